/// Record lifecycle sweeps
///
/// The pipeline moves records through their stages with four independent
/// passes over the store:
///
/// 1. **Ingest** (`save_tweet`) - new source tweets become records
/// 2. **Translate** - each requested backend fills its raw text
/// 3. **Post-process** - raw text is cleaned for publishing
/// 4. **Publish** (`tweet`) - cleaned text is posted as a reply thread
///
/// Each pass selects records by their flags, so any pass can be re-run after
/// a failure; a record's flags are only written once its work succeeded.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new(&config.account, config.settings, config.dictionary, collaborators)?;
/// let report = pipeline.translate_sweep(&[Backend::Primary], false).await?;
/// println!("{}", report);
/// ```
pub mod ingest;
pub mod post_process;
pub mod publish;
pub mod translate;


use crate::chunker::ThreadLimits;
use crate::config::{AccountSettings, CorrectionDictionary, reply_prefix};
use crate::error::{RelayError, RelayResult};
use crate::normalizer::Direction;
use crate::publish::{PublishThrottle, Publisher};
use crate::record::Backend;
use crate::store::DocumentStore;
use crate::timeline::TimelineSource;
use crate::translate::TranslationGateway;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records (or source items) the sweep looked at
    pub selected: usize,
    /// Records it inserted or changed
    pub updated: usize,
}

impl std::ops::AddAssign for SweepReport {
    fn add_assign(&mut self, other: Self) {
        self.selected += other.selected;
        self.updated += other.updated;
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} selected, {} updated", self.selected, self.updated)
    }
}

/// One step that can be requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SaveTweet,
    Translate,
    PostProcess,
    Tweet,
}

impl Command {
    pub const NAMES: [&'static str; 4] = ["save_tweet", "translate", "post_process", "tweet"];

    pub fn name(self) -> &'static str {
        match self {
            Command::SaveTweet => "save_tweet",
            Command::Translate => "translate",
            Command::PostProcess => "post_process",
            Command::Tweet => "tweet",
        }
    }
}

impl FromStr for Command {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "save_tweet" => Ok(Command::SaveTweet),
            "translate" => Ok(Command::Translate),
            "post_process" => Ok(Command::PostProcess),
            "tweet" => Ok(Command::Tweet),
            other => Err(RelayError::Config(format!(
                "Unknown command '{}', expected one of: {}",
                other,
                Command::NAMES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Flags shared by all commands of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub force: bool,
    /// Backends to translate with; empty means all of them
    pub backends: Vec<Backend>,
}

/// External services the pipeline talks to
pub struct Collaborators {
    pub store: Arc<dyn DocumentStore>,
    pub gateway: TranslationGateway,
    pub publisher: Arc<dyn Publisher>,
    pub timeline: Arc<dyn TimelineSource>,
}

/// Everything one account's sweeps need, passed in explicitly
pub struct Pipeline {
    account: String,
    settings: AccountSettings,
    dictionary: CorrectionDictionary,
    direction: Direction,
    limits: ThreadLimits,
    throttle: PublishThrottle,
    store: Arc<dyn DocumentStore>,
    gateway: TranslationGateway,
    publisher: Arc<dyn Publisher>,
    timeline: Arc<dyn TimelineSource>,
}

impl Pipeline {
    pub fn new(
        account: &str,
        settings: AccountSettings,
        dictionary: CorrectionDictionary,
        collaborators: Collaborators,
    ) -> RelayResult<Self> {
        let limits = ThreadLimits::from_settings(&settings.thread, reply_prefix(account))?;
        let direction = Direction::for_target(&dictionary, &settings.target_lang);
        let throttle = PublishThrottle::new(Duration::from_secs(settings.publish_delay_secs));

        Ok(Self {
            account: account.to_string(),
            settings,
            dictionary,
            direction,
            limits,
            throttle,
            store: collaborators.store,
            gateway: collaborators.gateway,
            publisher: collaborators.publisher,
            timeline: collaborators.timeline,
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Run one command with the invocation's flags
    pub async fn run(&self, command: Command, options: &RunOptions) -> RelayResult<SweepReport> {
        match command {
            Command::SaveTweet => self.save_tweets().await,
            Command::Translate => self.translate_sweep(&options.backends, options.force).await,
            Command::PostProcess => self.post_process_sweep(options.force).await,
            Command::Tweet => self.publish_sweep().await,
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("account", &self.account)
            .field("gateway", &self.gateway)
            .field("limits", &self.limits)
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names_roundtrip() {
        for name in Command::NAMES {
            let command: Command = name.parse().unwrap();
            assert_eq!(command.name(), name);
        }
    }

    #[test]
    fn test_unknown_command() {
        match "publish".parse::<Command>() {
            Err(RelayError::Config(msg)) => assert!(msg.contains("save_tweet")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_reports_add_up() {
        let mut total = SweepReport::default();
        total += SweepReport {
            selected: 3,
            updated: 1,
        };
        total += SweepReport {
            selected: 2,
            updated: 2,
        };
        assert_eq!(total.to_string(), "5 selected, 3 updated");
    }
}
