use clap::{Arg, ArgAction, Command as Cli};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tweet_relay::config::{RelayConfig, config_dir};
use tweet_relay::pipeline::{Collaborators, Command, Pipeline, RunOptions};
use tweet_relay::publish::TwitterPublisher;
use tweet_relay::store::MongoStore;
use tweet_relay::timeline::TwitterTimeline;
use tweet_relay::translate::{
    GoogleTranslateProvider, NaverTranslateProvider, TranslationGateway,
};
use tweet_relay::{Backend, RelayError, RelayResult};

fn cli() -> Cli {
    Cli::new("tweet-relay")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Relay tweets as machine-translated reply threads")
        .arg(
            Arg::new("account")
                .help("Bot account to run as (key in settings.yaml and credentials.yaml)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("commands")
                .help("Steps to run, in the order given")
                .required(true)
                .num_args(1..)
                .value_parser(Command::NAMES)
                .index(2),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .short('c')
                .help("Directory holding the YAML config files (default: .)"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .help("Redo translation or post-processing that already ran")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("google")
                .long("google")
                .help("Translate with Google Translate")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("naver")
                .long("naver")
                .help("Translate with Naver Papago")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every request and record")
                .action(ArgAction::SetTrue),
        )
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match run(&matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(matches: &clap::ArgMatches) -> RelayResult<()> {
    let account = matches
        .get_one::<String>("account")
        .ok_or_else(|| RelayError::Config("account is required".to_string()))?;
    let commands = matches
        .get_many::<String>("commands")
        .into_iter()
        .flatten()
        .map(|name| name.parse::<Command>())
        .collect::<RelayResult<Vec<Command>>>()?;

    let mut backends = Vec::new();
    if matches.get_flag("google") {
        backends.push(Backend::Primary);
    }
    if matches.get_flag("naver") {
        backends.push(Backend::Secondary);
    }
    let options = RunOptions {
        force: matches.get_flag("force"),
        backends,
    };

    let dir = config_dir(matches.get_one::<String>("config-dir"));
    let RelayConfig {
        account,
        settings,
        google_api_key,
        credentials,
        dictionary,
    } = RelayConfig::load(&dir, account)?;

    let store = MongoStore::connect(&settings.mongo_uri, &settings.database_name).await?;
    let gateway = TranslationGateway::new()
        .with_backend(
            Backend::Primary,
            Arc::new(GoogleTranslateProvider::new(google_api_key)?),
        )
        .with_backend(
            Backend::Secondary,
            Arc::new(NaverTranslateProvider::new(
                credentials.naver_api_id,
                credentials.naver_api_secret,
            )?),
        );
    let collaborators = Collaborators {
        store: Arc::new(store),
        gateway,
        publisher: Arc::new(TwitterPublisher::new(credentials.twitter_access_token)?),
        timeline: Arc::new(TwitterTimeline::new(credentials.twitter_bearer_token)?),
    };

    let pipeline = Pipeline::new(&account, settings, dictionary, collaborators)?;
    info!(account = %account, ?options, "Starting");

    for command in commands {
        let report = pipeline.run(command, &options).await?;
        println!("✅ {}: {}", command, report);
    }
    Ok(())
}
