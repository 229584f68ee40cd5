//! YAML configuration
//!
//! Three files are read from the config directory at start-up and handed to
//! the pipeline as immutable values:
//!
//! ```yaml
//! # settings.yaml
//! rhythpri_ko_ja:
//!   database_name: rhythpri_ko_ja
//!   target_accounts: [anidong3282, PRIPARA_TV]
//!   source_lang: ko
//!   target_lang: ja
//!
//! # credentials.yaml
//! google-api-key: "..."
//! rhythpri_ko_ja:
//!   naver-api-id: "..."
//!   naver-api-secret: "..."
//!   twitter-access-token: "..."
//!   twitter-bearer-token: "..."
//!
//! # correct_dict.yaml
//! pre:
//!   프리파라: プリパラ
//! post:
//!   プリパラ TV: プリパラTV
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RelayError, RelayResult};
use crate::record::Backend;

pub const SETTINGS_FILE: &str = "settings.yaml";
pub const CREDENTIALS_FILE: &str = "credentials.yaml";
pub const DICTIONARY_FILE: &str = "correct_dict.yaml";

/// Per-account settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountSettings {
    pub database_name: String,
    /// Handles whose timelines are relayed
    pub target_accounts: Vec<String>,
    pub source_lang: String,
    pub target_lang: String,
    #[serde(default = "default_mongo_uri")]
    pub mongo_uri: String,
    /// Number of tweets fetched per timeline
    #[serde(default = "default_timeline_count")]
    pub timeline_count: u32,
    #[serde(default)]
    pub thread: ThreadSettings,
    /// Minimum pause between two publish calls
    #[serde(default = "default_publish_delay_secs")]
    pub publish_delay_secs: u64,
    #[serde(default)]
    pub backend_labels: BackendLabels,
}

fn default_mongo_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_timeline_count() -> u32 {
    200
}

fn default_publish_delay_secs() -> u64 {
    5
}

/// Character budget of published posts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThreadSettings {
    pub max_post_length: usize,
    /// Room kept for the shortened permalink
    pub reserved_link_length: usize,
    /// Extra room kept on the first post of a thread
    pub extra_margin: usize,
}

impl Default for ThreadSettings {
    fn default() -> Self {
        Self {
            max_post_length: 100,
            reserved_link_length: 24,
            extra_margin: 12,
        }
    }
}

/// Text put in front of each backend's translation when it is published
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendLabels {
    pub primary: String,
    pub secondary: String,
}

impl Default for BackendLabels {
    fn default() -> Self {
        Self {
            primary: String::new(),
            secondary: "N/".to_string(),
        }
    }
}

impl BackendLabels {
    pub fn label(&self, backend: Backend) -> &str {
        match backend {
            Backend::Primary => &self.primary,
            Backend::Secondary => &self.secondary,
        }
    }
}

/// Contents of `credentials.yaml`
#[derive(Deserialize)]
pub struct Credentials {
    #[serde(rename = "google-api-key")]
    pub google_api_key: String,
    #[serde(flatten)]
    pub accounts: HashMap<String, AccountCredentials>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("google_api_key", &"***")
            .field("accounts", &self.accounts.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccountCredentials {
    pub naver_api_id: String,
    pub naver_api_secret: String,
    /// OAuth 2.0 user token of the bot account, used for posting
    pub twitter_access_token: String,
    /// App-only token, used for reading timelines
    pub twitter_bearer_token: String,
}

impl std::fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("naver_api_id", &self.naver_api_id)
            .field("naver_api_secret", &"***")
            .field("twitter_access_token", &"***")
            .field("twitter_bearer_token", &"***")
            .finish()
    }
}

/// Literal find/replace tables correcting systematic translation errors
///
/// Entries keep the order they have in the YAML file; replacements are
/// applied in that order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDictionary")]
pub struct CorrectionDictionary {
    /// Applied to source text before translation
    pub pre: Vec<(String, String)>,
    /// Applied to translated text
    pub post: Vec<(String, String)>,
    /// Target language the `pre` table maps into
    pub pre_target_lang: String,
}

impl Default for CorrectionDictionary {
    fn default() -> Self {
        Self {
            pre: Vec::new(),
            post: Vec::new(),
            pre_target_lang: "ja".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct RawDictionary {
    #[serde(default)]
    pre: Option<serde_yaml::Mapping>,
    #[serde(default)]
    post: Option<serde_yaml::Mapping>,
    #[serde(default)]
    pre_target_lang: Option<String>,
}

impl TryFrom<RawDictionary> for CorrectionDictionary {
    type Error = String;

    fn try_from(raw: RawDictionary) -> Result<Self, Self::Error> {
        Ok(Self {
            pre: ordered_pairs("pre", raw.pre)?,
            post: ordered_pairs("post", raw.post)?,
            pre_target_lang: raw.pre_target_lang.unwrap_or_else(|| "ja".to_string()),
        })
    }
}

fn ordered_pairs(
    table: &str,
    mapping: Option<serde_yaml::Mapping>,
) -> Result<Vec<(String, String)>, String> {
    let mut pairs = Vec::new();
    for (key, value) in mapping.unwrap_or_default() {
        match (scalar(&key), scalar(&value)) {
            (Some(k), Some(v)) => pairs.push((k, v)),
            _ => return Err(format!("'{}' entries must be plain strings", table)),
        }
    }
    Ok(pairs)
}

fn scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Everything one account needs to run
#[derive(Clone)]
pub struct RelayConfig {
    /// The bot account; also the key into settings and credentials
    pub account: String,
    pub settings: AccountSettings,
    pub google_api_key: String,
    pub credentials: AccountCredentials,
    pub dictionary: CorrectionDictionary,
}

impl RelayConfig {
    /// Load the three config files for `account` from `dir`
    pub fn load(dir: &Path, account: &str) -> RelayResult<Self> {
        let settings = load_settings(&dir.join(SETTINGS_FILE), account)?;
        let mut credentials = load_credentials(&dir.join(CREDENTIALS_FILE))?;
        let dictionary = load_dictionary(&dir.join(DICTIONARY_FILE))?;

        let account_credentials = credentials.accounts.remove(account).ok_or_else(|| {
            RelayError::Config(format!(
                "No credentials for account '{}' in {}",
                account, CREDENTIALS_FILE
            ))
        })?;

        Ok(Self {
            account: account.to_string(),
            settings,
            google_api_key: credentials.google_api_key,
            credentials: account_credentials,
            dictionary,
        })
    }

    /// Text put before every continuation post of a thread
    pub fn reply_prefix(&self) -> String {
        reply_prefix(&self.account)
    }
}

/// Mention that opens every continuation post of `account`'s threads
pub fn reply_prefix(account: &str) -> String {
    format!("@{} ", account)
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> RelayResult<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        RelayError::Config(format!("Failed to read file '{}': {}", path.display(), e))
    })?;
    serde_yaml::from_str(&content).map_err(|e| {
        RelayError::Config(format!(
            "Failed to parse YAML from '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Load the settings of one account from a `settings.yaml` file
pub fn load_settings(path: &Path, account: &str) -> RelayResult<AccountSettings> {
    let mut all: HashMap<String, AccountSettings> = read_yaml(path)?;
    all.remove(account).ok_or_else(|| {
        RelayError::Config(format!(
            "Account '{}' not found in '{}'",
            account,
            path.display()
        ))
    })
}

pub fn load_credentials(path: &Path) -> RelayResult<Credentials> {
    read_yaml(path)
}

pub fn load_dictionary(path: &Path) -> RelayResult<CorrectionDictionary> {
    read_yaml(path)
}

/// Config directory given on the command line, or the working directory
pub fn config_dir(arg: Option<&String>) -> PathBuf {
    arg.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."))
}
