//! Per-tweet document and its lifecycle
//!
//! A [`TweetRecord`] is created once at ingestion and then moved forward by
//! the sweeps in [`crate::pipeline`]. All mutation goes through a
//! [`RecordPatch`], which is checked against the record invariants before it
//! is persisted:
//!
//! - a backend cannot be post-processed unless it has been translated
//! - a post-processed backend always has non-empty cleaned text
//! - once a record is tweeted, translation fields are frozen

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RelayError, RelayResult};

/// One of the two translation providers a record is translated with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Google Translate; drives stage selection
    Primary,
    /// Naver Papago
    Secondary,
}

impl Backend {
    /// Every backend, primary first. Publishing follows this order.
    pub const ALL: [Backend; 2] = [Backend::Primary, Backend::Secondary];

    /// Field name used in the stored document
    pub fn key(self) -> &'static str {
        match self {
            Backend::Primary => "primary",
            Backend::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Snapshot of a source tweet as returned by the timeline API
///
/// Only the fields the pipeline reads are typed; everything else is kept
/// verbatim in `extra` so the stored snapshot is the full payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTweet {
    pub id: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(alias = "full_text")]
    pub text: String,
    #[serde(default)]
    pub entities: Entities,
    pub user: TweetUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retweeted_status: Option<ResharedTweet>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<UrlEntity>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlEntity {
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetUser {
    pub screen_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Back-reference carried by a retweet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResharedTweet {
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SourceTweet {
    /// Link to the tweet on the source platform
    pub fn permalink(&self) -> String {
        format!(
            "https://twitter.com/{}/status/{}",
            self.user.screen_name, self.id
        )
    }

    /// Id of the tweet this one reshares, if any
    pub fn reshared_id(&self) -> Option<i64> {
        self.retweeted_status.as_ref().map(|r| r.id)
    }

    pub fn url_entities(&self) -> Vec<String> {
        self.entities.urls.iter().map(|u| u.url.clone()).collect()
    }

    pub fn media_urls(&self) -> Vec<String> {
        self.entities
            .media
            .iter()
            .flatten()
            .map(|m| m.url.clone())
            .collect()
    }
}

/// Translation state of one backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendState {
    pub translated: bool,
    pub post_processed: bool,
    /// Text as returned by the translation backend
    pub raw: String,
    /// Text after post-processing; what gets published
    pub cleaned: String,
}

impl BackendState {
    /// True when this backend has something to publish
    pub fn is_publishable(&self) -> bool {
        self.post_processed && !self.cleaned.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translations {
    pub primary: BackendState,
    pub secondary: BackendState,
}

impl Translations {
    pub fn get(&self, backend: Backend) -> &BackendState {
        match backend {
            Backend::Primary => &self.primary,
            Backend::Secondary => &self.secondary,
        }
    }

    fn get_mut(&mut self, backend: Backend) -> &mut BackendState {
        match backend {
            Backend::Primary => &mut self.primary,
            Backend::Secondary => &mut self.secondary,
        }
    }
}

/// Pipeline stage of a record, derived from its flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    New,
    Translated,
    PostProcessed,
    Published,
}

/// The stored document for one source tweet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetRecord {
    #[serde(rename = "_id")]
    pub id: i64,
    pub tweet: SourceTweet,
    /// Stored as a BSON date, so only millisecond precision survives a store
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub captured_at: DateTime<Utc>,
    pub translations: Translations,
    pub tweeted: bool,
    #[serde(default)]
    pub already_published_elsewhere: bool,
}

impl TweetRecord {
    /// Build a fresh record in the `New` stage
    pub fn new(tweet: SourceTweet, captured_at: DateTime<Utc>) -> Self {
        Self {
            id: tweet.id,
            tweet,
            captured_at,
            translations: Translations::default(),
            tweeted: false,
            already_published_elsewhere: false,
        }
    }

    /// Build a record for a reshare of content this bot already relayed.
    /// It is terminal from the start and never translated.
    pub fn already_published(tweet: SourceTweet, captured_at: DateTime<Utc>) -> Self {
        Self {
            tweeted: true,
            already_published_elsewhere: true,
            ..Self::new(tweet, captured_at)
        }
    }

    pub fn backend(&self, backend: Backend) -> &BackendState {
        self.translations.get(backend)
    }

    pub fn stage(&self) -> Stage {
        let primary = &self.translations.primary;
        if self.tweeted {
            Stage::Published
        } else if primary.post_processed {
            Stage::PostProcessed
        } else if primary.translated {
            Stage::Translated
        } else {
            Stage::New
        }
    }

    /// Check the record invariants
    pub fn validate(&self) -> RelayResult<()> {
        for backend in Backend::ALL {
            let state = self.backend(backend);
            if state.post_processed && !state.translated {
                return Err(self.violation(format!(
                    "{} post-processed without being translated",
                    backend
                )));
            }
            if state.post_processed && state.cleaned.is_empty() {
                return Err(self.violation(format!(
                    "{} marked post-processed with empty text",
                    backend
                )));
            }
        }
        Ok(())
    }

    /// Apply a patch in place, rejecting it if the result would be illegal.
    /// On error the record is left unchanged.
    pub fn apply(&mut self, patch: &RecordPatch) -> RelayResult<()> {
        if self.tweeted && patch.touches_translations() {
            return Err(self.violation("record already tweeted".to_string()));
        }

        let mut next = self.clone();
        for set in &patch.sets {
            match set {
                FieldSet::Raw(b, text) => next.translations.get_mut(*b).raw = text.clone(),
                FieldSet::Cleaned(b, text) => {
                    next.translations.get_mut(*b).cleaned = text.clone()
                }
                FieldSet::Translated(b, flag) => next.translations.get_mut(*b).translated = *flag,
                FieldSet::PostProcessed(b, flag) => {
                    next.translations.get_mut(*b).post_processed = *flag
                }
                FieldSet::Tweeted(flag) => next.tweeted = *flag,
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    fn violation(&self, reason: String) -> RelayError {
        RelayError::Invariant {
            id: self.id,
            reason,
        }
    }
}

/// A single field assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSet {
    Raw(Backend, String),
    Cleaned(Backend, String),
    Translated(Backend, bool),
    PostProcessed(Backend, bool),
    Tweeted(bool),
}

impl FieldSet {
    /// Dotted path of the field in the stored document
    pub fn path(&self) -> String {
        match self {
            FieldSet::Raw(b, _) => format!("translations.{}.raw", b.key()),
            FieldSet::Cleaned(b, _) => format!("translations.{}.cleaned", b.key()),
            FieldSet::Translated(b, _) => format!("translations.{}.translated", b.key()),
            FieldSet::PostProcessed(b, _) => format!("translations.{}.post_processed", b.key()),
            FieldSet::Tweeted(_) => "tweeted".to_string(),
        }
    }
}

/// Partial update of a record, applied as one `$set`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub sets: Vec<FieldSet>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(mut self, backend: Backend, text: impl Into<String>) -> Self {
        self.sets.push(FieldSet::Raw(backend, text.into()));
        self
    }

    pub fn cleaned(mut self, backend: Backend, text: impl Into<String>) -> Self {
        self.sets.push(FieldSet::Cleaned(backend, text.into()));
        self
    }

    pub fn translated(mut self, backend: Backend, flag: bool) -> Self {
        self.sets.push(FieldSet::Translated(backend, flag));
        self
    }

    pub fn post_processed(mut self, backend: Backend, flag: bool) -> Self {
        self.sets.push(FieldSet::PostProcessed(backend, flag));
        self
    }

    pub fn tweeted(mut self) -> Self {
        self.sets.push(FieldSet::Tweeted(true));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    fn touches_translations(&self) -> bool {
        self.sets
            .iter()
            .any(|s| !matches!(s, FieldSet::Tweeted(_)))
    }
}
