//! Translation backend trait and helpers
//!
//! Each provider (Google Translate, Naver Papago, the mock) implements
//! [`Translator`]; the pipeline only ever talks to them through
//! [`crate::translate::TranslationGateway`].

use crate::error::{RelayError, RelayResult};
use async_trait::async_trait;

/// What a backend returned for one request
///
/// Both providers may answer a single input with several translated
/// segments, so the shape is kept until the caller flattens it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Single(String),
    Multiple(Vec<String>),
}

impl Translation {
    /// Flatten into one text; segments are joined with newlines
    pub fn into_text(self) -> String {
        match self {
            Translation::Single(text) => text,
            Translation::Multiple(texts) => texts.join("\n"),
        }
    }
}

/// Generic trait for translation providers
///
/// Implementations are expected to surface malformed responses as
/// [`RelayError::ValidationGap`] and error payloads as
/// [`RelayError::Service`], with the raw payload attached.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source_lang` to `target_lang`
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> RelayResult<Translation>;

    /// Name of this provider, used in logs and error messages
    fn provider_name(&self) -> &str;
}

/// Normalize a language code by stripping region information
///
/// - `ko-KR` → `ko`
/// - `zh-CN` → `zh`
/// - `ja` → `ja`
pub fn normalize_lang(lang: &str) -> String {
    lang.split('-').next().unwrap_or(lang).to_lowercase()
}

/// Check that a language code only holds alphanumerics, hyphens and underscores
pub fn validate_lang(lang: &str) -> RelayResult<()> {
    if lang.is_empty() {
        return Err(RelayError::Config("Language code is empty".to_string()));
    }

    if !lang
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(RelayError::Config(format!(
            "Invalid characters in language code: {}",
            lang
        )));
    }

    Ok(())
}
