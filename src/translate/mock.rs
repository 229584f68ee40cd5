//! Mock translator for testing
//!
//! A deterministic, network-free [`Translator`] used to drive the pipeline
//! in tests. It counts its calls so tests can assert that a backend was
//! never contacted.
//!
//! ```ignore
//! let mock = MockTranslator::new(MockMode::Suffix);
//! let result = mock.translate("hello", "ko", "ja").await?;
//! assert_eq!(result.into_text(), "hello_ja");
//! ```

use crate::error::{RelayError, RelayResult};
use crate::translate::translator::{Translation, Translator};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target language: "hello" → "hello_ja"
    Suffix,

    /// Predefined text → translation mappings, falling back to `Suffix`
    Mappings(HashMap<String, String>),

    /// Split on newlines and answer with several segments
    Segmented,

    /// Answer with an error payload
    Error(String),

    /// Answer successfully with a payload the client cannot read
    Malformed,

    /// Return input unchanged
    NoOp,
}

/// Mock translator that simulates various backend behaviors
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    name: String,
    calls: Arc<AtomicUsize>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            name: "Mock Translator".to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Give the mock a distinct name, to tell two backends apart in errors
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of translate calls received so far, shared between clones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn apply_translation(&self, text: &str, target: &str) -> RelayResult<Translation> {
        match &self.mode {
            MockMode::Suffix => Ok(Translation::Single(format!("{}_{}", text, target))),
            MockMode::Mappings(map) => Ok(Translation::Single(
                map.get(text)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)),
            )),
            MockMode::Segmented => Ok(Translation::Multiple(
                text.lines().map(|l| format!("{}_{}", l, target)).collect(),
            )),
            MockMode::Error(msg) => Err(RelayError::Service {
                service: self.name.clone(),
                raw: msg.clone(),
            }),
            MockMode::Malformed => Err(RelayError::ValidationGap {
                service: self.name.clone(),
                raw: r#"{"message":{"result":{}}}"#.to_string(),
            }),
            MockMode::NoOp => Ok(Translation::Single(text.to_string())),
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        target_lang: &str,
    ) -> RelayResult<Translation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.apply_translation(text, target_lang)
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_suffix_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock.translate("hello", "ko", "ja").await.unwrap();
        assert_eq!(result, Translation::Single("hello_ja".to_string()));
    }

    #[tokio::test]
    async fn test_mapping_with_fallback() {
        let mut map = HashMap::new();
        map.insert("안녕".to_string(), "こんにちは".to_string());
        let mock = MockTranslator::new(MockMode::Mappings(map));

        assert_eq!(
            mock.translate("안녕", "ko", "ja").await.unwrap().into_text(),
            "こんにちは"
        );
        assert_eq!(
            mock.translate("unknown", "ko", "ja").await.unwrap().into_text(),
            "unknown_ja"
        );
    }

    #[tokio::test]
    async fn test_segmented_translation() {
        let mock = MockTranslator::new(MockMode::Segmented);
        let result = mock.translate("a\nb", "ko", "ja").await.unwrap();
        assert_eq!(
            result,
            Translation::Multiple(vec!["a_ja".to_string(), "b_ja".to_string()])
        );
    }

    #[tokio::test]
    async fn test_error_mode() {
        let mock = MockTranslator::new(MockMode::Error("quota exceeded".to_string())).named("naver");
        match mock.translate("hello", "ko", "ja").await {
            Err(RelayError::Service { service, raw }) => {
                assert_eq!(service, "naver");
                assert_eq!(raw, "quota exceeded");
            }
            _ => panic!("Expected Service error"),
        }
    }

    #[tokio::test]
    async fn test_malformed_mode() {
        let mock = MockTranslator::new(MockMode::Malformed);
        assert!(matches!(
            mock.translate("hello", "ko", "ja").await,
            Err(RelayError::ValidationGap { .. })
        ));
    }

    #[tokio::test]
    async fn test_call_counter_shared_between_clones() {
        let mock = MockTranslator::new(MockMode::NoOp);
        let clone = mock.clone();
        assert_eq!(mock.calls(), 0);

        clone.translate("a", "ko", "ja").await.unwrap();
        let _ = mock.translate("b", "ko", "ja").await;
        assert_eq!(mock.calls(), 2);
        assert_eq!(clone.calls(), 2);
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(
            MockTranslator::new(MockMode::Suffix).provider_name(),
            "Mock Translator"
        );
    }
}
