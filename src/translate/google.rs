//! Google Translate API v2 backend
//!
//! ```ignore
//! let provider = GoogleTranslateProvider::new(config.google_api_key.clone())?;
//! let result = provider.translate("안녕하세요", "ko", "ja").await?;
//! println!("{}", result.into_text());
//! ```

use crate::error::{RelayError, RelayResult};
use crate::translate::translator::{Translation, Translator, normalize_lang, validate_lang};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

const SERVICE: &str = "Google Translate";

/// Google Translate API v2 provider
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    /// API key for authentication
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslateProvider {
    /// Maximum characters per request accepted by the API
    const MAX_CHARS_PER_STRING: usize = 30_000;

    /// Create a provider with an explicit API key
    pub fn new(api_key: String) -> RelayResult<Self> {
        if api_key.trim().is_empty() {
            return Err(RelayError::Config(
                "Google API key cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| RelayError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            base_url: "https://translation.googleapis.com/language/translate/v2".to_string(),
        })
    }

    /// Point the provider at another endpoint (e.g. a local stub)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Extract the translations from a successful response body
    ///
    /// One entry yields [`Translation::Single`], several yield
    /// [`Translation::Multiple`].
    fn parse_response(json: &Value) -> RelayResult<Translation> {
        let gap = || RelayError::ValidationGap {
            service: SERVICE.to_string(),
            raw: json.to_string(),
        };

        let translations = json["data"]["translations"].as_array().ok_or_else(gap)?;
        let mut texts = translations
            .iter()
            .map(|t| t["translatedText"].as_str().map(str::to_string).ok_or_else(gap))
            .collect::<RelayResult<Vec<String>>>()?;

        match texts.len() {
            0 => Err(gap()),
            1 => Ok(Translation::Single(texts.remove(0))),
            _ => Ok(Translation::Multiple(texts)),
        }
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl Translator for GoogleTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> RelayResult<Translation> {
        validate_lang(source_lang)?;
        validate_lang(target_lang)?;

        if text.is_empty() {
            return Ok(Translation::Single(String::new()));
        }

        if text.chars().count() > Self::MAX_CHARS_PER_STRING {
            return Err(RelayError::Config(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_STRING
            )));
        }

        let url = format!("{}?key={}", self.base_url, self.api_key);
        let body = json!({
            "q": text,
            "source": normalize_lang(source_lang),
            "target": normalize_lang(target_lang),
            "format": "text"
        });

        debug!(chars = text.chars().count(), "Sending request to {}", SERVICE);
        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RelayError::Service {
                service: SERVICE.to_string(),
                raw: format!("{}: {}", status, error_text),
            });
        }

        let raw = response.text().await?;
        let json: Value = serde_json::from_str(&raw).map_err(|_| RelayError::ValidationGap {
            service: SERVICE.to_string(),
            raw: raw.clone(),
        })?;

        Self::parse_response(&json)
    }

    fn provider_name(&self) -> &str {
        SERVICE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Initialization Tests ==========

    #[test]
    fn test_new_with_valid_key() {
        let provider = GoogleTranslateProvider::new("test-api-key".to_string()).unwrap();
        assert_eq!(provider.provider_name(), "Google Translate");
    }

    #[test]
    fn test_new_with_empty_key() {
        match GoogleTranslateProvider::new("   ".to_string()) {
            Err(RelayError::Config(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_debug_output_masks_key() {
        let provider = GoogleTranslateProvider::new("test-key".to_string()).unwrap();
        let debug_str = format!("{:?}", provider);
        assert!(debug_str.contains("***"));
        assert!(!debug_str.contains("test-key"));
    }

    // ========== Response Parsing Tests ==========

    #[test]
    fn test_parse_single_translation() {
        let json = json!({
            "data": { "translations": [ { "translatedText": "こんにちは" } ] }
        });
        assert_eq!(
            GoogleTranslateProvider::parse_response(&json).unwrap(),
            Translation::Single("こんにちは".to_string())
        );
    }

    #[test]
    fn test_parse_multiple_translations() {
        let json = json!({
            "data": { "translations": [
                { "translatedText": "一" },
                { "translatedText": "二" }
            ] }
        });
        assert_eq!(
            GoogleTranslateProvider::parse_response(&json).unwrap(),
            Translation::Multiple(vec!["一".to_string(), "二".to_string()])
        );
    }

    #[test]
    fn test_parse_missing_translations_keeps_payload() {
        let json = json!({ "error": { "code": 403, "message": "quota" } });
        match GoogleTranslateProvider::parse_response(&json) {
            Err(RelayError::ValidationGap { service, raw }) => {
                assert_eq!(service, "Google Translate");
                assert!(raw.contains("quota"));
            }
            _ => panic!("Expected ValidationGap"),
        }
    }

    #[test]
    fn test_parse_entry_without_text() {
        let json = json!({ "data": { "translations": [ { "detected": "ko" } ] } });
        assert!(GoogleTranslateProvider::parse_response(&json).is_err());
    }

    #[test]
    fn test_parse_empty_list() {
        let json = json!({ "data": { "translations": [] } });
        assert!(GoogleTranslateProvider::parse_response(&json).is_err());
    }

    // ========== Validation Tests ==========

    #[tokio::test]
    async fn test_translate_empty_text_skips_request() {
        // Unroutable endpoint: any request would fail
        let provider = GoogleTranslateProvider::new("test-key".to_string())
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let result = provider.translate("", "ko", "ja").await.unwrap();
        assert_eq!(result.into_text(), "");
    }

    #[tokio::test]
    async fn test_translate_invalid_lang() {
        let provider = GoogleTranslateProvider::new("test-key".to_string()).unwrap();
        assert!(provider.translate("hello", "ko", "ja#").await.is_err());
    }

    #[tokio::test]
    async fn test_translate_text_too_long() {
        let provider = GoogleTranslateProvider::new("test-key".to_string()).unwrap();
        let long_text = "x".repeat(GoogleTranslateProvider::MAX_CHARS_PER_STRING + 1);
        match provider.translate(&long_text, "ko", "ja").await {
            Err(RelayError::Config(msg)) => assert!(msg.contains("exceeds maximum")),
            _ => panic!("Expected Config error"),
        }
    }

    // ========== Integration Tests (require real API key) ==========

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_api_translation() {
        let Ok(key) = std::env::var("GOOGLE_TRANSLATE_API_KEY") else {
            eprintln!("Skipping: GOOGLE_TRANSLATE_API_KEY not set");
            return;
        };

        let provider = GoogleTranslateProvider::new(key).unwrap();
        let result = provider.translate("안녕하세요", "ko", "ja").await.unwrap();
        println!("Translation: 안녕하세요 → {:?}", result);
        assert!(!result.into_text().is_empty());
    }
}
