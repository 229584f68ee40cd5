//! Naver Papago translation backend

use crate::error::{RelayError, RelayResult};
use crate::translate::translator::{Translation, Translator, validate_lang};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

const SERVICE: &str = "Naver Papago";

/// Naver Papago NMT provider
#[derive(Clone)]
pub struct NaverTranslateProvider {
    client_id: String,
    client_secret: String,
    client: reqwest::Client,
    base_url: String,
}

impl NaverTranslateProvider {
    pub fn new(client_id: String, client_secret: String) -> RelayResult<Self> {
        if client_id.trim().is_empty() || client_secret.trim().is_empty() {
            return Err(RelayError::Config(
                "Naver client id and secret cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| RelayError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client_id,
            client_secret,
            client,
            base_url: "https://openapi.naver.com/v1/language/translate".to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read `message.result.translatedText` or `message.result.translatedTexts`
    fn parse_response(json: &Value) -> RelayResult<Translation> {
        let result = &json["message"]["result"];

        if let Some(text) = result["translatedText"].as_str() {
            return Ok(Translation::Single(text.to_string()));
        }

        if let Some(list) = result["translatedTexts"].as_array() {
            let texts: Option<Vec<String>> = list
                .iter()
                .map(|t| t.as_str().map(str::to_string))
                .collect();
            if let Some(texts) = texts {
                return Ok(Translation::Multiple(texts));
            }
        }

        Err(RelayError::ValidationGap {
            service: SERVICE.to_string(),
            raw: json.to_string(),
        })
    }
}

impl std::fmt::Debug for NaverTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaverTranslateProvider")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl Translator for NaverTranslateProvider {
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

        let params = [
            ("source", source_lang),
            ("target", target_lang),
            ("text", text),
        ];

        debug!(chars = text.chars().count(), "Sending request to {}", SERVICE);
        let response = self
            .client
            .post(&self.base_url)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            return Err(RelayError::Service {
                service: SERVICE.to_string(),
                raw: format!("{}: {}", status, raw),
            });
        }

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
