//! Twitter API v2 publisher

use crate::error::{RelayError, RelayResult};
use crate::publish::{PostId, Publisher};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: CreatedTweet,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

/// Posts as the bot account with an OAuth 2.0 user access token
#[derive(Clone)]
pub struct TwitterPublisher {
    access_token: String,
    http: reqwest::Client,
    base_url: String,
}

impl TwitterPublisher {
    pub fn new(access_token: String) -> RelayResult<Self> {
        if access_token.trim().is_empty() {
            return Err(RelayError::Config(
                "Twitter access token cannot be empty".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| RelayError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            access_token,
            http,
            base_url: "https://api.twitter.com/2/tweets".to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_body(body: &str, in_reply_to: Option<&str>) -> serde_json::Value {
        let mut request = json!({ "text": body });
        if let Some(parent_id) = in_reply_to {
            request["reply"] = json!({ "in_reply_to_tweet_id": parent_id });
        }
        request
    }
}

impl std::fmt::Debug for TwitterPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterPublisher")
            .field("access_token", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl Publisher for TwitterPublisher {
    async fn post(&self, body: &str, in_reply_to: Option<&str>) -> RelayResult<PostId> {
        debug!(reply_to = ?in_reply_to, "Posting {} characters", body.chars().count());
        let resp = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.access_token)
            .json(&Self::request_body(body, in_reply_to))
            .send()
            .await?;

        let status = resp.status();
        let raw = resp.text().await?;
        if !status.is_success() {
            return Err(RelayError::PublishRejected {
                status: status.as_u16(),
                raw,
            });
        }

        let created: CreateTweetResponse =
            serde_json::from_str(&raw).map_err(|_| RelayError::ValidationGap {
                service: "Twitter".to_string(),
                raw: raw.clone(),
            })?;
        Ok(created.data.id)
    }
}
