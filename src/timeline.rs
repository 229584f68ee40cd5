//! Fetching the recent tweets of a source account

use crate::error::{RelayError, RelayResult};
use crate::record::SourceTweet;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// Most recent tweets of `handle`, newest first
    async fn user_timeline(&self, handle: &str, count: u32) -> RelayResult<Vec<SourceTweet>>;
}

/// Twitter API v1.1 `statuses/user_timeline` with an app bearer token
#[derive(Clone)]
pub struct TwitterTimeline {
    bearer_token: String,
    http: reqwest::Client,
    base_url: String,
}

impl TwitterTimeline {
    pub fn new(bearer_token: String) -> RelayResult<Self> {
        if bearer_token.trim().is_empty() {
            return Err(RelayError::Config(
                "Twitter bearer token cannot be empty".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| RelayError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            bearer_token,
            http,
            base_url: "https://api.twitter.com/1.1/statuses/user_timeline.json".to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl std::fmt::Debug for TwitterTimeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterTimeline")
            .field("bearer_token", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl TimelineSource for TwitterTimeline {
    async fn user_timeline(&self, handle: &str, count: u32) -> RelayResult<Vec<SourceTweet>> {
        let count = count.to_string();
        let query = [
            ("screen_name", handle),
            ("count", count.as_str()),
            ("tweet_mode", "extended"),
        ];

        debug!(handle, "Fetching timeline");
        let resp = self
            .http
            .get(&self.base_url)
            .bearer_auth(&self.bearer_token)
            .query(&query)
            .send()
            .await?;

        let status = resp.status();
        let raw = resp.text().await?;
        if !status.is_success() {
            return Err(RelayError::Service {
                service: "Twitter timeline".to_string(),
                raw: format!("{}: {}", status, raw),
            });
        }

        parse_timeline(&raw)
    }
}

fn parse_timeline(raw: &str) -> RelayResult<Vec<SourceTweet>> {
    serde_json::from_str(raw).map_err(|e| RelayError::ValidationGap {
        service: "Twitter timeline".to_string(),
        raw: format!("{}: {}", e, raw),
    })
}

/// Serves canned timelines, keyed by handle
#[derive(Debug, Clone, Default)]
pub struct StaticTimeline {
    timelines: Arc<Mutex<HashMap<String, Vec<SourceTweet>>>>,
}

impl StaticTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, handle: &str, tweets: Vec<SourceTweet>) {
        self.timelines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle.to_string(), tweets);
    }
}

#[async_trait]
impl TimelineSource for StaticTimeline {
    async fn user_timeline(&self, handle: &str, count: u32) -> RelayResult<Vec<SourceTweet>> {
        let timelines = self.timelines.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(timelines
            .get(handle)
            .map(|tweets| tweets.iter().take(count as usize).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::sample_tweet;

    #[test]
    fn test_parse_extended_timeline() {
        let raw = r#"[
            {
                "id": 1350000000000000001,
                "created_at": "Sat Jan 16 10:00:00 +0000 2021",
                "full_text": "오늘 방송 https://t.co/abc",
                "entities": { "urls": [ { "url": "https://t.co/abc" } ] },
                "user": { "screen_name": "PRIPARA_TV" },
                "lang": "ko"
            }
        ]"#;
        let tweets = parse_timeline(raw).unwrap();
        assert_eq!(tweets.len(), 1);
        assert_eq!(tweets[0].text, "오늘 방송 https://t.co/abc");
        assert_eq!(tweets[0].url_entities(), vec!["https://t.co/abc".to_string()]);
        assert_eq!(tweets[0].extra["lang"], "ko");
    }

    #[test]
    fn test_parse_error_payload_is_validation_gap() {
        let raw = r#"{"errors":[{"code":89,"message":"Invalid or expired token."}]}"#;
        match parse_timeline(raw) {
            Err(RelayError::ValidationGap { raw, .. }) => assert!(raw.contains("expired")),
            _ => panic!("Expected ValidationGap"),
        }
    }

    #[test]
    fn test_empty_bearer_token_rejected() {
        assert!(TwitterTimeline::new(" ".to_string()).is_err());
    }

    #[tokio::test]
    async fn test_static_timeline_honors_count() {
        let timeline = StaticTimeline::new();
        timeline.set(
            "PRIPARA_TV",
            vec![sample_tweet(3, "c"), sample_tweet(2, "b"), sample_tweet(1, "a")],
        );

        let tweets = timeline.user_timeline("PRIPARA_TV", 2).await.unwrap();
        assert_eq!(tweets.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 2]);
        assert!(timeline.user_timeline("unknown", 200).await.unwrap().is_empty());
    }
}
