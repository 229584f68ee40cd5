//! In-process publisher for tests

use crate::error::{RelayError, RelayResult};
use crate::publish::{PostId, Publisher};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

/// One post accepted by a [`RecordingPublisher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedFragment {
    pub id: PostId,
    pub body: String,
    pub in_reply_to: Option<PostId>,
}

#[derive(Debug, Default)]
struct Log {
    posts: Vec<PostedFragment>,
    fail_after: Option<usize>,
}

/// Records every post and hands out sequential ids
///
/// Clones share the same log, so a test can keep a handle while the
/// pipeline owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    log: Arc<Mutex<Log>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every post once `n` posts have been accepted
    pub fn fail_after(&self, n: usize) {
        self.lock().fail_after = Some(n);
    }

    /// Accept posts again
    pub fn recover(&self) {
        self.lock().fail_after = None;
    }

    pub fn posts(&self) -> Vec<PostedFragment> {
        self.lock().posts.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Log> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn post(&self, body: &str, in_reply_to: Option<&str>) -> RelayResult<PostId> {
        let mut log = self.lock();
        if log.fail_after.is_some_and(|n| log.posts.len() >= n) {
            return Err(RelayError::PublishRejected {
                status: 429,
                raw: r#"{"title":"Too Many Requests"}"#.to_string(),
            });
        }

        let id = (1000 + log.posts.len() + 1).to_string();
        log.posts.push(PostedFragment {
            id: id.clone(),
            body: body.to_string(),
            in_reply_to: in_reply_to.map(str::to_string),
        });
        Ok(id)
    }
}
