//! Posting fragments to the bot account

pub mod mock;
pub mod throttle;
pub mod twitter;

use crate::error::RelayResult;
use async_trait::async_trait;

pub use mock::{PostedFragment, RecordingPublisher};
pub use throttle::PublishThrottle;
pub use twitter::TwitterPublisher;

/// Id the publishing service assigned to a post
pub type PostId = String;

/// A service that accepts one post at a time
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `body`, as a reply to `in_reply_to` when given
    async fn post(&self, body: &str, in_reply_to: Option<&str>) -> RelayResult<PostId>;
}
