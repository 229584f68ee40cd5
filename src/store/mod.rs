//! Persistence of tweet records

pub mod filter;
pub mod memory;
pub mod mongo;

use crate::error::RelayResult;
use crate::record::{RecordPatch, TweetRecord};
use async_trait::async_trait;

pub use filter::Filter;
pub use memory::InMemoryStore;
pub use mongo::MongoStore;

/// Collection of tweet records keyed by source tweet id
///
/// Implementations validate every patch against the record invariants
/// before persisting it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(&self, id: i64) -> RelayResult<Option<TweetRecord>>;

    /// Records matching `filter`, ascending by id
    async fn find(&self, filter: &Filter) -> RelayResult<Vec<TweetRecord>>;

    /// Fails if a record with the same id exists
    async fn insert(&self, record: &TweetRecord) -> RelayResult<()>;

    async fn update(&self, id: i64, patch: &RecordPatch) -> RelayResult<()>;
}
