//! Relays the tweets of source accounts as machine-translated reply threads
//! under a bot account.
//!
//! Each source tweet becomes a [`TweetRecord`] in a document store and moves
//! through the sweeps of a [`Pipeline`]: ingest, translate, post-process and
//! publish. Every external service sits behind a trait so the sweeps can run
//! against in-process doubles.

pub mod chunker;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod publish;
pub mod record;
pub mod store;
pub mod timeline;
pub mod translate;

// Re-export the types most callers need
pub use chunker::{Fragment, ThreadLimits, chunk};
pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
pub use pipeline::{Command, Pipeline, RunOptions, SweepReport};
pub use record::{Backend, RecordPatch, Stage, TweetRecord};
pub use store::{DocumentStore, Filter};
