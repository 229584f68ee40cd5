//! Record selection predicates
//!
//! A [`Filter`] can be evaluated against a record in memory or turned into
//! a MongoDB query document; both readings must agree.

use crate::record::{Backend, TweetRecord};
use bson::{Bson, Document, doc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    Tweeted(bool),
    Translated(Backend, bool),
    PostProcessed(Backend, bool),
    IdIs(i64),
    /// Records whose source tweet reshares the given id
    ResharedFrom(i64),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn matches(&self, record: &TweetRecord) -> bool {
        match self {
            Filter::All => true,
            Filter::Tweeted(flag) => record.tweeted == *flag,
            Filter::Translated(b, flag) => record.backend(*b).translated == *flag,
            Filter::PostProcessed(b, flag) => record.backend(*b).post_processed == *flag,
            Filter::IdIs(id) => record.id == *id,
            Filter::ResharedFrom(id) => record.tweet.reshared_id() == Some(*id),
            Filter::And(filters) => filters.iter().all(|f| f.matches(record)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(record)),
        }
    }

    pub fn to_document(&self) -> Document {
        match self {
            Filter::All => doc! {},
            Filter::Tweeted(flag) => doc! { "tweeted": *flag },
            Filter::Translated(b, flag) => {
                field(format!("translations.{}.translated", b.key()), *flag)
            }
            Filter::PostProcessed(b, flag) => {
                field(format!("translations.{}.post_processed", b.key()), *flag)
            }
            Filter::IdIs(id) => doc! { "_id": *id },
            Filter::ResharedFrom(id) => doc! { "tweet.retweeted_status.id": *id },
            Filter::And(filters) if filters.is_empty() => doc! {},
            Filter::And(filters) => {
                let clauses: Vec<Document> = filters.iter().map(Filter::to_document).collect();
                doc! { "$and": clauses }
            }
            // `$or` rejects an empty array; match nothing instead
            Filter::Or(filters) if filters.is_empty() => doc! { "_id": { "$in": [] } },
            Filter::Or(filters) => {
                let clauses: Vec<Document> = filters.iter().map(Filter::to_document).collect();
                doc! { "$or": clauses }
            }
        }
    }
}

fn field(path: String, value: impl Into<Bson>) -> Document {
    let mut document = Document::new();
    document.insert(path, value);
    document
}
