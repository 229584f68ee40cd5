//! MongoDB-backed store

use crate::error::{RelayError, RelayResult};
use crate::record::{FieldSet, RecordPatch, TweetRecord};
use crate::store::{DocumentStore, Filter};
use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::stream::TryStreamExt;
use mongodb::{Client, Collection};
use tracing::debug;

const COLLECTION: &str = "tweets";

/// Records of one account in `<database>.tweets`
#[derive(Debug, Clone)]
pub struct MongoStore {
    collection: Collection<TweetRecord>,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> RelayResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self::from_client(&client, database))
    }

    pub fn from_client(client: &Client, database: &str) -> Self {
        Self {
            collection: client.database(database).collection(COLLECTION),
        }
    }
}

/// The `$set` document for a patch
fn set_document(patch: &RecordPatch) -> Document {
    let mut fields = Document::new();
    for set in &patch.sets {
        let value = match set {
            FieldSet::Raw(_, text) | FieldSet::Cleaned(_, text) => Bson::String(text.clone()),
            FieldSet::Translated(_, flag)
            | FieldSet::PostProcessed(_, flag)
            | FieldSet::Tweeted(flag) => Bson::Boolean(*flag),
        };
        fields.insert(set.path(), value);
    }
    doc! { "$set": fields }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find_one(&self, id: i64) -> RelayResult<Option<TweetRecord>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find(&self, filter: &Filter) -> RelayResult<Vec<TweetRecord>> {
        let query = filter.to_document();
        debug!(%query, "Querying {}", COLLECTION);
        let mut cursor = self.collection.find(query).sort(doc! { "_id": 1 }).await?;

        let mut records = Vec::new();
        while let Some(record) = cursor.try_next().await? {
            records.push(record);
        }
        Ok(records)
    }

    async fn insert(&self, record: &TweetRecord) -> RelayResult<()> {
        record.validate()?;
        self.collection.insert_one(record).await?;
        Ok(())
    }

    async fn update(&self, id: i64, patch: &RecordPatch) -> RelayResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        // Validate against the stored state before writing
        let mut record = self
            .find_one(id)
            .await?
            .ok_or_else(|| RelayError::Store(format!("record {} not found", id)))?;
        record.apply(patch)?;

        let result = self
            .collection
            .update_one(doc! { "_id": id }, set_document(patch))
            .await?;
        if result.matched_count == 0 {
            return Err(RelayError::Store(format!("record {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Backend;
    use crate::record::tests::sample_tweet;
    use chrono::{SubsecRound, Utc};

    #[test]
    fn test_set_document_paths() {
        let patch = RecordPatch::new()
            .raw(Backend::Secondary, "訳")
            .translated(Backend::Secondary, true);
        assert_eq!(
            set_document(&patch),
            doc! { "$set": {
                "translations.secondary.raw": "訳",
                "translations.secondary.translated": true,
            } }
        );
    }

    #[test]
    fn test_set_document_tweeted() {
        assert_eq!(
            set_document(&RecordPatch::new().tweeted()),
            doc! { "$set": { "tweeted": true } }
        );
    }

    #[test]
    fn test_record_document_layout() {
        let record = TweetRecord::new(sample_tweet(42, "안녕"), Utc::now().trunc_subsecs(3));
        let document = bson::to_document(&record).unwrap();

        assert_eq!(document.get_i64("_id").unwrap(), 42);
        assert_eq!(
            document.get_datetime("captured_at").unwrap().timestamp_millis(),
            record.captured_at.timestamp_millis()
        );
        assert!(!document.get_bool("tweeted").unwrap());
        let primary = document
            .get_document("translations")
            .unwrap()
            .get_document("primary")
            .unwrap();
        assert!(!primary.get_bool("translated").unwrap());
        assert_eq!(primary.get_str("cleaned").unwrap(), "");

        let back: TweetRecord = bson::from_document(document).unwrap();
        assert_eq!(back, record);
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored (needs a local mongod)
    async fn test_real_database_roundtrip() {
        let Ok(uri) = std::env::var("MONGO_URI") else {
            eprintln!("Skipping: MONGO_URI not set");
            return;
        };

        let store = MongoStore::connect(&uri, "tweet_relay_test").await.unwrap();
        let id = Utc::now().timestamp_millis();
        store
            .insert(&TweetRecord::new(sample_tweet(id, "안녕"), Utc::now()))
            .await
            .unwrap();
        store
            .update(
                id,
                &RecordPatch::new()
                    .raw(Backend::Primary, "こんにちは")
                    .translated(Backend::Primary, true),
            )
            .await
            .unwrap();

        let found = store
            .find(&Filter::And(vec![
                Filter::IdIs(id),
                Filter::Translated(Backend::Primary, true),
            ]))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].backend(Backend::Primary).raw, "こんにちは");
    }
}
