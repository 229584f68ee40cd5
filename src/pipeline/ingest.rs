//! Turning source tweets into records

use crate::error::RelayResult;
use crate::pipeline::{Pipeline, SweepReport};
use crate::record::{SourceTweet, TweetRecord};
use crate::store::Filter;
use chrono::{SubsecRound, Utc};
use tracing::{debug, info};

impl Pipeline {
    /// Fetch every target account's timeline and ingest it
    pub async fn save_tweets(&self) -> RelayResult<SweepReport> {
        let mut report = SweepReport::default();
        for handle in &self.settings.target_accounts {
            let tweets = self
                .timeline
                .user_timeline(handle, self.settings.timeline_count)
                .await?;
            debug!(handle = %handle, count = tweets.len(), "Fetched timeline");
            report += self.ingest(tweets).await?;
        }
        info!(account = %self.account, "save_tweet: {}", report);
        Ok(report)
    }

    /// Insert a record for every tweet not stored yet
    ///
    /// A reshare of something this account already relayed is stored as
    /// published right away and never translated.
    pub async fn ingest(&self, tweets: Vec<SourceTweet>) -> RelayResult<SweepReport> {
        let mut report = SweepReport {
            selected: tweets.len(),
            updated: 0,
        };

        for tweet in tweets {
            if self.store.find_one(tweet.id).await?.is_some() {
                debug!(id = tweet.id, "Already stored, skipping");
                continue;
            }

            let captured_at = Utc::now().trunc_subsecs(3);
            let record = if self.already_relayed(&tweet).await? {
                info!(id = tweet.id, "Reshare of relayed content, marking published");
                TweetRecord::already_published(tweet, captured_at)
            } else {
                TweetRecord::new(tweet, captured_at)
            };
            self.store.insert(&record).await?;
            report.updated += 1;
        }
        Ok(report)
    }

    async fn already_relayed(&self, tweet: &SourceTweet) -> RelayResult<bool> {
        let Some(original) = tweet.reshared_id() else {
            return Ok(false);
        };
        let filter = Filter::And(vec![
            Filter::Tweeted(true),
            Filter::Or(vec![Filter::IdIs(original), Filter::ResharedFrom(original)]),
        ]);
        Ok(!self.store.find(&filter).await?.is_empty())
    }
}
