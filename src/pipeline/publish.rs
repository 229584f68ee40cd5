//! Publish sweep

use crate::chunker::chunk;
use crate::error::RelayResult;
use crate::pipeline::{Pipeline, SweepReport};
use crate::publish::PostId;
use crate::record::{Backend, RecordPatch, TweetRecord};
use crate::store::Filter;
use tracing::{debug, info};

impl Pipeline {
    /// Publish every ready record, oldest first
    ///
    /// A record is marked tweeted only after the threads of all its
    /// publishable backends went out. On failure the sweep stops and the
    /// record stays unpublished.
    pub async fn publish_sweep(&self) -> RelayResult<SweepReport> {
        let filter = Filter::And(vec![
            Filter::Translated(Backend::Primary, true),
            Filter::PostProcessed(Backend::Primary, true),
            Filter::Tweeted(false),
        ]);

        let records = self.store.find(&filter).await?;
        let mut report = SweepReport {
            selected: records.len(),
            updated: 0,
        };

        for record in records {
            self.publish_record(&record).await?;
            self.store.update(record.id, &RecordPatch::new().tweeted()).await?;
            report.updated += 1;
        }

        info!(account = %self.account, "tweet: {}", report);
        Ok(report)
    }

    async fn publish_record(&self, record: &TweetRecord) -> RelayResult<()> {
        let permalink = record.tweet.permalink();
        for backend in Backend::ALL {
            let state = record.backend(backend);
            if !state.is_publishable() {
                continue;
            }
            let text = format!(
                "{}{}",
                self.settings.backend_labels.label(backend),
                state.cleaned
            );
            let posts = self.publish_thread(&text, &permalink).await?;
            info!(id = record.id, backend = %backend, posts = posts.len(), "Published");
        }
        Ok(())
    }

    /// Post the fragments of `text` in order, each answering its parent
    async fn publish_thread(&self, text: &str, permalink: &str) -> RelayResult<Vec<PostId>> {
        let fragments = chunk(text, permalink, &self.limits);
        let mut posted: Vec<PostId> = Vec::with_capacity(fragments.len());

        for fragment in &fragments {
            let parent = fragment
                .reply_to
                .and_then(|i| posted.get(i))
                .map(String::as_str);
            self.throttle.wait().await;
            let id = self.publisher.post(&fragment.body, parent).await?;
            debug!(post = %id, reply_to = ?parent, last = fragment.is_last, "Posted fragment");
            posted.push(id);
        }
        Ok(posted)
    }
}
