//! Translate sweep

use crate::error::RelayResult;
use crate::normalizer::{StashedText, pre_process, restore_urls, stash_urls};
use crate::pipeline::{Pipeline, SweepReport};
use crate::record::{Backend, RecordPatch, SourceTweet};
use crate::store::Filter;
use tracing::{debug, info};

impl Pipeline {
    /// Fill the raw text of the requested backends (all when none are given)
    ///
    /// Without `force`, a backend that is already translated is left alone.
    /// A forced re-translation also drops the backend's post-processed text,
    /// so the next post-process sweep cleans the new translation.
    /// Published records are never touched.
    pub async fn translate_sweep(
        &self,
        backends: &[Backend],
        force: bool,
    ) -> RelayResult<SweepReport> {
        let backends = requested(backends);
        let filter = if force {
            Filter::Tweeted(false)
        } else {
            Filter::And(vec![
                Filter::Tweeted(false),
                Filter::Or(
                    backends
                        .iter()
                        .map(|b| Filter::Translated(*b, false))
                        .collect(),
                ),
            ])
        };

        let records = self.store.find(&filter).await?;
        let mut report = SweepReport {
            selected: records.len(),
            updated: 0,
        };

        for record in records {
            let pending: Vec<Backend> = backends
                .iter()
                .copied()
                .filter(|b| force || !record.backend(*b).translated)
                .collect();
            if pending.is_empty() {
                continue;
            }

            let source = self.prepare(&record.tweet);
            let mut patch = RecordPatch::new();
            for backend in pending {
                let translated = self
                    .gateway
                    .translate(
                        &source.text,
                        &self.settings.source_lang,
                        &self.settings.target_lang,
                        backend,
                    )
                    .await?;
                debug!(id = record.id, backend = %backend, "{} -> {}", source.text, translated);
                patch = patch
                    .raw(backend, restore_urls(translated, &source.urls))
                    .translated(backend, true);
                // Cleaned text belongs to the old raw text
                if record.backend(backend).post_processed {
                    patch = patch.post_processed(backend, false).cleaned(backend, "");
                }
            }

            self.store.update(record.id, &patch).await?;
            report.updated += 1;
        }

        info!(account = %self.account, "translate: {}", report);
        Ok(report)
    }

    /// Source text as sent to the backends
    fn prepare(&self, tweet: &SourceTweet) -> StashedText {
        let text = pre_process(&tweet.text, &self.dictionary, self.direction);
        stash_urls(&text, &tweet.url_entities(), &tweet.media_urls())
    }
}

fn requested(backends: &[Backend]) -> Vec<Backend> {
    if backends.is_empty() {
        return Backend::ALL.to_vec();
    }
    let mut backends = backends.to_vec();
    backends.sort();
    backends.dedup();
    backends
}
