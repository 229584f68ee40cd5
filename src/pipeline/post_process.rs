//! Post-process sweep

use crate::error::RelayResult;
use crate::normalizer::post_process;
use crate::pipeline::{Pipeline, SweepReport};
use crate::record::{Backend, RecordPatch};
use crate::store::Filter;
use tracing::{debug, info};

impl Pipeline {
    /// Clean the raw text of every translated backend
    ///
    /// A backend counts as post-processed only when cleaning left some
    /// text. Without `force`, records whose primary backend is already
    /// post-processed are skipped, as are individual backends that are.
    pub async fn post_process_sweep(&self, force: bool) -> RelayResult<SweepReport> {
        let mut clauses = vec![
            Filter::Translated(Backend::Primary, true),
            Filter::Tweeted(false),
        ];
        if !force {
            clauses.push(Filter::PostProcessed(Backend::Primary, false));
        }

        let records = self.store.find(&Filter::And(clauses)).await?;
        let mut report = SweepReport {
            selected: records.len(),
            updated: 0,
        };

        for record in records {
            let mut patch = RecordPatch::new();
            for backend in Backend::ALL {
                let state = record.backend(backend);
                if !state.translated || (state.post_processed && !force) {
                    continue;
                }
                let cleaned = post_process(&state.raw, &self.dictionary);
                debug!(id = record.id, backend = %backend, "cleaned: {}", cleaned);
                let has_text = !cleaned.is_empty();
                patch = patch
                    .cleaned(backend, cleaned)
                    .post_processed(backend, has_text);
            }

            if patch.is_empty() {
                continue;
            }
            self.store.update(record.id, &patch).await?;
            report.updated += 1;
        }

        info!(account = %self.account, "post_process: {}", report);
        Ok(report)
    }
}
