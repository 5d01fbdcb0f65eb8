//! Applies a cycle's fetch outcomes to the display state.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::data::{CycleSummary, DisplayReader, DisplayWriter, RowChange, RowKey, RowValues};
use crate::fetch::FetchOutcome;

/// The single writer of the display state.
///
/// For each node, in configuration order: a success inserts the row on
/// first sight and overwrites all of its columns afterwards; a failure
/// leaves the row untouched and only marks the node stale.
#[derive(Debug)]
pub struct Reconciler {
    display: DisplayWriter,
    cycles: u64,
}

impl Reconciler {
    pub fn new(display: DisplayWriter) -> Self {
        Self { display, cycles: 0 }
    }

    /// A reader of the state this reconciler writes.
    pub fn reader(&self) -> DisplayReader {
        self.display.reader()
    }

    /// Apply one cycle's outcomes, indexed by configuration position.
    ///
    /// All changes become visible to readers at once. The first call also
    /// marks the display ready, whatever the outcomes were.
    pub fn apply(&mut self, outcomes: Vec<FetchOutcome>, elapsed: Duration) -> CycleSummary {
        self.cycles += 1;
        let number = self.cycles;

        self.display.update(|state| {
            let now = Instant::now();
            let mut summary = CycleSummary {
                number,
                finished_at: now,
                elapsed,
                succeeded: 0,
                failed: 0,
                inserted: 0,
                updated: 0,
            };

            debug_assert_eq!(outcomes.len(), state.node_health().len());

            for (index, outcome) in outcomes.into_iter().enumerate() {
                let key = RowKey::new(index);
                match outcome {
                    FetchOutcome::Success(record) => {
                        match state.upsert_row(key, RowValues::from_record(&record)) {
                            RowChange::Inserted => summary.inserted += 1,
                            RowChange::Updated => summary.updated += 1,
                        }
                        state.record_success(key, now);
                        summary.succeeded += 1;
                    }
                    FetchOutcome::Failure(failure) => {
                        warn!(node = %failure.node, error = %failure.error, "node fetch failed; keeping last values");
                        state.record_failure(key, failure.error.to_string());
                        summary.failed += 1;
                    }
                }
            }

            if state.mark_ready() {
                info!(rows = state.rows().len(), "first cycle complete; display ready");
            }
            state.set_last_cycle(summary.clone());
            summary
        })
    }
}
