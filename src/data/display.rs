//! Display state shared between the polling task and the renderer.
//!
//! [`DisplayState`] is a plain data holder: rows ordered by [`RowKey`], a
//! `ready` flag and per-node health used for the stale indicator. It is
//! wrapped by a single [`DisplayWriter`] (owned by the reconciler) and any
//! number of [`DisplayReader`]s (the renderer). Every write bumps a revision
//! on a watch channel, which is the renderer's redraw hook.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{RwLock, RwLockReadGuard};
use tokio::sync::watch;

use super::columns::RowValues;
use crate::config::NodeConfig;

/// Stable identity of a row: the node's position in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey(usize);

impl RowKey {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// One table row: the last successfully fetched values of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub key: RowKey,
    pub values: RowValues,
    /// When the values were last written.
    pub updated_at: Instant,
}

/// Whether the row upsert created or refreshed a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    Inserted,
    Updated,
}

/// Freshness of a configured node, independent of its row values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeStatus {
    /// The latest fetch succeeded.
    Ok,
    /// The latest fetch failed; the row (if any) shows older values.
    Stale,
    /// No fetch has completed yet.
    Pending,
}

/// Out-of-band health of one configured node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHealth {
    /// Name from the configuration (available even before any success).
    pub name: String,
    pub last_success: Option<Instant>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

impl NodeHealth {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            last_success: None,
            last_error: None,
            consecutive_failures: 0,
        }
    }

    pub fn status(&self) -> NodeStatus {
        if self.last_error.is_some() {
            NodeStatus::Stale
        } else if self.last_success.is_some() {
            NodeStatus::Ok
        } else {
            NodeStatus::Pending
        }
    }
}

/// Summary of one completed polling pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    /// 1-based pass counter.
    pub number: u64,
    pub finished_at: Instant,
    /// Wall time of fetching plus reconciliation.
    pub elapsed: Duration,
    pub succeeded: usize,
    pub failed: usize,
    pub inserted: usize,
    pub updated: usize,
}

impl CycleSummary {
    /// Pass duration in whole milliseconds, saturating at `u64::MAX`.
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Rows, readiness and node health.
#[derive(Debug, Clone)]
pub struct DisplayState {
    /// Sorted by key, so row order always follows configuration order.
    rows: Vec<DisplayRow>,
    /// One entry per configured node, indexed by row key.
    health: Vec<NodeHealth>,
    ready: bool,
    last_cycle: Option<CycleSummary>,
}

impl DisplayState {
    /// Empty, not-ready state for the given nodes.
    pub fn new(nodes: &[NodeConfig]) -> Self {
        Self {
            rows: Vec::with_capacity(nodes.len()),
            health: nodes.iter().map(|n| NodeHealth::new(&n.name)).collect(),
            ready: false,
            last_cycle: None,
        }
    }

    /// Create the state and split it into its single writer and a reader.
    pub fn channel(nodes: &[NodeConfig]) -> (DisplayWriter, DisplayReader) {
        let state = Arc::new(RwLock::new(Self::new(nodes)));
        let (revision_tx, revision_rx) = watch::channel(0);
        let reader = DisplayReader {
            state: state.clone(),
            revision: revision_rx,
        };
        let writer = DisplayWriter {
            state,
            revision: revision_tx,
        };
        (writer, reader)
    }

    /// Insert the row for `key`, or overwrite all of its values in place.
    ///
    /// A new row is placed at its configuration position, never appended
    /// out of order.
    pub fn upsert_row(&mut self, key: RowKey, values: RowValues) -> RowChange {
        debug_assert!(key.index() < self.health.len(), "row key outside configuration");

        let updated_at = Instant::now();
        match self.rows.binary_search_by_key(&key, |row| row.key) {
            Ok(pos) => {
                let row = &mut self.rows[pos];
                row.values = values;
                row.updated_at = updated_at;
                RowChange::Updated
            }
            Err(pos) => {
                self.rows.insert(
                    pos,
                    DisplayRow {
                        key,
                        values,
                        updated_at,
                    },
                );
                RowChange::Inserted
            }
        }
    }

    /// Flip the ready flag. Returns `true` only on the first call.
    pub fn mark_ready(&mut self) -> bool {
        let first = !self.ready;
        self.ready = true;
        first
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Rows in configuration order.
    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn row(&self, key: RowKey) -> Option<&DisplayRow> {
        self.rows
            .binary_search_by_key(&key, |row| row.key)
            .ok()
            .map(|pos| &self.rows[pos])
    }

    /// Health of every configured node, in configuration order.
    pub fn node_health(&self) -> &[NodeHealth] {
        &self.health
    }

    pub fn health(&self, key: RowKey) -> Option<&NodeHealth> {
        self.health.get(key.index())
    }

    /// Count of configured nodes in each status: `(ok, stale, pending)`.
    pub fn status_counts(&self) -> (usize, usize, usize) {
        self.health
            .iter()
            .fold((0, 0, 0), |(ok, stale, pending), h| match h.status() {
                NodeStatus::Ok => (ok + 1, stale, pending),
                NodeStatus::Stale => (ok, stale + 1, pending),
                NodeStatus::Pending => (ok, stale, pending + 1),
            })
    }

    pub fn last_cycle(&self) -> Option<&CycleSummary> {
        self.last_cycle.as_ref()
    }

    pub(crate) fn record_success(&mut self, key: RowKey, at: Instant) {
        if let Some(health) = self.health.get_mut(key.index()) {
            health.last_success = Some(at);
            health.last_error = None;
            health.consecutive_failures = 0;
        }
    }

    pub(crate) fn record_failure(&mut self, key: RowKey, error: String) {
        if let Some(health) = self.health.get_mut(key.index()) {
            health.last_error = Some(error);
            health.consecutive_failures = health.consecutive_failures.saturating_add(1);
        }
    }

    pub(crate) fn set_last_cycle(&mut self, summary: CycleSummary) {
        self.last_cycle = Some(summary);
    }
}

/// The only handle allowed to mutate the display state.
#[derive(Debug)]
pub struct DisplayWriter {
    state: Arc<RwLock<DisplayState>>,
    revision: watch::Sender<u64>,
}

impl DisplayWriter {
    /// Apply `f` under the write lock, then notify readers.
    ///
    /// Readers observe either none or all of the changes made by `f`.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut DisplayState) -> R) -> R {
        let result = {
            let mut state = self.state.write();
            f(&mut state)
        };
        self.revision.send_modify(|rev| *rev += 1);
        result
    }

    /// A new reader for this state.
    pub fn reader(&self) -> DisplayReader {
        DisplayReader {
            state: self.state.clone(),
            revision: self.revision.subscribe(),
        }
    }
}

/// Read-only, cloneable access to the display state.
#[derive(Debug, Clone)]
pub struct DisplayReader {
    state: Arc<RwLock<DisplayState>>,
    revision: watch::Receiver<u64>,
}

impl DisplayReader {
    /// Lock the state for reading. Keep the guard short-lived.
    pub fn read(&self) -> RwLockReadGuard<'_, DisplayState> {
        self.state.read()
    }

    /// Returns `true` once per batch of writes since the last call.
    pub fn take_change(&mut self) -> bool {
        if self.revision.has_changed().unwrap_or(false) {
            self.revision.borrow_and_update();
            true
        } else {
            false
        }
    }

    /// Wait for the next batch of writes. Returns `false` once the writer is gone.
    pub async fn changed(&mut self) -> bool {
        self.revision.changed().await.is_ok()
    }

    /// Number of write batches applied so far.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }
}
