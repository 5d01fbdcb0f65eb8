//! Display data: the state the renderer reads and the reconciler writes.
//!
//! ## Submodules
//!
//! - [`columns`]: Column definitions and the rendered values of a row
//! - [`display`]: [`DisplayState`] with its single writer and shared readers
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "120s", "500ms")
//! - [`export`]: JSON export of the current table
//!
//! ## Data Flow
//!
//! ```text
//! Vec<FetchOutcome> (one per node, configuration order)
//!        │
//!        ▼
//! Reconciler::apply()
//!        │
//!        ├──▶ DisplayState::upsert_row()   (successes only)
//!        ├──▶ NodeHealth                   (stale marker for failures)
//!        └──▶ DisplayState::mark_ready()   (first pass only)
//!        │
//!        ▼
//! DisplayReader (redraw hook + read lock) ──▶ ui
//! ```

pub mod columns;
pub mod display;
pub mod duration;
pub mod export;

pub use columns::{Column, RowValues, COLUMNS, COLUMN_COUNT};
pub use display::{
    CycleSummary, DisplayReader, DisplayRow, DisplayState, DisplayWriter, NodeHealth, NodeStatus,
    RowChange, RowKey,
};
