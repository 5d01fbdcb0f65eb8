//! The polling-and-render cycle.
//!
//! ```text
//!  Scheduler ──(every interval)──▶ FetchCoordinator::fetch_all
//!      ▲                               │ one task per node, join barrier
//!      │                               ▼
//!      │                        Vec<FetchOutcome> (configuration order)
//!      │                               │
//!      │                               ▼
//!      └──────── wait ◀──────── Reconciler::apply ──▶ DisplayWriter
//! ```
//!
//! - [`Scheduler`]: cancellable loop, one pass in flight at a time
//! - [`FetchCoordinator`]: parallel fan-out with a full join before returning
//! - [`Reconciler`]: insert-if-new / update-in-place, stale marking, readiness

mod coordinator;
mod reconciler;
mod scheduler;

pub use coordinator::FetchCoordinator;
pub use reconciler::Reconciler;
pub use scheduler::{Scheduler, SchedulerHandle};
