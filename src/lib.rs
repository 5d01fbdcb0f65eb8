//! # nodemon
//!
//! A live terminal dashboard that polls a configured set of nodes for status
//! metrics and renders them as a stable, in-place refreshing table.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  tokio task                                                      │
//! │  ┌───────────┐   ┌──────────────────┐   ┌────────────┐           │
//! │  │ Scheduler │──▶│ FetchCoordinator │──▶│ Reconciler │           │
//! │  │ (interval)│   │ (task per node)  │   │ (1 writer) │           │
//! │  └───────────┘   └────────┬─────────┘   └─────┬──────┘           │
//! │                           │ StatusFetcher     │ DisplayWriter    │
//! │                           ▼                   ▼                  │
//! │                     HttpFetcher        Arc<RwLock<DisplayState>> │
//! └───────────────────────────────────────────────┬──────────────────┘
//!                                                 │ DisplayReader
//!  main thread                                    ▼
//!  ┌─────────┐   ┌──────────┐   ┌────────────────────────┐
//!  │ events  │──▶│   app    │──▶│ ui (header/table/bar)  │──▶ Terminal
//!  └─────────┘   └──────────┘   └────────────────────────┘
//! ```
//!
//! - **[`config`]**: Node list and polling settings ([`DashboardConfig`])
//! - **[`fetch`]**: The [`StatusFetcher`] trait, [`StatusRecord`] and the HTTP client
//! - **[`poll`]**: Scheduler, concurrent fetch coordinator and table reconciler
//! - **[`data`]**: [`DisplayState`] shared between the polling task and the renderer
//! - **[`app`]**, **[`events`]**, **[`ui`]**: The terminal front end
//! - **[`shutdown`]**: Clean exit on SIGINT/SIGTERM
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the nodes listed in config.json
//! nodemon --config config.json
//!
//! # One pass, written as JSON
//! nodemon --config config.json --export status.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use nodemon::{DisplayState, HttpFetcher, NodeConfig, Scheduler};
//!
//! # tokio_test::block_on(async {
//! let nodes: Arc<[NodeConfig]> = vec![NodeConfig::new("node-1", "10.0.0.5")].into();
//! let fetcher = Arc::new(HttpFetcher::builder().timeout(Duration::from_secs(5)).build()?);
//! let (writer, reader) = DisplayState::channel(&nodes);
//!
//! let mut scheduler = Scheduler::new(nodes, fetcher, writer, Duration::from_secs(120));
//! let summary = scheduler.run_once().await;
//! println!("{} ok, {} rows", summary.succeeded, reader.read().rows().len());
//! # Ok::<_, nodemon::FetchError>(())
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod fetch;
pub mod poll;
pub mod shutdown;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{ConfigError, DashboardConfig, NodeConfig};
pub use data::{DisplayReader, DisplayState, DisplayWriter};
pub use fetch::{
    FetchError, FetchFailure, FetchOutcome, HttpFetcher, PostState, StatusFetcher, StatusRecord,
};
pub use poll::{FetchCoordinator, Reconciler, Scheduler, SchedulerHandle};
