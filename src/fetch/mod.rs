//! Node status fetching.
//!
//! The polling core only depends on the [`StatusFetcher`] capability: given a
//! [`NodeConfig`], produce a [`StatusRecord`] or a [`FetchError`]. Fetchers
//! own their timeouts and report failures as values rather than panicking.
//!
//! [`HttpFetcher`] is the implementation used by the binary; it talks to the
//! node's JSON API gateway.

mod error;
mod http;
mod record;

#[cfg(test)]
pub(crate) mod scripted;

pub use error::FetchError;
pub use http::{HttpFetcher, HttpFetcherBuilder};
pub use record::{size_gib, PostState, StatusRecord, GIB_PER_SPACE_UNIT};

use std::fmt::{self, Debug};

use async_trait::async_trait;

use crate::config::NodeConfig;

/// Capability to fetch the current status of one node.
///
/// Implementations must bound each call with their own timeout so that one
/// unresponsive node cannot stall a polling cycle indefinitely.
///
/// # Example
///
/// ```no_run
/// use nodemon::{HttpFetcher, NodeConfig, StatusFetcher};
///
/// # tokio_test::block_on(async {
/// let fetcher = HttpFetcher::builder().build().unwrap();
/// let node = NodeConfig::new("node-1", "10.0.0.5");
/// match fetcher.fetch_status(&node).await {
///     Ok(record) => println!("{} is at layer {}", record.name, record.top_layer),
///     Err(e) => println!("{} failed: {}", node.name, e),
/// }
/// # });
/// ```
#[async_trait]
pub trait StatusFetcher: Send + Sync + Debug {
    /// Fetch the status of `node`.
    async fn fetch_status(&self, node: &NodeConfig) -> Result<StatusRecord, FetchError>;

    /// Returns a human-readable description of the fetcher.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}

/// A fetch that failed for a particular node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// Name of the node, from its configuration.
    pub node: String,
    pub error: FetchError,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.node, self.error)
    }
}

/// The result of fetching one node in one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(StatusRecord),
    Failure(FetchFailure),
}

impl FetchOutcome {
    /// Attribute a fetch result to the node it was fetched for.
    pub fn from_result(node: &NodeConfig, result: Result<StatusRecord, FetchError>) -> Self {
        match result {
            Ok(record) => FetchOutcome::Success(record),
            Err(error) => FetchOutcome::Failure(FetchFailure {
                node: node.name.clone(),
                error,
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}
