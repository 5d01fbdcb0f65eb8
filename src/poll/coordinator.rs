//! Concurrent fan-out/fan-in of one status fetch per node.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::NodeConfig;
use crate::fetch::{FetchError, FetchOutcome, StatusFetcher};

/// Issues one fetch per configured node and waits for all of them.
#[derive(Debug, Clone)]
pub struct FetchCoordinator {
    fetcher: Arc<dyn StatusFetcher>,
}

impl FetchCoordinator {
    pub fn new(fetcher: Arc<dyn StatusFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &Arc<dyn StatusFetcher> {
        &self.fetcher
    }

    /// Fetch every node in parallel and return one outcome per node, in
    /// the same order as `nodes`.
    ///
    /// Each node runs in its own task: a failure or panic in one task does
    /// not affect the others. Returns only after every task has finished;
    /// if this future is dropped early the remaining tasks are aborted, so no
    /// fetch outlives its cycle.
    pub async fn fetch_all(&self, nodes: &Arc<[NodeConfig]>) -> Vec<FetchOutcome> {
        let mut tasks = JoinSet::new();
        let mut slots: Vec<Option<FetchOutcome>> = vec![None; nodes.len()];
        let mut task_index = Vec::with_capacity(nodes.len());

        for index in 0..nodes.len() {
            let fetcher = self.fetcher.clone();
            let nodes = nodes.clone();
            let handle = tasks.spawn(async move {
                let result = fetcher.fetch_status(&nodes[index]).await;
                (index, result)
            });
            task_index.push((handle.id(), index));
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    debug!(node = %nodes[index].name, ok = result.is_ok(), "fetch finished");
                    slots[index] = Some(FetchOutcome::from_result(&nodes[index], result));
                }
                Err(join_err) => {
                    let Some(&(_, index)) = task_index.iter().find(|(id, _)| *id == join_err.id())
                    else {
                        continue;
                    };
                    warn!(node = %nodes[index].name, error = %join_err, "fetch task failed");
                    slots[index] = Some(FetchOutcome::from_result(
                        &nodes[index],
                        Err(FetchError::from(join_err)),
                    ));
                }
            }
        }

        slots
            .into_iter()
            .zip(nodes.iter())
            .map(|(slot, node)| {
                slot.unwrap_or_else(|| {
                    FetchOutcome::from_result(node, Err(FetchError::Task("lost".to_string())))
                })
            })
            .collect()
    }
}
