//! Scripted fetcher for exercising the polling core without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{FetchError, PostState, StatusFetcher, StatusRecord};
use crate::config::NodeConfig;

#[derive(Debug, Clone)]
pub(crate) enum Step {
    Ok(StatusRecord),
    Err(FetchError),
    Panic,
}

/// Replays queued responses per node name, each after a per-node delay.
///
/// An exhausted queue answers with a connection error.
#[derive(Debug, Default)]
pub(crate) struct ScriptedFetcher {
    steps: Mutex<HashMap<String, VecDeque<Step>>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_delay(self, node: &str, delay: Duration) -> Self {
        self.delays.lock().insert(node.to_string(), delay);
        self
    }

    pub(crate) fn push(&self, node: &str, step: Step) {
        self.steps.lock().entry(node.to_string()).or_default().push_back(step);
    }

    pub(crate) fn push_ok(&self, node: &str, top_layer: u32) {
        self.push(node, Step::Ok(record(node, top_layer)));
    }

    pub(crate) fn push_err(&self, node: &str) {
        self.push(node, Step::Err(FetchError::Connection("refused".to_string())));
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusFetcher for ScriptedFetcher {
    async fn fetch_status(&self, node: &NodeConfig) -> Result<StatusRecord, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let step = self.steps.lock().get_mut(&node.name).and_then(|q| q.pop_front());
        let delay = self.delays.lock().get(&node.name).copied().unwrap_or_default();

        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match step {
            Some(Step::Ok(record)) => Ok(record),
            Some(Step::Err(err)) => Err(err),
            Some(Step::Panic) => panic!("scripted panic for {}", node.name),
            None => Err(FetchError::Connection("no scripted response".to_string())),
        }
    }

    fn description(&self) -> &str {
        "scripted"
    }
}

/// A record whose values are all derived from `name` and `top_layer`.
pub(crate) fn record(name: &str, top_layer: u32) -> StatusRecord {
    StatusRecord {
        name: name.to_string(),
        version: "v1.7.0".to_string(),
        host: format!("{}.local", name),
        connected_peers: 20,
        synced: true,
        top_layer,
        verified_layer: top_layer.saturating_sub(1),
        synced_layer: top_layer,
        smeshing: true,
        post_state: PostState::Complete,
        space_units: 4,
        size_gib: 256,
        assigned_layers_count: 3,
    }
}

/// Node configs named after `names`, in order.
pub(crate) fn nodes(names: &[&str]) -> Vec<NodeConfig> {
    names
        .iter()
        .map(|name| NodeConfig::new(*name, format!("{}.local", name)))
        .collect()
}
