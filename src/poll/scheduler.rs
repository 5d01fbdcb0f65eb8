//! The repeating fetch → reconcile → wait loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use super::coordinator::FetchCoordinator;
use super::reconciler::Reconciler;
use crate::config::NodeConfig;
use crate::data::{CycleSummary, DisplayReader, DisplayWriter};
use crate::fetch::StatusFetcher;

/// Drives polling passes on a fixed interval.
///
/// The interval is measured from the end of one pass to the start of the
/// next, so passes never overlap and an overrunning pass is simply followed
/// by the next wait.
#[derive(Debug)]
pub struct Scheduler {
    nodes: Arc<[NodeConfig]>,
    coordinator: FetchCoordinator,
    reconciler: Reconciler,
    interval: Duration,
}

impl Scheduler {
    pub fn new(
        nodes: Arc<[NodeConfig]>,
        fetcher: Arc<dyn StatusFetcher>,
        display: DisplayWriter,
        interval: Duration,
    ) -> Self {
        Self {
            nodes,
            coordinator: FetchCoordinator::new(fetcher),
            reconciler: Reconciler::new(display),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// A reader of the display state this scheduler writes.
    pub fn reader(&self) -> DisplayReader {
        self.reconciler.reader()
    }

    /// Run a single fetch-and-reconcile pass.
    pub async fn run_once(&mut self) -> CycleSummary {
        let started = Instant::now();
        let outcomes = self.coordinator.fetch_all(&self.nodes).await;
        let summary = self.reconciler.apply(outcomes, started.elapsed());

        info!(
            cycle = summary.number,
            elapsed_ms = summary.elapsed_ms(),
            ok = summary.succeeded,
            failed = summary.failed,
            "polling cycle complete"
        );
        summary
    }

    /// Poll until `stop` turns `true` or its sender is dropped.
    ///
    /// The stop signal is checked before every pass and raced against the
    /// wait between passes; a pass that has started always runs to
    /// completion.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        info!(
            nodes = self.nodes.len(),
            interval_secs = self.interval.as_secs_f64(),
            "scheduler started"
        );

        loop {
            if *stop.borrow_and_update() {
                break;
            }

            self.run_once().await;

            if !self.wait(&mut stop).await {
                break;
            }
        }

        info!("scheduler stopped");
    }

    /// Sleep for one interval. Returns `false` if a stop was requested.
    async fn wait(&self, stop: &mut watch::Receiver<bool>) -> bool {
        let sleep = tokio::time::sleep(self.interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow_and_update() {
                        debug!("stop requested while waiting");
                        return false;
                    }
                }
            }
        }
    }

    /// Spawn [`Scheduler::run`] on the current tokio runtime.
    pub fn spawn(self) -> SchedulerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));
        SchedulerHandle { stop_tx, task }
    }
}

/// Handle for stopping a spawned scheduler.
///
/// Dropping the handle also stops the scheduler after its current pass.
#[derive(Debug)]
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Ask the scheduler to stop. A pass in flight is allowed to finish.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the scheduler and wait for it to exit.
    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        self.stop();
        self.task.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DisplayState;
    use crate::fetch::scripted::{nodes, ScriptedFetcher};

    const INTERVAL: Duration = Duration::from_secs(120);

    fn scheduler(names: &[&str], fetcher: Arc<ScriptedFetcher>) -> (Scheduler, DisplayReader) {
        let nodes: Arc<[NodeConfig]> = nodes(names).into();
        let (writer, reader) = DisplayState::channel(&nodes);
        (Scheduler::new(nodes, fetcher, writer, INTERVAL), reader)
    }

    #[tokio::test(start_paused = true)]
    async fn test_passes_are_separated_by_interval() {
        let fetcher = Arc::new(ScriptedFetcher::new().with_delay("a", Duration::from_secs(5)));
        let (scheduler, reader) = scheduler(&["a"], fetcher.clone());
        let handle = scheduler.spawn();

        // First pass: t = 0..5s, then waits until t = 125s.
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(fetcher.calls(), 1);
        assert!(reader.read().is_ready());

        tokio::time::sleep(Duration::from_secs(110)).await;
        assert_eq!(fetcher.calls(), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fetcher.calls(), 2);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_overrunning_pass_never_overlaps() {
        let fetcher = Arc::new(ScriptedFetcher::new().with_delay("slow", Duration::from_secs(300)));
        let (scheduler, _reader) = scheduler(&["slow"], fetcher.clone());
        let handle = scheduler.spawn();

        tokio::time::sleep(Duration::from_secs(299)).await;
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(fetcher.peak_in_flight(), 1);

        // Pass ends at 300s; the next starts at 420s.
        tokio::time::sleep(Duration::from_secs(119)).await;
        assert_eq!(fetcher.calls(), 1);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(fetcher.peak_in_flight(), 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_wait_prevents_next_pass() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let (scheduler, _reader) = scheduler(&["a", "b"], fetcher.clone());
        let handle = scheduler.spawn();

        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.shutdown().await.unwrap();
        assert_eq!(fetcher.calls(), 2);

        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_does_not_abort_pass_in_flight() {
        let fetcher = Arc::new(ScriptedFetcher::new().with_delay("a", Duration::from_secs(10)));
        fetcher.push_ok("a", 7);
        let (scheduler, reader) = scheduler(&["a"], fetcher.clone());
        let handle = scheduler.spawn();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!reader.read().is_ready());

        handle.shutdown().await.unwrap();

        let state = reader.read();
        assert!(state.is_ready());
        assert_eq!(state.rows().len(), 1);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_scheduler() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let (scheduler, mut reader) = scheduler(&["a"], fetcher.clone());
        let handle = scheduler.spawn();

        assert!(reader.changed().await);
        drop(handle);

        tokio::time::sleep(INTERVAL * 2).await;
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_node_scenario() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.push_ok("A", 100);
        fetcher.push_ok("B", 100);
        fetcher.push_ok("C", 100);
        fetcher.push_ok("A", 101);
        fetcher.push_err("B");
        fetcher.push_ok("C", 101);

        let (mut scheduler, reader) = scheduler(&["A", "B", "C"], fetcher);

        scheduler.run_once().await;
        {
            let state = reader.read();
            assert!(state.is_ready());
            let names: Vec<&str> =
                state.rows().iter().filter_map(|r| r.values.get(0)).collect();
            assert_eq!(names, ["A", "B", "C"]);
        }
        let b_before = reader.read().rows()[1].clone();

        let summary = scheduler.run_once().await;
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);

        let state = reader.read();
        let names: Vec<&str> = state.rows().iter().filter_map(|r| r.values.get(0)).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(state.rows()[0].values.get(5), Some("101"));
        assert_eq!(state.rows()[1], b_before);
        assert_eq!(state.rows()[2].values.get(5), Some("101"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_time_is_max_not_sum() {
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .with_delay("slowest", Duration::from_secs(30))
                .with_delay("middle", Duration::from_millis(300))
                .with_delay("fastest", Duration::from_millis(3)),
        );
        for name in ["slowest", "middle", "fastest"] {
            fetcher.push_ok(name, 1);
        }
        let (mut scheduler, reader) = scheduler(&["slowest", "middle", "fastest"], fetcher);

        let summary = scheduler.run_once().await;

        assert!(summary.elapsed >= Duration::from_secs(30));
        assert!(summary.elapsed < Duration::from_millis(30_300));
        assert!((30_000..30_300).contains(&summary.elapsed_ms()));
        let state = reader.read();
        let names: Vec<&str> = state.rows().iter().filter_map(|r| r.values.get(0)).collect();
        assert_eq!(names, ["slowest", "middle", "fastest"]);
    }
}
