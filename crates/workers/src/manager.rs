//! Sequential worker loop.
//!
//! Workers run strictly in registration order within a tick so each
//! stage observes the previous stage's writes. One failing worker never
//! stops the tick; its error is logged and the loop moves on. The same
//! holds for the heartbeat store itself: a failed heartbeat write is
//! logged and the pass continues.

use std::time::Duration;

use copytrace_core::{HeartbeatSink, Worker};
use tokio::sync::watch;
use tracing::{error, info};

pub struct WorkerManager {
    workers: Vec<Box<dyn Worker>>,
    heartbeats: Box<dyn HeartbeatSink>,
    tick_interval: Duration,
}

impl WorkerManager {
    #[must_use]
    pub fn new(heartbeats: Box<dyn HeartbeatSink>, tick_interval: Duration) -> Self {
        Self {
            workers: Vec::new(),
            heartbeats,
            tick_interval,
        }
    }

    /// Registers a worker at the end of the tick order.
    pub fn register(&mut self, worker: Box<dyn Worker>) {
        self.workers.push(worker);
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Runs every registered worker once, in order. A heartbeat is
    /// recorded after each worker whether it succeeded or not; a failed
    /// worker records a backlog of zero for that pass. A pending shutdown
    /// stops the pass between workers, never mid-batch.
    pub async fn run_pass(&self, shutdown: Option<&watch::Receiver<bool>>) {
        for worker in &self.workers {
            if shutdown.is_some_and(|rx| *rx.borrow()) {
                break;
            }
            let backlog = match worker.run_once().await {
                Ok(items) => {
                    info!(worker = worker.name(), items, "worker pass complete");
                    items as i64
                }
                Err(err) => {
                    error!(worker = worker.name(), error = %err, "worker pass failed");
                    0
                }
            };
            if let Err(err) = self.heartbeats.record(worker.name(), backlog).await {
                error!(worker = worker.name(), error = %err, "heartbeat write failed");
            }
        }
    }

    /// Ticks until the shutdown channel flips to `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            workers = self.workers.len(),
            interval_ms = self.tick_interval.as_millis() as u64,
            "worker loop starting"
        );
        loop {
            if *shutdown.borrow() {
                break;
            }
            self.run_pass(Some(&shutdown)).await;

            tokio::select! {
                _ = tokio::time::sleep(self.tick_interval) => {}
                _ = shutdown.changed() => {}
            }
        }
        info!("worker loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, bail, Result};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<(String, i64)>>,
        fail_for: Option<&'static str>,
    }

    struct SinkHandle(Arc<RecordingSink>);

    #[async_trait]
    impl HeartbeatSink for SinkHandle {
        async fn record(&self, worker_name: &str, backlog_count: i64) -> Result<()> {
            if self.0.fail_for == Some(worker_name) {
                return Err(anyhow!("connection refused"));
            }
            self.0
                .records
                .lock()
                .unwrap()
                .push((worker_name.to_string(), backlog_count));
            Ok(())
        }
    }

    struct FixedWorker {
        name: &'static str,
        items: Option<usize>,
    }

    #[async_trait]
    impl Worker for FixedWorker {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn run_once(&self) -> Result<usize> {
            match self.items {
                Some(items) => Ok(items),
                None => bail!("batch query failed"),
            }
        }
    }

    fn manager_with(sink: &Arc<RecordingSink>) -> WorkerManager {
        WorkerManager::new(Box::new(SinkHandle(Arc::clone(sink))), Duration::from_millis(1))
    }

    #[tokio::test]
    async fn failing_worker_is_isolated_and_still_heartbeats() {
        let sink = Arc::new(RecordingSink::default());
        let mut manager = manager_with(&sink);
        manager.register(Box::new(FixedWorker {
            name: "first",
            items: Some(7),
        }));
        manager.register(Box::new(FixedWorker {
            name: "broken",
            items: None,
        }));
        manager.register(Box::new(FixedWorker {
            name: "last",
            items: Some(2),
        }));

        manager.run_pass(None).await;
        let records = sink.records.lock().unwrap().clone();
        assert_eq!(
            records,
            vec![
                ("first".to_string(), 7),
                ("broken".to_string(), 0),
                ("last".to_string(), 2),
            ]
        );
    }

    #[tokio::test]
    async fn heartbeat_store_error_does_not_abort_the_pass() {
        let sink = Arc::new(RecordingSink {
            records: Mutex::new(Vec::new()),
            fail_for: Some("first"),
        });
        let mut manager = manager_with(&sink);
        manager.register(Box::new(FixedWorker {
            name: "first",
            items: Some(3),
        }));
        manager.register(Box::new(FixedWorker {
            name: "second",
            items: Some(5),
        }));

        manager.run_pass(None).await;
        // The first heartbeat write failed; the pass kept going and
        // recorded the second worker.
        let records = sink.records.lock().unwrap().clone();
        assert_eq!(records, vec![("second".to_string(), 5)]);
    }

    #[tokio::test]
    async fn shutdown_is_observed_between_workers() {
        let sink = Arc::new(RecordingSink::default());
        let mut manager = manager_with(&sink);
        manager.register(Box::new(FixedWorker {
            name: "only",
            items: Some(1),
        }));

        let (tx, rx) = watch::channel(true);
        manager.run_pass(Some(&rx)).await;
        assert!(sink.records.lock().unwrap().is_empty());

        tx.send(false).unwrap();
        manager.run_pass(Some(&rx)).await;
        assert_eq!(
            sink.records.lock().unwrap().clone(),
            vec![("only".to_string(), 1)]
        );
    }
}
