use anyhow::Result;
use async_trait::async_trait;

/// A batch job driven by the worker manager.
///
/// `run_once` processes up to one batch and returns the number of items it
/// saw, which the manager records as the worker's heartbeat backlog. It
/// must be idempotent: the same inputs produce the same rows on re-run.
#[async_trait]
pub trait Worker: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run_once(&self) -> Result<usize>;
}

/// Destination for per-worker heartbeat records.
#[async_trait]
pub trait HeartbeatSink: Send + Sync {
    async fn record(&self, worker_name: &str, backlog_count: i64) -> Result<()>;
}
