//! TTL cache over baseline percentiles.
//!
//! The scoring worker reads baselines on every pass; recomputing the
//! percentile query per pair would hammer the database, so one snapshot is
//! shared behind a short TTL. Holding the mutex across the refresh gives
//! single-flight behavior: concurrent callers wait for one query instead
//! of piling on.

use std::time::{Duration, Instant};

use copytrace_core::Baselines;
use tokio::sync::Mutex;
use tracing::warn;

use crate::repositories::BaselineRepository;

struct CacheState {
    snapshot: Baselines,
    fetched_at: Option<Instant>,
}

/// Shared, TTL-bounded view of the baseline percentiles.
pub struct BaselineCache {
    repo: BaselineRepository,
    ttl: Duration,
    sample: i64,
    state: Mutex<CacheState>,
}

impl BaselineCache {
    /// Creates a cache that refreshes at most once per `ttl` over the
    /// most recent `sample` scored pairs.
    #[must_use]
    pub fn new(repo: BaselineRepository, ttl: Duration, sample: i64) -> Self {
        Self {
            repo,
            ttl,
            sample,
            state: Mutex::new(CacheState {
                snapshot: Baselines::default(),
                fetched_at: None,
            }),
        }
    }

    /// Current baseline snapshot, refreshed when stale. A failed refresh
    /// keeps serving the last known snapshot.
    pub async fn get(&self) -> Baselines {
        let mut state = self.state.lock().await;
        let stale = match state.fetched_at {
            Some(at) => at.elapsed() >= self.ttl,
            None => true,
        };
        if stale {
            match self.repo.compute(self.sample).await {
                Ok(snapshot) => {
                    state.snapshot = snapshot;
                    state.fetched_at = Some(Instant::now());
                }
                Err(error) => {
                    warn!(%error, "baseline refresh failed, serving previous snapshot");
                    // Back off for a TTL so a broken query does not retry
                    // on every pair.
                    if state.fetched_at.is_some() {
                        state.fetched_at = Some(Instant::now());
                    }
                }
            }
        }
        state.snapshot.clone()
    }

    /// Drops the cached snapshot so the next `get` refreshes.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.fetched_at = None;
    }
}
