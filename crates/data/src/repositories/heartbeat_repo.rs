//! Worker heartbeat repository.

use anyhow::Result;
use async_trait::async_trait;
use copytrace_core::HeartbeatSink;
use sqlx::PgPool;

use crate::models::HeartbeatRecord;

/// Repository for per-worker heartbeat upserts.
#[derive(Debug, Clone)]
pub struct HeartbeatRepository {
    pool: PgPool,
}

impl HeartbeatRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a successful pass for a worker.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn upsert(&self, worker_name: &str, backlog_count: i64) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO worker_heartbeats (worker_name, last_ok_at, backlog_count, updated_at)
            VALUES ($1, now(), $2, now())
            ON CONFLICT (worker_name) DO UPDATE SET
                last_ok_at    = now(),
                backlog_count = EXCLUDED.backlog_count,
                updated_at    = now()
            ",
        )
        .bind(worker_name)
        .bind(backlog_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All recorded heartbeats.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<HeartbeatRecord>> {
        let rows = sqlx::query_as::<_, HeartbeatRecord>(
            "SELECT worker_name, last_ok_at, backlog_count FROM worker_heartbeats ORDER BY worker_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl HeartbeatSink for HeartbeatRepository {
    async fn record(&self, worker_name: &str, backlog_count: i64) -> Result<()> {
        self.upsert(worker_name, backlog_count).await
    }
}
