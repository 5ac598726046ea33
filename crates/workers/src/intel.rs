//! Creator intel worker: daily execution-quality rollups per creator.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use copytrace_core::Worker;
use copytrace_data::CreatorIntelRepository;
use tracing::warn;

const WINDOW_DAYS: i64 = 7;

/// Rolls the trailing week of scored pairs into one row per creator per
/// day. Re-running on the same day overwrites that day's row.
pub struct CreatorIntelWorker {
    repo: CreatorIntelRepository,
    batch: i64,
}

impl CreatorIntelWorker {
    #[must_use]
    pub fn new(repo: CreatorIntelRepository, batch: i64) -> Self {
        Self { repo, batch }
    }
}

#[async_trait]
impl Worker for CreatorIntelWorker {
    fn name(&self) -> &'static str {
        "creator_intel"
    }

    async fn run_once(&self) -> Result<usize> {
        let aggregates = self.repo.aggregate_scores(WINDOW_DAYS, self.batch).await?;
        let seen = aggregates.len();
        let today = Utc::now().date_naive();

        for agg in &aggregates {
            if let Err(error) = self
                .repo
                .upsert_daily(
                    &agg.creator_pubkey,
                    today,
                    agg.exec_score_avg,
                    agg.trade_count,
                )
                .await
            {
                warn!(creator = %agg.creator_pubkey, %error, "intel rollup write failed");
            }
        }
        Ok(seen)
    }
}
