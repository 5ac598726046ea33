//! Scoring worker: execution scores for matched pairs.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use copytrace_core::Worker;
use copytrace_data::{BaselineCache, PairRepository, ScoreUpdate, ScoringRow};
use copytrace_engines::scoring::{compute_subscores, finalize, ScoreInputs};
use tracing::{debug, warn};

/// Scores every matched-but-unscored pair against the shared baselines.
/// Pairs that cannot produce a single subscore are marked FAILED and not
/// retried until their source changes.
pub struct ScoringWorker {
    pairs: PairRepository,
    baselines: Arc<BaselineCache>,
    batch: i64,
}

impl ScoringWorker {
    #[must_use]
    pub fn new(pairs: PairRepository, baselines: Arc<BaselineCache>, batch: i64) -> Self {
        Self {
            pairs,
            baselines,
            batch,
        }
    }

    fn inputs(row: &ScoringRow) -> ScoreInputs {
        ScoreInputs {
            delta_slots_event: row.delta_slots_event.map(|v| v as f64),
            delta_ms_event: row.delta_ms_event.map(|v| v as f64),
            delta_slots_landed: row.delta_slots_landed().map(|v| v as f64),
            delta_ms_landed: row.delta_ms_landed().map(|v| v as f64),
            price_drift_pct: row.price_drift_pct,
            size_similarity: row.size_similarity(),
            route_similarity: row.route_similarity(),
            copy_roi_pct: None,
            source_roi_pct: None,
            tip_per_cu: row.tip_per_cu(),
            cu_price_micro_lamports: row.cu_price_micro_lamports,
        }
    }
}

#[async_trait]
impl Worker for ScoringWorker {
    fn name(&self) -> &'static str {
        "scoring"
    }

    async fn run_once(&self) -> Result<usize> {
        let rows = self.pairs.fetch_unscored(self.batch).await?;
        if rows.is_empty() {
            return Ok(0);
        }
        let baselines = self.baselines.get().await;
        let seen = rows.len();

        for row in &rows {
            let sub = compute_subscores(&Self::inputs(row), &baselines);
            let result = finalize(&sub);

            debug!(
                copy_trade_id = row.copy_trade_id,
                score = ?result.score,
                status = result.status.as_str(),
                "scored"
            );

            let update = ScoreUpdate {
                copy_trade_id: row.copy_trade_id,
                execution_score: result.score,
                exec_status: result.status,
                exec_timing: sub.timing,
                exec_financial: sub.financial,
                exec_cost: sub.cost,
                exec_congestion: sub.congestion,
                exec_missing: result.missing.iter().map(|s| (*s).to_string()).collect(),
            };
            if let Err(error) = self.pairs.apply_score(&update).await {
                warn!(copy_trade_id = row.copy_trade_id, %error, "score write failed");
            }
        }
        Ok(seen)
    }
}
