//! Ladder worker: crowd and fee-context snapshots for matched pairs.

use anyhow::Result;
use async_trait::async_trait;
use copytrace_core::{LadderConfig, Worker};
use copytrace_data::{LadderCandidateRow, LadderRepository, NewLadderSnapshot};
use copytrace_engines::ladder::{build, LadderComputation, NeighborExec, BADGE_MISSING_SOURCE};
use serde_json::json;
use tracing::{debug, warn};

/// Builds one immutable snapshot per matched pair: who else landed near
/// the source event, what they paid, and how this execution compares.
pub struct LadderWorker {
    repo: LadderRepository,
    window: i64,
    batch: i64,
}

impl LadderWorker {
    #[must_use]
    pub fn new(repo: LadderRepository, config: &LadderConfig, batch: i64) -> Self {
        Self {
            repo,
            window: config.clamped_window(),
            batch,
        }
    }

    fn snapshot(candidate: &LadderCandidateRow, comp: &LadderComputation) -> NewLadderSnapshot {
        let hist = json!(comp.bins);

        NewLadderSnapshot {
            pair_id: candidate.pair_id,
            event_slot: candidate.event_slot,
            copy_landed_slot: candidate.copy_landed_slot,
            delta_slots: Some(comp.delta_slots),
            crowd_ahead: Some(comp.crowd.ahead),
            crowd_at_event: Some(comp.crowd.at_event),
            crowd_behind: Some(comp.crowd.behind),
            tip_p50: comp.tip_percentiles.p50,
            tip_p66: comp.tip_percentiles.p66,
            tip_p90: comp.tip_percentiles.p90,
            cu_p50: comp.cu_percentiles.p50,
            cu_p66: comp.cu_percentiles.p66,
            cu_p90: comp.cu_percentiles.p90,
            tip_grade: comp.tip_grade.map(|g| g.as_str().to_string()),
            cu_grade: comp.cu_grade.map(|g| g.as_str().to_string()),
            hist: Some(hist),
            badges: comp.badges.clone(),
            status: NewLadderSnapshot::STATUS_OK.to_string(),
        }
    }

    async fn process(&self, candidate: &LadderCandidateRow) -> Result<()> {
        let Some(event_slot) = candidate.event_slot else {
            let snap = NewLadderSnapshot::missing_source(
                candidate.pair_id,
                candidate.copy_landed_slot,
                BADGE_MISSING_SOURCE,
            );
            self.repo.insert_snapshot(&snap).await?;
            return Ok(());
        };

        // Candidate selection only returns buildable rows; a row that
        // lost its copy slot between queries waits for the next tick.
        let Some(copy_landed_slot) = candidate.copy_landed_slot else {
            debug!(pair_id = candidate.pair_id, "copy slot not enriched yet");
            return Ok(());
        };

        let rows = self
            .repo
            .fetch_neighbors(candidate.pair_id, event_slot, self.window)
            .await?;
        let neighbors: Vec<NeighborExec> = rows
            .into_iter()
            .map(|r| NeighborExec {
                relative_slot: r.relative_slot,
                source_trade_id: r.source_trade_id,
                tip_lamports: r.tip_lamports,
                cu_price_micro_lamports: r.cu_price_micro_lamports,
            })
            .collect();

        let comp = build(
            event_slot,
            copy_landed_slot,
            candidate.tip_lamports,
            candidate.cu_price_micro_lamports,
            &neighbors,
        );
        self.repo
            .insert_snapshot(&Self::snapshot(candidate, &comp))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Worker for LadderWorker {
    fn name(&self) -> &'static str {
        "ladder"
    }

    async fn run_once(&self) -> Result<usize> {
        let candidates = self.repo.fetch_candidates(self.batch).await?;
        let seen = candidates.len();
        for candidate in &candidates {
            if let Err(error) = self.process(candidate).await {
                warn!(pair_id = candidate.pair_id, %error, "ladder snapshot failed");
            }
        }
        Ok(seen)
    }
}
