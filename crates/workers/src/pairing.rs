//! Pairing worker: joins copy trades to their nearest source trade.

use anyhow::Result;
use async_trait::async_trait;
use copytrace_core::{PairingConfig, Worker};
use copytrace_data::{
    CopyTradeRecord, CopyTradeRepository, NewPair, PairRepository, SourceTradeRecord,
    SourceTradeRepository,
};
use copytrace_engines::pairing::{evaluate, CopyLeg, SourceLeg};
use serde_json::json;
use tracing::{debug, warn};

/// Matches unmatched copy trades against the source ledger. Prefers the
/// slot axis; falls back to the timestamp axis while the copy trade is
/// still waiting for slot enrichment. Trades with no candidate get an
/// unmatched pair row and are retried every tick.
pub struct PairingWorker {
    copy_trades: CopyTradeRepository,
    source_trades: SourceTradeRepository,
    pairs: PairRepository,
    config: PairingConfig,
    batch: i64,
}

impl PairingWorker {
    #[must_use]
    pub fn new(
        copy_trades: CopyTradeRepository,
        source_trades: SourceTradeRepository,
        pairs: PairRepository,
        config: PairingConfig,
        batch: i64,
    ) -> Self {
        Self {
            copy_trades,
            source_trades,
            pairs,
            config,
            batch,
        }
    }

    async fn find_candidate(
        &self,
        trade: &CopyTradeRecord,
    ) -> Result<(Option<SourceTradeRecord>, &'static str)> {
        if let Some(landed_slot) = trade.landed_slot {
            let found = self
                .source_trades
                .nearest_in_slot_window(
                    &trade.token_mint,
                    &trade.side,
                    landed_slot,
                    self.config.window_slots,
                )
                .await?;
            return Ok((found, "slot"));
        }
        // Slot not enriched yet; the wall-clock window is the same bound
        // in different units.
        let found = self
            .source_trades
            .nearest_in_time_window(
                &trade.token_mint,
                &trade.side,
                trade.ts,
                self.config.window_ms,
            )
            .await?;
        Ok((found, "ms"))
    }

    async fn process(&self, trade: &CopyTradeRecord) -> Result<()> {
        let (candidate, axis) = self.find_candidate(trade).await?;

        let Some(source) = candidate else {
            let diagnostics = json!({
                "reason": "NO_SOURCE_CANDIDATE",
                "window_slots": self.config.window_slots,
                "window_ms": self.config.window_ms,
            });
            self.pairs
                .upsert_unmatched(trade.id, &trade.token_mint, &trade.side, Some(&diagnostics))
                .await?;
            return Ok(());
        };

        let copy_leg = CopyLeg {
            landed_slot: trade.landed_slot,
            timestamp: trade.ts,
            invested_amount: trade.invested_amount,
            received_qty: trade.received_qty,
        };
        let source_leg = SourceLeg {
            id: source.id,
            event_slot: source.event_slot,
            event_ts: source.event_ts,
            price: source.price,
        };
        let join = evaluate(&copy_leg, &source_leg);

        debug!(
            copy_trade_id = trade.id,
            source_trade_id = join.source_trade_id,
            confidence = join.confidence.as_str(),
            axis,
            "paired"
        );

        self.pairs
            .upsert_matched(&NewPair {
                copy_trade_id: trade.id,
                source_trade_id: join.source_trade_id,
                token_mint: trade.token_mint.clone(),
                side: trade.side.clone(),
                delta_slots_event: join.delta_slots_event,
                delta_ms_event: join.delta_ms_event,
                price_drift_pct: join.price_drift_pct,
                confidence: join.confidence,
                diagnostics: Some(json!({ "matched_axis": axis })),
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Worker for PairingWorker {
    fn name(&self) -> &'static str {
        "pairing"
    }

    async fn run_once(&self) -> Result<usize> {
        let trades = self.copy_trades.fetch_unmatched(self.batch).await?;
        let seen = trades.len();
        for trade in &trades {
            if let Err(error) = self.process(trade).await {
                warn!(copy_trade_id = trade.id, %error, "pairing failed for trade");
            }
        }
        Ok(seen)
    }
}
