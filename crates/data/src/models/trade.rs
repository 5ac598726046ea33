//! Ledger record models for copy and source trades.
//!
//! Side/confidence columns are TEXT; records carry the raw string and the
//! typed enums live in `copytrace-core`.

use chrono::{DateTime, Utc};
use copytrace_core::Side;
use rust_decimal::Decimal;

/// An executed wallet trade, candidate copy of some creator action.
/// Immutable except for the chain-enrichment fields (landed slot, block
/// time, fee metadata), which start null and are backfilled.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CopyTradeRecord {
    pub id: i64,
    pub wallet_id: i64,
    pub token_mint: String,
    pub side: String,
    pub invested_amount: Decimal,
    pub received_qty: Decimal,
    pub tx_signature: Option<String>,
    pub landed_slot: Option<i64>,
    pub block_time: Option<DateTime<Utc>>,
    pub tip_lamports: Option<i64>,
    pub cu_used: Option<i64>,
    pub cu_price_micro_lamports: Option<f64>,
    pub route: Option<String>,
    pub ts: DateTime<Utc>,
}

impl CopyTradeRecord {
    #[must_use]
    pub fn side(&self) -> Option<Side> {
        Side::parse(&self.side)
    }

    /// Tip normalized per compute unit; the denominator is floored at 1.
    #[must_use]
    pub fn tip_per_cu(&self) -> Option<f64> {
        let tip = self.tip_lamports? as f64;
        let cu = self.cu_used.unwrap_or(1).max(1) as f64;
        Some(tip / cu)
    }
}

/// A creator's on-chain trade, the candidate origin of a copy.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SourceTradeRecord {
    pub id: i64,
    pub creator_pubkey: String,
    pub token_mint: String,
    pub side: String,
    pub event_ts: DateTime<Utc>,
    pub event_slot: Option<i64>,
    pub landed_slot: Option<i64>,
    pub block_time: Option<DateTime<Utc>>,
    pub tx_signature: Option<String>,
    pub price: Decimal,
    pub amount: Option<Decimal>,
    pub tip_lamports: Option<i64>,
    pub cu_used: Option<i64>,
    pub cu_price_micro_lamports: Option<f64>,
    pub route: Option<String>,
}

impl SourceTradeRecord {
    #[must_use]
    pub fn side(&self) -> Option<Side> {
        Side::parse(&self.side)
    }
}
