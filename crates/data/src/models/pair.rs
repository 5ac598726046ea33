//! Pair join/score record models.

use chrono::{DateTime, Utc};
use copytrace_core::{Confidence, ExecStatus};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

/// The join result for one copy trade; at most one active source.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PairRecord {
    pub copy_trade_id: i64,
    pub source_trade_id: Option<i64>,
    pub token_mint: String,
    pub side: String,
    pub delta_slots_event: Option<i64>,
    pub delta_ms_event: Option<i64>,
    pub price_drift_pct: Option<f64>,
    pub confidence: Option<String>,
    pub execution_score: Option<f64>,
    pub exec_status: Option<String>,
    pub exec_timing: Option<f64>,
    pub exec_financial: Option<f64>,
    pub exec_cost: Option<f64>,
    pub exec_congestion: Option<f64>,
    pub exec_missing: Option<Vec<String>>,
    pub diagnostics: Option<JsonValue>,
    pub paired_at: DateTime<Utc>,
    pub scored_at: Option<DateTime<Utc>>,
}

impl PairRecord {
    /// Unmatched pairs surface to consumers as AWAITING_MATCH.
    #[must_use]
    pub fn is_awaiting_match(&self) -> bool {
        self.source_trade_id.is_none()
    }

    #[must_use]
    pub fn confidence(&self) -> Option<Confidence> {
        self.confidence.as_deref().and_then(Confidence::parse)
    }

    #[must_use]
    pub fn exec_status(&self) -> Option<ExecStatus> {
        self.exec_status.as_deref().and_then(ExecStatus::parse)
    }
}

/// Join fields written by the pairing worker.
#[derive(Debug, Clone)]
pub struct NewPair {
    pub copy_trade_id: i64,
    pub source_trade_id: i64,
    pub token_mint: String,
    pub side: String,
    pub delta_slots_event: Option<i64>,
    pub delta_ms_event: Option<i64>,
    pub price_drift_pct: Option<f64>,
    pub confidence: Confidence,
    pub diagnostics: Option<JsonValue>,
}

/// Score fields written by the scoring worker.
#[derive(Debug, Clone)]
pub struct ScoreUpdate {
    pub copy_trade_id: i64,
    pub execution_score: Option<f64>,
    pub exec_status: ExecStatus,
    pub exec_timing: Option<f64>,
    pub exec_financial: Option<f64>,
    pub exec_cost: Option<f64>,
    pub exec_congestion: Option<f64>,
    pub exec_missing: Vec<String>,
}

/// One unscored pair joined with both trade legs, everything the scorer
/// can use. Optional fields stay null when enrichment has not landed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoringRow {
    pub copy_trade_id: i64,
    pub delta_slots_event: Option<i64>,
    pub delta_ms_event: Option<i64>,
    pub price_drift_pct: Option<f64>,
    pub copy_landed_slot: Option<i64>,
    pub copy_block_time: Option<DateTime<Utc>>,
    pub tip_lamports: Option<i64>,
    pub cu_used: Option<i64>,
    pub cu_price_micro_lamports: Option<f64>,
    pub copy_route: Option<String>,
    pub invested_amount: Decimal,
    pub source_landed_slot: Option<i64>,
    pub source_block_time: Option<DateTime<Utc>>,
    pub source_route: Option<String>,
    pub source_amount: Option<Decimal>,
}

impl ScoringRow {
    #[must_use]
    pub fn tip_per_cu(&self) -> Option<f64> {
        let tip = self.tip_lamports? as f64;
        let cu = self.cu_used.unwrap_or(1).max(1) as f64;
        Some(tip / cu)
    }

    #[must_use]
    pub fn delta_slots_landed(&self) -> Option<i64> {
        Some(self.copy_landed_slot? - self.source_landed_slot?)
    }

    #[must_use]
    pub fn delta_ms_landed(&self) -> Option<i64> {
        Some((self.copy_block_time? - self.source_block_time?).num_milliseconds())
    }

    /// 1.0 when both legs took the same route, 0.0 when they differ,
    /// None when either route is unknown.
    #[must_use]
    pub fn route_similarity(&self) -> Option<f64> {
        let copy = self.copy_route.as_deref()?;
        let source = self.source_route.as_deref()?;
        Some(if copy.eq_ignore_ascii_case(source) {
            1.0
        } else {
            0.0
        })
    }

    /// min/max ratio of the two notionals, None when the source amount is
    /// unknown or either side is zero.
    #[must_use]
    pub fn size_similarity(&self) -> Option<f64> {
        use rust_decimal::prelude::ToPrimitive;
        let copy = self.invested_amount.to_f64()?;
        let source = self.source_amount?.to_f64()?;
        if copy <= 0.0 || source <= 0.0 {
            return None;
        }
        Some(copy.min(source) / copy.max(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row() -> ScoringRow {
        ScoringRow {
            copy_trade_id: 1,
            delta_slots_event: Some(5),
            delta_ms_event: Some(900),
            price_drift_pct: Some(0.3),
            copy_landed_slot: Some(1_000_010),
            copy_block_time: None,
            tip_lamports: Some(10_000),
            cu_used: Some(2),
            cu_price_micro_lamports: Some(2500.0),
            copy_route: Some("Jupiter".to_string()),
            invested_amount: dec!(2),
            source_landed_slot: Some(1_000_004),
            source_block_time: None,
            source_route: Some("jupiter".to_string()),
            source_amount: Some(dec!(8)),
        }
    }

    #[test]
    fn landed_delta_needs_both_slots() {
        assert_eq!(row().delta_slots_landed(), Some(6));
        let mut r = row();
        r.source_landed_slot = None;
        assert_eq!(r.delta_slots_landed(), None);
    }

    #[test]
    fn route_similarity_ignores_case() {
        assert_eq!(row().route_similarity(), Some(1.0));
        let mut r = row();
        r.source_route = Some("raydium".to_string());
        assert_eq!(r.route_similarity(), Some(0.0));
        r.source_route = None;
        assert_eq!(r.route_similarity(), None);
    }

    #[test]
    fn size_similarity_is_min_over_max() {
        assert_eq!(row().size_similarity(), Some(0.25));
        let mut r = row();
        r.source_amount = None;
        assert_eq!(r.size_similarity(), None);
    }

    #[test]
    fn tip_per_cu() {
        assert_eq!(row().tip_per_cu(), Some(5000.0));
    }
}
