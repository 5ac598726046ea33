//! Ladder snapshot record models.

use serde_json::Value as JsonValue;

/// A pair that still needs a ladder snapshot, with the slots and own fees
/// required to build one. `event_slot` may be null when the source event
/// slot never landed; the worker writes a degraded snapshot in that case.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LadderCandidateRow {
    pub pair_id: i64,
    pub event_slot: Option<i64>,
    pub copy_landed_slot: Option<i64>,
    pub tip_lamports: Option<i64>,
    pub cu_price_micro_lamports: Option<f64>,
}

impl LadderCandidateRow {
    /// Whether a snapshot can be written for this candidate right now:
    /// either the source event slot is unknown (degraded snapshot) or both
    /// slots are present. Candidate selection enforces the same predicate
    /// in SQL so unbuildable rows never occupy a batch slot.
    #[must_use]
    pub fn buildable(&self) -> bool {
        self.event_slot.is_none() || self.copy_landed_slot.is_some()
    }
}

/// A neighboring copy execution inside the slot window.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NeighborRow {
    pub relative_slot: i64,
    pub source_trade_id: Option<i64>,
    pub tip_lamports: Option<i64>,
    pub cu_price_micro_lamports: Option<f64>,
}

/// Snapshot row written once per pair.
#[derive(Debug, Clone)]
pub struct NewLadderSnapshot {
    pub pair_id: i64,
    pub event_slot: Option<i64>,
    pub copy_landed_slot: Option<i64>,
    pub delta_slots: Option<i64>,
    pub crowd_ahead: Option<i64>,
    pub crowd_at_event: Option<i64>,
    pub crowd_behind: Option<i64>,
    pub tip_p50: Option<f64>,
    pub tip_p66: Option<f64>,
    pub tip_p90: Option<f64>,
    pub cu_p50: Option<f64>,
    pub cu_p66: Option<f64>,
    pub cu_p90: Option<f64>,
    pub tip_grade: Option<String>,
    pub cu_grade: Option<String>,
    pub hist: Option<JsonValue>,
    pub badges: Vec<String>,
    pub status: String,
}

impl NewLadderSnapshot {
    pub const STATUS_OK: &'static str = "OK";
    pub const STATUS_MISSING_SOURCE: &'static str = "MISSING_SOURCE";

    /// Degraded snapshot for a pair whose source event slot is unknown.
    #[must_use]
    pub fn missing_source(pair_id: i64, copy_landed_slot: Option<i64>, badge: &str) -> Self {
        Self {
            pair_id,
            event_slot: None,
            copy_landed_slot,
            delta_slots: None,
            crowd_ahead: None,
            crowd_at_event: None,
            crowd_behind: None,
            tip_p50: None,
            tip_p66: None,
            tip_p90: None,
            cu_p50: None,
            cu_p66: None,
            cu_p90: None,
            tip_grade: None,
            cu_grade: None,
            hist: None,
            badges: vec![badge.to_string()],
            status: Self::STATUS_MISSING_SOURCE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(event_slot: Option<i64>, copy_landed_slot: Option<i64>) -> LadderCandidateRow {
        LadderCandidateRow {
            pair_id: 1,
            event_slot,
            copy_landed_slot,
            tip_lamports: None,
            cu_price_micro_lamports: None,
        }
    }

    #[test]
    fn unenriched_copy_slot_is_not_buildable() {
        // A known event slot with no copy slot yet must wait for
        // enrichment rather than fill a batch slot every tick.
        assert!(!candidate(Some(100), None).buildable());
        assert!(candidate(Some(100), Some(104)).buildable());
        // No event slot means a degraded snapshot, buildable either way.
        assert!(candidate(None, None).buildable());
        assert!(candidate(None, Some(104)).buildable());
    }

    #[test]
    fn missing_source_snapshot_shape() {
        let snap = NewLadderSnapshot::missing_source(9, Some(104), "Missing Source Event");
        assert_eq!(snap.status, NewLadderSnapshot::STATUS_MISSING_SOURCE);
        assert_eq!(snap.badges, vec!["Missing Source Event".to_string()]);
        assert_eq!(snap.delta_slots, None);
        assert_eq!(snap.copy_landed_slot, Some(104));
    }
}
