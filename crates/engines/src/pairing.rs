//! Stream-to-stream join of copy trades onto their nearest source trade.
//!
//! Candidate selection (token/side filter, slot-distance ordering,
//! id tie-break, window bound) happens in SQL; this module computes the
//! join fields for the single chosen candidate and the confidence tier.

use chrono::{DateTime, Utc};
use copytrace_core::Confidence;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Copy-side inputs to the join.
#[derive(Debug, Clone)]
pub struct CopyLeg {
    pub landed_slot: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub invested_amount: Decimal,
    pub received_qty: Decimal,
}

/// Source-side inputs to the join.
#[derive(Debug, Clone)]
pub struct SourceLeg {
    pub id: i64,
    pub event_slot: Option<i64>,
    pub event_ts: DateTime<Utc>,
    pub price: Decimal,
}

/// Computed join fields for a matched pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairJoin {
    pub source_trade_id: i64,
    pub delta_slots_event: Option<i64>,
    pub delta_ms_event: Option<i64>,
    pub price_drift_pct: Option<f64>,
    pub confidence: Confidence,
}

/// Effective price the copy paid, invested amount over received quantity.
#[must_use]
pub fn effective_price(invested_amount: Decimal, received_qty: Decimal) -> Option<Decimal> {
    if received_qty.is_zero() {
        return None;
    }
    invested_amount.checked_div(received_qty)
}

/// Signed drift of the copy's effective price from the source price,
/// in percent. None when the source price is zero or either side is
/// unavailable.
#[must_use]
pub fn price_drift_pct(copy_price: Option<Decimal>, source_price: Decimal) -> Option<f64> {
    let copy_price = copy_price?;
    if source_price.is_zero() {
        return None;
    }
    let drift = (copy_price - source_price).checked_div(source_price)? * Decimal::from(100);
    drift.to_f64()
}

/// Confidence tier from the event deltas; first matching rule wins.
///
/// HIGH: |slots| <= 20 or |ms| <= 1200. MED: |slots| <= 60 or |ms| <= 5000.
/// Otherwise LOW.
#[must_use]
pub fn confidence(delta_slots: Option<i64>, delta_ms: Option<i64>) -> Confidence {
    if delta_slots.is_some_and(|d| d.abs() <= 20) {
        return Confidence::High;
    }
    if delta_ms.is_some_and(|d| d.abs() <= 1200) {
        return Confidence::High;
    }
    if delta_slots.is_some_and(|d| d.abs() <= 60) || delta_ms.is_some_and(|d| d.abs() <= 5000) {
        return Confidence::Med;
    }
    Confidence::Low
}

/// Computes all join fields for a copy trade against its chosen source.
#[must_use]
pub fn evaluate(copy: &CopyLeg, source: &SourceLeg) -> PairJoin {
    let delta_slots_event = match (copy.landed_slot, source.event_slot) {
        (Some(c), Some(s)) => Some(c - s),
        _ => None,
    };
    let delta_ms_event = Some((copy.timestamp - source.event_ts).num_milliseconds());

    let copy_price = effective_price(copy.invested_amount, copy.received_qty);
    let drift = price_drift_pct(copy_price, source.price);

    PairJoin {
        source_trade_id: source.id,
        delta_slots_event,
        delta_ms_event,
        price_drift_pct: drift,
        confidence: confidence(delta_slots_event, delta_ms_event),
    }
}

/// Whether a re-pair run may replace an existing match. A HIGH-confidence
/// match is only ever replaced by another HIGH-confidence one.
#[must_use]
pub fn allows_replace(existing: Option<Confidence>, candidate: Confidence) -> bool {
    match existing {
        Some(Confidence::High) => candidate == Confidence::High,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ts(ms_offset: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms_offset).unwrap()
    }

    fn copy_at(slot: Option<i64>, ms: i64) -> CopyLeg {
        CopyLeg {
            landed_slot: slot,
            timestamp: ts(ms),
            invested_amount: dec!(1.0),
            received_qty: dec!(100.0),
        }
    }

    fn source_at(slot: Option<i64>, ms: i64) -> SourceLeg {
        SourceLeg {
            id: 7,
            event_slot: slot,
            event_ts: ts(ms),
            price: dec!(0.01),
        }
    }

    #[test]
    fn confidence_slot_boundary_is_inclusive_on_high() {
        assert_eq!(confidence(Some(20), None), Confidence::High);
        assert_eq!(confidence(Some(-20), None), Confidence::High);
        assert_eq!(confidence(Some(21), None), Confidence::Med);
        assert_eq!(confidence(Some(60), None), Confidence::Med);
        assert_eq!(confidence(Some(61), None), Confidence::Low);
    }

    #[test]
    fn confidence_ms_axis() {
        assert_eq!(confidence(None, Some(1200)), Confidence::High);
        assert_eq!(confidence(None, Some(1201)), Confidence::Med);
        assert_eq!(confidence(None, Some(5000)), Confidence::Med);
        assert_eq!(confidence(None, Some(5001)), Confidence::Low);
    }

    #[test]
    fn confidence_either_axis_can_promote() {
        // Slow by slots but fast by wall clock still rates HIGH.
        assert_eq!(confidence(Some(45), Some(900)), Confidence::High);
        // Both out of MED range rates LOW.
        assert_eq!(confidence(Some(61), Some(6000)), Confidence::Low);
    }

    #[test]
    fn evaluate_copy_landing_before_source_event() {
        // Copy landed at 1_000_000, source event at 1_000_002.
        let copy = copy_at(Some(1_000_000), 0);
        let source = source_at(Some(1_000_002), 0);
        let join = evaluate(&copy, &source);
        assert_eq!(join.delta_slots_event, Some(-2));
        assert_eq!(join.confidence, Confidence::High);
    }

    #[test]
    fn evaluate_without_copy_slot_uses_ms_axis_only() {
        let copy = copy_at(None, 4000);
        let source = source_at(Some(500), 0);
        let join = evaluate(&copy, &source);
        assert_eq!(join.delta_slots_event, None);
        assert_eq!(join.delta_ms_event, Some(4000));
        assert_eq!(join.confidence, Confidence::Med);
    }

    #[test]
    fn drift_is_signed_percent() {
        // Effective price 1.0 / 100 = 0.01, source 0.01 -> zero drift.
        let copy = copy_at(Some(10), 0);
        let source = source_at(Some(10), 0);
        let join = evaluate(&copy, &source);
        assert_eq!(join.price_drift_pct, Some(0.0));

        let worse = CopyLeg {
            invested_amount: dec!(1.1),
            ..copy
        };
        let drift = evaluate(&worse, &source).price_drift_pct.unwrap();
        assert!((drift - 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_received_qty_yields_no_drift() {
        let copy = CopyLeg {
            received_qty: dec!(0),
            ..copy_at(Some(10), 0)
        };
        assert_eq!(evaluate(&copy, &source_at(Some(10), 0)).price_drift_pct, None);
    }

    #[test]
    fn high_match_is_never_downgraded() {
        assert!(!allows_replace(Some(Confidence::High), Confidence::Med));
        assert!(!allows_replace(Some(Confidence::High), Confidence::Low));
        assert!(allows_replace(Some(Confidence::High), Confidence::High));
        assert!(allows_replace(Some(Confidence::Med), Confidence::Low));
        assert!(allows_replace(None, Confidence::Low));
    }
}
