//! Neighbor-window crowding statistics, fee grading, and badge derivation.
//!
//! The worker fetches every copy execution landing within the slot window
//! around the pair's event slot (the trade itself excluded); this module
//! turns those rows into crowd buckets, per-slot aggregates, nearest-rank
//! fee percentiles, grades, and badges.

use copytrace_core::FeeGrade;
use serde::Serialize;
use std::collections::BTreeMap;

pub const CONTESTED_CROWD_THRESHOLD: i64 = 5;
pub const LATE_SLOT_THRESHOLD: i64 = 10;

pub const BADGE_MISSING_SOURCE: &str = "Missing Source Event";
pub const BADGE_ALONE: &str = "Execution Alone";
pub const BADGE_EARLY: &str = "Early Execution";
pub const BADGE_ON_TIME: &str = "On-Time";
pub const BADGE_LATE: &str = "Late Execution";
pub const BADGE_CONTESTED: &str = "Contested Block";
pub const BADGE_OVERPAID_TIP: &str = "Overpaid Tip";
pub const BADGE_TIP_SLIGHTLY_HIGH: &str = "Tip Slightly High";
pub const BADGE_UNDER_TIPPED: &str = "Under-tipped";

/// One neighboring copy execution, positioned relative to the event slot.
#[derive(Debug, Clone)]
pub struct NeighborExec {
    pub relative_slot: i64,
    pub source_trade_id: Option<i64>,
    pub tip_lamports: Option<i64>,
    pub cu_price_micro_lamports: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crowd {
    pub ahead: i64,
    pub at_event: i64,
    pub behind: i64,
}

impl Crowd {
    #[must_use]
    pub fn total(&self) -> i64 {
        self.ahead + self.at_event + self.behind
    }
}

/// Per-slot aggregate over the window, serialized into the snapshot's
/// histogram JSONB.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotBin {
    pub relative_slot: i64,
    pub copies: i64,
    pub distinct_sources: i64,
    pub avg_tip: Option<f64>,
    pub avg_cu_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeePercentiles {
    pub p50: Option<f64>,
    pub p66: Option<f64>,
    pub p90: Option<f64>,
}

/// Full ladder computation for one pair.
#[derive(Debug, Clone)]
pub struct LadderComputation {
    pub delta_slots: i64,
    pub crowd: Crowd,
    pub bins: Vec<SlotBin>,
    pub tip_percentiles: FeePercentiles,
    pub cu_percentiles: FeePercentiles,
    pub tip_grade: Option<FeeGrade>,
    pub cu_grade: Option<FeeGrade>,
    pub badges: Vec<String>,
}

/// Buckets neighbors by their offset from the event slot.
#[must_use]
pub fn build_crowd(neighbors: &[NeighborExec]) -> Crowd {
    let mut crowd = Crowd::default();
    for n in neighbors {
        if n.relative_slot < 0 {
            crowd.ahead += 1;
        } else if n.relative_slot == 0 {
            crowd.at_event += 1;
        } else {
            crowd.behind += 1;
        }
    }
    crowd
}

/// Per-slot aggregates, ordered by relative slot.
#[must_use]
pub fn slot_bins(neighbors: &[NeighborExec]) -> Vec<SlotBin> {
    struct Acc {
        copies: i64,
        sources: Vec<i64>,
        tip_sum: i64,
        tip_n: i64,
        cu_sum: f64,
        cu_n: i64,
    }

    let mut bins: BTreeMap<i64, Acc> = BTreeMap::new();
    for n in neighbors {
        let acc = bins.entry(n.relative_slot).or_insert(Acc {
            copies: 0,
            sources: Vec::new(),
            tip_sum: 0,
            tip_n: 0,
            cu_sum: 0.0,
            cu_n: 0,
        });
        acc.copies += 1;
        if let Some(src) = n.source_trade_id {
            if !acc.sources.contains(&src) {
                acc.sources.push(src);
            }
        }
        if let Some(tip) = n.tip_lamports {
            acc.tip_sum += tip;
            acc.tip_n += 1;
        }
        if let Some(cu) = n.cu_price_micro_lamports {
            acc.cu_sum += cu;
            acc.cu_n += 1;
        }
    }

    bins.into_iter()
        .map(|(relative_slot, acc)| SlotBin {
            relative_slot,
            copies: acc.copies,
            distinct_sources: acc.sources.len() as i64,
            avg_tip: (acc.tip_n > 0).then(|| acc.tip_sum as f64 / acc.tip_n as f64),
            avg_cu_price: (acc.cu_n > 0).then(|| acc.cu_sum / acc.cu_n as f64),
        })
        .collect()
}

// Nearest-rank percentile over a sorted copy of the values.
fn nearest_rank(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (p * sorted.len() as f64).ceil() as usize;
    Some(sorted[rank.clamp(1, sorted.len()) - 1])
}

/// p50/p66/p90 of the neighbor fee values.
#[must_use]
pub fn percentiles(values: &[f64]) -> FeePercentiles {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    FeePercentiles {
        p50: nearest_rank(&sorted, 0.50),
        p66: nearest_rank(&sorted, 0.66),
        p90: nearest_rank(&sorted, 0.90),
    }
}

/// Grades a fee value against the window percentiles. Falls back to a
/// plain median split when only the p50 is available.
#[must_use]
pub fn grade(value: Option<f64>, pct: &FeePercentiles) -> Option<FeeGrade> {
    let value = value?;
    let p50 = pct.p50?;
    let (p66, p90) = match (pct.p66, pct.p90) {
        (Some(p66), Some(p90)) => (p66, p90),
        _ => {
            return Some(if value < p50 {
                FeeGrade::Underpay
            } else {
                FeeGrade::Optimal
            })
        }
    };
    if value <= p66 {
        return Some(if value >= p50 {
            FeeGrade::Optimal
        } else {
            FeeGrade::Underpay
        });
    }
    if value <= p90 {
        return Some(FeeGrade::SlightOverpay);
    }
    Some(FeeGrade::Overpay)
}

/// All badges that apply, evaluated independently.
#[must_use]
pub fn derive_badges(
    event_slot: Option<i64>,
    delta_slots: Option<i64>,
    crowd_total: i64,
    tip_grade: Option<FeeGrade>,
) -> Vec<String> {
    let mut badges = Vec::new();
    if event_slot.is_none() {
        badges.push(BADGE_MISSING_SOURCE.to_string());
        return badges;
    }
    if crowd_total == 0 {
        badges.push(BADGE_ALONE.to_string());
    }
    if let Some(delta) = delta_slots {
        if delta < 0 {
            badges.push(BADGE_EARLY.to_string());
        } else if delta == 0 {
            badges.push(BADGE_ON_TIME.to_string());
        } else if delta >= LATE_SLOT_THRESHOLD {
            badges.push(BADGE_LATE.to_string());
        }
    }
    if crowd_total >= CONTESTED_CROWD_THRESHOLD {
        badges.push(BADGE_CONTESTED.to_string());
    }
    match tip_grade {
        Some(FeeGrade::Overpay) => badges.push(BADGE_OVERPAID_TIP.to_string()),
        Some(FeeGrade::SlightOverpay) => badges.push(BADGE_TIP_SLIGHTLY_HIGH.to_string()),
        Some(FeeGrade::Underpay) if delta_slots.unwrap_or(0) > 0 => {
            badges.push(BADGE_UNDER_TIPPED.to_string());
        }
        _ => {}
    }
    badges
}

/// Builds the full ladder computation for a pair with a known event slot.
#[must_use]
pub fn build(
    event_slot: i64,
    copy_landed_slot: i64,
    own_tip_lamports: Option<i64>,
    own_cu_price: Option<f64>,
    neighbors: &[NeighborExec],
) -> LadderComputation {
    let delta_slots = copy_landed_slot - event_slot;
    let crowd = build_crowd(neighbors);
    let bins = slot_bins(neighbors);

    let tips: Vec<f64> = neighbors
        .iter()
        .filter_map(|n| n.tip_lamports.map(|t| t as f64))
        .collect();
    let cu_prices: Vec<f64> = neighbors
        .iter()
        .filter_map(|n| n.cu_price_micro_lamports)
        .collect();

    let tip_percentiles = percentiles(&tips);
    let cu_percentiles = percentiles(&cu_prices);

    let tip_grade = grade(own_tip_lamports.map(|t| t as f64), &tip_percentiles);
    let cu_grade = grade(own_cu_price, &cu_percentiles);

    let badges = derive_badges(
        Some(event_slot),
        Some(delta_slots),
        crowd.total(),
        tip_grade,
    );

    LadderComputation {
        delta_slots,
        crowd,
        bins,
        tip_percentiles,
        cu_percentiles,
        tip_grade,
        cu_grade,
        badges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbor(rel: i64, tip: Option<i64>) -> NeighborExec {
        NeighborExec {
            relative_slot: rel,
            source_trade_id: None,
            tip_lamports: tip,
            cu_price_micro_lamports: None,
        }
    }

    #[test]
    fn crowd_buckets_by_offset() {
        let neighbors = vec![
            neighbor(-3, None),
            neighbor(-1, None),
            neighbor(0, None),
            neighbor(4, None),
        ];
        let crowd = build_crowd(&neighbors);
        assert_eq!(crowd.ahead, 2);
        assert_eq!(crowd.at_event, 1);
        assert_eq!(crowd.behind, 1);
        assert_eq!(crowd.total(), 4);
    }

    #[test]
    fn contested_badge_requires_five() {
        // 3 ahead + 1 at event = 4: below threshold.
        let badges = derive_badges(Some(100), Some(1), 4, None);
        assert!(!badges.iter().any(|b| b == BADGE_CONTESTED));
        let badges = derive_badges(Some(100), Some(1), 5, None);
        assert!(badges.iter().any(|b| b == BADGE_CONTESTED));
    }

    #[test]
    fn late_and_overpaid_combine() {
        let badges = derive_badges(Some(100), Some(12), 2, Some(FeeGrade::Overpay));
        assert!(badges.iter().any(|b| b == BADGE_LATE));
        assert!(badges.iter().any(|b| b == BADGE_OVERPAID_TIP));
    }

    #[test]
    fn missing_event_slot_short_circuits() {
        let badges = derive_badges(None, Some(0), 10, Some(FeeGrade::Overpay));
        assert_eq!(badges, vec![BADGE_MISSING_SOURCE.to_string()]);
    }

    #[test]
    fn timing_badges() {
        assert!(derive_badges(Some(1), Some(-2), 1, None)
            .iter()
            .any(|b| b == BADGE_EARLY));
        assert!(derive_badges(Some(1), Some(0), 1, None)
            .iter()
            .any(|b| b == BADGE_ON_TIME));
        assert!(derive_badges(Some(1), Some(10), 1, None)
            .iter()
            .any(|b| b == BADGE_LATE));
        // 9 is late-ish but below the badge threshold.
        let badges = derive_badges(Some(1), Some(9), 1, None);
        assert!(!badges.iter().any(|b| b == BADGE_LATE));
    }

    #[test]
    fn under_tipped_only_when_behind() {
        let badges = derive_badges(Some(1), Some(3), 1, Some(FeeGrade::Underpay));
        assert!(badges.iter().any(|b| b == BADGE_UNDER_TIPPED));
        let badges = derive_badges(Some(1), Some(0), 1, Some(FeeGrade::Underpay));
        assert!(!badges.iter().any(|b| b == BADGE_UNDER_TIPPED));
    }

    #[test]
    fn alone_badge_when_no_neighbors() {
        let badges = derive_badges(Some(1), Some(0), 0, None);
        assert!(badges.iter().any(|b| b == BADGE_ALONE));
    }

    #[test]
    fn nearest_rank_percentiles() {
        let values = vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let pct = percentiles(&values);
        assert_eq!(pct.p50, Some(50.0));
        assert_eq!(pct.p66, Some(70.0));
        assert_eq!(pct.p90, Some(90.0));

        assert_eq!(percentiles(&[]), FeePercentiles::default());
        let single = percentiles(&[42.0]);
        assert_eq!(single.p50, Some(42.0));
        assert_eq!(single.p90, Some(42.0));
    }

    #[test]
    fn grading_bands() {
        let pct = FeePercentiles {
            p50: Some(50.0),
            p66: Some(66.0),
            p90: Some(90.0),
        };
        assert_eq!(grade(Some(55.0), &pct), Some(FeeGrade::Optimal));
        assert_eq!(grade(Some(50.0), &pct), Some(FeeGrade::Optimal));
        assert_eq!(grade(Some(49.0), &pct), Some(FeeGrade::Underpay));
        assert_eq!(grade(Some(70.0), &pct), Some(FeeGrade::SlightOverpay));
        assert_eq!(grade(Some(90.0), &pct), Some(FeeGrade::SlightOverpay));
        assert_eq!(grade(Some(91.0), &pct), Some(FeeGrade::Overpay));
        assert_eq!(grade(None, &pct), None);
    }

    #[test]
    fn grading_falls_back_to_median_split() {
        let pct = FeePercentiles {
            p50: Some(50.0),
            p66: None,
            p90: None,
        };
        assert_eq!(grade(Some(49.0), &pct), Some(FeeGrade::Underpay));
        assert_eq!(grade(Some(50.0), &pct), Some(FeeGrade::Optimal));
        assert_eq!(grade(Some(500.0), &pct), Some(FeeGrade::Optimal));
    }

    #[test]
    fn bins_aggregate_per_slot() {
        let neighbors = vec![
            NeighborExec {
                relative_slot: -1,
                source_trade_id: Some(1),
                tip_lamports: Some(1000),
                cu_price_micro_lamports: Some(10.0),
            },
            NeighborExec {
                relative_slot: -1,
                source_trade_id: Some(1),
                tip_lamports: Some(3000),
                cu_price_micro_lamports: None,
            },
            NeighborExec {
                relative_slot: 2,
                source_trade_id: Some(2),
                tip_lamports: None,
                cu_price_micro_lamports: None,
            },
        ];
        let bins = slot_bins(&neighbors);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].relative_slot, -1);
        assert_eq!(bins[0].copies, 2);
        assert_eq!(bins[0].distinct_sources, 1);
        assert_eq!(bins[0].avg_tip, Some(2000.0));
        assert_eq!(bins[0].avg_cu_price, Some(10.0));
        assert_eq!(bins[1].relative_slot, 2);
        assert_eq!(bins[1].avg_tip, None);
    }

    #[test]
    fn build_produces_full_computation() {
        let neighbors = vec![
            neighbor(-2, Some(1000)),
            neighbor(0, Some(2000)),
            neighbor(1, Some(3000)),
            neighbor(1, Some(4000)),
            neighbor(3, Some(5000)),
        ];
        let ladder = build(1_000_000, 1_000_012, Some(10_000), None, &neighbors);
        assert_eq!(ladder.delta_slots, 12);
        assert_eq!(ladder.crowd.total(), 5);
        // Own tip above every neighbor: overpay, and 12 slots behind: late.
        assert_eq!(ladder.tip_grade, Some(FeeGrade::Overpay));
        assert!(ladder.badges.iter().any(|b| b == BADGE_LATE));
        assert!(ladder.badges.iter().any(|b| b == BADGE_OVERPAID_TIP));
        assert!(ladder.badges.iter().any(|b| b == BADGE_CONTESTED));
        assert_eq!(ladder.cu_grade, None);
    }
}
