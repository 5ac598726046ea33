//! Multi-factor execution scoring against live population baselines.
//!
//! Four independent subscores (timing, financial, cost, congestion), each
//! nullable when its inputs are unavailable, combined into a weighted
//! 0-100 composite renormalized over the factors actually present.

use copytrace_core::{Baselines, ExecStatus};

/// Factor weights for the composite score.
pub const WEIGHT_TIMING: f64 = 0.40;
pub const WEIGHT_FINANCIAL: f64 = 0.35;
pub const WEIGHT_COST: f64 = 0.15;
pub const WEIGHT_CONGESTION: f64 = 0.10;

/// Everything the scorer can use. All fields optional; absence flows
/// through to `exec_missing` rather than erroring.
#[derive(Debug, Clone, Default)]
pub struct ScoreInputs {
    pub delta_slots_event: Option<f64>,
    pub delta_ms_event: Option<f64>,
    pub delta_slots_landed: Option<f64>,
    pub delta_ms_landed: Option<f64>,
    pub price_drift_pct: Option<f64>,
    pub size_similarity: Option<f64>,
    pub route_similarity: Option<f64>,
    pub copy_roi_pct: Option<f64>,
    pub source_roi_pct: Option<f64>,
    pub tip_per_cu: Option<f64>,
    pub cu_price_micro_lamports: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subscores {
    pub timing: Option<f64>,
    pub financial: Option<f64>,
    pub cost: Option<f64>,
    pub congestion: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub score: Option<f64>,
    pub status: ExecStatus,
    pub missing: Vec<&'static str>,
}

#[must_use]
pub fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

/// Target/max normalization: 100 at or below `target`, 0 at `max`, linear
/// in between. `x` is clamped to `[0, max]` first, so early (negative)
/// deltas score 100.
#[must_use]
pub fn norm_t(target: f64, max: f64, x: Option<f64>) -> Option<f64> {
    let x = x?;
    let xx = clamp(x, 0.0, max);
    if xx <= target {
        return Some(100.0);
    }
    Some(100.0 * (max - xx) / (max - target))
}

/// Same shape as [`norm_t`] for percentage inputs.
#[must_use]
pub fn norm_pct(target_pct: f64, max_pct: f64, x_pct: Option<f64>) -> Option<f64> {
    norm_t(target_pct, max_pct, x_pct)
}

/// Inverse normalization against a population median: 100 at or below the
/// p50, decaying as `(p50/x)^1.25` above it.
#[must_use]
pub fn norm_inv_to_baseline(x: Option<f64>, p50: Option<f64>) -> Option<f64> {
    let x = x?;
    let p50 = p50?;
    if p50 <= 0.0 {
        return None;
    }
    if x <= p50 {
        return Some(100.0);
    }
    Some(clamp(100.0 * (p50 / x).powf(1.25), 0.0, 100.0))
}

// 0.6 slot / 0.4 ms when both present, else whichever is there.
fn blend(slot_score: Option<f64>, ms_score: Option<f64>) -> Option<f64> {
    match (slot_score, ms_score) {
        (Some(a), Some(b)) => Some(0.6 * a + 0.4 * b),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn timing_subscore(inputs: &ScoreInputs) -> Option<f64> {
    let event = blend(
        norm_t(2.0, 12.0, inputs.delta_slots_event),
        norm_t(400.0, 3000.0, inputs.delta_ms_event),
    );
    let landed = blend(
        norm_t(2.0, 15.0, inputs.delta_slots_landed),
        norm_t(800.0, 5000.0, inputs.delta_ms_landed),
    );

    match (event, landed) {
        (Some(e), Some(l)) => Some(0.7 * e + 0.3 * l),
        (Some(e), None) => Some(e),
        (None, Some(l)) => Some(l),
        (None, None) => None,
    }
}

fn financial_subscore(inputs: &ScoreInputs) -> Option<f64> {
    let s_price = norm_pct(0.5, 5.0, inputs.price_drift_pct);
    let s_size = inputs.size_similarity.map(|s| s * 100.0);
    let s_route = inputs.route_similarity.map(|s| s * 100.0);
    let s_roi = match (inputs.copy_roi_pct, inputs.source_roi_pct) {
        (Some(copy), Some(source)) => {
            let penalty = (source - copy).max(0.0);
            Some(clamp(100.0 - 5.0 * penalty, 0.0, 100.0))
        }
        _ => None,
    };

    let mut acc = 0.0;
    let mut weight_sum = 0.0;
    for (value, weight) in [
        (s_price, 0.6),
        (s_size, 0.15),
        (s_route, 0.15),
        (s_roi, 0.10),
    ] {
        if let Some(v) = value {
            acc += v * weight;
            weight_sum += weight;
        }
    }
    if weight_sum > 0.0 {
        Some(acc / weight_sum)
    } else {
        None
    }
}

fn cost_subscore(inputs: &ScoreInputs, baselines: &Baselines) -> Option<f64> {
    let s_tip = norm_inv_to_baseline(inputs.tip_per_cu, baselines.tip_per_cu_p50);
    let s_cu = norm_inv_to_baseline(inputs.cu_price_micro_lamports, baselines.cu_price_p50);

    let parts: Vec<f64> = [s_tip, s_cu].into_iter().flatten().collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.iter().sum::<f64>() / parts.len() as f64)
}

fn congestion_subscore(inputs: &ScoreInputs, baselines: &Baselines) -> Option<f64> {
    let landed = norm_t(2.0, 15.0, inputs.delta_slots_landed)?;
    let factor = clamp(baselines.delta_slots_landed_p95? / 6.0, 0.5, 2.0);
    let mut score = clamp(landed * factor, 0.0, 100.0);

    // Wasted-spend penalty: a fat tip during low congestion bought nothing.
    if let (Some(tip), Some(p50)) = (inputs.tip_per_cu, baselines.tip_per_cu_p50) {
        if factor < 0.8 && tip > 3.0 * p50 {
            score = clamp(score - 15.0, 0.0, 100.0);
        }
    }
    Some(score)
}

/// Computes the four subscores. Each is None when its inputs are missing.
#[must_use]
pub fn compute_subscores(inputs: &ScoreInputs, baselines: &Baselines) -> Subscores {
    Subscores {
        timing: timing_subscore(inputs),
        financial: financial_subscore(inputs),
        cost: cost_subscore(inputs, baselines),
        congestion: congestion_subscore(inputs, baselines),
    }
}

/// Weighted composite over the present subscores, renormalized by the
/// weights actually used and rounded to 2 decimals.
#[must_use]
pub fn finalize(sub: &Subscores) -> ScoreResult {
    let factors: [(&'static str, Option<f64>, f64); 4] = [
        ("timing", sub.timing, WEIGHT_TIMING),
        ("financial", sub.financial, WEIGHT_FINANCIAL),
        ("cost", sub.cost, WEIGHT_COST),
        ("congestion", sub.congestion, WEIGHT_CONGESTION),
    ];

    let mut acc = 0.0;
    let mut weight_sum = 0.0;
    let mut missing = Vec::new();
    for (name, value, weight) in factors {
        match value {
            Some(v) => {
                acc += v * weight;
                weight_sum += weight;
            }
            None => missing.push(name),
        }
    }

    let score = if weight_sum > 0.0 {
        Some((clamp(acc / weight_sum, 0.0, 100.0) * 100.0).round() / 100.0)
    } else {
        None
    };

    let status = match (score, missing.is_empty()) {
        (Some(_), true) => ExecStatus::Ready,
        (Some(_), false) => ExecStatus::Partial,
        (None, _) => ExecStatus::Failed,
    };

    ScoreResult {
        score,
        status,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_baselines() -> Baselines {
        Baselines {
            tip_per_cu_p50: Some(5000.0),
            cu_price_p50: Some(1000.0),
            delta_slots_landed_p95: Some(6.0),
            delta_ms_event_p50: Some(800.0),
            delta_ms_event_p95: Some(4000.0),
            price_drift_p50: Some(0.4),
        }
    }

    #[test]
    fn norm_t_boundaries() {
        assert_eq!(norm_t(2.0, 12.0, Some(2.0)), Some(100.0));
        assert_eq!(norm_t(2.0, 12.0, Some(12.0)), Some(0.0));
        assert_eq!(norm_t(2.0, 12.0, Some(-5.0)), Some(100.0));
        assert_eq!(norm_t(2.0, 12.0, Some(20.0)), Some(0.0));
        assert_eq!(norm_t(2.0, 12.0, None), None);
        // Linear midpoint: x = 7 -> (12-7)/(12-2) = 50.
        assert_eq!(norm_t(2.0, 12.0, Some(7.0)), Some(50.0));
    }

    #[test]
    fn norm_inv_matches_documented_scenario() {
        // tip 10_000 against p50 5_000: 100 * (0.5)^1.25 ~= 42.0
        let s = norm_inv_to_baseline(Some(10_000.0), Some(5_000.0)).unwrap();
        assert!((s - 42.044820762685725).abs() < 1e-9);
        assert_eq!(norm_inv_to_baseline(Some(4_000.0), Some(5_000.0)), Some(100.0));
        assert_eq!(norm_inv_to_baseline(Some(1.0), Some(0.0)), None);
        assert_eq!(norm_inv_to_baseline(None, Some(5_000.0)), None);
    }

    #[test]
    fn timing_blends_slot_and_ms_components() {
        let inputs = ScoreInputs {
            delta_slots_event: Some(2.0),
            delta_ms_event: Some(3000.0),
            ..ScoreInputs::default()
        };
        // event = 0.6*100 + 0.4*0 = 60; no landed component.
        let sub = compute_subscores(&inputs, &Baselines::default());
        assert_eq!(sub.timing, Some(60.0));
    }

    #[test]
    fn timing_weights_event_over_landed() {
        let inputs = ScoreInputs {
            delta_slots_event: Some(2.0),
            delta_slots_landed: Some(15.0),
            ..ScoreInputs::default()
        };
        // event = 100, landed = 0 -> 0.7*100 + 0.3*0 = 70.
        let sub = compute_subscores(&inputs, &Baselines::default());
        assert_eq!(sub.timing, Some(70.0));
    }

    #[test]
    fn financial_renormalizes_over_present_parts() {
        let inputs = ScoreInputs {
            price_drift_pct: Some(0.2),
            route_similarity: Some(1.0),
            ..ScoreInputs::default()
        };
        // Both present parts score 100, so the weighted mean is 100.
        let sub = compute_subscores(&inputs, &Baselines::default());
        assert_eq!(sub.financial, Some(100.0));
    }

    #[test]
    fn roi_underperformance_is_penalized() {
        let inputs = ScoreInputs {
            copy_roi_pct: Some(5.0),
            source_roi_pct: Some(15.0),
            ..ScoreInputs::default()
        };
        // Only the ROI part is present: 100 - 5*10 = 50.
        let sub = compute_subscores(&inputs, &Baselines::default());
        assert_eq!(sub.financial, Some(50.0));
    }

    #[test]
    fn cost_averages_available_efficiencies() {
        let inputs = ScoreInputs {
            tip_per_cu: Some(10_000.0),
            cu_price_micro_lamports: Some(500.0),
            ..ScoreInputs::default()
        };
        let sub = compute_subscores(&inputs, &full_baselines());
        // tip ~= 42.04, cu = 100 -> mean ~= 71.02
        let cost = sub.cost.unwrap();
        assert!((cost - 71.02241038134286).abs() < 1e-9);
    }

    #[test]
    fn congestion_penalizes_wasted_spend() {
        let mut baselines = full_baselines();
        baselines.delta_slots_landed_p95 = Some(3.0); // factor 0.5, low congestion
        let inputs = ScoreInputs {
            delta_slots_landed: Some(2.0),
            tip_per_cu: Some(20_000.0), // > 3x p50
            ..ScoreInputs::default()
        };
        let sub = compute_subscores(&inputs, &baselines);
        // norm = 100, scaled 50, minus 15 penalty.
        assert_eq!(sub.congestion, Some(35.0));
    }

    #[test]
    fn congestion_absent_without_baseline() {
        let inputs = ScoreInputs {
            delta_slots_landed: Some(2.0),
            ..ScoreInputs::default()
        };
        let sub = compute_subscores(&inputs, &Baselines::default());
        assert_eq!(sub.congestion, None);
    }

    #[test]
    fn finalize_ready_when_all_present() {
        let sub = Subscores {
            timing: Some(80.0),
            financial: Some(90.0),
            cost: Some(60.0),
            congestion: Some(40.0),
        };
        let res = finalize(&sub);
        assert_eq!(res.status, ExecStatus::Ready);
        assert!(res.missing.is_empty());
        // 0.4*80 + 0.35*90 + 0.15*60 + 0.1*40 = 76.5
        assert_eq!(res.score, Some(76.5));
    }

    #[test]
    fn finalize_partial_renormalizes_weights() {
        let sub = Subscores {
            timing: Some(80.0),
            financial: None,
            cost: Some(60.0),
            congestion: None,
        };
        let res = finalize(&sub);
        assert_eq!(res.status, ExecStatus::Partial);
        assert_eq!(res.missing, vec!["financial", "congestion"]);
        // (0.4*80 + 0.15*60) / 0.55 = 74.55 (rounded)
        assert_eq!(res.score, Some(74.55));
    }

    #[test]
    fn finalize_failed_keeps_score_null() {
        let res = finalize(&Subscores::default());
        assert_eq!(res.status, ExecStatus::Failed);
        assert_eq!(res.score, None);
        assert_eq!(res.missing.len(), 4);
    }
}
