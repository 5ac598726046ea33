//! Domain enums and shared value types.
//!
//! Enums are stored as TEXT columns; records carry the raw string and the
//! typed variants live here with `as_str` / `parse` helpers.

use serde::{Deserialize, Serialize};

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Some(Self::Buy),
            "SELL" => Some(Self::Sell),
            _ => None,
        }
    }
}

/// Reliability tier of a pairing, derived from event deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Med,
    Low,
}

impl Confidence {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Med => "MED",
            Self::Low => "LOW",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "HIGH" => Some(Self::High),
            "MED" => Some(Self::Med),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Outcome of the execution-scoring pass for a pair.
///
/// `Ready` means every subscore was computable, `Partial` means a score
/// exists but at least one factor was missing, `Failed` means no factor
/// could be computed and the score stays null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecStatus {
    Ready,
    Partial,
    Failed,
}

impl ExecStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Partial => "PARTIAL",
            Self::Failed => "FAILED",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "READY" => Some(Self::Ready),
            "PARTIAL" => Some(Self::Partial),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Fee grade of a trade's tip or compute-unit price against its neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeGrade {
    Optimal,
    Underpay,
    SlightOverpay,
    Overpay,
}

impl FeeGrade {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Optimal => "Optimal",
            Self::Underpay => "Underpay",
            Self::SlightOverpay => "Slight Overpay",
            Self::Overpay => "Overpay",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Optimal" => Some(Self::Optimal),
            "Underpay" => Some(Self::Underpay),
            "Slight Overpay" => Some(Self::SlightOverpay),
            "Overpay" => Some(Self::Overpay),
            _ => None,
        }
    }
}

/// Population percentile snapshot used to normalize cost and congestion
/// subscores. Any field may be absent while the sample is still thin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Baselines {
    pub tip_per_cu_p50: Option<f64>,
    pub cu_price_p50: Option<f64>,
    pub delta_slots_landed_p95: Option<f64>,
    pub delta_ms_event_p50: Option<f64>,
    pub delta_ms_event_p95: Option<f64>,
    pub price_drift_p50: Option<f64>,
}

impl Baselines {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tip_per_cu_p50.is_none()
            && self.cu_price_p50.is_none()
            && self.delta_slots_landed_p95.is_none()
            && self.delta_ms_event_p50.is_none()
            && self.delta_ms_event_p95.is_none()
            && self.price_drift_p50.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_roundtrip() {
        assert_eq!(Side::parse("buy"), Some(Side::Buy));
        assert_eq!(Side::parse("SELL"), Some(Side::Sell));
        assert_eq!(Side::parse("hold"), None);
        assert_eq!(Side::Buy.as_str(), "BUY");
    }

    #[test]
    fn confidence_roundtrip() {
        for c in [Confidence::High, Confidence::Med, Confidence::Low] {
            assert_eq!(Confidence::parse(c.as_str()), Some(c));
        }
        assert_eq!(Confidence::parse("NONE"), None);
    }

    #[test]
    fn fee_grade_uses_display_labels() {
        assert_eq!(FeeGrade::parse("Slight Overpay"), Some(FeeGrade::SlightOverpay));
        assert_eq!(FeeGrade::SlightOverpay.as_str(), "Slight Overpay");
    }

    #[test]
    fn empty_baselines() {
        assert!(Baselines::default().is_empty());
        let b = Baselines {
            tip_per_cu_p50: Some(5000.0),
            ..Baselines::default()
        };
        assert!(!b.is_empty());
    }
}
