use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub chain: ChainConfig,
    pub orchestrator: OrchestratorConfig,
    pub pairing: PairingConfig,
    pub ladder: LadderConfig,
    pub scoring: ScoringConfig,
    pub alerts: AlertsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/copytrace".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            timeout_secs: 20,
            max_attempts: 4,
        }
    }
}

/// Per-worker toggles, batch sizes, and the tick interval for the
/// sequential worker loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub tick_interval_ms: u64,
    pub normalizer_enabled: bool,
    pub pairing_enabled: bool,
    pub ladder_enabled: bool,
    pub scoring_enabled: bool,
    pub creator_intel_enabled: bool,
    pub alerts_enabled: bool,
    pub normalizer_batch: i64,
    pub pairing_batch: i64,
    pub ladder_batch: i64,
    pub scoring_batch: i64,
    pub creator_intel_batch: i64,
    pub alerts_batch: i64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
            normalizer_enabled: true,
            pairing_enabled: true,
            ladder_enabled: true,
            scoring_enabled: true,
            creator_intel_enabled: true,
            alerts_enabled: true,
            normalizer_batch: 50,
            pairing_batch: 300,
            ladder_batch: 200,
            scoring_batch: 300,
            creator_intel_batch: 200,
            alerts_batch: 100,
        }
    }
}

/// Candidate search window for the stream join. The two fields express the
/// same bound on two axes: slots when the copy trade's landed slot is known,
/// milliseconds against event timestamps when it is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    pub window_slots: i64,
    pub window_ms: i64,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            window_slots: 50,
            window_ms: 90_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    pub window_slots: i64,
}

impl LadderConfig {
    pub const MIN_WINDOW: i64 = 2;
    pub const MAX_WINDOW: i64 = 32;

    /// Window clamped to the supported range.
    #[must_use]
    pub fn clamped_window(&self) -> i64 {
        self.window_slots.clamp(Self::MIN_WINDOW, Self::MAX_WINDOW)
    }
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self { window_slots: 8 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub baseline_ttl_secs: u64,
    pub baseline_sample: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            baseline_ttl_secs: 10,
            baseline_sample: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub score_threshold: f64,
    pub dedup_hours: i64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            score_threshold: 60.0,
            dedup_hours: 24,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.pairing.window_slots, 50);
        assert_eq!(cfg.pairing.window_ms, 90_000);
        assert_eq!(cfg.ladder.window_slots, 8);
        assert_eq!(cfg.scoring.baseline_ttl_secs, 10);
        assert_eq!(cfg.scoring.baseline_sample, 500);
        assert!((cfg.alerts.score_threshold - 60.0).abs() < f64::EPSILON);
        assert_eq!(cfg.orchestrator.tick_interval_ms, 2000);
    }

    #[test]
    fn ladder_window_is_clamped() {
        let mut ladder = LadderConfig { window_slots: 1 };
        assert_eq!(ladder.clamped_window(), 2);
        ladder.window_slots = 64;
        assert_eq!(ladder.clamped_window(), 32);
        ladder.window_slots = 8;
        assert_eq!(ladder.clamped_window(), 8);
    }
}
