//! Alerts worker: raises execution-quality alerts for scored pairs.

use anyhow::Result;
use async_trait::async_trait;
use copytrace_core::{AlertsConfig, Worker};
use copytrace_data::{AlertRepository, NewAlert};
use serde_json::json;
use tracing::{info, warn};

pub const CATEGORY_EXECUTION_SCORE: &str = "EXECUTION_SCORE";

pub const SEVERITY_CRITICAL: &str = "CRITICAL";
pub const SEVERITY_HIGH: &str = "HIGH";
pub const SEVERITY_MEDIUM: &str = "MEDIUM";
pub const SEVERITY_LOW: &str = "LOW";

/// Severity tier for an execution score already below the alert
/// threshold.
#[must_use]
pub fn severity_for(score: f64) -> &'static str {
    if score < 20.0 {
        SEVERITY_CRITICAL
    } else if score < 40.0 {
        SEVERITY_HIGH
    } else if score < 60.0 {
        SEVERITY_MEDIUM
    } else {
        SEVERITY_LOW
    }
}

/// Scans scored pairs below the configured threshold and raises at most
/// one alert per wallet per dedup window.
pub struct AlertsWorker {
    repo: AlertRepository,
    config: AlertsConfig,
    batch: i64,
}

impl AlertsWorker {
    #[must_use]
    pub fn new(repo: AlertRepository, config: AlertsConfig, batch: i64) -> Self {
        Self {
            repo,
            config,
            batch,
        }
    }
}

#[async_trait]
impl Worker for AlertsWorker {
    fn name(&self) -> &'static str {
        "alerts"
    }

    async fn run_once(&self) -> Result<usize> {
        let candidates = self
            .repo
            .fetch_candidates(
                CATEGORY_EXECUTION_SCORE,
                self.config.score_threshold,
                self.config.dedup_hours,
                self.batch,
            )
            .await?;
        let seen = candidates.len();

        for candidate in &candidates {
            let severity = severity_for(candidate.execution_score);
            let alert = NewAlert {
                wallet_id: candidate.wallet_id,
                creator_pubkey: candidate.creator_pubkey.clone(),
                category: CATEGORY_EXECUTION_SCORE.to_string(),
                severity: severity.to_string(),
                reason: format!(
                    "execution score {:.2} below threshold {:.0}",
                    candidate.execution_score, self.config.score_threshold
                ),
                resolution_action: Some(
                    "review the wallet's tip settings and recent creator fills".to_string(),
                ),
                eval_snapshot: Some(json!({
                    "copy_trade_id": candidate.copy_trade_id,
                    "execution_score": candidate.execution_score,
                    "threshold": self.config.score_threshold,
                })),
            };
            match self.repo.insert(&alert).await {
                Ok(id) => info!(
                    alert_id = id,
                    wallet_id = candidate.wallet_id,
                    severity,
                    "alert raised"
                ),
                Err(error) => {
                    warn!(wallet_id = candidate.wallet_id, %error, "alert insert failed");
                }
            }
        }
        Ok(seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_tiers() {
        assert_eq!(severity_for(5.0), SEVERITY_CRITICAL);
        assert_eq!(severity_for(19.99), SEVERITY_CRITICAL);
        assert_eq!(severity_for(20.0), SEVERITY_HIGH);
        assert_eq!(severity_for(39.99), SEVERITY_HIGH);
        assert_eq!(severity_for(40.0), SEVERITY_MEDIUM);
        assert_eq!(severity_for(59.99), SEVERITY_MEDIUM);
        assert_eq!(severity_for(60.0), SEVERITY_LOW);
    }
}
