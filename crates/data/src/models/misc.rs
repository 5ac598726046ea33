//! Heartbeat, alert, and creator-intel record models.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HeartbeatRecord {
    pub worker_name: String,
    pub last_ok_at: DateTime<Utc>,
    pub backlog_count: i64,
}

/// A scored pair eligible for an execution-score alert.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AlertCandidateRow {
    pub copy_trade_id: i64,
    pub wallet_id: i64,
    pub creator_pubkey: Option<String>,
    pub execution_score: f64,
}

#[derive(Debug, Clone)]
pub struct NewAlert {
    pub wallet_id: i64,
    pub creator_pubkey: Option<String>,
    pub category: String,
    pub severity: String,
    pub reason: String,
    pub resolution_action: Option<String>,
    pub eval_snapshot: Option<JsonValue>,
}

/// Per-creator execution-score aggregate over the trailing window.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CreatorScoreAgg {
    pub creator_pubkey: String,
    pub exec_score_avg: Option<f64>,
    pub trade_count: i64,
}
