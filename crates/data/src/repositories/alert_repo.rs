//! Alert repository with dedup-aware candidate selection.

use anyhow::Result;
use sqlx::PgPool;

use crate::models::{AlertCandidateRow, NewAlert};

/// Repository for alert candidate scans and inserts.
#[derive(Debug, Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Scored pairs below the threshold whose wallet has not received an
    /// execution-score alert inside the dedup window.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn fetch_candidates(
        &self,
        category: &str,
        score_threshold: f64,
        dedup_hours: i64,
        limit: i64,
    ) -> Result<Vec<AlertCandidateRow>> {
        let rows = sqlx::query_as::<_, AlertCandidateRow>(
            r"
            SELECT p.copy_trade_id,
                   ct.wallet_id,
                   st.creator_pubkey,
                   p.execution_score
            FROM trade_pairs p
            JOIN copy_trades ct ON ct.id = p.copy_trade_id
            LEFT JOIN source_trades st ON st.id = p.source_trade_id
            WHERE p.execution_score IS NOT NULL
              AND p.execution_score < $2
              AND NOT EXISTS (
                  SELECT 1 FROM alerts a
                  WHERE a.wallet_id = ct.wallet_id
                    AND a.category = $1
                    AND a.created_at > now() - make_interval(hours => $3::int)
              )
            ORDER BY p.scored_at DESC
            LIMIT $4
            ",
        )
        .bind(category)
        .bind(score_threshold)
        .bind(dedup_hours)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts one alert row.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert(&self, alert: &NewAlert) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r"
            INSERT INTO alerts
                (wallet_id, creator_pubkey, category, severity, reason,
                 resolution_action, eval_snapshot)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(alert.wallet_id)
        .bind(&alert.creator_pubkey)
        .bind(&alert.category)
        .bind(&alert.severity)
        .bind(&alert.reason)
        .bind(&alert.resolution_action)
        .bind(&alert.eval_snapshot)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
