//! Trade-pair repository: the join table every downstream stage reads.

use anyhow::Result;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::models::{NewPair, PairRecord, ScoreUpdate, ScoringRow};

/// Repository for pair upserts and score writes.
#[derive(Debug, Clone)]
pub struct PairRepository {
    pool: PgPool,
}

impl PairRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts a matched pair. A HIGH-confidence row is never replaced by
    /// a lower-confidence candidate, and `paired_at` only moves when the
    /// chosen source actually changes, so byte-identical re-runs leave the
    /// row untouched. Score columns reset whenever the source changes.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn upsert_matched(&self, pair: &NewPair) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO trade_pairs
                (copy_trade_id, source_trade_id, token_mint, side,
                 delta_slots_event, delta_ms_event, price_drift_pct,
                 confidence, diagnostics, paired_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now())
            ON CONFLICT (copy_trade_id) DO UPDATE SET
                source_trade_id   = EXCLUDED.source_trade_id,
                token_mint        = EXCLUDED.token_mint,
                side              = EXCLUDED.side,
                delta_slots_event = EXCLUDED.delta_slots_event,
                delta_ms_event    = EXCLUDED.delta_ms_event,
                price_drift_pct   = EXCLUDED.price_drift_pct,
                confidence        = EXCLUDED.confidence,
                diagnostics       = EXCLUDED.diagnostics,
                execution_score   = CASE
                    WHEN trade_pairs.source_trade_id IS DISTINCT FROM EXCLUDED.source_trade_id
                    THEN NULL ELSE trade_pairs.execution_score END,
                exec_status       = CASE
                    WHEN trade_pairs.source_trade_id IS DISTINCT FROM EXCLUDED.source_trade_id
                    THEN NULL ELSE trade_pairs.exec_status END,
                scored_at         = CASE
                    WHEN trade_pairs.source_trade_id IS DISTINCT FROM EXCLUDED.source_trade_id
                    THEN NULL ELSE trade_pairs.scored_at END,
                paired_at         = CASE
                    WHEN trade_pairs.source_trade_id IS DISTINCT FROM EXCLUDED.source_trade_id
                    THEN now() ELSE trade_pairs.paired_at END
            WHERE trade_pairs.confidence IS DISTINCT FROM 'HIGH'
               OR EXCLUDED.confidence = 'HIGH'
            ",
        )
        .bind(pair.copy_trade_id)
        .bind(pair.source_trade_id)
        .bind(&pair.token_mint)
        .bind(&pair.side)
        .bind(pair.delta_slots_event)
        .bind(pair.delta_ms_event)
        .bind(pair.price_drift_pct)
        .bind(pair.confidence.as_str())
        .bind(&pair.diagnostics)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Records that a copy trade has no source candidate yet. Only the
    /// diagnostics refresh on conflict; a row that has since matched is
    /// left alone.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn upsert_unmatched(
        &self,
        copy_trade_id: i64,
        token_mint: &str,
        side: &str,
        diagnostics: Option<&JsonValue>,
    ) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO trade_pairs (copy_trade_id, token_mint, side, diagnostics)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (copy_trade_id) DO UPDATE SET
                diagnostics = EXCLUDED.diagnostics
            WHERE trade_pairs.source_trade_id IS NULL
            ",
        )
        .bind(copy_trade_id)
        .bind(token_mint)
        .bind(side)
        .bind(diagnostics)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Matched pairs with no execution score, joined with both legs.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn fetch_unscored(&self, limit: i64) -> Result<Vec<ScoringRow>> {
        let rows = sqlx::query_as::<_, ScoringRow>(
            r"
            SELECT p.copy_trade_id,
                   p.delta_slots_event,
                   p.delta_ms_event,
                   p.price_drift_pct,
                   ct.landed_slot             AS copy_landed_slot,
                   ct.block_time              AS copy_block_time,
                   ct.tip_lamports,
                   ct.cu_used,
                   ct.cu_price_micro_lamports,
                   ct.route                   AS copy_route,
                   ct.invested_amount,
                   st.landed_slot             AS source_landed_slot,
                   st.block_time              AS source_block_time,
                   st.route                   AS source_route,
                   st.amount                  AS source_amount
            FROM trade_pairs p
            JOIN copy_trades ct ON ct.id = p.copy_trade_id
            JOIN source_trades st ON st.id = p.source_trade_id
            WHERE p.source_trade_id IS NOT NULL
              AND p.execution_score IS NULL
              AND (p.exec_status IS NULL OR p.exec_status <> 'FAILED')
            ORDER BY p.copy_trade_id ASC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Writes the score columns for one pair.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn apply_score(&self, update: &ScoreUpdate) -> Result<()> {
        sqlx::query(
            r"
            UPDATE trade_pairs
            SET execution_score = $2,
                exec_status     = $3,
                exec_timing     = $4,
                exec_financial  = $5,
                exec_cost       = $6,
                exec_congestion = $7,
                exec_missing    = $8,
                scored_at       = now()
            WHERE copy_trade_id = $1
            ",
        )
        .bind(update.copy_trade_id)
        .bind(update.execution_score)
        .bind(update.exec_status.as_str())
        .bind(update.exec_timing)
        .bind(update.exec_financial)
        .bind(update.exec_cost)
        .bind(update.exec_congestion)
        .bind(&update.exec_missing)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets the pair row for a copy trade.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get(&self, copy_trade_id: i64) -> Result<Option<PairRecord>> {
        let record = sqlx::query_as::<_, PairRecord>(
            r"
            SELECT copy_trade_id, source_trade_id, token_mint, side,
                   delta_slots_event, delta_ms_event, price_drift_pct,
                   confidence, execution_score, exec_status, exec_timing,
                   exec_financial, exec_cost, exec_congestion, exec_missing,
                   diagnostics, paired_at, scored_at
            FROM trade_pairs
            WHERE copy_trade_id = $1
            ",
        )
        .bind(copy_trade_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
