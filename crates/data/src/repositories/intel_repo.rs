//! Creator intel repository: trailing-window score aggregates per creator.

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::CreatorScoreAgg;

/// Repository for creator execution aggregates and daily rollup writes.
#[derive(Debug, Clone)]
pub struct CreatorIntelRepository {
    pool: PgPool,
}

impl CreatorIntelRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Average execution score and trade count per creator over the last
    /// `window_days` of scored pairs.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn aggregate_scores(
        &self,
        window_days: i64,
        limit: i64,
    ) -> Result<Vec<CreatorScoreAgg>> {
        let rows = sqlx::query_as::<_, CreatorScoreAgg>(
            r"
            SELECT st.creator_pubkey,
                   AVG(p.execution_score) AS exec_score_avg,
                   COUNT(*)               AS trade_count
            FROM trade_pairs p
            JOIN source_trades st ON st.id = p.source_trade_id
            WHERE p.execution_score IS NOT NULL
              AND p.scored_at > now() - make_interval(days => $1::int)
            GROUP BY st.creator_pubkey
            ORDER BY st.creator_pubkey
            LIMIT $2
            ",
        )
        .bind(window_days)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Upserts one creator's daily rollup.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn upsert_daily(
        &self,
        creator_pubkey: &str,
        day: NaiveDate,
        exec_score_avg: Option<f64>,
        trade_count: i64,
    ) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO creator_intel_daily (creator_pubkey, day, exec_score_avg, trade_count)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (creator_pubkey, day) DO UPDATE SET
                exec_score_avg = EXCLUDED.exec_score_avg,
                trade_count    = EXCLUDED.trade_count
            ",
        )
        .bind(creator_pubkey)
        .bind(day)
        .bind(exec_score_avg)
        .bind(trade_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
