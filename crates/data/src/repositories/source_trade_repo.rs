//! Source-trade ledger repository.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::SourceTradeRecord;

const COLUMNS: &str = "id, creator_pubkey, token_mint, side, event_ts, event_slot, \
     landed_slot, block_time, tx_signature, price, amount, tip_lamports, cu_used, \
     cu_price_micro_lamports, route";

/// Repository for source-trade reads and enrichment writes.
#[derive(Debug, Clone)]
pub struct SourceTradeRepository {
    pool: PgPool,
}

impl SourceTradeRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The single nearest source trade for (token, side) by absolute slot
    /// distance inside the window. Equal distances break toward the lower
    /// id so re-runs pick the same candidate.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn nearest_in_slot_window(
        &self,
        token_mint: &str,
        side: &str,
        landed_slot: i64,
        window_slots: i64,
    ) -> Result<Option<SourceTradeRecord>> {
        let record = sqlx::query_as::<_, SourceTradeRecord>(&format!(
            r"
            SELECT {COLUMNS}
            FROM source_trades
            WHERE token_mint = $1
              AND side = $2
              AND event_slot IS NOT NULL
              AND abs(event_slot - $3) <= $4
            ORDER BY abs(event_slot - $3) ASC, id ASC
            LIMIT 1
            "
        ))
        .bind(token_mint)
        .bind(side)
        .bind(landed_slot)
        .bind(window_slots)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Millisecond-axis fallback for copy trades whose landed slot has not
    /// been enriched yet: nearest by event timestamp inside the window.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn nearest_in_time_window(
        &self,
        token_mint: &str,
        side: &str,
        timestamp: DateTime<Utc>,
        window_ms: i64,
    ) -> Result<Option<SourceTradeRecord>> {
        let record = sqlx::query_as::<_, SourceTradeRecord>(&format!(
            r"
            SELECT {COLUMNS}
            FROM source_trades
            WHERE token_mint = $1
              AND side = $2
              AND abs(extract(epoch FROM (event_ts - $3)) * 1000) <= $4
            ORDER BY abs(extract(epoch FROM (event_ts - $3))) ASC, id ASC
            LIMIT 1
            "
        ))
        .bind(token_mint)
        .bind(side)
        .bind(timestamp)
        .bind(window_ms as f64)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Gets a source trade by id.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<SourceTradeRecord>> {
        let record = sqlx::query_as::<_, SourceTradeRecord>(&format!(
            "SELECT {COLUMNS} FROM source_trades WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Trades with a signature but no landed slot yet.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn fetch_needing_enrichment(&self, limit: i64) -> Result<Vec<(i64, String)>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            r"
            SELECT id, tx_signature
            FROM source_trades
            WHERE tx_signature IS NOT NULL AND landed_slot IS NULL
            ORDER BY id ASC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Writes landed slot and block time for one trade.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn apply_enrichment(
        &self,
        id: i64,
        landed_slot: i64,
        block_time: Option<DateTime<Utc>>,
    ) -> Result<()> {
        sqlx::query(
            r"
            UPDATE source_trades
            SET landed_slot = $2,
                block_time = $3,
                event_slot = COALESCE(event_slot, $2)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(landed_slot)
        .bind(block_time)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
