//! Copy-trade ledger repository.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::CopyTradeRecord;

const COLUMNS: &str = "id, wallet_id, token_mint, side, invested_amount, received_qty, \
     tx_signature, landed_slot, block_time, tip_lamports, cu_used, \
     cu_price_micro_lamports, route, ts";

/// Repository for copy-trade reads and enrichment writes.
#[derive(Debug, Clone)]
pub struct CopyTradeRepository {
    pool: PgPool,
}

impl CopyTradeRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Copy trades with no pair row yet, or whose pair is still unmatched,
    /// ordered by id ascending so every batch makes forward progress.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn fetch_unmatched(&self, limit: i64) -> Result<Vec<CopyTradeRecord>> {
        let records = sqlx::query_as::<_, CopyTradeRecord>(
            r"
            SELECT ct.id, ct.wallet_id, ct.token_mint, ct.side, ct.invested_amount,
                   ct.received_qty, ct.tx_signature, ct.landed_slot, ct.block_time,
                   ct.tip_lamports, ct.cu_used, ct.cu_price_micro_lamports, ct.route, ct.ts
            FROM copy_trades ct
            LEFT JOIN trade_pairs p ON p.copy_trade_id = ct.id
            WHERE p.copy_trade_id IS NULL OR p.source_trade_id IS NULL
            ORDER BY ct.id ASC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Trades carrying a transaction signature that have not been
    /// slot-enriched yet.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn fetch_needing_enrichment(&self, limit: i64) -> Result<Vec<(i64, String)>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            r"
            SELECT id, tx_signature
            FROM copy_trades
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

    /// Writes the chain-enrichment fields for one trade.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn apply_enrichment(
        &self,
        id: i64,
        landed_slot: i64,
        block_time: Option<DateTime<Utc>>,
        tip_lamports: Option<i64>,
        cu_used: Option<i64>,
        cu_price_micro_lamports: Option<f64>,
        route: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r"
            UPDATE copy_trades
            SET landed_slot = $2,
                block_time = $3,
                tip_lamports = COALESCE($4, tip_lamports),
                cu_used = COALESCE($5, cu_used),
                cu_price_micro_lamports = COALESCE($6, cu_price_micro_lamports),
                route = COALESCE($7, route)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(landed_slot)
        .bind(block_time)
        .bind(tip_lamports)
        .bind(cu_used)
        .bind(cu_price_micro_lamports)
        .bind(route)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a copy trade by id.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<CopyTradeRecord>> {
        let record = sqlx::query_as::<_, CopyTradeRecord>(&format!(
            "SELECT {COLUMNS} FROM copy_trades WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
