//! Ladder snapshot repository.

use anyhow::Result;
use sqlx::PgPool;

use crate::models::{LadderCandidateRow, NeighborRow, NewLadderSnapshot};

/// Repository for ladder snapshot candidates, neighbor scans, and writes.
#[derive(Debug, Clone)]
pub struct LadderRepository {
    pool: PgPool,
}

impl LadderRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Matched pairs without a snapshot yet, with the slots and own fees
    /// the builder needs. Pairs whose copy slot is still unenriched are
    /// excluded so they cannot occupy the batch without ever producing a
    /// snapshot; pairs with no event slot stay in, since those get a
    /// degraded snapshot and leave the set.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn fetch_candidates(&self, limit: i64) -> Result<Vec<LadderCandidateRow>> {
        let rows = sqlx::query_as::<_, LadderCandidateRow>(
            r"
            SELECT p.copy_trade_id AS pair_id,
                   st.event_slot,
                   ct.landed_slot  AS copy_landed_slot,
                   ct.tip_lamports,
                   ct.cu_price_micro_lamports
            FROM trade_pairs p
            JOIN copy_trades ct ON ct.id = p.copy_trade_id
            LEFT JOIN source_trades st ON st.id = p.source_trade_id
            LEFT JOIN ladder_snapshots ls ON ls.pair_id = p.copy_trade_id
            WHERE p.source_trade_id IS NOT NULL
              AND ls.pair_id IS NULL
              AND (st.event_slot IS NULL OR ct.landed_slot IS NOT NULL)
            ORDER BY p.copy_trade_id ASC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Other copy executions that landed within `window` slots of
    /// `event_slot`, relative-positioned against it. The trade under
    /// inspection is excluded from its own crowd.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn fetch_neighbors(
        &self,
        copy_trade_id: i64,
        event_slot: i64,
        window: i64,
    ) -> Result<Vec<NeighborRow>> {
        let rows = sqlx::query_as::<_, NeighborRow>(
            r"
            SELECT ct.landed_slot - $2 AS relative_slot,
                   p.source_trade_id,
                   ct.tip_lamports,
                   ct.cu_price_micro_lamports
            FROM copy_trades ct
            LEFT JOIN trade_pairs p ON p.copy_trade_id = ct.id
            WHERE ct.id <> $1
              AND ct.landed_slot IS NOT NULL
              AND ct.landed_slot BETWEEN $2 - $3 AND $2 + $3
            ORDER BY ct.landed_slot ASC, ct.id ASC
            ",
        )
        .bind(copy_trade_id)
        .bind(event_slot)
        .bind(window)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Writes one snapshot; a snapshot is immutable once present.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert_snapshot(&self, snap: &NewLadderSnapshot) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO ladder_snapshots
                (pair_id, event_slot, copy_landed_slot, delta_slots,
                 crowd_ahead, crowd_at_event, crowd_behind,
                 tip_p50, tip_p66, tip_p90, cu_p50, cu_p66, cu_p90,
                 tip_grade, cu_grade, hist, badges, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18)
            ON CONFLICT (pair_id) DO NOTHING
            ",
        )
        .bind(snap.pair_id)
        .bind(snap.event_slot)
        .bind(snap.copy_landed_slot)
        .bind(snap.delta_slots)
        .bind(snap.crowd_ahead)
        .bind(snap.crowd_at_event)
        .bind(snap.crowd_behind)
        .bind(snap.tip_p50)
        .bind(snap.tip_p66)
        .bind(snap.tip_p90)
        .bind(snap.cu_p50)
        .bind(snap.cu_p66)
        .bind(snap.cu_p90)
        .bind(&snap.tip_grade)
        .bind(&snap.cu_grade)
        .bind(&snap.hist)
        .bind(&snap.badges)
        .bind(&snap.status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
