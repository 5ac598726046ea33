//! Baseline percentile repository.

use anyhow::Result;
use copytrace_core::Baselines;
use sqlx::PgPool;

/// Repository computing baseline percentiles over the most recent scored
/// pairs.
#[derive(Debug, Clone)]
pub struct BaselineRepository {
    pool: PgPool,
}

impl BaselineRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Percentiles over the `sample` most recently scored pairs. Every
    /// field is independently nullable: a cold database returns an empty
    /// snapshot rather than an error.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn compute(&self, sample: i64) -> Result<Baselines> {
        let row: (
            Option<f64>,
            Option<f64>,
            Option<f64>,
            Option<f64>,
            Option<f64>,
            Option<f64>,
        ) = sqlx::query_as(
            r"
            WITH recent AS (
                SELECT p.delta_slots_event,
                       p.delta_ms_event,
                       p.price_drift_pct,
                       ct.landed_slot - st.landed_slot AS delta_slots_landed,
                       ct.tip_lamports::float8 / GREATEST(ct.cu_used, 1) AS tip_per_cu,
                       ct.cu_price_micro_lamports
                FROM trade_pairs p
                JOIN copy_trades ct ON ct.id = p.copy_trade_id
                LEFT JOIN source_trades st ON st.id = p.source_trade_id
                WHERE p.execution_score IS NOT NULL
                ORDER BY p.paired_at DESC
                LIMIT $1
            )
            SELECT
                (percentile_disc(0.50) WITHIN GROUP (ORDER BY tip_per_cu))::float8,
                (percentile_disc(0.50) WITHIN GROUP (ORDER BY cu_price_micro_lamports))::float8,
                (percentile_disc(0.95) WITHIN GROUP (ORDER BY delta_slots_landed))::float8,
                (percentile_disc(0.50) WITHIN GROUP (ORDER BY delta_ms_event))::float8,
                (percentile_disc(0.95) WITHIN GROUP (ORDER BY delta_ms_event))::float8,
                (percentile_disc(0.50) WITHIN GROUP (ORDER BY abs(price_drift_pct)))::float8
            FROM recent
            ",
        )
        .bind(sample)
        .fetch_one(&self.pool)
        .await?;

        Ok(Baselines {
            tip_per_cu_p50: row.0,
            cu_price_p50: row.1,
            delta_slots_landed_p95: row.2,
            delta_ms_event_p50: row.3,
            delta_ms_event_p95: row.4,
            price_drift_p50: row.5,
        })
    }
}
