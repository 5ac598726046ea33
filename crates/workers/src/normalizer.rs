//! Normalizer worker: backfills landed slots and fee metadata from the
//! chain for trades that arrived with only a signature.

use anyhow::Result;
use async_trait::async_trait;
use copytrace_chain::ChainClient;
use copytrace_core::Worker;
use copytrace_data::{CopyTradeRepository, SourceTradeRepository};
use tracing::{debug, warn};

/// Enriches both ledgers. A signature the cluster does not know yet is
/// skipped and picked up on a later tick.
pub struct NormalizerWorker {
    copy_trades: CopyTradeRepository,
    source_trades: SourceTradeRepository,
    chain: ChainClient,
    batch: i64,
}

impl NormalizerWorker {
    #[must_use]
    pub fn new(
        copy_trades: CopyTradeRepository,
        source_trades: SourceTradeRepository,
        chain: ChainClient,
        batch: i64,
    ) -> Self {
        Self {
            copy_trades,
            source_trades,
            chain,
            batch,
        }
    }

    async fn enrich_copy_trades(&self) -> Result<usize> {
        let pending = self.copy_trades.fetch_needing_enrichment(self.batch).await?;
        let seen = pending.len();
        for (id, signature) in &pending {
            match self.chain.get_transaction(signature).await {
                Ok(Some(meta)) => {
                    let written = self
                        .copy_trades
                        .apply_enrichment(
                            *id,
                            meta.slot,
                            meta.block_time,
                            meta.tip_lamports,
                            meta.cu_used,
                            meta.cu_price_micro_lamports,
                            None,
                        )
                        .await;
                    if let Err(error) = written {
                        warn!(copy_trade_id = id, %error, "enrichment write failed");
                    }
                }
                Ok(None) => debug!(copy_trade_id = id, "transaction not confirmed yet"),
                Err(error) => {
                    warn!(copy_trade_id = id, %error, "copy trade enrichment failed");
                }
            }
        }
        Ok(seen)
    }

    async fn enrich_source_trades(&self) -> Result<usize> {
        let pending = self
            .source_trades
            .fetch_needing_enrichment(self.batch)
            .await?;
        let seen = pending.len();
        for (id, signature) in &pending {
            match self.chain.get_transaction(signature).await {
                Ok(Some(meta)) => {
                    let written = self
                        .source_trades
                        .apply_enrichment(*id, meta.slot, meta.block_time)
                        .await;
                    if let Err(error) = written {
                        warn!(source_trade_id = id, %error, "enrichment write failed");
                    }
                }
                Ok(None) => debug!(source_trade_id = id, "transaction not confirmed yet"),
                Err(error) => {
                    warn!(source_trade_id = id, %error, "source trade enrichment failed");
                }
            }
        }
        Ok(seen)
    }
}

#[async_trait]
impl Worker for NormalizerWorker {
    fn name(&self) -> &'static str {
        "normalizer"
    }

    async fn run_once(&self) -> Result<usize> {
        let copies = self.enrich_copy_trades().await?;
        // The copy pass already ran; report its progress even when the
        // source-side batch query fails.
        match self.enrich_source_trades().await {
            Ok(sources) => Ok(copies + sources),
            Err(error) => {
                warn!(%error, "source enrichment batch failed");
                Ok(copies)
            }
        }
    }
}
