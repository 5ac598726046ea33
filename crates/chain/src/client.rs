use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use copytrace_core::ChainConfig;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

/// Base signature fee in lamports; anything above it is priority spend.
const BASE_FEE_LAMPORTS: i64 = 5_000;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(4);

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("rpc url is not configured")]
    MissingRpcUrl,
    #[error("rpc transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("malformed rpc response: {0}")]
    Malformed(String),
}

/// Confirmed-transaction metadata relevant to execution analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct TxMeta {
    pub slot: i64,
    pub block_time: Option<DateTime<Utc>>,
    pub tip_lamports: Option<i64>,
    pub cu_used: Option<i64>,
    pub cu_price_micro_lamports: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<RpcTransaction>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcTransaction {
    slot: i64,
    #[serde(rename = "blockTime")]
    block_time: Option<i64>,
    meta: Option<RpcTxMeta>,
}

#[derive(Debug, Deserialize)]
struct RpcTxMeta {
    fee: Option<i64>,
    #[serde(rename = "computeUnitsConsumed")]
    compute_units_consumed: Option<i64>,
}

/// Minimal `getTransaction` client with capped-exponential retry on
/// transport failures.
#[derive(Debug, Clone)]
pub struct ChainClient {
    http: Client,
    rpc_url: String,
    max_attempts: u32,
}

impl ChainClient {
    /// # Errors
    /// Returns `ChainError::MissingRpcUrl` when no RPC endpoint is
    /// configured, or a transport error if the client cannot be built.
    pub fn new(config: &ChainConfig) -> Result<Self, ChainError> {
        if config.rpc_url.is_empty() {
            return Err(ChainError::MissingRpcUrl);
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            rpc_url: config.rpc_url.clone(),
            max_attempts: config.max_attempts.max(1),
        })
    }

    /// Looks up a confirmed transaction. `Ok(None)` means the cluster does
    /// not know the signature (yet); transport errors retry before
    /// surfacing.
    ///
    /// # Errors
    /// Returns an error once every attempt has failed or the response is
    /// malformed.
    pub async fn get_transaction(&self, signature: &str) -> Result<Option<TxMeta>, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getTransaction",
            "params": [signature, {
                "encoding": "json",
                "commitment": "confirmed",
                "maxSupportedTransactionVersion": 0,
            }],
        });

        let mut delay = RETRY_BASE_DELAY;
        let mut last_error: Option<ChainError> = None;
        for attempt in 1..=self.max_attempts {
            match self.call(&body).await {
                Ok(meta) => return Ok(meta),
                Err(ChainError::Transport(error)) => {
                    debug!(%error, attempt, signature, "rpc attempt failed");
                    last_error = Some(ChainError::Transport(error));
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(RETRY_MAX_DELAY);
                }
                Err(other) => return Err(other),
            }
        }
        Err(last_error.unwrap_or(ChainError::Malformed("no attempts made".to_string())))
    }

    async fn call(&self, body: &serde_json::Value) -> Result<Option<TxMeta>, ChainError> {
        let response: RpcResponse = self
            .http
            .post(&self.rpc_url)
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(ChainError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        let Some(tx) = response.result else {
            return Ok(None);
        };

        Ok(Some(Self::into_meta(tx)))
    }

    fn into_meta(tx: RpcTransaction) -> TxMeta {
        let block_time = tx
            .block_time
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
        let fee = tx.meta.as_ref().and_then(|m| m.fee);
        let cu_used = tx.meta.as_ref().and_then(|m| m.compute_units_consumed);
        let tip_lamports = fee.map(|f| (f - BASE_FEE_LAMPORTS).max(0));
        let cu_price_micro_lamports = match (tip_lamports, cu_used) {
            (Some(tip), Some(cu)) if cu > 0 => Some(tip as f64 * 1_000_000.0 / cu as f64),
            _ => None,
        };
        TxMeta {
            slot: tx.slot,
            block_time,
            tip_lamports,
            cu_used,
            cu_price_micro_lamports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(fee: Option<i64>, cu: Option<i64>) -> RpcTransaction {
        RpcTransaction {
            slot: 250_000_123,
            block_time: Some(1_756_500_000),
            meta: Some(RpcTxMeta {
                fee,
                compute_units_consumed: cu,
            }),
        }
    }

    #[test]
    fn tip_is_fee_above_base() {
        let meta = ChainClient::into_meta(tx(Some(25_000), Some(200_000)));
        assert_eq!(meta.tip_lamports, Some(20_000));
        // 20_000 lamports over 200_000 CU = 0.1 lamport/CU = 100_000 µlam/CU.
        assert_eq!(meta.cu_price_micro_lamports, Some(100_000.0));
    }

    #[test]
    fn base_only_fee_means_zero_tip() {
        let meta = ChainClient::into_meta(tx(Some(5_000), Some(150_000)));
        assert_eq!(meta.tip_lamports, Some(0));
        assert_eq!(meta.cu_price_micro_lamports, Some(0.0));
    }

    #[test]
    fn missing_meta_leaves_fees_unset() {
        let meta = ChainClient::into_meta(RpcTransaction {
            slot: 1,
            block_time: None,
            meta: None,
        });
        assert_eq!(meta.tip_lamports, None);
        assert_eq!(meta.cu_used, None);
        assert_eq!(meta.cu_price_micro_lamports, None);
        assert_eq!(meta.block_time, None);
    }

    #[test]
    fn missing_rpc_url_is_rejected() {
        let config = ChainConfig {
            rpc_url: String::new(),
            timeout_secs: 5,
            max_attempts: 3,
        };
        assert!(matches!(
            ChainClient::new(&config),
            Err(ChainError::MissingRpcUrl)
        ));
    }
}
