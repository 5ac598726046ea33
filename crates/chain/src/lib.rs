//! JSON-RPC lookups used by the normalizer to backfill landed slots,
//! block times, and fee details on trades that only carried a signature.

pub mod client;

pub use client::{ChainClient, ChainError, TxMeta};
