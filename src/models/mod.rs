// Persisted records owned by the store and the API response models built on them.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-chain indexing parameters, loaded once at the start of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub chain_id: String,
    pub start_block: Option<u64>,
    /// `None` means the chain is indexed indefinitely.
    pub end_block: Option<u64>,
    pub sleep_per_block: Duration,
    pub sleep_on_error: Duration,
}

/// A watched (contract address, method signature) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub chain_id: String,
    pub address: String,
    pub method_signature: String,
}

impl Target {
    /// Builds a target with address and signature lower-cased.
    pub fn new(chain_id: &str, address: &str, method_signature: &str) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            address: address.to_lowercase(),
            method_signature: method_signature.to_lowercase(),
        }
    }
}

/// Last fully indexed block of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub chain_id: String,
    pub block_number: u64,
    pub block_hash: String,
}

impl Checkpoint {
    /// The block to process when resuming from this checkpoint.
    pub fn next_block(&self) -> u64 {
        self.block_number + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedTransaction {
    pub chain_id: String,
    pub hash: String,
    pub block_number: u64,
    pub block_hash: String,
    pub from: String,
    pub to: String,
    pub input: String,
    /// Wei amount as a decimal string.
    pub value: String,
    /// Block time, `YYYY-MM-DD HH:MM:SS` in UTC.
    pub timestamp: String,
}

// API response models
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub data: Vec<IndexedTransaction>,
    pub meta: Meta,
}

#[derive(Debug, Serialize)]
pub struct Meta {
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}
