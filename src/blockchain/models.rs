//! JSON-RPC shapes of EVM blocks, transactions and receipts, and the
//! conversion of a matched transaction into its stored form.

use crate::models::IndexedTransaction;
use alloy_primitives::U256;
use chrono::DateTime;
use serde::{Deserialize, Deserializer};

/// A block as returned by `eth_getBlockByNumber(n, true)`.
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    #[serde(deserialize_with = "deserialize_quantity")]
    pub number: u64,
    pub hash: String,
    #[serde(deserialize_with = "deserialize_quantity")]
    pub timestamp: u64,
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    pub hash: String,
    pub from: String,
    /// `None` for contract creation.
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub input: String,
    #[serde(default = "zero_quantity")]
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Failure,
    /// Pre-Byzantium receipts carry a state root instead of a status.
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Receipt {
    #[serde(default, deserialize_with = "deserialize_status")]
    pub status: Option<ReceiptStatus>,
}

impl Receipt {
    pub fn status(&self) -> ReceiptStatus {
        self.status.unwrap_or(ReceiptStatus::Unknown)
    }

    pub fn is_success(&self) -> bool {
        self.status() == ReceiptStatus::Success
    }
}

impl Block {
    /// Block time at second precision.
    pub fn formatted_timestamp(&self) -> String {
        format_block_time(self.timestamp)
    }
}

pub fn format_block_time(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Build the stored record for a transaction of `block`.
pub fn extract_transaction(chain_id: &str, block: &Block, tx: &RawTransaction) -> IndexedTransaction {
    IndexedTransaction {
        chain_id: chain_id.to_string(),
        hash: tx.hash.clone(),
        block_number: block.number,
        block_hash: block.hash.clone(),
        from: tx.from.clone(),
        to: tx.to.clone().unwrap_or_default(),
        input: tx.input.clone(),
        value: quantity_to_decimal(&tx.value),
        timestamp: block.formatted_timestamp(),
    }
}

/// Renders a hex quantity as a decimal string. Unparseable input is kept as-is.
pub fn quantity_to_decimal(quantity: &str) -> String {
    match quantity.parse::<U256>() {
        Ok(value) => value.to_string(),
        Err(_) => quantity.to_string(),
    }
}

pub fn parse_quantity(raw: &str) -> Option<u64> {
    let digits = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))?;
    if digits.is_empty() {
        return Some(0);
    }
    u64::from_str_radix(digits, 16).ok()
}

fn zero_quantity() -> String {
    "0x0".to_string()
}

fn deserialize_quantity<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_quantity(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid hex quantity: {}", raw)))
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<ReceiptStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.map(|s| match parse_quantity(&s) {
        Some(1) => ReceiptStatus::Success,
        Some(0) => ReceiptStatus::Failure,
        _ => ReceiptStatus::Unknown,
    }))
}
