//! Fakes and fixtures shared by the test modules.

use crate::blockchain::client::{ChainClient, ClientError};
use crate::blockchain::models::{Block, RawTransaction, Receipt, ReceiptStatus};
use crate::db::{connection, CheckpointStore, SqliteStore, TargetStore, TransactionStore};
use crate::models::{Chain, Checkpoint, IndexedTransaction, Target};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TARGET_ADDRESS: &str = "0xabc";
pub const TARGET_SIGNATURE: &str = "0x1234";

pub async fn memory_store() -> SqliteStore {
    SqliteStore::new(connection::in_memory().await.expect("Failed to open in-memory database"))
}

pub fn test_chain(chain_id: &str, start_block: Option<u64>, end_block: Option<u64>) -> Chain {
    Chain {
        chain_id: chain_id.to_string(),
        start_block,
        end_block,
        sleep_per_block: Duration::from_millis(1),
        sleep_on_error: Duration::from_millis(1),
    }
}

pub fn raw_tx(hash: &str, to: Option<&str>, input: &str) -> RawTransaction {
    RawTransaction {
        hash: hash.to_string(),
        from: "0x00000000000000000000000000000000000000f1".to_string(),
        to: to.map(str::to_string),
        input: input.to_string(),
        value: "0xde0b6b3a7640000".to_string(),
    }
}

pub fn block(number: u64, transactions: Vec<RawTransaction>) -> Block {
    Block {
        number,
        hash: format!("0xblock{}", number),
        timestamp: 1_700_000_000 + number,
        transactions,
    }
}

/// A block with one transaction to the watched target.
pub fn matching_block(number: u64) -> Block {
    block(
        number,
        vec![raw_tx(&format!("0xtx{}", number), Some("0xABC"), "0x1234deadbeef")],
    )
}

#[derive(Default)]
struct FakeChainInner {
    blocks: Mutex<HashMap<u64, Block>>,
    receipts: Mutex<HashMap<String, ReceiptStatus>>,
    block_failures: Mutex<HashMap<u64, usize>>,
    block_calls: Mutex<Vec<u64>>,
    receipt_calls: Mutex<Vec<String>>,
}

/// In-memory chain. Blocks that were never added answer `BlockNotFound`;
/// receipts default to success.
#[derive(Clone, Default)]
pub struct FakeChainClient {
    inner: Arc<FakeChainInner>,
}

impl FakeChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let client = Self::new();
        for block in blocks {
            client.add_block(block);
        }
        client
    }

    pub fn add_block(&self, block: Block) {
        self.inner.blocks.lock().unwrap().insert(block.number, block);
    }

    pub fn set_receipt(&self, tx_hash: &str, status: ReceiptStatus) {
        self.inner
            .receipts
            .lock()
            .unwrap()
            .insert(tx_hash.to_string(), status);
    }

    /// The next `times` fetches of `number` fail with a transport-style error.
    pub fn fail_block(&self, number: u64, times: usize) {
        self.inner.block_failures.lock().unwrap().insert(number, times);
    }

    pub fn block_calls(&self) -> Vec<u64> {
        self.inner.block_calls.lock().unwrap().clone()
    }

    pub fn receipt_calls(&self) -> Vec<String> {
        self.inner.receipt_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainClient for FakeChainClient {
    async fn get_block(&self, number: u64) -> Result<Block, ClientError> {
        self.inner.block_calls.lock().unwrap().push(number);

        {
            let mut failures = self.inner.block_failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&number) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ClientError::InvalidResponse("connection reset".to_string()));
                }
            }
        }

        self.inner
            .blocks
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .ok_or(ClientError::BlockNotFound(number))
    }

    async fn get_receipt(&self, tx_hash: &str) -> Result<Receipt, ClientError> {
        self.inner.receipt_calls.lock().unwrap().push(tx_hash.to_string());

        let status = self
            .inner
            .receipts
            .lock()
            .unwrap()
            .get(tx_hash)
            .copied()
            .unwrap_or(ReceiptStatus::Success);

        Ok(Receipt { status: Some(status) })
    }
}

/// Wraps a `SqliteStore` and fails a configurable number of writes.
#[derive(Clone)]
pub struct FlakyStore {
    inner: SqliteStore,
    transaction_failures: Arc<AtomicUsize>,
    checkpoint_failures: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            transaction_failures: Arc::new(AtomicUsize::new(0)),
            checkpoint_failures: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fail_transaction_writes(&self, times: usize) {
        self.transaction_failures.store(times, Ordering::SeqCst);
    }

    pub fn fail_checkpoint_writes(&self, times: usize) {
        self.checkpoint_failures.store(times, Ordering::SeqCst);
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl CheckpointStore for FlakyStore {
    async fn get_checkpoint(&self, chain_id: &str) -> Result<Option<Checkpoint>, sqlx::Error> {
        self.inner.get_checkpoint(chain_id).await
    }

    async fn upsert_checkpoint(
        &self,
        chain_id: &str,
        block_number: u64,
        block_hash: &str,
    ) -> Result<(), sqlx::Error> {
        if Self::take_failure(&self.checkpoint_failures) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        self.inner.upsert_checkpoint(chain_id, block_number, block_hash).await
    }
}

#[async_trait]
impl TransactionStore for FlakyStore {
    async fn upsert_transaction(&self, tx: &IndexedTransaction) -> Result<(), sqlx::Error> {
        self.inner.upsert_transaction(tx).await
    }

    async fn upsert_transactions(&self, txs: &[IndexedTransaction]) -> Result<(), sqlx::Error> {
        if Self::take_failure(&self.transaction_failures) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        self.inner.upsert_transactions(txs).await
    }
}

#[async_trait]
impl TargetStore for FlakyStore {
    async fn get_targets(&self, chain_id: &str) -> Result<Vec<Target>, sqlx::Error> {
        self.inner.get_targets(chain_id).await
    }
}
