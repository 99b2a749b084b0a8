//! Store seams consumed by the chain indexer and their SQLite implementation.

use crate::db::{checkpoint, target, transaction};
use crate::models::{Checkpoint, IndexedTransaction, Target};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn get_checkpoint(&self, chain_id: &str) -> Result<Option<Checkpoint>, sqlx::Error>;

    /// Must be atomic per chain and never lower a stored checkpoint.
    async fn upsert_checkpoint(
        &self,
        chain_id: &str,
        block_number: u64,
        block_hash: &str,
    ) -> Result<(), sqlx::Error>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Keyed on `(chain_id, hash)`; repeating a call leaves one row.
    async fn upsert_transaction(&self, tx: &IndexedTransaction) -> Result<(), sqlx::Error>;

    async fn upsert_transactions(&self, txs: &[IndexedTransaction]) -> Result<(), sqlx::Error> {
        for tx in txs {
            self.upsert_transaction(tx).await?;
        }
        Ok(())
    }
}

#[async_trait]
pub trait TargetStore: Send + Sync {
    async fn get_targets(&self, chain_id: &str) -> Result<Vec<Target>, sqlx::Error>;
}

/// Everything a chain indexer reads and writes.
pub trait IndexStore: CheckpointStore + TransactionStore + TargetStore {}

impl<T: CheckpointStore + TransactionStore + TargetStore> IndexStore for T {}

/// Store handle backed by its own SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CheckpointStore for SqliteStore {
    async fn get_checkpoint(&self, chain_id: &str) -> Result<Option<Checkpoint>, sqlx::Error> {
        checkpoint::get_checkpoint(&self.pool, chain_id).await
    }

    async fn upsert_checkpoint(
        &self,
        chain_id: &str,
        block_number: u64,
        block_hash: &str,
    ) -> Result<(), sqlx::Error> {
        checkpoint::upsert_checkpoint(&self.pool, chain_id, block_number, block_hash).await
    }
}

#[async_trait]
impl TransactionStore for SqliteStore {
    async fn upsert_transaction(&self, tx: &IndexedTransaction) -> Result<(), sqlx::Error> {
        transaction::upsert_transaction(&self.pool, tx).await
    }

    async fn upsert_transactions(&self, txs: &[IndexedTransaction]) -> Result<(), sqlx::Error> {
        transaction::upsert_transactions(&self.pool, txs).await
    }
}

#[async_trait]
impl TargetStore for SqliteStore {
    async fn get_targets(&self, chain_id: &str) -> Result<Vec<Target>, sqlx::Error> {
        target::get_targets(&self.pool, chain_id).await
    }
}
