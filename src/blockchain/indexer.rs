//! Per-chain indexing loop.
//!
//! A `ChainIndexer` walks one chain block by block from its checkpoint. Each
//! block is handled as a unit: fetch, filter, receipt check, transaction
//! upsert, then checkpoint upsert. Only after all of that succeeds does the
//! cursor move; any failure sleeps `sleep_on_error` and retries the same block.

use crate::blockchain::client::{ChainClient, ClientError};
use crate::blockchain::filter;
use crate::blockchain::models::extract_transaction;
use crate::db::IndexStore;
use crate::models::{Chain, Target};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexerState {
    Initializing,
    Running,
    Stopped,
    FailedFatal,
}

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Chain not found for id {0}")]
    ChainNotFound(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl IndexerError {
    /// Short label used in structured log records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChainNotFound(_) => "chain_not_found",
            Self::Client(ClientError::BlockNotFound(_)) => "block_not_found",
            Self::Client(ClientError::ReceiptNotFound(_)) => "receipt_not_found",
            Self::Client(ClientError::InvalidResponse(_)) => "invalid_response",
            Self::Client(_) => "rpc",
            Self::Store(_) => "store",
        }
    }
}

/// How a run ended without a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexerExit {
    /// The cursor passed `end_block`.
    Stopped { chain: String },
    /// The shutdown token fired.
    Cancelled { chain: String },
}

impl fmt::Display for IndexerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped { chain } => write!(f, "{} indexing stopped", chain),
            Self::Cancelled { chain } => write!(f, "{} indexing cancelled", chain),
        }
    }
}

/// Result of one fully indexed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockOutcome {
    pub block_number: u64,
    pub block_hash: String,
    pub indexed: usize,
    pub skipped_failed: usize,
}

pub struct ChainIndexer<C, S> {
    chain: Chain,
    name: String,
    client: C,
    store: S,
    targets: Vec<Target>,
    current_block: u64,
    state: IndexerState,
    shutdown: CancellationToken,
    notifier: Option<mpsc::UnboundedSender<String>>,
}

impl<C: ChainClient, S: IndexStore> ChainIndexer<C, S> {
    pub fn new(chain: Chain, name: impl Into<String>, client: C, store: S) -> Self {
        let current_block = chain.start_block.unwrap_or(0);
        Self {
            chain,
            name: name.into(),
            client,
            store,
            targets: Vec::new(),
            current_block,
            state: IndexerState::Initializing,
            shutdown: CancellationToken::new(),
            notifier: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Human-readable status lines are also sent here.
    pub fn with_notifier(mut self, notifier: mpsc::UnboundedSender<String>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn state(&self) -> IndexerState {
        self.state
    }

    pub fn current_block(&self) -> u64 {
        self.current_block
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Reads the checkpoint and watch list. On success the indexer is `Running`.
    pub async fn initialize(&mut self) -> Result<(), IndexerError> {
        let chain_id = self.chain.chain_id.clone();

        match self.load_setup(&chain_id).await {
            Ok(()) => {
                self.state = IndexerState::Running;
                info!(
                    chain_id = %chain_id,
                    block = self.current_block,
                    targets = self.targets.len(),
                    "{} indexer ready",
                    self.name
                );
                Ok(())
            }
            Err(e) => {
                self.state = IndexerState::FailedFatal;
                error!(chain_id = %chain_id, kind = e.kind(), error = %e, "{} indexer setup failed", self.name);
                Err(e)
            }
        }
    }

    async fn load_setup(&mut self, chain_id: &str) -> Result<(), IndexerError> {
        if let Some(checkpoint) = self.store.get_checkpoint(chain_id).await? {
            debug!(chain_id = %chain_id, block = checkpoint.block_number, "Resuming from checkpoint");
            self.current_block = checkpoint.next_block();
        }

        self.targets = self.store.get_targets(chain_id).await?;
        if self.targets.is_empty() {
            warn!(chain_id = %chain_id, "No targets configured");
            self.notify(format!("{} target contract not found", self.name));
        }

        Ok(())
    }

    /// Runs until `end_block` is passed or the shutdown token fires. In-loop
    /// failures are never returned; only setup can fail.
    pub async fn run(mut self) -> Result<IndexerExit, IndexerError> {
        if self.state == IndexerState::Initializing {
            self.initialize().await?;
        }

        let chain_id = self.chain.chain_id.clone();

        loop {
            if self.shutdown.is_cancelled() {
                return Ok(self.finish(IndexerExit::Cancelled { chain: self.name.clone() }));
            }

            if let Some(end_block) = self.chain.end_block {
                if self.current_block > end_block {
                    return Ok(self.finish(IndexerExit::Stopped { chain: self.name.clone() }));
                }
            }

            let block = self.current_block;
            let delay = match self.index_block(block).await {
                Ok(outcome) => {
                    if outcome.indexed > 0 {
                        info!(
                            chain_id = %chain_id,
                            block = block,
                            indexed = outcome.indexed,
                            "Indexed block"
                        );
                    } else {
                        debug!(chain_id = %chain_id, block = block, "Indexed block");
                    }
                    self.current_block = block + 1;
                    self.chain.sleep_per_block
                }
                Err(e @ IndexerError::Client(ClientError::BlockNotFound(_))) => {
                    debug!(
                        chain_id = %chain_id,
                        block = block,
                        kind = e.kind(),
                        "Block not available yet"
                    );
                    self.chain.sleep_on_error
                }
                Err(e) => {
                    error!(
                        chain_id = %chain_id,
                        block = block,
                        kind = e.kind(),
                        error = %e,
                        "Failed to index block, retrying"
                    );
                    self.chain.sleep_on_error
                }
            };

            if !self.pause(delay).await {
                return Ok(self.finish(IndexerExit::Cancelled { chain: self.name.clone() }));
            }
        }
    }

    /// Indexes one block. Does not move the cursor.
    pub async fn index_block(&self, block_number: u64) -> Result<BlockOutcome, IndexerError> {
        let chain_id = &self.chain.chain_id;
        let block = self.client.get_block(block_number).await?;

        let mut matched = Vec::new();
        let mut skipped_failed = 0;

        for tx in &block.transactions {
            if !filter::matches(tx, &self.targets) {
                continue;
            }

            let receipt = self.client.get_receipt(&tx.hash).await?;
            if !receipt.is_success() {
                info!(
                    chain_id = %chain_id,
                    block = block_number,
                    tx_hash = %tx.hash,
                    "Skipped failed transaction"
                );
                skipped_failed += 1;
                continue;
            }

            matched.push(extract_transaction(chain_id, &block, tx));
        }

        self.store.upsert_transactions(&matched).await?;
        self.store
            .upsert_checkpoint(chain_id, block_number, &block.hash)
            .await?;

        Ok(BlockOutcome {
            block_number,
            block_hash: block.hash,
            indexed: matched.len(),
            skipped_failed,
        })
    }

    /// Sleeps unless shut down first. Returns false on shutdown.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = sleep(duration) => true,
            _ = self.shutdown.cancelled() => false,
        }
    }

    fn finish(&mut self, exit: IndexerExit) -> IndexerExit {
        self.state = IndexerState::Stopped;
        info!(chain_id = %self.chain.chain_id, block = self.current_block, "{}", exit);
        self.notify(exit.to_string());
        exit
    }

    fn notify(&self, message: String) {
        if let Some(notifier) = &self.notifier {
            // A dropped receiver only means nobody is listening
            let _ = notifier.send(message);
        }
    }
}
