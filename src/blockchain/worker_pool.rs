use crate::blockchain::client::{ChainClient, EvmClient};
use crate::blockchain::indexer::{ChainIndexer, IndexerError, IndexerExit};
use crate::blockchain::registry::ChainRegistry;
use crate::config::Config;
use crate::db::{connection, IndexStore, SqliteStore};
use crate::models::Chain;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Connections per chain; the loop is sequential so one is busy at a time.
const CONNECTIONS_PER_WORKER: u32 = 2;

/// One indexing task per chain. Workers share nothing but the shutdown token
/// and the notice channel, so one chain's failures never stall another.
pub struct WorkerPool {
    workers: Vec<WorkerHandle>,
    notice_tx: mpsc::UnboundedSender<String>,
    notice_task: JoinHandle<Vec<String>>,
    shutdown: CancellationToken,
}

struct WorkerHandle {
    chain_id: String,
    handle: JoinHandle<Result<IndexerExit, IndexerError>>,
}

#[derive(Debug)]
pub struct WorkerReport {
    pub chain_id: String,
    pub result: Result<IndexerExit, String>,
}

#[derive(Debug, Default)]
pub struct PoolSummary {
    pub reports: Vec<WorkerReport>,
    /// Status lines emitted by the workers, in arrival order.
    pub notices: Vec<String>,
}

impl WorkerPool {
    pub fn new(shutdown: CancellationToken) -> Self {
        let (notice_tx, mut notice_rx) = mpsc::unbounded_channel::<String>();

        let notice_task = tokio::spawn(async move {
            let mut notices = Vec::new();
            while let Some(notice) = notice_rx.recv().await {
                info!("{}", notice);
                notices.push(notice);
            }
            notices
        });

        Self {
            workers: Vec::new(),
            notice_tx,
            notice_task,
            shutdown,
        }
    }

    /// Spawns a worker per chain, each with its own RPC client and store pool.
    pub fn start(
        config: Arc<Config>,
        registry: Arc<ChainRegistry>,
        chains: Vec<Chain>,
        shutdown: CancellationToken,
    ) -> Self {
        let mut pool = Self::new(shutdown);

        for chain in chains {
            let chain_id = chain.chain_id.clone();
            let config = config.clone();
            let registry = registry.clone();
            let shutdown = pool.shutdown.clone();
            let notifier = pool.notice_tx.clone();

            let handle = tokio::spawn(async move {
                run_chain(chain, config, registry, shutdown, notifier).await
            });

            info!("Worker for chain {} started", chain_id);
            pool.workers.push(WorkerHandle { chain_id, handle });
        }

        pool
    }

    /// Spawns an already constructed indexer.
    pub fn spawn_indexer<C, S>(&mut self, chain_id: &str, indexer: ChainIndexer<C, S>)
    where
        C: ChainClient + 'static,
        S: IndexStore + 'static,
    {
        let indexer = indexer
            .with_shutdown(self.shutdown.clone())
            .with_notifier(self.notice_tx.clone());
        let handle = tokio::spawn(indexer.run());

        info!("Worker for chain {} started", chain_id);
        self.workers.push(WorkerHandle {
            chain_id: chain_id.to_string(),
            handle,
        });
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Waits for every worker to finish and collects their notices.
    pub async fn join(self) -> PoolSummary {
        let Self {
            workers,
            notice_tx,
            notice_task,
            ..
        } = self;
        drop(notice_tx);

        let mut reports = Vec::with_capacity(workers.len());
        for WorkerHandle { chain_id, handle } in workers {
            let result = match handle.await {
                Ok(Ok(exit)) => Ok(exit),
                Ok(Err(e)) => {
                    error!("Worker for chain {} failed: {}", chain_id, e);
                    Err(e.to_string())
                }
                Err(e) => {
                    error!("Worker for chain {} panicked: {}", chain_id, e);
                    Err(e.to_string())
                }
            };
            reports.push(WorkerReport { chain_id, result });
        }

        let notices = notice_task.await.unwrap_or_else(|e| {
            warn!("Notice collector stopped early: {}", e);
            Vec::new()
        });

        PoolSummary { reports, notices }
    }
}

async fn run_chain(
    chain: Chain,
    config: Arc<Config>,
    registry: Arc<ChainRegistry>,
    shutdown: CancellationToken,
    notifier: mpsc::UnboundedSender<String>,
) -> Result<IndexerExit, IndexerError> {
    let network = registry
        .lookup(&chain.chain_id)
        .cloned()
        .ok_or_else(|| IndexerError::ChainNotFound(chain.chain_id.clone()))?;

    let pool = connection::establish_connection_with(&config.database_url, CONNECTIONS_PER_WORKER).await?;
    let client = EvmClient::new(&network, &config)?;

    ChainIndexer::new(chain, network.name, client, SqliteStore::new(pool))
        .with_shutdown(shutdown)
        .with_notifier(notifier)
        .run()
        .await
}
