pub mod client;
pub mod filter;
pub mod indexer;
pub mod models;
pub mod registry;
pub mod worker_pool;

// Re-exports for convenience
pub use client::{ChainClient, ClientError, EvmClient};
pub use indexer::{ChainIndexer, IndexerError, IndexerExit, IndexerState};
pub use registry::{ChainRegistry, NetworkParams};
pub use worker_pool::WorkerPool;
