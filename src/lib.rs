pub mod api;
pub mod blockchain;
pub mod cache;
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use api::error::ApiError;
pub use api::route::create_router;
pub use blockchain::{ChainIndexer, ChainRegistry, EvmClient, WorkerPool};
pub use db::SqliteStore;
pub use models::{Chain, Checkpoint, IndexedTransaction, Target};
pub use validation::{validate_evm_address, validate_method_signature, validate_target};
