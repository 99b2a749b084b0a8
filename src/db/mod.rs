pub mod chain;
pub mod checkpoint;
pub mod connection;
pub mod migration;
pub mod store;
pub mod target;
pub mod transaction;

pub use store::{CheckpointStore, IndexStore, SqliteStore, TargetStore, TransactionStore};

/// Current unix time in seconds.
pub(crate) fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
