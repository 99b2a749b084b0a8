use crate::cache::TransactionCacheManager;
use sqlx::SqlitePool;

/// Shared state of the query API. The indexers do not use it; each owns its
/// own store handle.
pub struct AppState {
    pub db_pool: SqlitePool,
    pub cache: TransactionCacheManager,
}
