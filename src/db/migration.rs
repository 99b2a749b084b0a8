use sqlx::SqlitePool;
use tracing::info;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");

    // Per-chain run parameters; null sleeps fall back to the configured defaults
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS chains (
            chain_id TEXT PRIMARY KEY,
            start_block INTEGER,
            end_block INTEGER,
            sleep_per_block_ms INTEGER,
            sleep_on_error_ms INTEGER
        )"
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS targets (
            chain_id TEXT NOT NULL,
            address TEXT NOT NULL,
            method_signature TEXT NOT NULL,
            added_at INTEGER NOT NULL,
            PRIMARY KEY (chain_id, address, method_signature)
        )"
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS checkpoints (
            chain_id TEXT PRIMARY KEY,
            block_number INTEGER NOT NULL,
            block_hash TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )"
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS transactions (
            chain_id TEXT NOT NULL,
            hash TEXT NOT NULL,
            block_number INTEGER NOT NULL,
            block_hash TEXT NOT NULL,
            from_address TEXT NOT NULL,
            to_address TEXT NOT NULL,
            input TEXT NOT NULL,
            value TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            PRIMARY KEY (chain_id, hash)
        )"
    )
    .execute(pool)
    .await?;

    // Add indexes for common queries
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transactions_chain_to_block
         ON transactions(chain_id, to_address, block_number)"
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transactions_chain_block
         ON transactions(chain_id, block_number)"
    )
    .execute(pool)
    .await?;

    info!("Database migrations completed successfully");
    Ok(())
}
