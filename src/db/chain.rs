use crate::models::Chain;
use sqlx::{Pool, Row, Sqlite};
use std::time::Duration;
use tracing::warn;

/// Loads every configured chain. Null sleeps take the given defaults.
pub async fn get_all_chains(
    pool: &Pool<Sqlite>,
    default_sleep_per_block: Duration,
    default_sleep_on_error: Duration,
) -> Result<Vec<Chain>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT chain_id, start_block, end_block, sleep_per_block_ms, sleep_on_error_ms
         FROM chains ORDER BY chain_id",
    )
    .fetch_all(pool)
    .await?;

    let mut chains = Vec::with_capacity(rows.len());
    for row in &rows {
        let chain_id: String = row.get("chain_id");
        let start_block = non_negative(row.get("start_block"));
        let end_block = non_negative(row.get("end_block"));
        let sleep_per_block = non_negative(row.get("sleep_per_block_ms"));
        let sleep_on_error = non_negative(row.get("sleep_on_error_ms"));

        match (start_block, end_block, sleep_per_block, sleep_on_error) {
            (Ok(start_block), Ok(end_block), Ok(sleep_per_block), Ok(sleep_on_error)) => chains.push(Chain {
                chain_id,
                start_block,
                end_block,
                sleep_per_block: sleep_per_block
                    .map(Duration::from_millis)
                    .unwrap_or(default_sleep_per_block),
                sleep_on_error: sleep_on_error
                    .map(Duration::from_millis)
                    .unwrap_or(default_sleep_on_error),
            }),
            _ => warn!(chain_id = %chain_id, "Skipping chain with a negative block or sleep value"),
        }
    }

    Ok(chains)
}

// Nullable INTEGER column that must not be negative
fn non_negative(value: Option<i64>) -> Result<Option<u64>, std::num::TryFromIntError> {
    value.map(u64::try_from).transpose()
}

pub async fn upsert_chain(pool: &Pool<Sqlite>, chain: &Chain) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO chains (chain_id, start_block, end_block, sleep_per_block_ms, sleep_on_error_ms)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(chain_id) DO UPDATE SET
            start_block = excluded.start_block,
            end_block = excluded.end_block,
            sleep_per_block_ms = excluded.sleep_per_block_ms,
            sleep_on_error_ms = excluded.sleep_on_error_ms",
    )
    .bind(&chain.chain_id)
    .bind(chain.start_block.map(|b| b as i64))
    .bind(chain.end_block.map(|b| b as i64))
    .bind(chain.sleep_per_block.as_millis() as i64)
    .bind(chain.sleep_on_error.as_millis() as i64)
    .execute(pool)
    .await?;

    Ok(())
}
