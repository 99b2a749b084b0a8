use crate::db::now_secs;
use crate::models::Checkpoint;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

fn from_row(row: &SqliteRow) -> Checkpoint {
    Checkpoint {
        chain_id: row.get("chain_id"),
        block_number: row.get::<i64, _>("block_number") as u64,
        block_hash: row.get("block_hash"),
    }
}

pub async fn get_checkpoint(
    pool: &Pool<Sqlite>,
    chain_id: &str,
) -> Result<Option<Checkpoint>, sqlx::Error> {
    let row = sqlx::query("SELECT chain_id, block_number, block_hash FROM checkpoints WHERE chain_id = ?")
        .bind(chain_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// Writes the checkpoint in a single statement. A block number lower than the
/// stored one leaves the row untouched, so the checkpoint never moves back.
pub async fn upsert_checkpoint(
    pool: &Pool<Sqlite>,
    chain_id: &str,
    block_number: u64,
    block_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO checkpoints (chain_id, block_number, block_hash, updated_at)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(chain_id) DO UPDATE SET
            block_number = excluded.block_number,
            block_hash = excluded.block_hash,
            updated_at = excluded.updated_at
         WHERE excluded.block_number >= checkpoints.block_number",
    )
    .bind(chain_id)
    .bind(block_number as i64)
    .bind(block_hash)
    .bind(now_secs())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_all_checkpoints(pool: &Pool<Sqlite>) -> Result<Vec<Checkpoint>, sqlx::Error> {
    let rows = sqlx::query("SELECT chain_id, block_number, block_hash FROM checkpoints ORDER BY chain_id")
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(from_row).collect())
}
