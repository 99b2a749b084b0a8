use crate::db::now_secs;
use crate::models::Target;
use sqlx::{Pool, Row, Sqlite};

pub async fn add_target(pool: &Pool<Sqlite>, target: &Target) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO targets (chain_id, address, method_signature, added_at) VALUES (?, ?, ?, ?)
         ON CONFLICT(chain_id, address, method_signature) DO NOTHING",
    )
    .bind(&target.chain_id)
    .bind(target.address.to_lowercase())
    .bind(target.method_signature.to_lowercase())
    .bind(now_secs())
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns whether a row was removed.
pub async fn remove_target(pool: &Pool<Sqlite>, target: &Target) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM targets WHERE chain_id = ? AND address = ? AND method_signature = ?",
    )
    .bind(&target.chain_id)
    .bind(target.address.to_lowercase())
    .bind(target.method_signature.to_lowercase())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get_targets(pool: &Pool<Sqlite>, chain_id: &str) -> Result<Vec<Target>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT chain_id, address, method_signature FROM targets
         WHERE chain_id = ? ORDER BY added_at, address",
    )
    .bind(chain_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| Target {
            chain_id: row.get("chain_id"),
            address: row.get("address"),
            method_signature: row.get("method_signature"),
        })
        .collect())
}
