use crate::models::IndexedTransaction;
use sqlx::sqlite::SqliteConnection;
use sqlx::{Pool, Row, Sqlite};

const UPSERT_TRANSACTION: &str = r#"
    INSERT INTO transactions
    (chain_id, hash, block_number, block_hash, from_address, to_address, input, value, timestamp)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(chain_id, hash) DO UPDATE SET
        block_number = excluded.block_number,
        block_hash = excluded.block_hash,
        from_address = excluded.from_address,
        to_address = excluded.to_address,
        input = excluded.input,
        value = excluded.value,
        timestamp = excluded.timestamp
"#;

async fn upsert_one(
    conn: &mut SqliteConnection,
    transaction: &IndexedTransaction,
) -> Result<(), sqlx::Error> {
    sqlx::query(UPSERT_TRANSACTION)
        .bind(&transaction.chain_id)
        .bind(&transaction.hash)
        .bind(transaction.block_number as i64)
        .bind(&transaction.block_hash)
        .bind(&transaction.from)
        .bind(&transaction.to)
        .bind(&transaction.input)
        .bind(&transaction.value)
        .bind(&transaction.timestamp)
        .execute(conn)
        .await?;

    Ok(())
}

pub async fn upsert_transaction(
    pool: &Pool<Sqlite>,
    transaction: &IndexedTransaction,
) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    upsert_one(&mut *conn, transaction).await
}

/// Upserts a batch inside one SQL transaction: all rows land or none do.
pub async fn upsert_transactions(
    pool: &Pool<Sqlite>,
    transactions: &[IndexedTransaction],
) -> Result<(), sqlx::Error> {
    if transactions.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    for transaction in transactions {
        upsert_one(&mut *tx, transaction).await?;
    }

    tx.commit().await?;

    Ok(())
}

/// Returns one page of a chain's transactions in block order and the total
/// count, optionally restricted to a `to` address.
pub async fn get_transactions(
    pool: &Pool<Sqlite>,
    chain_id: &str,
    to_address: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<(Vec<IndexedTransaction>, i64), sqlx::Error> {
    let to_address = to_address.map(str::to_lowercase);

    let total_count = sqlx::query(
        "SELECT COUNT(*) FROM transactions
         WHERE chain_id = ? AND (? IS NULL OR lower(to_address) = ?)",
    )
    .bind(chain_id)
    .bind(to_address.as_deref())
    .bind(to_address.as_deref())
    .fetch_one(pool)
    .await?
    .get::<i64, _>(0);

    let rows = sqlx::query(
        r#"SELECT chain_id, hash, block_number, block_hash, from_address, to_address,
                  input, value, timestamp
           FROM transactions
           WHERE chain_id = ? AND (? IS NULL OR lower(to_address) = ?)
           ORDER BY block_number ASC, hash ASC
           LIMIT ? OFFSET ?"#,
    )
    .bind(chain_id)
    .bind(to_address.as_deref())
    .bind(to_address.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let transactions = rows
        .iter()
        .map(|row| IndexedTransaction {
            chain_id: row.get("chain_id"),
            hash: row.get("hash"),
            block_number: row.get::<i64, _>("block_number") as u64,
            block_hash: row.get("block_hash"),
            from: row.get("from_address"),
            to: row.get("to_address"),
            input: row.get("input"),
            value: row.get("value"),
            timestamp: row.get("timestamp"),
        })
        .collect();

    Ok((transactions, total_count))
}

pub async fn count_transactions(pool: &Pool<Sqlite>, chain_id: &str) -> Result<i64, sqlx::Error> {
    let count = sqlx::query("SELECT COUNT(*) FROM transactions WHERE chain_id = ?")
        .bind(chain_id)
        .fetch_one(pool)
        .await?
        .get::<i64, _>(0);

    Ok(count)
}
