//! Cache key generation and management

use std::fmt;

/// A structured cache key that can be converted to a string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Key for one page of a transaction query
    TransactionQuery {
        chain_id: String,
        address: Option<String>,
        offset: i64,
        limit: i64,
    },
}

impl CacheKey {
    /// Create a new transaction query key. The address is normalised to lower case.
    pub fn transaction_query(chain_id: &str, address: Option<&str>, offset: i64, limit: i64) -> Self {
        Self::TransactionQuery {
            chain_id: chain_id.to_string(),
            address: address.map(str::to_lowercase),
            offset,
            limit,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransactionQuery { chain_id, address, offset, limit } => write!(
                f,
                "tx:{}:{}:{}:{}",
                chain_id,
                address.as_deref().unwrap_or("*"),
                offset,
                limit
            ),
        }
    }
}
