// Configuration for:
// - Database connection string
// - Query API listening address/port
// - RPC client behaviour (timeout, rate limit, retries)
// - RPC endpoint overrides for the chain registry
// - Default per-chain sleeps and cache settings

use dotenv::dotenv;
use std::collections::HashMap;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub rpc_timeout_secs: u64,
    pub rpc_rate_limit: Option<u32>,
    pub rpc_max_retries: usize,
    pub chain_rpc_urls: HashMap<String, String>,
    pub default_sleep_per_block: Duration,
    pub default_sleep_on_error: Duration,
    pub cache_ttl: Duration,
    pub cache_max_capacity: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:indexer.db".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            rpc_timeout_secs: 30,
            rpc_rate_limit: None,
            rpc_max_retries: 2,
            chain_rpc_urls: HashMap::new(),
            default_sleep_per_block: Duration::from_millis(1000),
            default_sleep_on_error: Duration::from_millis(5000),
            cache_ttl: Duration::from_secs(60),
            cache_max_capacity: 1000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();
        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        let server_host = env::var("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.server_port);
        let rpc_timeout_secs = env::var("RPC_TIMEOUT_SECS")
            .map(|v| v.parse().unwrap_or(30))
            .unwrap_or(defaults.rpc_timeout_secs);
        let rpc_rate_limit = env::var("RPC_RATE_LIMIT")
            .map(|v| v.parse().ok())
            .unwrap_or(None);
        let rpc_max_retries = env::var("RPC_MAX_RETRIES")
            .map(|v| v.parse().unwrap_or(2))
            .unwrap_or(defaults.rpc_max_retries);
        let chain_rpc_urls = env::var("CHAIN_RPC_URLS")
            .map(|v| parse_rpc_overrides(&v))
            .unwrap_or_default();
        let default_sleep_per_block = env::var("DEFAULT_SLEEP_PER_BLOCK_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.default_sleep_per_block);
        let default_sleep_on_error = env::var("DEFAULT_SLEEP_ON_ERROR_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.default_sleep_on_error);
        let cache_ttl = env::var("CACHE_TTL")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);
        let cache_max_capacity = env::var("CACHE_MAX_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.cache_max_capacity);

        Self {
            database_url,
            server_host,
            server_port,
            rpc_timeout_secs,
            rpc_rate_limit,
            rpc_max_retries,
            chain_rpc_urls,
            default_sleep_per_block,
            default_sleep_on_error,
            cache_ttl,
            cache_max_capacity,
        }
    }
}

/// Parses `"1=https://a,137=https://b"` into a chain id -> URL map.
/// Malformed entries are skipped.
pub fn parse_rpc_overrides(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|entry| {
            let (id, url) = entry.split_once('=')?;
            let (id, url) = (id.trim(), url.trim());
            if id.is_empty() || url.is_empty() {
                return None;
            }
            Some((id.to_string(), url.to_string()))
        })
        .collect()
}
