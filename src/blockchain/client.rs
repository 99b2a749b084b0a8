use crate::blockchain::models::{Block, Receipt};
use crate::blockchain::registry::NetworkParams;
use crate::config::Config;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("RPC transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc { code: i64, message: String },

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("Block not found: {0}")]
    BlockNotFound(u64),

    #[error("Receipt not found: {0}")]
    ReceiptNotFound(String),
}

impl ClientError {
    /// Errors worth retrying immediately inside the client. Everything else
    /// goes back to the indexer, which backs off on its own schedule.
    fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// Network access the indexer needs from a chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Fetch block `number` with full transaction objects.
    async fn get_block(&self, number: u64) -> Result<Block, ClientError>;

    async fn get_receipt(&self, tx_hash: &str) -> Result<Receipt, ClientError>;
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC client for an EVM-compatible node.
pub struct EvmClient {
    http: reqwest::Client,
    rpc_url: String,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
    max_retries: usize,
    next_id: AtomicU64,
}

impl EvmClient {
    pub fn new(network: &NetworkParams, config: &Config) -> Result<Self, ClientError> {
        let timeout = Duration::from_secs(config.rpc_timeout_secs);
        info!(
            "Initializing EVM client for {} ({}) with RPC endpoint: {}",
            network.name, network.chain_id, network.rpc_url
        );

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let limiter = config
            .rpc_rate_limit
            .and_then(NonZeroU32::new)
            .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));

        Ok(Self {
            http,
            rpc_url: network.rpc_url.clone(),
            limiter,
            max_retries: config.rpc_max_retries,
            next_id: AtomicU64::new(1),
        })
    }

    /// Sends one request, retrying transport failures with exponential backoff.
    /// Returns `None` when the node answered with a `null` result.
    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, ClientError> {
        let result = (|| self.send_once(method, params.clone()))
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(200))
                    .with_max_times(self.max_retries),
            )
            .when(ClientError::is_transient)
            .notify(|err, dur| warn!("Retrying {} after {:?}: {}", method, dur, err))
            .await?;

        match result {
            Value::Null => Ok(None),
            value => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", method, e))),
        }
    }

    async fn send_once(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!("Sending {} to {}", method, self.rpc_url);

        let response: JsonRpcResponse = self
            .http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(ClientError::JsonRpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl ChainClient for EvmClient {
    async fn get_block(&self, number: u64) -> Result<Block, ClientError> {
        self.request("eth_getBlockByNumber", json!([format!("0x{:x}", number), true]))
            .await?
            .ok_or(ClientError::BlockNotFound(number))
    }

    async fn get_receipt(&self, tx_hash: &str) -> Result<Receipt, ClientError> {
        self.request("eth_getTransactionReceipt", json!([tx_hash]))
            .await?
            .ok_or_else(|| ClientError::ReceiptNotFound(tx_hash.to_string()))
    }
}
