//! Static chain id -> network lookup, built once at startup.

use crate::config::Config;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParams {
    pub chain_id: String,
    pub name: String,
    pub rpc_url: String,
}

/// Well-known networks and a public endpoint for each.
const KNOWN_NETWORKS: &[(&str, &str, &str)] = &[
    ("1", "Ethereum", "https://eth.merkle.io"),
    ("10", "OP Mainnet", "https://mainnet.optimism.io"),
    ("56", "BNB Smart Chain", "https://bsc-dataseed.bnbchain.org"),
    ("100", "Gnosis", "https://rpc.gnosischain.com"),
    ("137", "Polygon", "https://polygon-rpc.com"),
    ("8453", "Base", "https://mainnet.base.org"),
    ("42161", "Arbitrum One", "https://arb1.arbitrum.io/rpc"),
    ("43114", "Avalanche", "https://api.avax.network/ext/bc/C/rpc"),
    ("11155111", "Sepolia", "https://sepolia.drpc.org"),
];

#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    networks: HashMap<String, NetworkParams>,
}

impl ChainRegistry {
    /// Built-in networks only.
    pub fn builtin() -> Self {
        let networks = KNOWN_NETWORKS
            .iter()
            .map(|(id, name, url)| {
                (
                    id.to_string(),
                    NetworkParams {
                        chain_id: id.to_string(),
                        name: name.to_string(),
                        rpc_url: url.to_string(),
                    },
                )
            })
            .collect();
        Self { networks }
    }

    /// Built-in networks with `CHAIN_RPC_URLS` overrides applied. An override
    /// for an unknown id adds a network named after its id.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::builtin();
        for (chain_id, rpc_url) in &config.chain_rpc_urls {
            registry.insert(chain_id, rpc_url);
        }
        info!("Chain registry loaded with {} networks", registry.networks.len());
        registry
    }

    pub fn insert(&mut self, chain_id: &str, rpc_url: &str) {
        debug!("Registering RPC endpoint for chain {}: {}", chain_id, rpc_url);
        self.networks
            .entry(chain_id.to_string())
            .and_modify(|n| n.rpc_url = rpc_url.to_string())
            .or_insert_with(|| NetworkParams {
                chain_id: chain_id.to_string(),
                name: format!("chain-{}", chain_id),
                rpc_url: rpc_url.to_string(),
            });
    }

    pub fn lookup(&self, chain_id: &str) -> Option<&NetworkParams> {
        self.networks.get(chain_id)
    }
}
