use alloy::primitives::Address;
use std::str::FromStr;
use std::sync::Arc;

use crate::adapters::{ChainClient, ChainConnector};
use crate::error::{ClaimError, Result};

/// Static description of a supported chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub chain_id: u64,
    pub native_currency: &'static str,
    pub explorer: &'static str,
    pub rpc_urls: &'static [&'static str],
    pub contract: Option<&'static str>,
}

pub const BASE: NetworkInfo = NetworkInfo {
    key: "base",
    name: "Base",
    chain_id: 8453,
    native_currency: "ETH",
    explorer: "https://basescan.org",
    rpc_urls: &[
        "https://mainnet.base.org",
        "https://base-mainnet.public.blastapi.io",
        "https://base.blockpi.network/v1/rpc/public",
        "https://1rpc.io/base",
    ],
    contract: Some("0x64DC8E118ec25ba32B95daf010056D22b652637B"),
};

pub const BLAST: NetworkInfo = NetworkInfo {
    key: "blast",
    name: "Blast",
    chain_id: 81457,
    native_currency: "ETH",
    explorer: "https://blastscan.io",
    rpc_urls: &["https://rpc.blast.io"],
    contract: None,
};

pub const NETWORKS: &[&NetworkInfo] = &[&BASE, &BLAST];

impl NetworkInfo {
    /// Look up a network by key (case-insensitive)
    pub fn by_key(key: &str) -> Result<&'static NetworkInfo> {
        let key = key.trim().to_ascii_lowercase();
        NETWORKS
            .iter()
            .copied()
            .find(|n| n.key == key)
            .ok_or(ClaimError::UnknownNetwork(key))
    }

    /// Candidate endpoints in try order; a preferred endpoint goes first
    pub fn candidate_endpoints(&self, preferred: Option<&str>) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.rpc_urls.len() + 1);
        if let Some(url) = preferred.map(str::trim).filter(|u| !u.is_empty()) {
            out.push(url.to_string());
        }
        for url in self.rpc_urls {
            if !out.iter().any(|u| u.as_str() == *url) {
                out.push((*url).to_string());
            }
        }
        out
    }

    pub fn address_url(&self, address: Address) -> String {
        format!("{}/address/{}", self.explorer, address)
    }

    pub fn tx_url(&self, tx: impl std::fmt::Display) -> String {
        format!("{}/tx/{}", self.explorer, tx)
    }
}

impl std::fmt::Display for NetworkInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (chain {})", self.name, self.chain_id)
    }
}

/// Parse a user- or config-supplied contract address
pub fn parse_contract_address(raw: &str) -> Result<Address> {
    Address::from_str(raw.trim()).map_err(|e| {
        ClaimError::AddressParsing(format!("Invalid contract address '{}': {}", raw, e))
    })
}

/// Everything a cycle needs to talk to the chain.
///
/// Built once by endpoint selection at startup and shared by reference;
/// failover produces a new context instead of mutating this one.
#[derive(Clone)]
pub struct NetworkContext {
    pub network: &'static NetworkInfo,
    pub chain: Arc<dyn ChainClient>,
    pub connector: Arc<dyn ChainConnector>,
    /// All candidate endpoints, in configured order
    pub endpoints: Vec<String>,
    pub wallet: Address,
    pub contract: Address,
}

impl NetworkContext {
    pub fn endpoint(&self) -> &str {
        self.chain.endpoint()
    }
}

impl std::fmt::Debug for NetworkContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkContext")
            .field("network", &self.network.key)
            .field("endpoint", &self.endpoint())
            .field("wallet", &self.wallet)
            .field("contract", &self.contract)
            .finish()
    }
}
