#![allow(dead_code)]

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use chrono::Utc;
use reward_claimer::adapters::{
    ChainClient, ChainConnector, ClaimReceipt, ClaimRequest, RewardSource,
};
use reward_claimer::domain::{Authorization, NetworkContext, RewardEntry, BASE};
use reward_claimer::error::{ClaimError, Result};
use reward_claimer::strategy::{AutoClaimer, ClaimerConfig, CostEstimator, GasPolicy};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const GAS_PRICE: u128 = 1_000_000_000;

/// Cost of one claim at [`GAS_PRICE`] under the default policy
pub fn unit_cost() -> U256 {
    let policy = GasPolicy::default();
    policy.unit_cost(policy.discounted_gas_price(GAS_PRICE))
}

pub fn entries(n: usize) -> Vec<RewardEntry> {
    (1..=n)
        .map(|i| RewardEntry {
            id: i.to_string(),
            hash: format!("0xreward{:02}", i),
            observed_at: Utc::now(),
        })
        .collect()
}

/// Hashes the chain has accepted claims for; the source hides them
pub type Ledger = Arc<Mutex<HashSet<String>>>;

#[derive(Debug, Default)]
pub struct ChainState {
    pub chain_id: u64,
    pub balance: U256,
    pub gas_price: u128,
    /// Claims charge the whole balance instead of their cost
    pub drain_on_send: bool,
    pub sent: Vec<String>,
    /// Every `send_claim` call, accepted or not
    pub send_attempts: usize,
    pub balance_reads: usize,
    pub gas_price_reads: usize,
    /// From the given (1-based) read on, quote this price instead
    pub gas_price_rise: Option<(usize, u128)>,
}

pub struct FakeChain {
    endpoint: String,
    pub state: Mutex<ChainState>,
    ledger: Ledger,
}

impl FakeChain {
    pub fn new(endpoint: &str, balance: U256, ledger: Ledger) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            state: Mutex::new(ChainState {
                chain_id: BASE.chain_id,
                balance,
                gas_price: GAS_PRICE,
                ..Default::default()
            }),
            ledger,
        }
    }

    pub fn on_chain(endpoint: &str, chain_id: u64) -> Self {
        let chain = Self::new(endpoint, U256::ZERO, Ledger::default());
        chain.state.lock().unwrap().chain_id = chain_id;
        chain
    }

    pub fn sent(&self) -> Vec<String> {
        self.state.lock().unwrap().sent.clone()
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().chain_id)
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(100)
    }

    async fn balance(&self, _owner: Address) -> Result<U256> {
        let mut state = self.state.lock().unwrap();
        state.balance_reads += 1;
        Ok(state.balance)
    }

    async fn raw_balance(&self, _owner: Address) -> Result<Option<U256>> {
        Ok(Some(self.state.lock().unwrap().balance))
    }

    async fn gas_price(&self) -> Result<u128> {
        let mut state = self.state.lock().unwrap();
        state.gas_price_reads += 1;
        match state.gas_price_rise {
            Some((from, price)) if state.gas_price_reads >= from => Ok(price),
            _ => Ok(state.gas_price),
        }
    }

    async fn send_claim(&self, request: &ClaimRequest) -> Result<TxHash> {
        let mut state = self.state.lock().unwrap();
        state.send_attempts += 1;
        let cost = request.value + U256::from(request.gas_limit) * U256::from(request.gas_price);
        if cost > state.balance {
            return Err(ClaimError::SubmissionFailed(
                "insufficient funds for gas * price + value".into(),
            ));
        }
        state.balance = if state.drain_on_send {
            U256::ZERO
        } else {
            state.balance - cost
        };
        state.sent.push(request.hash.clone());
        self.ledger.lock().unwrap().insert(request.hash.clone());
        Ok(TxHash::with_last_byte(state.sent.len() as u8))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<ClaimReceipt> {
        Ok(ClaimReceipt {
            tx_hash,
            block_number: Some(101),
            gas_used: 100_000,
            effective_gas_price: GAS_PRICE,
            success: true,
        })
    }
}

/// Connects to known endpoints, refuses everything else
#[derive(Default)]
pub struct FakeConnector {
    clients: Vec<(String, Arc<dyn ChainClient>)>,
    pub tried: Mutex<Vec<String>>,
}

impl FakeConnector {
    pub fn new(clients: Vec<(String, Arc<dyn ChainClient>)>) -> Self {
        Self {
            clients,
            tried: Mutex::new(Vec::new()),
        }
    }

    pub fn tried(&self) -> Vec<String> {
        self.tried.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainConnector for FakeConnector {
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn ChainClient>> {
        self.tried.lock().unwrap().push(endpoint.to_string());
        self.clients
            .iter()
            .find(|(url, _)| url == endpoint)
            .map(|(_, client)| client.clone())
            .ok_or_else(|| ClaimError::Rpc(format!("connection refused: {}", endpoint)))
    }
}

/// In-memory reward service backed by a shared ledger
pub struct FakeSource {
    pub backlog: Vec<RewardEntry>,
    /// Hashes the service refuses to sign
    pub unsigned: HashSet<String>,
    ledger: Ledger,
    pub list_calls: Mutex<usize>,
    pub auth_calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new(backlog: Vec<RewardEntry>, ledger: Ledger) -> Self {
        Self {
            backlog,
            unsigned: HashSet::new(),
            ledger,
            list_calls: Mutex::new(0),
            auth_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        *self.list_calls.lock().unwrap() + self.auth_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RewardSource for FakeSource {
    async fn list_unclaimed(&self, _address: Address) -> Vec<RewardEntry> {
        *self.list_calls.lock().unwrap() += 1;
        let claimed = self.ledger.lock().unwrap();
        self.backlog
            .iter()
            .filter(|e| !claimed.contains(&e.hash))
            .cloned()
            .collect()
    }

    async fn get_authorization(&self, _address: Address, hash: &str) -> Option<Authorization> {
        self.auth_calls.lock().unwrap().push(hash.to_string());
        if self.unsigned.contains(hash) {
            return None;
        }
        Some(Authorization {
            for_hash: hash.to_string(),
            signature: Bytes::from(vec![0x5a; 65]),
        })
    }
}

pub fn claimer(chain: Arc<FakeChain>, source: Arc<FakeSource>) -> AutoClaimer {
    let ctx = NetworkContext {
        network: &BASE,
        chain,
        connector: Arc::new(FakeConnector::default()),
        endpoints: vec!["http://fake-node".to_string()],
        wallet: Address::repeat_byte(0x42),
        contract: Address::repeat_byte(0x64),
    };
    AutoClaimer::new(
        ctx,
        source,
        CostEstimator::new(GasPolicy::default()),
        ClaimerConfig {
            item_delay: Duration::from_secs(3),
        },
    )
}
