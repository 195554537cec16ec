//! Chain access for the claimer
//!
//! Everything the claim engine needs from an RPC node sits behind
//! [`ChainClient`]; the production implementation is built on alloy.

use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::sol;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ClaimError, Result};

// Block reward contract; `mine` is the only entry point the claimer uses
sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IBlockRewards {
        /// Claim the reward for `hash` with a service-issued signature
        function mine(string hash, bytes _signature) external payable;
    }
}

/// Fully priced claim transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub contract: Address,
    pub hash: String,
    pub signature: Bytes,
    pub value: U256,
    pub gas_limit: u64,
    pub gas_price: u128,
}

/// What the claimer keeps from a mined receipt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub effective_gas_price: u128,
    pub success: bool,
}

/// Read/write access to one verified RPC endpoint with a bound signer
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// URI this client talks to
    fn endpoint(&self) -> &str;

    async fn chain_id(&self) -> Result<u64>;

    async fn block_number(&self) -> Result<u64>;

    /// Balance through the provider's typed API
    async fn balance(&self, owner: Address) -> Result<U256>;

    /// Balance through a raw `eth_getBalance` call; `None` when the node returns null
    async fn raw_balance(&self, owner: Address) -> Result<Option<U256>>;

    /// Network-suggested gas price in wei
    async fn gas_price(&self) -> Result<u128>;

    /// Sign and broadcast a claim; returns once the node accepted it
    async fn send_claim(&self, request: &ClaimRequest) -> Result<TxHash>;

    /// Block until the transaction is mined
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<ClaimReceipt>;
}

/// Opens [`ChainClient`]s by endpoint URI
#[async_trait]
pub trait ChainConnector: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn ChainClient>>;
}

/// Alloy-backed chain client
pub struct AlloyChainClient {
    endpoint: String,
    provider: DynProvider,
}

impl AlloyChainClient {
    pub fn new(endpoint: &str, wallet: EthereumWallet) -> Result<Self> {
        let rpc_url: url::Url = endpoint
            .parse()
            .map_err(|e| ClaimError::Rpc(format!("Invalid RPC URL {}: {}", endpoint, e)))?;
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(rpc_url)
            .erased();

        Ok(Self {
            endpoint: endpoint.to_string(),
            provider,
        })
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ClaimError::Rpc(format!("eth_chainId failed: {}", e)))
    }

    async fn block_number(&self) -> Result<u64> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ClaimError::Rpc(format!("eth_blockNumber failed: {}", e)))
    }

    async fn balance(&self, owner: Address) -> Result<U256> {
        self.provider
            .get_balance(owner)
            .await
            .map_err(|e| ClaimError::Rpc(format!("getBalance failed: {}", e)))
    }

    async fn raw_balance(&self, owner: Address) -> Result<Option<U256>> {
        self.provider
            .raw_request::<_, Option<U256>>("eth_getBalance".into(), (owner, "latest"))
            .await
            .map_err(|e| ClaimError::Rpc(format!("raw eth_getBalance failed: {}", e)))
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| ClaimError::Rpc(format!("eth_gasPrice failed: {}", e)))
    }

    async fn send_claim(&self, request: &ClaimRequest) -> Result<TxHash> {
        let contract = IBlockRewards::new(request.contract, self.provider.clone());

        let pending = contract
            .mine(request.hash.clone(), request.signature.clone())
            .value(request.value)
            .gas(request.gas_limit)
            .gas_price(request.gas_price)
            .send()
            .await
            .map_err(|e| ClaimError::SubmissionFailed(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        debug!("Claim tx {} accepted by {}", tx_hash, self.endpoint);
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<ClaimReceipt> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await
            .map_err(|e| ClaimError::Rpc(format!("Tx confirmation failed: {}", e)))?;

        Ok(ClaimReceipt {
            tx_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
            effective_gas_price: receipt.effective_gas_price(),
            success: receipt.status(),
        })
    }
}

/// Connects alloy clients that sign with one wallet
#[derive(Clone)]
pub struct AlloyConnector {
    wallet: EthereumWallet,
}

impl AlloyConnector {
    pub fn new(wallet: EthereumWallet) -> Self {
        Self { wallet }
    }
}

#[async_trait]
impl ChainConnector for AlloyConnector {
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn ChainClient>> {
        let client = AlloyChainClient::new(endpoint, self.wallet.clone())?;
        Ok(Arc::new(client))
    }
}
