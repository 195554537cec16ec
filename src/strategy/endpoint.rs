//! RPC endpoint selection
//!
//! Walks the candidate list once, in order, and keeps the first endpoint
//! that answers with the expected chain id. No retries; callers that want
//! resilience run selection again.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::adapters::{ChainClient, ChainConnector};
use crate::domain::NetworkInfo;
use crate::error::{ClaimError, Result};

/// A verified endpoint
pub struct SelectedEndpoint {
    pub client: Arc<dyn ChainClient>,
    pub block_number: u64,
    /// Position in the candidate list
    pub index: usize,
}

impl std::fmt::Debug for SelectedEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedEndpoint")
            .field("endpoint", &self.client.endpoint())
            .field("block_number", &self.block_number)
            .field("index", &self.index)
            .finish()
    }
}

pub struct EndpointSelector<'a> {
    connector: &'a dyn ChainConnector,
}

impl<'a> EndpointSelector<'a> {
    pub fn new(connector: &'a dyn ChainConnector) -> Self {
        Self { connector }
    }

    /// Return the first candidate reporting `network.chain_id`
    pub async fn select(
        &self,
        network: &NetworkInfo,
        candidates: &[String],
    ) -> Result<SelectedEndpoint> {
        info!("Connecting to {} RPC endpoints...", network.name);

        for (index, endpoint) in candidates.iter().enumerate() {
            match self.check_endpoint(endpoint, network.chain_id).await {
                Ok((client, block_number)) => {
                    info!(
                        "Connected to {} (block height {})",
                        endpoint, block_number
                    );
                    return Ok(SelectedEndpoint {
                        client,
                        block_number,
                        index,
                    });
                }
                Err(e) => {
                    debug!("Skipping endpoint {}: {}", endpoint, e);
                }
            }
        }

        warn!(
            "No {} endpoint answered with chain id {}",
            network.name, network.chain_id
        );
        Err(ClaimError::NoAvailableEndpoint {
            network: network.key.to_string(),
            tried: candidates.len(),
        })
    }

    async fn check_endpoint(
        &self,
        endpoint: &str,
        expected_chain_id: u64,
    ) -> Result<(Arc<dyn ChainClient>, u64)> {
        let client = self.connector.connect(endpoint).await?;

        let chain_id = client.chain_id().await?;
        if chain_id != expected_chain_id {
            return Err(ClaimError::Rpc(format!(
                "wrong network: chain id {} (expected {})",
                chain_id, expected_chain_id
            )));
        }

        let block_number = client.block_number().await?;
        Ok((client, block_number))
    }
}
