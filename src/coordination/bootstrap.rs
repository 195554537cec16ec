//! Startup: wallet confirmation, network and contract resolution,
//! endpoint selection and the initial funds gate.
//!
//! Everything here may stop the process; nothing after it will.

use alloy::primitives::Address;
use std::sync::Arc;
use tracing::{info, warn};

use crate::adapters::{ChainConnector, RewardSource};
use crate::config::AppConfig;
use crate::coordination::operator::Operator;
use crate::domain::{parse_contract_address, NetworkContext, NetworkInfo};
use crate::error::{ClaimError, Result};
use crate::strategy::{AutoClaimer, ClaimerConfig, CostEstimator, EndpointSelector, GasPolicy};

/// Resolve the network, taking the operator's switch request into account
pub fn resolve_network(
    config: &AppConfig,
    operator: &dyn Operator,
) -> Result<&'static NetworkInfo> {
    let configured = NetworkInfo::by_key(&config.network)?;
    info!("Configured network: {}", configured);

    match operator.choose_network(configured) {
        Some(key) => match NetworkInfo::by_key(&key) {
            Ok(network) => {
                info!("Switched to {}", network);
                Ok(network)
            }
            Err(_) => {
                warn!("Unknown network '{}', staying on {}", key, configured.name);
                Ok(configured)
            }
        },
        None => Ok(configured),
    }
}

/// Config override, then the network default, then the operator
pub fn resolve_contract(
    config: &AppConfig,
    network: &NetworkInfo,
    operator: &dyn Operator,
) -> Result<Address> {
    let raw = config
        .contract_address
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| network.contract.map(str::to_string))
        .or_else(|| operator.provide_contract_address(network))
        .ok_or_else(|| {
            ClaimError::AddressParsing(format!(
                "No claim contract address for {}, cannot continue",
                network.name
            ))
        })?;

    let contract = parse_contract_address(&raw)?;
    info!("Claim contract: {}", contract);
    Ok(contract)
}

/// Run every startup step and return a claimer ready to be scheduled
pub async fn bootstrap(
    config: &AppConfig,
    wallet: Address,
    connector: Arc<dyn ChainConnector>,
    source: Arc<dyn RewardSource>,
    operator: &dyn Operator,
) -> Result<AutoClaimer> {
    if !operator.confirm_address(wallet) {
        return Err(ClaimError::Aborted(
            "wallet address not confirmed, check the private key".into(),
        ));
    }

    let network = resolve_network(config, operator)?;
    let contract = resolve_contract(config, network, operator)?;

    let endpoints = network.candidate_endpoints(config.rpc_url.as_deref());
    let selected = EndpointSelector::new(connector.as_ref())
        .select(network, &endpoints)
        .await?;

    let ctx = NetworkContext {
        network,
        chain: selected.client,
        connector,
        endpoints,
        wallet,
        contract,
    };
    info!("Wallet {} on {}", wallet, ctx.endpoint());
    info!("Explorer: {}", network.address_url(wallet));

    let estimator = CostEstimator::new(GasPolicy::from_config(&config.claim)?);

    info!("Checking wallet balance...");
    match estimator.estimate_and_check(&ctx, true).await {
        Ok(check) if check.sufficient => {}
        Ok(check) => {
            if !operator.confirm_low_balance(Some(&check)) {
                return Err(ClaimError::Aborted("insufficient balance".into()));
            }
        }
        Err(e) => {
            warn!("Could not check balance: {}", e);
            if !operator.confirm_low_balance(None) {
                return Err(ClaimError::Aborted("balance unavailable".into()));
            }
        }
    }

    Ok(AutoClaimer::new(
        ctx,
        source,
        estimator,
        ClaimerConfig {
            item_delay: config.schedule.item_delay(),
        },
    ))
}
