//! Claim cost and affordability
//!
//! `unit_cost = claim_value + gas_limit * discounted_gas_price`, all in
//! exact integer wei. The estimator is a pure read-then-compute step and is
//! used both for the cycle-level admission check and right before every
//! submission.

use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};
use tracing::{debug, info, warn};

use crate::config::ClaimConfig;
use crate::domain::NetworkContext;
use crate::error::{ClaimError, Result};

/// Fixed pricing inputs for one claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPolicy {
    /// Value transferred with each claim (wei)
    pub claim_value: U256,
    pub gas_limit: u64,
    /// Share of the network gas price we bid, in percent
    pub discount_pct: u64,
}

impl GasPolicy {
    pub fn from_config(config: &ClaimConfig) -> Result<Self> {
        let claim_value = config.value_wei().map_err(ClaimError::InvalidConfig)?;
        Ok(Self {
            claim_value,
            gas_limit: config.gas_limit,
            discount_pct: config.gas_price_discount_pct,
        })
    }

    /// floor(gas_price * discount_pct / 100) without overflow
    pub fn discounted_gas_price(&self, gas_price: u128) -> u128 {
        let pct = self.discount_pct as u128;
        (gas_price / 100) * pct + (gas_price % 100) * pct / 100
    }

    /// Total wei needed for one claim at the given (already discounted) price
    pub fn unit_cost(&self, discounted_gas_price: u128) -> U256 {
        self.claim_value + U256::from(self.gas_limit) * U256::from(discounted_gas_price)
    }
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            claim_value: U256::from(30_000_000_000_000u64),
            gas_limit: 250_000,
            discount_pct: 85,
        }
    }
}

/// floor(balance / unit_cost), saturating; a zero cost is unlimited
pub fn affordable_count(balance: U256, unit_cost: U256) -> u64 {
    if unit_cost.is_zero() {
        return u64::MAX;
    }
    u64::try_from(balance / unit_cost).unwrap_or(u64::MAX)
}

/// Snapshot of what one claim costs and how many the wallet can pay for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostEstimate {
    pub balance: U256,
    /// Network-suggested gas price (wei)
    pub network_gas_price: u128,
    /// Price actually bid (wei)
    pub gas_price: u128,
    pub unit_cost: U256,
    pub affordable_count: u64,
}

impl CostEstimate {
    pub fn compute(policy: &GasPolicy, balance: U256, network_gas_price: u128) -> Self {
        let gas_price = policy.discounted_gas_price(network_gas_price);
        let unit_cost = policy.unit_cost(gas_price);
        Self {
            balance,
            network_gas_price,
            gas_price,
            unit_cost,
            affordable_count: affordable_count(balance, unit_cost),
        }
    }

    pub fn is_sufficient(&self) -> bool {
        self.balance >= self.unit_cost
    }
}

/// Outcome of `estimate_and_check`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundsCheck {
    pub sufficient: bool,
    pub estimate: CostEstimate,
}

/// One way of reading the wallet balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceStrategy {
    /// Provider's typed balance query on the selected endpoint
    Direct,
    /// Raw `eth_getBalance` on the selected endpoint
    Raw,
    /// Typed query on a fresh connection to the first configured endpoint
    FreshEndpoint,
}

impl BalanceStrategy {
    pub const ALL: [BalanceStrategy; 3] = [
        BalanceStrategy::Direct,
        BalanceStrategy::Raw,
        BalanceStrategy::FreshEndpoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceStrategy::Direct => "direct",
            BalanceStrategy::Raw => "raw",
            BalanceStrategy::FreshEndpoint => "fresh_endpoint",
        }
    }

    /// `Ok(None)` means the node answered without a value
    pub async fn read(&self, ctx: &NetworkContext, owner: Address) -> Result<Option<U256>> {
        match self {
            BalanceStrategy::Direct => ctx.chain.balance(owner).await.map(Some),
            BalanceStrategy::Raw => ctx.chain.raw_balance(owner).await,
            BalanceStrategy::FreshEndpoint => {
                let first = ctx.endpoints.first().ok_or_else(|| {
                    ClaimError::BalanceUnavailable("no configured endpoints".into())
                })?;
                let fresh = ctx.connector.connect(first).await?;
                fresh.balance(owner).await.map(Some)
            }
        }
    }
}

/// Tries balance strategies in order and keeps the first value
#[derive(Debug, Clone)]
pub struct BalanceReader {
    strategies: Vec<BalanceStrategy>,
}

impl Default for BalanceReader {
    fn default() -> Self {
        Self {
            strategies: BalanceStrategy::ALL.to_vec(),
        }
    }
}

impl BalanceReader {
    pub fn new(strategies: Vec<BalanceStrategy>) -> Self {
        Self { strategies }
    }

    pub async fn read(&self, ctx: &NetworkContext) -> Result<U256> {
        let mut failures = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            match strategy.read(ctx, ctx.wallet).await {
                Ok(Some(balance)) => {
                    debug!("Balance read via {} strategy", strategy.as_str());
                    return Ok(balance);
                }
                Ok(None) => failures.push(format!("{}: null result", strategy.as_str())),
                Err(e) => failures.push(format!("{}: {}", strategy.as_str(), e)),
            }
        }

        Err(ClaimError::BalanceUnavailable(failures.join("; ")))
    }
}

/// Reads balance and gas price and turns them into a [`CostEstimate`]
#[derive(Debug, Clone)]
pub struct CostEstimator {
    policy: GasPolicy,
    balances: BalanceReader,
}

impl CostEstimator {
    pub fn new(policy: GasPolicy) -> Self {
        Self {
            policy,
            balances: BalanceReader::default(),
        }
    }

    pub fn with_balance_reader(mut self, balances: BalanceReader) -> Self {
        self.balances = balances;
        self
    }

    pub fn policy(&self) -> &GasPolicy {
        &self.policy
    }

    pub async fn estimate(&self, ctx: &NetworkContext) -> Result<CostEstimate> {
        let balance = self.balances.read(ctx).await?;
        let network_gas_price = ctx.chain.gas_price().await?;
        Ok(CostEstimate::compute(&self.policy, balance, network_gas_price))
    }

    /// Estimate, then compare against one unit cost. With `verbose` the
    /// figures are logged at info level.
    pub async fn estimate_and_check(
        &self,
        ctx: &NetworkContext,
        verbose: bool,
    ) -> Result<FundsCheck> {
        let estimate = self.estimate(ctx).await?;
        let sufficient = estimate.is_sufficient();
        let currency = ctx.network.native_currency;

        if verbose {
            info!("{} balance: {} {}", currency, format_eth(estimate.balance), currency);
            info!(
                "Gas price: {} gwei ({}% of network price)",
                format_gwei(estimate.gas_price),
                self.policy.discount_pct
            );
            info!(
                "Estimated cost per claim: {} {}",
                format_eth(estimate.unit_cost),
                currency
            );
            if sufficient {
                info!(
                    "Balance covers about {} claim(s)",
                    estimate.affordable_count
                );
            } else {
                warn!(
                    "Insufficient {}: need at least {} {}",
                    currency,
                    format_eth(estimate.unit_cost),
                    currency
                );
            }
        } else {
            debug!(
                balance = %estimate.balance,
                unit_cost = %estimate.unit_cost,
                affordable = estimate.affordable_count,
                "Funds check"
            );
        }

        Ok(FundsCheck {
            sufficient,
            estimate,
        })
    }
}

pub fn format_eth(wei: U256) -> String {
    format_units(wei, "ether").unwrap_or_else(|_| wei.to_string())
}

pub fn format_gwei(wei: u128) -> String {
    format_units(U256::from(wei), "gwei").unwrap_or_else(|_| wei.to_string())
}
