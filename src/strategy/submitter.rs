//! Sends one claim and waits for it to be mined.
//!
//! Never returns an error: every failure is folded into a
//! [`ClaimOutcome`] so the batch can move on to the next entry.
//! A claim whose send-time cost exceeds the balance the caller just
//! observed is never sent.

use alloy::primitives::U256;
use tracing::{error, info, warn};

use crate::adapters::ClaimRequest;
use crate::domain::{Authorization, ClaimOutcome, FailureKind, NetworkContext, RewardEntry};
use crate::error::ClaimError;
use crate::strategy::cost::{format_eth, format_gwei, GasPolicy};

#[derive(Debug, Clone)]
pub struct ClaimSubmitter {
    policy: GasPolicy,
}

impl ClaimSubmitter {
    pub fn new(policy: GasPolicy) -> Self {
        Self { policy }
    }

    /// `observed_balance` is the balance read by the caller's pre-check
    pub async fn submit(
        &self,
        ctx: &NetworkContext,
        entry: &RewardEntry,
        authorization: &Authorization,
        observed_balance: U256,
    ) -> ClaimOutcome {
        // Priced at send time; the cycle's estimate may be stale by now
        let network_gas_price = match ctx.chain.gas_price().await {
            Ok(p) => p,
            Err(e) => {
                return ClaimOutcome::failed(
                    entry.clone(),
                    FailureKind::Rejected,
                    format!("gas price unavailable: {}", e),
                )
            }
        };
        let gas_price = self.policy.discounted_gas_price(network_gas_price);
        let unit_cost = self.policy.unit_cost(gas_price);

        if unit_cost > observed_balance {
            warn!(
                "Gas price rose to {} gwei, claim now costs {} ETH but balance is {} ETH",
                format_gwei(gas_price),
                format_eth(unit_cost),
                format_eth(observed_balance)
            );
            return ClaimOutcome::failed(
                entry.clone(),
                FailureKind::InsufficientFunds,
                format!(
                    "insufficient funds at send time: cost {} wei exceeds balance {} wei",
                    unit_cost, observed_balance
                ),
            );
        }

        let request = ClaimRequest {
            contract: ctx.contract,
            hash: entry.hash.clone(),
            signature: authorization.signature.clone(),
            value: self.policy.claim_value,
            gas_limit: self.policy.gas_limit,
            gas_price,
        };

        info!(
            "Claiming reward (hash: {}..., gas price {} gwei)",
            entry.short_hash(),
            format_gwei(gas_price)
        );

        let tx_hash = match ctx.chain.send_claim(&request).await {
            Ok(h) => h,
            Err(e) => {
                let reason = match e {
                    ClaimError::SubmissionFailed(msg) => msg,
                    other => other.to_string(),
                };
                let kind = FailureKind::classify(&reason);
                error!(
                    "Claim tx rejected (hash: {}...): {}",
                    entry.short_hash(),
                    reason
                );
                return ClaimOutcome::failed(entry.clone(), kind, reason);
            }
        };
        info!("Claim tx submitted: {}", tx_hash);

        let receipt = match ctx.chain.wait_for_receipt(tx_hash).await {
            Ok(r) => r,
            Err(e) => {
                error!("Claim tx {} not confirmed: {}", tx_hash, e);
                let mut outcome =
                    ClaimOutcome::failed(entry.clone(), FailureKind::Confirmation, e.to_string());
                outcome.tx_reference = Some(tx_hash);
                return outcome;
            }
        };

        let realized_cost = self.policy.claim_value
            + U256::from(receipt.gas_used) * U256::from(receipt.effective_gas_price);

        if !receipt.success {
            warn!(
                "Claim tx {} reverted in block {:?}",
                tx_hash, receipt.block_number
            );
            // value is refunded on revert, gas is not
            let gas_cost = U256::from(receipt.gas_used) * U256::from(receipt.effective_gas_price);
            return ClaimOutcome {
                entry: entry.clone(),
                succeeded: false,
                tx_reference: Some(tx_hash),
                block_number: receipt.block_number,
                gas_used: Some(receipt.gas_used),
                realized_cost: Some(gas_cost),
                failure: Some(FailureKind::Reverted),
                reason: Some("transaction reverted".to_string()),
            };
        }

        info!(
            "Claim confirmed in block {:?}, gas used {} | {}",
            receipt.block_number,
            receipt.gas_used,
            ctx.network.tx_url(tx_hash)
        );

        ClaimOutcome {
            entry: entry.clone(),
            succeeded: true,
            tx_reference: Some(tx_hash),
            block_number: receipt.block_number,
            gas_used: Some(receipt.gas_used),
            realized_cost: Some(realized_cost),
            failure: None,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::chain::mock::{MockChain, MockConnector};
    use crate::domain::BASE;
    use alloy::primitives::{Address, Bytes};
    use chrono::Utc;
    use std::sync::Arc;

    fn fixture(chain: Arc<MockChain>) -> (NetworkContext, RewardEntry, Authorization) {
        let ctx = NetworkContext {
            network: &BASE,
            chain,
            connector: Arc::new(MockConnector::default()),
            endpoints: vec!["http://node".to_string()],
            wallet: Address::ZERO,
            contract: Address::repeat_byte(0x11),
        };
        let entry = RewardEntry {
            id: "1".into(),
            hash: "0xfeedfacecafebeef".into(),
            observed_at: Utc::now(),
        };
        let auth = Authorization {
            for_hash: entry.hash.clone(),
            signature: Bytes::from(vec![1u8, 2, 3]),
        };
        (ctx, entry, auth)
    }

    fn one_ether() -> U256 {
        U256::from(10u64).pow(U256::from(18))
    }

    #[tokio::test]
    async fn test_submit_prices_at_send_time() {
        let chain = Arc::new(MockChain::new("http://node", one_ether(), 2_000));
        let (ctx, entry, auth) = fixture(chain.clone());

        let outcome = ClaimSubmitter::new(GasPolicy::default())
            .submit(&ctx, &entry, &auth, one_ether())
            .await;

        assert!(outcome.succeeded);
        assert!(outcome.tx_reference.is_some());
        let state = chain.state.lock().unwrap();
        let sent = &state.sent[0];
        assert_eq!(sent.gas_price, 1_700);
        assert_eq!(sent.gas_limit, 250_000);
        assert_eq!(sent.hash, entry.hash);
        assert_eq!(sent.signature, auth.signature);
        assert_eq!(sent.contract, Address::repeat_byte(0x11));
    }

    #[tokio::test]
    async fn test_funds_rejection_is_classified() {
        let chain = Arc::new(MockChain::new("http://node", U256::ZERO, 1));
        chain.state.lock().unwrap().send_error =
            Some("insufficient funds for gas * price + value".to_string());
        let (ctx, entry, auth) = fixture(chain);

        let outcome = ClaimSubmitter::new(GasPolicy::default())
            .submit(&ctx, &entry, &auth, one_ether())
            .await;

        assert!(!outcome.succeeded);
        assert!(outcome.is_funds_failure());
        assert!(outcome.reason.unwrap().contains("insufficient funds"));
    }

    #[tokio::test]
    async fn test_revert_is_reported_not_raised() {
        let chain = Arc::new(MockChain::new("http://node", one_ether(), 1));
        chain.state.lock().unwrap().revert = true;
        let (ctx, entry, auth) = fixture(chain);

        let outcome = ClaimSubmitter::new(GasPolicy::default())
            .submit(&ctx, &entry, &auth, one_ether())
            .await;

        assert!(!outcome.succeeded);
        assert_eq!(outcome.failure, Some(FailureKind::Reverted));
        assert!(outcome.tx_reference.is_some());
    }

    #[tokio::test]
    async fn test_price_rise_above_observed_balance_is_not_sent() {
        let policy = GasPolicy::default();
        let balance = policy.unit_cost(policy.discounted_gas_price(1_000_000_000));
        let chain = Arc::new(MockChain::new("http://node", balance, 2_000_000_000));
        let (ctx, entry, auth) = fixture(chain.clone());

        let outcome = ClaimSubmitter::new(policy)
            .submit(&ctx, &entry, &auth, balance)
            .await;

        assert!(!outcome.succeeded);
        assert_eq!(outcome.failure, Some(FailureKind::InsufficientFunds));
        assert!(outcome.tx_reference.is_none());
        assert_eq!(chain.sent_count(), 0);
    }
}
