use alloy::primitives::{Bytes, TxHash, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An unclaimed reward as listed by the reward service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEntry {
    pub id: String,
    /// Content hash the claim is made for
    pub hash: String,
    pub observed_at: DateTime<Utc>,
}

impl RewardEntry {
    /// First 10 characters of the hash, for logs
    pub fn short_hash(&self) -> &str {
        short_hash(&self.hash)
    }
}

pub fn short_hash(hash: &str) -> &str {
    match hash.char_indices().nth(10) {
        Some((idx, _)) => &hash[..idx],
        None => hash,
    }
}

/// Service-issued signature entitling the wallet to claim one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub for_hash: String,
    pub signature: Bytes,
}

/// Why a claim did not go through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The node refused the transaction
    Rejected,
    /// Mined but reverted
    Reverted,
    /// Sent, but the receipt could not be obtained
    Confirmation,
    /// The network reported the wallet cannot pay
    InsufficientFunds,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Rejected => "rejected",
            FailureKind::Reverted => "reverted",
            FailureKind::Confirmation => "confirmation",
            FailureKind::InsufficientFunds => "insufficient_funds",
        }
    }

    /// Classify a node/provider error message
    pub fn classify(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("insufficient funds")
            || lower.contains("insufficient balance")
            || lower.contains("exceeds balance")
        {
            FailureKind::InsufficientFunds
        } else {
            FailureKind::Rejected
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one claim attempt
#[derive(Debug, Clone)]
pub struct ClaimOutcome {
    pub entry: RewardEntry,
    pub succeeded: bool,
    pub tx_reference: Option<TxHash>,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
    /// value + gas_used * effective gas price, when confirmed
    pub realized_cost: Option<U256>,
    pub failure: Option<FailureKind>,
    pub reason: Option<String>,
}

impl ClaimOutcome {
    pub fn failed(entry: RewardEntry, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            entry,
            succeeded: false,
            tx_reference: None,
            block_number: None,
            gas_used: None,
            realized_cost: None,
            failure: Some(kind),
            reason: Some(reason.into()),
        }
    }

    pub fn is_funds_failure(&self) -> bool {
        self.failure == Some(FailureKind::InsufficientFunds)
    }
}
