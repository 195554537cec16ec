use crate::error::{ClaimError, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::str::FromStr;
use tracing::info;
use zeroize::Zeroize;

/// Environment variables checked for the signing key, in order
pub const PRIVATE_KEY_VARS: &[&str] = &["WALLET_PRIVATE_KEY", "PRIVATE_KEY"];

/// Wallet that signs claim transactions
///
/// # Security
/// The hex key is zeroized right after the signer is built and is never
/// stored in this struct. `Debug` only shows the address.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a private key hex string (with or without `0x`)
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let mut secure_key = private_key.trim().trim_start_matches("0x").to_string();

        let parsed = PrivateKeySigner::from_str(&secure_key);
        secure_key.zeroize();

        let signer = parsed.map_err(|e| ClaimError::Wallet(format!("Invalid private key: {}", e)))?;
        info!("Wallet initialized: {}", signer.address());

        Ok(Self { signer })
    }

    /// Create a wallet from `WALLET_PRIVATE_KEY` (or `PRIVATE_KEY`)
    pub fn from_env() -> Result<Self> {
        let mut private_key = PRIVATE_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| {
                ClaimError::Wallet(format!(
                    "No signing key set. Put it in {} (or {})",
                    PRIVATE_KEY_VARS[0], PRIVATE_KEY_VARS[1]
                ))
            })?;

        let result = Self::from_private_key(&private_key);
        private_key.zeroize();

        result
    }

    /// Get the wallet address
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signer wrapped for alloy providers
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish()
    }
}
