use thiserror::Error;

/// Main error type for the claimer
#[derive(Error, Debug)]
pub enum ClaimError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    // Endpoint selection
    #[error("No available endpoint for {network} (tried {tried} candidate(s))")]
    NoAvailableEndpoint { network: String, tried: usize },

    // Funds
    #[error("Balance unavailable: {0}")]
    BalanceUnavailable(String),

    // Reward service errors
    #[error("Reward source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Authorization unavailable: {0}")]
    AuthorizationUnavailable(String),

    // Chain errors
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Claim submission failed: {0}")]
    SubmissionFailed(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Crypto/signing errors
    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Address parsing error: {0}")]
    AddressParsing(String),

    // Operator declined to continue at startup
    #[error("Aborted: {0}")]
    Aborted(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ClaimError {
    /// Failures that end the process when they happen during startup.
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            ClaimError::NoAvailableEndpoint { .. }
                | ClaimError::Wallet(_)
                | ClaimError::AddressParsing(_)
                | ClaimError::Config(_)
                | ClaimError::InvalidConfig(_)
                | ClaimError::UnknownNetwork(_)
        )
    }
}

/// Result type alias for ClaimError
pub type Result<T> = std::result::Result<T, ClaimError>;
