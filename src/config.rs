use alloy::primitives::utils::parse_ether;
use alloy::primitives::U256;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Network key (e.g., "base")
    #[serde(default = "default_network")]
    pub network: String,
    /// Preferred RPC endpoint, tried before the network's built-in list
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Claim contract override
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub claim: ClaimConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the reward service
    pub base_url: String,
    /// Max entries requested per listing
    pub listing_limit: u32,
    /// Transport-level request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.basedblocks.xyz".to_string(),
            listing_limit: 50,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimConfig {
    /// Value sent with every claim, in ether (e.g., "0.00003")
    pub value_eth: String,
    /// Gas limit for one claim transaction
    pub gas_limit: u64,
    /// Percentage of the network gas price actually bid (e.g., 85)
    pub gas_price_discount_pct: u64,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            value_eth: "0.00003".to_string(),
            gas_limit: 250_000,
            gas_price_discount_pct: 85,
        }
    }
}

impl ClaimConfig {
    /// Claim value in wei
    pub fn value_wei(&self) -> Result<U256, String> {
        parse_ether(self.value_eth.trim()).map_err(|e| {
            format!(
                "claim.value_eth '{}' is not a valid amount: {}",
                self.value_eth, e
            )
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between the end of one cycle and the start of the next
    pub interval_secs: u64,
    /// Pause between claims inside a cycle, in milliseconds
    pub item_delay_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            item_delay_ms: 3000,
        }
    }
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_network() -> String {
    "base".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            rpc_url: None,
            contract_address: None,
            api: ApiConfig::default(),
            claim: ClaimConfig::default(),
            schedule: ScheduleConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let defaults = AppConfig::default();

        let builder = Config::builder()
            // Start with default values
            .set_default("network", defaults.network)?
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.listing_limit", defaults.api.listing_limit)?
            .set_default("api.timeout_secs", defaults.api.timeout_secs)?
            .set_default("claim.value_eth", defaults.claim.value_eth)?
            .set_default("claim.gas_limit", defaults.claim.gas_limit)?
            .set_default(
                "claim.gas_price_discount_pct",
                defaults.claim.gas_price_discount_pct,
            )?
            .set_default("schedule.interval_secs", defaults.schedule.interval_secs)?
            .set_default("schedule.item_delay_ms", defaults.schedule.item_delay_ms)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("CLAIMER_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (CLAIMER_SCHEDULE__INTERVAL_SECS, etc.)
            .add_source(
                Environment::with_prefix("CLAIMER")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.network.trim().is_empty() {
            errors.push("network must not be empty".to_string());
        }

        match self.claim.value_wei() {
            Ok(v) if v.is_zero() => errors.push("claim.value_eth must be positive".to_string()),
            Ok(_) => {}
            Err(e) => errors.push(e),
        }

        if self.claim.gas_limit == 0 {
            errors.push("claim.gas_limit must be positive".to_string());
        }

        if self.claim.gas_price_discount_pct == 0 || self.claim.gas_price_discount_pct > 100 {
            errors.push("claim.gas_price_discount_pct must be between 1 and 100".to_string());
        }

        if self.schedule.interval_secs == 0 {
            errors.push("schedule.interval_secs must be positive".to_string());
        }

        if self.api.listing_limit == 0 {
            errors.push("api.listing_limit must be positive".to_string());
        }

        if let Err(e) = url::Url::parse(&self.api.base_url) {
            errors.push(format!("api.base_url is not a valid URL: {e}"));
        }

        if let Some(rpc) = &self.rpc_url {
            if let Err(e) = url::Url::parse(rpc) {
                errors.push(format!("rpc_url is not a valid URL: {e}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
