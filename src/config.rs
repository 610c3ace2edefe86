//! Configuration for the paygate checkout pipeline
//!
//! All configuration is loaded from TOML files with environment variable
//! overrides via dotenv. Every knob has a default matching the observed
//! production behavior, so an empty config file is valid.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use solana_sdk::pubkey::Pubkey;

use crate::composer::errors::ComposeError;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Ledger RPC configuration
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Swap aggregator configuration
    #[serde(default)]
    pub aggregator: AggregatorConfig,

    /// Checkout / settlement configuration
    #[serde(default)]
    pub checkout: CheckoutConfig,

    /// Confirmation watcher configuration
    #[serde(default)]
    pub watcher: WatcherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Ledger RPC endpoint
    #[serde(default = "default_rpc_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Base URL of the swap aggregator API
    #[serde(default = "default_aggregator_base_url")]
    pub base_url: String,

    /// Per-call timeout in seconds. Applies to each external call separately,
    /// so one slow call cannot consume the whole composition budget.
    #[serde(default = "default_aggregator_timeout")]
    pub timeout_secs: u64,

    /// Slippage tolerance for the exact-out quote (basis points)
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u16,

    /// Let the aggregator size the compute unit limit per route
    #[serde(default = "default_true")]
    pub dynamic_compute_unit_limit: bool,

    /// Let the aggregator adapt slippage per route
    #[serde(default = "default_true")]
    pub dynamic_slippage: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Settlement stablecoin mint (defaults to USDC)
    #[serde(default = "default_settlement_mint")]
    pub settlement_mint: String,

    /// Decimal exponent of the settlement mint
    #[serde(default = "default_settlement_decimals")]
    pub settlement_decimals: u8,

    /// Network-priority tip appended to each checkout transaction (lamports)
    #[serde(default = "default_fee_tip_lamports")]
    pub fee_tip_lamports: u64,

    /// Operator account receiving the tip transfer
    #[serde(default = "default_fee_tip_recipient")]
    pub fee_tip_recipient: String,

    /// Message returned to the wallet alongside the transaction
    #[serde(default = "default_checkout_message")]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Fixed poll interval in milliseconds. Sub-second keeps the UI
    /// responsive; the bound avoids hammering the RPC endpoint.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

// Default value functions
fn default_rpc_endpoint() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}
fn default_rpc_timeout() -> u64 {
    30
}
fn default_aggregator_base_url() -> String {
    "https://api.jup.ag/swap/v1".to_string()
}
fn default_aggregator_timeout() -> u64 {
    10
}
fn default_slippage_bps() -> u16 {
    50
}
fn default_settlement_mint() -> String {
    // USDC
    "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string()
}
fn default_settlement_decimals() -> u8 {
    6
}
fn default_fee_tip_lamports() -> u64 {
    8_000
}
fn default_fee_tip_recipient() -> String {
    "HFqU5x63VTqvQss8hp11i4wVV8bD44PvwucfZ2bU7gRe".to_string()
}
fn default_checkout_message() -> String {
    "Thank you for your purchase!".to_string()
}
fn default_poll_interval_ms() -> u64 {
    500
}
fn default_true() -> bool {
    true
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: default_rpc_endpoint(),
            timeout_secs: default_rpc_timeout(),
        }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            base_url: default_aggregator_base_url(),
            timeout_secs: default_aggregator_timeout(),
            slippage_bps: default_slippage_bps(),
            dynamic_compute_unit_limit: true,
            dynamic_slippage: true,
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            settlement_mint: default_settlement_mint(),
            settlement_decimals: default_settlement_decimals(),
            fee_tip_lamports: default_fee_tip_lamports(),
            fee_tip_recipient: default_fee_tip_recipient(),
            message: default_checkout_message(),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_file(path)
    }
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AggregatorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CheckoutConfig {
    /// Parse the configured settlement mint
    pub fn settlement_mint(&self) -> Result<Pubkey, ComposeError> {
        Pubkey::from_str(&self.settlement_mint).map_err(|e| {
            ComposeError::Validation(format!(
                "invalid settlement mint '{}': {e}",
                self.settlement_mint
            ))
        })
    }

    /// Parse the configured tip recipient
    pub fn fee_tip_recipient(&self) -> Result<Pubkey, ComposeError> {
        Pubkey::from_str(&self.fee_tip_recipient).map_err(|e| {
            ComposeError::Validation(format!(
                "invalid fee tip recipient '{}': {e}",
                self.fee_tip_recipient
            ))
        })
    }
}

impl WatcherConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
