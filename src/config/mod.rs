//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the relayer
//! service. Configuration includes target-chain endpoints, retry and polling
//! settings, and API settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// TARGET CHAINS
// ============================================================================

/// Target chain a receipt proof can be relayed to.
///
/// The supported set is fixed; whether a chain is usable at runtime depends
/// on a `[chains.<name>]` block being present in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetChain {
    Polygon,
    Arbitrum,
    Optimism,
}

impl TargetChain {
    /// All chains the relayer knows how to talk to.
    pub const ALL: [TargetChain; 3] = [
        TargetChain::Polygon,
        TargetChain::Arbitrum,
        TargetChain::Optimism,
    ];

    /// Wire name for the chain, as used in configuration and API payloads.
    pub fn name(&self) -> &'static str {
        match self {
            TargetChain::Polygon => "polygon",
            TargetChain::Arbitrum => "arbitrum",
            TargetChain::Optimism => "optimism",
        }
    }

    /// Comma-separated list of supported chain names, for error messages.
    pub fn supported_names() -> String {
        Self::ALL
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TargetChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetChain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "polygon" => Ok(TargetChain::Polygon),
            "arbitrum" => Ok(TargetChain::Arbitrum),
            "optimism" => Ok(TargetChain::Optimism),
            other => Err(anyhow::anyhow!(
                "Unsupported chain '{}'. Supported chains: {}",
                other,
                TargetChain::supported_names()
            )),
        }
    }
}

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all service settings.
///
/// This structure holds configuration for:
/// - Target chain connection details (per-chain, optional)
/// - Relay retry settings
/// - Confirmation monitor settings
/// - API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target chain configuration, one optional block per supported chain
    pub chains: ChainsConfig,
    /// Relay submission settings (retry bound, backoff)
    pub relay: RelayConfig,
    /// Confirmation monitor settings (poll interval, poll budget)
    pub monitor: MonitorConfig,
    /// API server configuration (host, port, CORS, admin token)
    pub api: ApiConfig,
}

/// Per-chain configuration blocks. A chain without a block is treated as
/// unconfigured and relay requests naming it are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainsConfig {
    #[serde(default)]
    pub polygon: Option<ChainConfig>,
    #[serde(default)]
    pub arbitrum: Option<ChainConfig>,
    #[serde(default)]
    pub optimism: Option<ChainConfig>,
}

/// Configuration for a single target chain connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL for the chain
    pub rpc_url: String,
    /// Confirmation depth at which a relayed transaction counts as final.
    /// Chain-specific: faster block production needs a higher threshold.
    pub required_confirmations: u64,
}

/// Relay submission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Name of the chain receipts are anchored on (recorded on every job)
    pub source_chain: String,
    /// Maximum submission attempts per job before the job fails
    pub max_attempts: u32,
    /// Base backoff delay between attempts in milliseconds; the delay grows
    /// linearly with the attempt number
    pub initial_backoff_ms: u64,
    /// Timeout for individual JSON-RPC requests in milliseconds
    pub request_timeout_ms: u64,
}

/// Confirmation monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Polling interval for confirmation checks in milliseconds
    pub poll_interval_ms: u64,
    /// Maximum confirmation polls per job; exhausting the budget times the
    /// job out so no job polls forever
    pub max_poll_ticks: u32,
}

/// API server configuration for external communication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host address to bind the API server to
    pub host: String,
    /// Port number to bind the API server to
    pub port: u16,
    /// Allowed CORS origins for cross-origin requests
    pub cors_origins: Vec<String>,
    /// Bearer token required on relay-triggering and mutating endpoints
    pub admin_token: String,
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Validates the configuration.
    ///
    /// This function ensures that:
    /// - At least one target chain is configured
    /// - Every configured chain requires at least one confirmation
    /// - Retry and polling budgets are non-zero
    /// - The admin token is non-empty
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Configuration is valid
    /// - `Err(anyhow::Error)` - Description of the first violation found
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.configured_chains().is_empty() {
            return Err(anyhow::anyhow!(
                "Configuration error: no target chains configured. Add at least one [chains.<name>] block ({}).",
                TargetChain::supported_names()
            ));
        }

        for chain in self.configured_chains() {
            let chain_config = self.chain(chain).expect("configured chain has a block");
            if chain_config.rpc_url.is_empty() {
                return Err(anyhow::anyhow!(
                    "Configuration error: chains.{} has an empty rpc_url",
                    chain
                ));
            }
            if chain_config.required_confirmations == 0 {
                return Err(anyhow::anyhow!(
                    "Configuration error: chains.{} must require at least 1 confirmation",
                    chain
                ));
            }
        }

        if self.relay.max_attempts == 0 {
            return Err(anyhow::anyhow!(
                "Configuration error: relay.max_attempts must be at least 1"
            ));
        }

        if self.monitor.max_poll_ticks == 0 {
            return Err(anyhow::anyhow!(
                "Configuration error: monitor.max_poll_ticks must be at least 1"
            ));
        }

        if self.api.admin_token.is_empty() {
            return Err(anyhow::anyhow!(
                "Configuration error: api.admin_token must not be empty"
            ));
        }

        Ok(())
    }

    /// Returns the configuration block for a chain, if one is present.
    pub fn chain(&self, chain: TargetChain) -> Option<&ChainConfig> {
        match chain {
            TargetChain::Polygon => self.chains.polygon.as_ref(),
            TargetChain::Arbitrum => self.chains.arbitrum.as_ref(),
            TargetChain::Optimism => self.chains.optimism.as_ref(),
        }
    }

    /// Returns the chains that have a configuration block, in declaration order.
    pub fn configured_chains(&self) -> Vec<TargetChain> {
        TargetChain::ALL
            .iter()
            .copied()
            .filter(|chain| self.chain(*chain).is_some())
            .collect()
    }

    /// Loads configuration from the TOML file.
    ///
    /// This function:
    /// 1. Resolves the config path from `RELAYER_CONFIG_PATH` or the default
    /// 2. Loads and parses the configuration if the file exists
    /// 3. Validates the parsed configuration
    /// 4. Returns an error asking the user to copy the template otherwise
    ///
    /// # Returns
    ///
    /// - `Ok(Config)` - Successfully loaded and validated configuration
    /// - `Err(anyhow::Error)` - Missing file, parse failure, or validation failure
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("RELAYER_CONFIG_PATH")
            .unwrap_or_else(|_| "config/relayer.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/relayer.template.toml config/relayer.toml\n\
                Then edit config/relayer.toml with your actual values.",
                config_path
            ))
        }
    }
}

/// Validates a `0x`-prefixed hex string with an expected byte length.
///
/// Used for content hashes (32 bytes) and transaction hashes.
pub fn validate_hex_value(value: &str, expected_len: usize) -> anyhow::Result<()> {
    let stripped = value
        .strip_prefix("0x")
        .ok_or_else(|| anyhow::anyhow!("Value must be a 0x-prefixed hex string"))?;
    let bytes = hex::decode(stripped).map_err(|_| anyhow::anyhow!("Invalid hex value"))?;
    if bytes.len() != expected_len {
        anyhow::bail!("Invalid value length: expected {} bytes", expected_len);
    }
    Ok(())
}

/// Validates a `0x`-prefixed hex blob of arbitrary non-zero length.
///
/// Used for proof payloads, which vary in size by receipt type.
pub fn validate_hex_blob(value: &str) -> anyhow::Result<()> {
    let stripped = value
        .strip_prefix("0x")
        .ok_or_else(|| anyhow::anyhow!("Value must be a 0x-prefixed hex string"))?;
    let bytes = hex::decode(stripped).map_err(|_| anyhow::anyhow!("Invalid hex value"))?;
    if bytes.is_empty() {
        anyhow::bail!("Hex blob must not be empty");
    }
    Ok(())
}
