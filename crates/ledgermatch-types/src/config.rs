//! Configuration types for the LedgerMatch agent.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{LedgerMatchError, Result, constants};

/// Ledger network selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network name (`testnet`, `mainnet`, `localnet`, ...).
    pub network_id: String,
    /// JSON-RPC endpoint of a node on that network.
    pub node_url: String,
}

impl NetworkConfig {
    /// Network with the public RPC endpoint for well-known names.
    ///
    /// Unknown names get the testnet-style URL pattern; override
    /// `node_url` for private deployments.
    #[must_use]
    pub fn for_network(network_id: &str) -> Self {
        let node_url = match network_id {
            "localnet" => "http://127.0.0.1:3030".to_string(),
            other => format!("https://rpc.{other}.near.org"),
        };
        Self {
            network_id: network_id.to_string(),
            node_url,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::for_network(constants::DEFAULT_NETWORK)
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = LedgerMatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(LedgerMatchError::Configuration(format!(
                "unknown log format '{other}'"
            ))),
        }
    }
}

/// Full agent configuration, resolved from CLI flags and environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Account of the order-book contract.
    pub contract_id: String,
    /// Account that signs `execute` calls.
    pub account_id: String,
    /// Network and RPC endpoint.
    pub network: NetworkConfig,
    /// Report matches without submitting them.
    pub dry_run: bool,
    /// Fixed delay between cycles.
    pub poll_interval_ms: u64,
    /// `limit` for each `get_orders` page.
    pub page_size: u64,
    /// Duplicate-submission window; 0 disables the quarantine.
    pub quarantine_secs: u64,
    /// Log filter directive (`info`, `debug`, `ledgermatch_agent=trace`, ...).
    pub log_level: String,
    pub log_format: LogFormat,
    /// Credentials file; `None` means the default NEAR location.
    pub credentials_path: Option<PathBuf>,
}

impl AgentConfig {
    /// Config with defaults for everything except the two account ids.
    #[must_use]
    pub fn new(contract_id: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            contract_id: contract_id.into(),
            account_id: account_id.into(),
            network: NetworkConfig::default(),
            dry_run: false,
            poll_interval_ms: constants::DEFAULT_POLL_INTERVAL_MS,
            page_size: constants::DEFAULT_PAGE_SIZE,
            quarantine_secs: constants::DEFAULT_QUARANTINE_SECS,
            log_level: constants::DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::default(),
            credentials_path: None,
        }
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn quarantine_window(&self) -> Duration {
        Duration::from_secs(self.quarantine_secs)
    }

    /// Reject configurations the agent cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.contract_id.trim().is_empty() {
            return Err(LedgerMatchError::Configuration(
                "contract id must not be empty".into(),
            ));
        }
        if self.account_id.trim().is_empty() {
            return Err(LedgerMatchError::Configuration(
                "account id must not be empty".into(),
            ));
        }
        if self.network.node_url.trim().is_empty() {
            return Err(LedgerMatchError::Configuration(
                "node url must not be empty".into(),
            ));
        }
        if self.page_size == 0 {
            return Err(LedgerMatchError::Configuration(
                "page size must be > 0".into(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(LedgerMatchError::Configuration(
                "poll interval must be > 0".into(),
            ));
        }
        Ok(())
    }
}
