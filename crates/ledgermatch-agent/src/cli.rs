//! Command-line and environment configuration.
//!
//! Every option can also be set through the environment variable named in
//! its help text; command-line flags win.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use ledgermatch_types::constants::{
    DEFAULT_LOG_LEVEL, DEFAULT_NETWORK, DEFAULT_PAGE_SIZE, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_QUARANTINE_SECS,
};
use ledgermatch_types::{AgentConfig, LogFormat, NetworkConfig, Result};

#[derive(Parser, Debug, Clone)]
#[command(name = "ledgermatch", version)]
#[command(about = "Matches crossing orders on an on-ledger order book", long_about = None)]
pub struct Cli {
    /// Order-book contract account
    #[arg(long, env = "ORDERBOOK_CONTRACT_ID")]
    pub contract_id: String,

    /// Account that signs `execute` calls
    #[arg(long, env = "MATCHER_ACCOUNT_ID")]
    pub account_id: String,

    /// NEAR network name (testnet, mainnet, localnet, ...)
    #[arg(long, env = "NEAR_ENV", default_value = DEFAULT_NETWORK)]
    pub network: String,

    /// JSON-RPC endpoint; derived from the network when omitted
    #[arg(long, env = "NEAR_NODE_URL")]
    pub node_url: Option<String>,

    /// Log matches instead of submitting them
    #[arg(long, env = "DRY_RUN", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    pub dry_run: bool,

    /// Log filter directive (overridden by RUST_LOG)
    #[arg(long, env = "LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Log output format: pretty or json
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    /// Delay between poll cycles
    #[arg(long, env = "POLL_INTERVAL_MS", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,

    /// Orders requested per `get_orders` page
    #[arg(long, env = "PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u64,

    /// Seconds an attempted match stays quarantined (0 disables)
    #[arg(long, env = "QUARANTINE_SECS", default_value_t = DEFAULT_QUARANTINE_SECS)]
    pub quarantine_secs: u64,

    /// NEAR CLI credentials file [default: ~/.near-credentials/<network>/<account>.json]
    #[arg(long, env = "MATCHER_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Signing key `ed25519:<base58>`; takes precedence over the credentials file
    #[arg(long, env = "MATCHER_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,
}

impl Cli {
    /// Build and validate the agent configuration. The private key is not
    /// part of it; read it from [`Cli::private_key`].
    pub fn to_config(&self) -> Result<AgentConfig> {
        let mut network = NetworkConfig::for_network(self.network.trim());
        if let Some(url) = self.node_url.as_deref().filter(|u| !u.trim().is_empty()) {
            network.node_url = url.trim().to_string();
        }

        let config = AgentConfig {
            contract_id: self.contract_id.trim().to_string(),
            account_id: self.account_id.trim().to_string(),
            network,
            dry_run: self.dry_run,
            poll_interval_ms: self.poll_interval_ms,
            page_size: self.page_size,
            quarantine_secs: self.quarantine_secs,
            log_level: self.log_level.clone(),
            log_format: self.log_format,
            credentials_path: self.credentials.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}
