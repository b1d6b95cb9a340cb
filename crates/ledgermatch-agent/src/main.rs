use anyhow::Context;
use clap::Parser;
use ledgermatch_agent::{Cli, PollLoop, logging};
use ledgermatch_ledger::{MatcherKey, NearLedger};
use ledgermatch_types::constants::{AGENT_NAME, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.to_config().context("invalid configuration")?;
    logging::init(&config.log_level, config.log_format)?;

    tracing::info!(
        version = VERSION,
        contract = %config.contract_id,
        account = %config.account_id,
        network = %config.network.network_id,
        node = %config.network.node_url,
        dry_run = config.dry_run,
        "Starting {AGENT_NAME}"
    );

    let key = MatcherKey::resolve(
        &config.account_id,
        &config.network.network_id,
        config.credentials_path.as_deref(),
        cli.private_key.as_deref(),
    );
    let mut ledger = NearLedger::from_config(&config).context("cannot build ledger client")?;
    match key {
        Ok(key) => {
            ledger = ledger.with_signer(key);
            ledger
                .verify_access_key()
                .await
                .context("matcher access key check failed")?;
        }
        // Dry runs never sign, so they can watch the book without a key.
        Err(err) if config.dry_run => {
            tracing::warn!(error = %err, "No signing key; running read-only");
        }
        Err(err) => return Err(err).context("cannot load matcher key"),
    }

    let ledger = std::sync::Arc::new(ledger);
    let mut poll = PollLoop::new(&config, ledger.clone(), ledger);
    poll.seed().await.context("initial order fetch failed")?;

    tokio::select! {
        () = poll.run() => {}
        res = tokio::signal::ctrl_c() => {
            res.context("cannot listen for shutdown signal")?;
            tracing::info!(cycles = poll.cycle().0, "Shutdown requested");
        }
    }
    Ok(())
}
