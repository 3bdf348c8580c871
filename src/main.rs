//! MoltDuel Game Server
//!
//! Authoritative duel server for MoltDuel. Hosts one rock-paper-scissors
//! session per WebSocket connection; every outcome is computed server-side
//! by the deterministic duel core.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use molt_duel::network::server::{DuelServer, ServerConfig};
use molt_duel::{FAUCET_AMOUNT, FAUCET_COOLDOWN_MS, STAKE, STARTING_BALANCE, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("MoltDuel Server v{}", VERSION);
    info!("Stake per round: {} $DUEL", STAKE);
    info!("Starting balance: {} $DUEL", STARTING_BALANCE);
    info!(
        "Faucet: +{} $DUEL every {}s",
        FAUCET_AMOUNT,
        FAUCET_COOLDOWN_MS / 1000
    );

    let config = ServerConfig::from_env();
    let server = DuelServer::new(config);

    server.run().await.context("duel server failed")?;

    Ok(())
}
