//! fxbridge-server: MCP server for FXServer administration
//!
//! This binary connects to an FXServer RCON endpoint using environment
//! configuration, then exposes plugin lifecycle, command execution, and
//! log retrieval tools through the Model Context Protocol over stdio.

use anyhow::{Context, Result, bail};
use fxbridge_server::{BridgeConfig, FileLogStore, FxBridgeServer, ServerManager};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP transport; logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = BridgeConfig::from_env();
    if !config.has_auto_connect() {
        bail!(
            "RCON_ADDRESS, RCON_PORT and RCON_PASSWORD must be set; \
             cannot start without a server connection"
        );
    }

    let rcon = config.rcon();
    let address = rcon.address();
    let logs = FileLogStore::new(config.logs_dir.clone());

    let manager = ServerManager::new(rcon, logs)?;
    manager
        .connect()
        .await
        .with_context(|| format!("Failed to connect to FXServer at {}", address))?;
    info!("Connected to FXServer at {}", address);

    let server = FxBridgeServer::new(manager);
    server.run_stdio().await?;

    Ok(())
}
