//! # fxbridge-server
//!
//! MCP server implementation for FXServer administration.
//!
//! This crate provides:
//! - MCP JSON-RPC protocol handling over stdio
//! - Tool definitions and dispatch (plugin lifecycle, command execution,
//!   log retrieval)
//! - The server manager owning the RCON client and operation history
//! - The `LogStore` collaborator for tailing server log files

pub mod config;
pub mod logs;
pub mod manager;
pub mod mcp;
pub mod oplog;
pub mod stdio;
pub mod tools;

pub use config::BridgeConfig;
pub use logs::{FileLogStore, LogStore};
pub use manager::ServerManager;

use fxbridge_core::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// MCP server wrapping a server manager
pub struct FxBridgeServer<L: LogStore> {
    pub(crate) manager: Arc<RwLock<ServerManager<L>>>,
}

impl<L: LogStore> FxBridgeServer<L> {
    /// Create a new server around an already-connected manager
    pub fn new(manager: ServerManager<L>) -> Self {
        Self {
            manager: Arc::new(RwLock::new(manager)),
        }
    }

    /// Run the server on stdio transport until the client disconnects
    pub async fn run_stdio(self) -> Result<()> {
        stdio::run(self).await
    }
}
