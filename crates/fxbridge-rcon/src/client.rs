//! UDP session client for the RCON protocol
//!
//! One client owns one datagram socket and one {host, port, password}
//! descriptor. The wire format has no request ids, so correlation is
//! positional: the socket lock is held for the entire request/reply
//! exchange and a second caller simply waits its turn.

use crate::frame;
use fxbridge_core::{BridgeError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio::time::{Duration, timeout};
use tracing::{debug, info, warn};

/// Largest reply datagram we accept
const MAX_DATAGRAM: usize = 65536;

/// Connection descriptor for one RCON session. Immutable after the client
/// is constructed.
#[derive(Debug, Clone)]
pub struct RconConfig {
    /// Server host
    pub host: String,
    /// Server game port (RCON shares it)
    pub port: u16,
    /// Password embedded in every request
    pub password: String,
    /// Reply deadline for a single command
    pub timeout: Duration,
}

impl Default for RconConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 30120,
            password: String::new(),
            timeout: Duration::from_millis(5000),
        }
    }
}

impl RconConfig {
    /// Create a descriptor with the default reply deadline
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
            ..Default::default()
        }
    }

    /// `host:port` form used for socket connects and log lines
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// RCON client for communicating with an FXServer console
#[derive(Debug)]
pub struct RconClient {
    /// Datagram socket, held across the whole request/reply exchange so at
    /// most one request is ever in flight
    socket: Mutex<Option<UdpSocket>>,
    /// Connection descriptor
    config: RconConfig,
    /// Whether the password probe succeeded
    connected: AtomicBool,
}

impl RconClient {
    /// Create a new client. No traffic happens until `open` or `connect`.
    pub fn new(config: RconConfig) -> Self {
        Self {
            socket: Mutex::new(None),
            config,
            connected: AtomicBool::new(false),
        }
    }

    /// Bind the datagram socket and point it at the server. Idempotent.
    pub async fn open(&self) -> Result<()> {
        let mut guard = self.socket.lock().await;
        if guard.is_some() {
            return Ok(());
        }

        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| BridgeError::Socket(format!("bind failed: {}", e)))?;
        socket
            .connect((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|e| {
                BridgeError::Socket(format!("connect to {} failed: {}", self.config.address(), e))
            })?;

        *guard = Some(socket);
        Ok(())
    }

    /// Probe the server and verify the password.
    ///
    /// The protocol has no auth handshake. The only signal it offers is
    /// whether a probe command comes back with a "Bad rcon" complaint, so
    /// we send `version` and inspect the reply.
    pub async fn connect(&self) -> Result<()> {
        info!("Connecting to FXServer at {}", self.config.address());

        let probe = async {
            self.open().await?;
            self.send("version").await
        };
        let reply = probe.await.map_err(|e| {
            BridgeError::Connection(format!("Failed to connect to FXServer: {}", e))
        })?;

        if reply.contains("Bad rcon") {
            self.connected.store(false, Ordering::SeqCst);
            return Err(BridgeError::Connection("Invalid RCON password".to_string()));
        }

        self.connected.store(true, Ordering::SeqCst);
        info!("RCON session established: {}", reply);

        Ok(())
    }

    /// Check whether the password probe succeeded
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Send one command with the configured reply deadline
    pub async fn send(&self, command: &str) -> Result<String> {
        self.send_timeout(command, self.config.timeout).await
    }

    /// Send one command and wait for the correlated reply.
    ///
    /// The transport treats the next inbound datagram as the reply to this
    /// request, so the receive buffer is drained of stale datagrams before
    /// transmitting. Transmit failure rejects immediately; deadline expiry
    /// rejects with a timeout naming the command. No retry happens at this
    /// layer.
    pub async fn send_timeout(&self, command: &str, deadline: Duration) -> Result<String> {
        let guard = self.socket.lock().await;
        let socket = guard
            .as_ref()
            .ok_or_else(|| BridgeError::Socket("not connected".to_string()))?;

        drain_stale(socket);

        let request = frame::encode(command, &self.config.password);
        socket
            .send(&request)
            .await
            .map_err(|e| BridgeError::Socket(format!("send failed: {}", e)))?;
        debug!("RCON request: {}", command);

        let mut buf = vec![0u8; MAX_DATAGRAM];
        let len = match timeout(deadline, socket.recv(&mut buf)).await {
            Ok(Ok(len)) => len,
            Ok(Err(e)) => return Err(BridgeError::Socket(format!("recv failed: {}", e))),
            Err(_) => {
                warn!("RCON reply deadline expired for: {}", command);
                return Err(BridgeError::Timeout(command.to_string()));
            }
        };

        let reply = frame::decode(&buf[..len]);
        debug!(
            "RCON reply ({} bytes): {}",
            len,
            reply.chars().take(100).collect::<String>()
        );
        Ok(reply)
    }

    /// Release the socket. Safe to call repeatedly; a later `send` fails
    /// with a socket error instead of hanging.
    pub async fn close(&self) {
        if self.socket.lock().await.take().is_some() {
            info!("RCON session closed");
        }
        self.connected.store(false, Ordering::SeqCst);
    }
}

/// Discard datagrams left over from a request whose deadline already fired,
/// so they are not read as the reply to the next command.
fn drain_stale(socket: &UdpSocket) {
    let mut buf = [0u8; MAX_DATAGRAM];
    while let Ok(len) = socket.try_recv(&mut buf) {
        warn!("Discarding stale RCON datagram ({} bytes)", len);
    }
}
