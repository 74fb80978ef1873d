//! Session tests against fake loopback peers
//!
//! Each test spins up a real UDP socket on an ephemeral port and scripts
//! the peer's behavior: banner replies, bad-password complaints, silence,
//! deliberately late replies.

use fxbridge_rcon::{RconClient, RconConfig, frame};
use std::time::Duration;
use tokio::net::UdpSocket;

/// Spawn a peer that answers every request with `reply` (marker-framed).
async fn fake_server(reply: &'static str) -> u16 {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut buf = [0u8; 1024];
        loop {
            let Ok((_, peer)) = socket.recv_from(&mut buf).await else {
                break;
            };
            let mut out = frame::MARKER.to_vec();
            out.extend_from_slice(reply.as_bytes());
            let _ = socket.send_to(&out, peer).await;
        }
    });
    port
}

fn config(port: u16, timeout_ms: u64) -> RconConfig {
    RconConfig {
        host: "127.0.0.1".to_string(),
        port,
        password: "hunter2".to_string(),
        timeout: Duration::from_millis(timeout_ms),
    }
}

#[tokio::test]
async fn connect_accepts_a_version_banner() {
    let port = fake_server("FXServer, version 1.2.3").await;
    let client = RconClient::new(config(port, 1000));

    client.connect().await.unwrap();
    assert!(client.is_connected());
}

#[tokio::test]
async fn connect_rejects_a_bad_password() {
    let port = fake_server("Bad rcon password").await;
    let client = RconClient::new(config(port, 1000));

    let err = client.connect().await.unwrap_err();
    assert!(err.to_string().contains("Invalid RCON password"));
    assert!(!client.is_connected());
}

#[tokio::test]
async fn send_round_trips_through_the_codec() {
    // Peer echoes the raw request datagram back, so the decoded reply is
    // the request payload itself.
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut buf = [0u8; 1024];
        while let Ok((len, peer)) = socket.recv_from(&mut buf).await {
            let _ = socket.send_to(&buf[..len], peer).await;
        }
    });

    let client = RconClient::new(config(port, 1000));
    client.open().await.unwrap();
    let reply = client.send("status").await.unwrap();
    assert_eq!(reply, "rcon hunter2 status");
}

#[tokio::test]
async fn send_times_out_naming_the_command() {
    // Bound but silent peer.
    let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = silent.local_addr().unwrap().port();

    let client = RconClient::new(config(port, 50));
    client.open().await.unwrap();

    let start = std::time::Instant::now();
    let err = client.send("status").await.unwrap_err();
    assert!(start.elapsed() < Duration::from_millis(500));
    assert!(err.to_string().contains("timeout") || err.to_string().contains("Timeout"));
    assert!(err.to_string().contains("status"));
}

#[tokio::test]
async fn close_is_idempotent_and_send_after_close_fails() {
    let port = fake_server("ok").await;
    let client = RconClient::new(config(port, 1000));
    client.open().await.unwrap();

    client.close().await;
    client.close().await;

    let err = client.send("status").await.unwrap_err();
    assert!(err.to_string().contains("not connected"));
}

#[tokio::test]
async fn late_reply_is_not_misattributed_to_the_next_command() {
    // Peer that answers "slow" requests late and everything else promptly.
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut buf = [0u8; 1024];
        while let Ok((len, peer)) = socket.recv_from(&mut buf).await {
            let text = String::from_utf8_lossy(&buf[4..len]).to_string();
            let reply = if text.ends_with("slow") {
                tokio::time::sleep(Duration::from_millis(100)).await;
                "late"
            } else {
                "fresh"
            };
            let mut out = frame::MARKER.to_vec();
            out.extend_from_slice(reply.as_bytes());
            let _ = socket.send_to(&out, peer).await;
        }
    });

    let client = RconClient::new(config(port, 50));
    client.open().await.unwrap();

    assert!(client.send("slow").await.is_err());

    // Let the late reply land in the receive buffer, then issue another
    // command; the stale datagram must be discarded, not returned.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(client.send("fast").await.unwrap(), "fresh");
}
