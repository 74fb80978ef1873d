//! RCON client for FXServer-style game servers
//!
//! Implements the legacy Quake-derived datagram RCON protocol:
//!
//! - **Wire format**: UDP datagrams, a fixed 4-byte `0xFFFFFFFF` marker,
//!   no length prefix, no request ids. Requests carry
//!   `"rcon <password> <command>"`; replies are free text.
//! - **Correlation**: positional. At most one request is in flight per
//!   client; the next inbound datagram is the reply to the last request.
//! - **Classification**: free-text replies are mapped to uniform
//!   success/failure envelopes, including structured JSON replies printed
//!   by a cooperating server-side bridge resource.

pub mod classify;
pub mod client;
pub mod frame;
pub mod validate;

pub use classify::{BRIDGE_TAG, classify};
pub use client::{RconClient, RconConfig};
pub use validate::validate;
