//! # fxbridge-core
//!
//! Core types for the fxbridge FXServer administration bridge.
//!
//! This crate provides the foundational types used across the workspace:
//! - The `BridgeError` enum and `Result` alias
//! - The stable error-code taxonomy shared with tool consumers
//! - The uniform `ToolResponse` envelope every operation resolves to

pub mod error;
pub mod response;

pub use error::{BridgeError, Result};
pub use response::{ErrorCode, ErrorDetail, ToolResponse};
