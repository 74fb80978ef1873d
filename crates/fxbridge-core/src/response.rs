//! Uniform result envelope for server operations
//!
//! Every administration operation, whether it succeeds, is rejected by the
//! remote console, or fails at the transport, resolves to a `ToolResponse`.
//! Command rejections are data, not errors: callers inspect `success` and
//! `error.code` instead of unwinding.

use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable error identifiers shared with tool consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ConnectionFailed,
    CommandFailed,
    PluginNotFound,
    InvalidCommand,
    Timeout,
    PermissionDenied,
    ResourceNotFound,
    InvalidArguments,
    UnknownError,
}

/// Error payload attached to a failed envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Uniform response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl ToolResponse {
    /// Successful envelope with an optional data payload
    pub fn ok(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            error: None,
        }
    }

    /// Failed envelope; the message doubles as the error message
    pub fn err(code: ErrorCode, message: impl Into<String>, details: Option<Value>) -> Self {
        let message = message.into();
        Self {
            success: false,
            message: message.clone(),
            data: None,
            error: Some(ErrorDetail {
                code,
                message,
                details,
            }),
        }
    }

    /// Fold a transport-level failure into the taxonomy so tool callers can
    /// report it without unwinding
    pub fn from_error(err: &BridgeError, command: &str) -> Self {
        let code = match err {
            BridgeError::Timeout(_) => ErrorCode::Timeout,
            BridgeError::Connection(_) | BridgeError::Socket(_) => ErrorCode::ConnectionFailed,
            _ => ErrorCode::UnknownError,
        };
        Self::err(
            code,
            err.to_string(),
            Some(serde_json::json!({ "command": command })),
        )
    }
}
