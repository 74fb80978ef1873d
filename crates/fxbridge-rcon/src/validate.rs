//! Pre-flight validation of commands before they reach the transport
//!
//! Empty commands and shell-style destructive invocations are rejected
//! here and never transmitted.

use fxbridge_core::{ErrorCode, ToolResponse};

/// Validate `command` before transmission. `None` means the command may be
/// sent; `Some` is the rejection envelope to hand back to the caller.
pub fn validate(command: &str) -> Option<ToolResponse> {
    if command.trim().is_empty() {
        return Some(ToolResponse::err(
            ErrorCode::InvalidArguments,
            "Command cannot be empty",
            None,
        ));
    }

    if is_destructive(command) {
        return Some(ToolResponse::err(
            ErrorCode::PermissionDenied,
            "Command contains potentially dangerous operations",
            None,
        ));
    }

    None
}

/// Denylist of destructive shell-style patterns: recursive delete, disk
/// format, host shutdown/reboot.
fn is_destructive(command: &str) -> bool {
    let lower = command.to_lowercase();

    if lower.contains("shutdown") || lower.contains("reboot") {
        return true;
    }
    if word_before_whitespace(&lower, "format") {
        return true;
    }

    let tokens: Vec<&str> = lower.split_whitespace().collect();
    tokens.windows(2).any(|pair| {
        (pair[0] == "rm" && pair[1].starts_with("-rf"))
            || (pair[0] == "del" && (pair[1].starts_with("/s") || pair[1].starts_with("/q")))
    })
}

/// True when `word` occurs followed by whitespace (so `format c:` matches
/// but `reformatted` does not).
fn word_before_whitespace(lower: &str, word: &str) -> bool {
    lower.match_indices(word).any(|(at, _)| {
        lower[at + word.len()..]
            .chars()
            .next()
            .is_some_and(char::is_whitespace)
    })
}
