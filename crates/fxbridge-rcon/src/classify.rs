//! Classification of raw RCON reply text into result envelopes
//!
//! The console replies with free-form text. A cooperating server-side
//! bridge resource may print a JSON object for richer results; everything
//! else has to be judged from error signatures. Classification is a pure
//! function of (reply text, original command) and keeps no state between
//! calls.

use fxbridge_core::{ErrorCode, ToolResponse};
use serde_json::Value;
use tracing::debug;

/// Tag printed by the cooperating server-side bridge resource
pub const BRIDGE_TAG: &str = "[fxbridge]";

/// Case-insensitive text signature. Probe text is lowercased once before
/// matching, so every needle here is written lowercase.
#[derive(Debug, Clone, Copy)]
enum Signature {
    /// Reply starts with the needle
    Leading(&'static str),
    /// Whole reply equals the needle
    Exact(&'static str),
    /// Reply starts with the first needle and contains the second after it
    LeadingThen(&'static str, &'static str),
    /// Needles appear anywhere in the reply, in order
    AnyThen(&'static str, &'static str),
}

impl Signature {
    fn matches(self, lower: &str) -> bool {
        match self {
            Signature::Leading(needle) => lower.starts_with(needle),
            Signature::Exact(needle) => lower == needle,
            Signature::LeadingThen(lead, rest) => {
                lower.starts_with(lead) && lower[lead.len()..].contains(rest)
            }
            Signature::AnyThen(first, second) => match lower.find(first) {
                Some(at) => lower[at + first.len()..].contains(second),
                None => false,
            },
        }
    }
}

/// Signatures that mark a plain reply as an error, in match order
const ERROR_SIGNATURES: &[Signature] = &[
    Signature::Leading("no such command"),
    Signature::Leading("unknown command"),
    Signature::Leading("command not found"),
    Signature::Leading("error:"),
    Signature::Leading("script error"),
    Signature::Leading("failed to"),
    Signature::Leading("cannot"),
    Signature::Leading("invalid"),
    Signature::Leading("permission denied"),
    Signature::Leading("access denied"),
    Signature::Leading("timeout"),
    Signature::Leading("connection failed"),
    Signature::LeadingThen("resource", "not found"),
    Signature::LeadingThen("plugin", "not found"),
    Signature::AnyThen("argument", "null"),
    Signature::Exact("nil"),
    Signature::Exact("false"),
];

/// Console-level failures that are authoritative even when the reply also
/// carries bridge JSON (the console echoes them around the payload)
const COMMAND_FAILURE_PHRASES: &[&str] =
    &["no such command", "unknown command", "command not found"];

/// Outcome of the classification decision, before envelope construction
#[derive(Debug)]
enum Verdict {
    /// Plain text matching an error signature
    PlainError,
    /// Bridge reply that resolves to a failure
    StructuredError,
    /// Bridge reply that resolves to success
    StructuredSuccess {
        message: String,
        data: Option<Value>,
    },
    /// Plain text with no error signature
    PlainSuccess,
}

/// Classify a raw reply to `command` into the uniform envelope.
pub fn classify(raw: &str, command: &str) -> ToolResponse {
    let text = raw.trim();
    debug!("Classifying reply to {}: {}", command, text);

    match judge(text) {
        Verdict::PlainError | Verdict::StructuredError => error_envelope(text, command),
        Verdict::StructuredSuccess { message, data } => {
            ToolResponse::ok(message, Some(data.unwrap_or_else(|| reply_data(text, command))))
        }
        Verdict::PlainSuccess => ToolResponse::ok(
            "Command executed successfully",
            Some(reply_data(text, command)),
        ),
    }
}

fn judge(text: &str) -> Verdict {
    let lower = text.to_lowercase();

    if ERROR_SIGNATURES.iter().any(|s| s.matches(&lower)) {
        return Verdict::PlainError;
    }

    if is_bridge_reply(text) {
        return judge_bridge(text);
    }

    Verdict::PlainSuccess
}

/// Does the reply look like it came from the bridge resource rather than
/// the plain console?
fn is_bridge_reply(text: &str) -> bool {
    text.contains("{\"data\":") || text.contains(BRIDGE_TAG) || text.contains("\"success\":")
}

/// Judge a reply carrying (or claiming to carry) bridge JSON.
///
/// The bridge's `success` field is trusted: the reply is a failure only if
/// `success` is explicitly `false` or the console echoed an explicit
/// command-failure phrase around the payload. A payload that will not parse
/// still counts as success, because the bridge did reply.
fn judge_bridge(text: &str) -> Verdict {
    let clean = strip_echo(text);
    let clean_lower = clean.to_lowercase();

    if COMMAND_FAILURE_PHRASES
        .iter()
        .any(|p| clean_lower.contains(p))
    {
        return Verdict::StructuredError;
    }

    if let Some(json) = extract_json(clean) {
        return match serde_json::from_str::<Value>(json) {
            Ok(value) => {
                if value.get("success") == Some(&Value::Bool(false)) {
                    return Verdict::StructuredError;
                }
                let message = value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Plugin command executed successfully")
                    .to_string();
                Verdict::StructuredSuccess {
                    message,
                    data: value.get("data").cloned(),
                }
            }
            Err(e) => {
                debug!("Bridge payload did not parse as JSON: {}", e);
                Verdict::StructuredSuccess {
                    message: "Plugin command executed (unparseable JSON payload)".to_string(),
                    data: None,
                }
            }
        };
    }

    if text.contains("[ERROR]") || text.contains("ERROR:") {
        return Verdict::StructuredError;
    }

    Verdict::StructuredSuccess {
        message: "Plugin command executed successfully".to_string(),
        data: None,
    }
}

/// Extract the widest `{...}` substring, mirroring a greedy brace match.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Strip the console's `print ` echo from the head of a reply.
fn strip_echo(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() > 5 && bytes[..5].eq_ignore_ascii_case(b"print") && bytes[5].is_ascii_whitespace()
    {
        text[5..].trim_start()
    } else {
        text
    }
}

/// Strip the `script error in native <hex>:` prefix the console prepends to
/// native call failures.
fn strip_native_prefix(text: &str) -> &str {
    const PREFIX: &str = "script error in native ";
    let bytes = text.as_bytes();
    if bytes.len() > PREFIX.len() && bytes[..PREFIX.len()].eq_ignore_ascii_case(PREFIX.as_bytes()) {
        let rest = &text[PREFIX.len()..];
        let hex_len = rest
            .bytes()
            .take_while(|b| b.is_ascii_hexdigit())
            .count();
        if hex_len > 0 {
            if let Some(after) = rest[hex_len..].strip_prefix(':') {
                return after.trim_start();
            }
        }
    }
    text
}

fn error_envelope(text: &str, command: &str) -> ToolResponse {
    ToolResponse::err(
        error_code(text),
        error_message(text),
        Some(reply_data(text, command)),
    )
}

fn reply_data(text: &str, command: &str) -> Value {
    serde_json::json!({ "response": text, "command": command })
}

/// Derive the taxonomy code for an error reply. Precedence-ordered: the
/// first table entry that matches wins.
fn error_code(text: &str) -> ErrorCode {
    let lower = text.to_lowercase();

    if COMMAND_FAILURE_PHRASES.iter().any(|p| lower.contains(p)) {
        ErrorCode::InvalidCommand
    } else if lower.contains("permission denied") || lower.contains("access denied") {
        ErrorCode::PermissionDenied
    } else if lower.contains("timeout") {
        ErrorCode::Timeout
    } else if lower.contains("connection failed") {
        ErrorCode::ConnectionFailed
    } else if Signature::AnyThen("resource", "not found").matches(&lower)
        || Signature::AnyThen("plugin", "not found").matches(&lower)
    {
        ErrorCode::ResourceNotFound
    } else if lower.contains("invalid") || Signature::AnyThen("argument", "null").matches(&lower) {
        ErrorCode::InvalidArguments
    } else if lower.contains("script error") || lower.contains("failed to") {
        ErrorCode::CommandFailed
    } else {
        ErrorCode::UnknownError
    }
}

/// Extract a human-readable message from an error reply: drop echo and
/// native-error prefixes, capitalize, fall back to a generic message.
fn error_message(text: &str) -> String {
    let message = strip_native_prefix(strip_echo(text)).trim();
    if message.is_empty() {
        return "Unknown error occurred".to_string();
    }

    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Unknown error occurred".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_command_is_invalid_command() {
        let resp = classify("Unknown command foo", "foo");
        assert!(!resp.success);
        assert_eq!(resp.error.unwrap().code, ErrorCode::InvalidCommand);
    }

    #[test]
    fn plain_text_defaults_to_success() {
        let resp = classify("FXServer, version 1.2.3", "version");
        assert!(resp.success);
        let data = resp.data.unwrap();
        assert_eq!(data["response"], "FXServer, version 1.2.3");
        assert_eq!(data["command"], "version");
    }

    #[test]
    fn bridge_json_success_is_trusted() {
        let resp = classify(r#"{"success":true,"message":"ok","data":{"x":1}}"#, "cmd");
        assert!(resp.success);
        assert_eq!(resp.message, "ok");
        assert_eq!(resp.data.unwrap()["x"], 1);
    }

    #[test]
    fn bridge_json_explicit_false_is_an_error() {
        let resp = classify(r#"{"success":false}"#, "cmd");
        assert!(!resp.success);
        assert!(resp.error.is_some());
    }

    #[test]
    fn bridge_json_without_success_field_defaults_to_success() {
        let resp = classify(r#"print {"data":{"players":3}}"#, "cmd");
        assert!(resp.success);
        assert_eq!(resp.data.unwrap()["players"], 3);
    }

    #[test]
    fn failure_phrase_overrides_bridge_json() {
        let resp = classify(
            r#"No such command bridge; {"success":true,"message":"ok"}"#,
            "cmd",
        );
        assert!(!resp.success);
        assert_eq!(resp.error.unwrap().code, ErrorCode::InvalidCommand);
    }

    #[test]
    fn unparseable_bridge_payload_still_succeeds() {
        let resp = classify(r#"[fxbridge] ready {not json}"#, "cmd");
        assert!(resp.success);
        assert!(resp.message.contains("unparseable"));
    }

    #[test]
    fn bridge_tag_with_error_marker_fails() {
        let resp = classify("[fxbridge] ERROR: event queue full", "cmd");
        assert!(!resp.success);
    }

    #[test]
    fn nil_and_false_are_errors_only_when_exact() {
        assert!(!classify("nil", "cmd").success);
        assert!(!classify("false", "cmd").success);
        assert!(classify("falsey looking but fine", "cmd").success);
    }

    #[test]
    fn resource_not_found_matches_with_infix() {
        let resp = classify("Resource mymode was not found", "ensure mymode");
        assert!(!resp.success);
        assert_eq!(resp.error.unwrap().code, ErrorCode::ResourceNotFound);
    }

    #[test]
    fn error_code_precedence_tables() {
        assert_eq!(error_code("No such command x"), ErrorCode::InvalidCommand);
        assert_eq!(error_code("Access denied for y"), ErrorCode::PermissionDenied);
        assert_eq!(error_code("Timeout while waiting"), ErrorCode::Timeout);
        assert_eq!(error_code("Connection failed: refused"), ErrorCode::ConnectionFailed);
        assert_eq!(error_code("Plugin foo not found"), ErrorCode::ResourceNotFound);
        assert_eq!(error_code("Invalid argument count"), ErrorCode::InvalidArguments);
        assert_eq!(error_code("argument #2 was null"), ErrorCode::InvalidArguments);
        assert_eq!(error_code("Failed to start resource"), ErrorCode::CommandFailed);
        assert_eq!(error_code("something else entirely"), ErrorCode::UnknownError);
    }

    #[test]
    fn error_message_strips_prefixes_and_capitalizes() {
        assert_eq!(
            error_message("print script error in native a7b2c3: cannot read field"),
            "Cannot read field"
        );
        assert_eq!(error_message("error: oops"), "Error: oops");
        assert_eq!(error_message(""), "Unknown error occurred");
    }

    #[test]
    fn leading_signatures_only_match_at_start() {
        // "Cannot" mid-sentence is not an error by itself
        assert!(classify("Started resource; cannot hot-reload", "cmd").success);
        assert!(!classify("Cannot start resource", "cmd").success);
    }
}
