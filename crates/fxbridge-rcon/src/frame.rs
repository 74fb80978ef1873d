//! Wire framing for the legacy RCON protocol
//!
//! Every datagram, request or reply, starts with a fixed 4-byte marker.
//! There is no length prefix and no escaping; the transport's own datagram
//! boundaries delimit the message.

/// Fixed sentinel agreed upon with legacy game-server RCON implementations
pub const MARKER: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// Build a request frame for `command`, authenticated with `password`.
///
/// The protocol has no auth handshake; the password rides along in every
/// request.
pub fn encode(command: &str, password: &str) -> Vec<u8> {
    let payload = format!("rcon {} {}", password, command);
    let mut buf = Vec::with_capacity(MARKER.len() + payload.len());
    buf.extend_from_slice(&MARKER);
    buf.extend_from_slice(payload.as_bytes());
    buf
}

/// Decode a reply frame into its trimmed text payload.
///
/// A buffer shorter than the marker decodes to an empty string rather than
/// an error; the wire format has no way to signal a malformed reply.
pub fn decode(data: &[u8]) -> String {
    if data.len() < MARKER.len() {
        return String::new();
    }
    String::from_utf8_lossy(&data[MARKER.len()..])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_prefixes_marker() {
        let frame = encode("status", "hunter2");
        assert_eq!(&frame[..4], &MARKER);
        assert_eq!(&frame[4..], b"rcon hunter2 status");
    }

    #[test]
    fn decode_round_trips_an_echoed_frame() {
        let frame = encode("ensure mymode", "hunter2");
        assert_eq!(decode(&frame), "rcon hunter2 ensure mymode");
    }

    #[test]
    fn undersized_buffers_decode_to_empty() {
        for len in 0..4 {
            assert_eq!(decode(&vec![0xFF; len]), "");
        }
    }

    #[test]
    fn decode_trims_surrounding_whitespace() {
        let mut frame = MARKER.to_vec();
        frame.extend_from_slice(b"\nprint ok\r\n");
        assert_eq!(decode(&frame), "print ok");
    }

    #[test]
    fn decode_is_lossy_on_invalid_utf8() {
        let mut frame = MARKER.to_vec();
        frame.extend_from_slice(&[0x68, 0x69, 0xFF, 0xFE]);
        let text = decode(&frame);
        assert!(text.starts_with("hi"));
    }
}
