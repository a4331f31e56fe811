//! Framing for the parent-to-child init command.
//!
//! Arguments are NUL-delimited on the wire so argument boundaries
//! survive embedded spaces. The parent writes the whole payload once
//! and closes its end; the child reads to EOF.

/// Encodes an argument vector for the init pipe.
#[must_use]
pub fn encode_args(args: &[String]) -> Vec<u8> {
    args.join("\0").into_bytes()
}

/// Decodes an init-pipe payload back into an argument vector.
///
/// An empty payload decodes to an empty vector, which the init
/// bootstrap rejects as "no command".
#[must_use]
pub fn decode_args(payload: &[u8]) -> Vec<String> {
    if payload.is_empty() {
        return Vec::new();
    }
    String::from_utf8_lossy(payload)
        .split('\0')
        .map(str::to_string)
        .collect()
}
