//! Binary/text codec for transport-safe payloads
//!
//! Ciphertext and DER bodies cross the text boundary as standard (RFC 4648)
//! base64 with padding. Decoding is strict: characters outside the alphabet,
//! non-canonical padding and truncated input are all rejected.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::FormError;

/// Encode raw bytes as standard base64 text
pub fn encode_text(bytes: impl AsRef<[u8]>) -> String {
    BASE64.encode(bytes)
}

/// Decode standard base64 text back to raw bytes
///
/// Fails with [`FormError::MalformedEncoding`] on any character outside the
/// base64 alphabet (whitespace included) or on invalid padding/length.
pub fn decode_text(text: &str) -> Result<Vec<u8>, FormError> {
    BASE64
        .decode(text)
        .map_err(|e| FormError::MalformedEncoding(e.to_string()))
}

/// Decode base64 text after removing all ASCII whitespace
///
/// Text pasted into a form field routinely picks up line breaks and trailing
/// spaces; those are dropped before strict decoding.
pub fn decode_text_lenient(text: &str) -> Result<Vec<u8>, FormError> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    decode_text(&compact)
}
