//! Common test utilities for rsaform integration tests
//!
//! Fixture keys under `tests/data/` were generated once with OpenSSL
//! (`openssl genpkey -algorithm RSA`, `openssl pkey -pubout`) so tests run
//! against fixed key material instead of fresh key generation.

#![allow(dead_code)]

/// Test data for encryption/decryption
pub const TEST_PLAINTEXT: &str = "Hello, rsaform! This is test data for encryption.";

/// 2048-bit key pair "A"
pub const PUBLIC_2048_A: &str = include_str!("../data/rsa2048_a_public.pem");
pub const PRIVATE_2048_A: &str = include_str!("../data/rsa2048_a_private.pem");

/// 2048-bit key pair "B", unrelated to "A"
pub const PUBLIC_2048_B: &str = include_str!("../data/rsa2048_b_public.pem");
pub const PRIVATE_2048_B: &str = include_str!("../data/rsa2048_b_private.pem");

/// 1024-bit key pair
pub const PUBLIC_1024: &str = include_str!("../data/rsa1024_public.pem");
pub const PRIVATE_1024: &str = include_str!("../data/rsa1024_private.pem");

/// P-256 keys, valid PEM but not RSA
pub const EC_PUBLIC: &str = include_str!("../data/ec_p256_public.pem");
pub const EC_PRIVATE: &str = include_str!("../data/ec_p256_private.pem");

/// Re-wrap PEM text the way a user might after hand-editing it
///
/// Converts to CRLF, indents every body line and inserts a blank line.
pub fn hand_edited(pem: &str) -> String {
    let mut out = String::new();
    for (i, line) in pem.lines().enumerate() {
        if line.starts_with("-----") {
            out.push_str(line);
        } else {
            out.push_str("  \t");
            out.push_str(line);
            out.push(' ');
        }
        out.push_str("\r\n");
        if i == 1 {
            out.push_str("\r\n");
        }
    }
    out
}

/// Plaintext of exactly `len` UTF-8 bytes
pub fn plaintext_of_len(len: usize) -> String {
    "x".repeat(len)
}
