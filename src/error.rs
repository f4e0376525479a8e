//! Error type for the rsaform public API
//!
//! Every failure of the encode/frame/encrypt/decrypt workflow surfaces as one
//! [`FormError`] variant with a message that can be shown to the user as-is.
//!
//! # Example
//!
//! ```no_run
//! use rsaform::{FormError, RsaForm};
//!
//! # fn example(public_pem: &str) -> Result<(), FormError> {
//! let form = RsaForm::rust_crypto();
//! match form.encrypt(public_pem, "hello") {
//!     Ok(ciphertext) => println!("{ciphertext}"),
//!     Err(FormError::PlaintextTooLarge { max, actual }) => {
//!         eprintln!("message is {actual} bytes, limit is {max}");
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Unified error type for all rsaform operations
///
/// Only [`FormError::PlaintextTooLarge`] exposes size details. Provider
/// failures on the encrypt and decrypt paths carry no detail at all; the
/// decrypt path in particular reports wrong keys, corrupted ciphertext and
/// padding failures with one identical message.
#[derive(Debug, Error)]
pub enum FormError {
    /// Text is not valid base64 (alphabet, padding or length)
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    /// PEM envelope is missing, inconsistent or of the wrong kind
    #[error("Invalid PEM: {0}")]
    InvalidPem(String),

    /// DER could not be imported as an RSA-OAEP key
    #[error("Key import failed: {0}")]
    KeyImport(String),

    /// Provider could not generate a key pair
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Plaintext does not fit into one OAEP block
    #[error("Plaintext too large: {actual} bytes exceeds the maximum of {max} bytes")]
    PlaintextTooLarge { max: i64, actual: usize },

    /// Encryption failed inside the provider
    #[error("Encryption failed")]
    EncryptionFailed,

    /// Decryption failed (wrong key, corrupted ciphertext or bad padding)
    #[error("Decryption failed")]
    DecryptionFailed,

    /// Decrypted bytes are not valid UTF-8 text
    #[error("Decrypted data is not valid UTF-8 text")]
    InvalidUtf8,
}

impl FormError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedEncoding(_) => "malformed_encoding",
            Self::InvalidPem(_) => "invalid_pem",
            Self::KeyImport(_) => "key_import",
            Self::KeyGeneration(_) => "key_generation",
            Self::PlaintextTooLarge { .. } => "plaintext_too_large",
            Self::EncryptionFailed => "encryption_failed",
            Self::DecryptionFailed => "decryption_failed",
            Self::InvalidUtf8 => "invalid_utf8",
        }
    }

    /// Provider errors are surfaced immediately and never retried
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Returns a suggestion for resolving this error
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::MalformedEncoding(_) => {
                Some("Check that the text was copied completely and is standard base64")
            }
            Self::InvalidPem(_) => Some(
                "Paste the whole key including the -----BEGIN----- and -----END----- lines",
            ),
            Self::KeyImport(_) => Some("Use an RSA key in SPKI (public) or PKCS#8 (private) form"),
            Self::KeyGeneration(_) => Some("Choose a modulus length of 1024, 2048, 3072 or 4096 bits"),
            Self::PlaintextTooLarge { .. } => {
                Some("Shorten the message or generate a key with a larger modulus")
            }
            Self::DecryptionFailed => {
                Some("Make sure the private key matches the key used to encrypt")
            }
            Self::EncryptionFailed | Self::InvalidUtf8 => None,
        }
    }

    /// Returns true if the failure came from malformed user-supplied text
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedEncoding(_) | Self::InvalidPem(_) | Self::KeyImport(_)
        )
    }
}
