//! RSA-OAEP key encoding and transport-safety layer
//!
//! Generates RSA key pairs, frames keys as PEM text, and encrypts/decrypts
//! single-block RSA-OAEP/SHA-256 messages carried as base64 text. The RSA
//! arithmetic itself lives behind the [`KeyProvider`] trait.
//!
//! # Example
//!
//! ```no_run
//! use rsaform::prelude::*;
//!
//! # fn example() -> Result<(), FormError> {
//! let form = RsaForm::rust_crypto();
//! let pair = form.generate_key_pair(2048)?;
//! assert_eq!(form.budget(pair.public_key_pem())?, 190);
//!
//! let ciphertext = form.encrypt(pair.public_key_pem(), "hello")?;
//! assert_eq!(ciphertext.len(), 344);
//! assert_eq!(form.decrypt(pair.private_key_pem(), &ciphertext)?, "hello");
//! # Ok(())
//! # }
//! ```

pub mod budget;
pub mod codec;
pub mod error;
pub mod form;
pub mod pem;
pub mod prelude;
pub mod provider;

pub use budget::{has_capacity, max_plaintext_bytes, max_plaintext_bytes_for, HashAlgorithm};
pub use codec::{decode_text, decode_text_lenient, encode_text};
pub use error::FormError;
pub use form::{KeyPair, RsaForm};
pub use pem::{frame, unframe, PemDocument, PemLabel};
pub use provider::{
    KeyProfile, KeyProvider, ProviderError, RustCryptoProvider, PUBLIC_EXPONENT,
    SUPPORTED_MODULUS_BITS,
};
