//! rsaform Prelude
//!
//! ```rust
//! use rsaform::prelude::*;
//!
//! let pem = frame(PemLabel::PublicKey, &[0x30, 0x00]);
//! assert_eq!(unframe(&pem).unwrap().der(), &[0x30, 0x00]);
//! assert_eq!(max_plaintext_bytes(2048, "SHA-256"), 190);
//! ```

pub use crate::budget::{max_plaintext_bytes, HashAlgorithm};
pub use crate::codec::{decode_text, encode_text};
pub use crate::error::FormError;
pub use crate::form::{KeyPair, RsaForm};
pub use crate::pem::{frame, unframe, PemDocument, PemLabel};

// Trait import so provider methods resolve without an explicit `use`
pub use crate::provider::{KeyProfile, KeyProvider, RustCryptoProvider};
