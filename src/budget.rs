//! RSA-OAEP plaintext budget
//!
//! OAEP embeds the message together with two hash-sized fields and two
//! framing bytes into one modulus-sized block, so the largest plaintext is
//! `k - 2*hLen - 2` where `k` is the modulus length in bytes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Hash functions that can parameterize OAEP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "SHA-1")]
    Sha1,
    /// The only hash the shipped provider uses
    #[default]
    #[serde(rename = "SHA-256")]
    Sha256,
    #[serde(rename = "SHA-384")]
    Sha384,
    #[serde(rename = "SHA-512")]
    Sha512,
}

impl HashAlgorithm {
    /// Digest output size in bytes
    pub fn digest_size(&self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Canonical name (`SHA-256` etc.)
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "SHA-1",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Look up a hash by name, ignoring case, hyphens and underscores
    ///
    /// `SHA-256`, `sha256` and `Sha_256` all resolve to [`HashAlgorithm::Sha256`].
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "SHA1" => Some(HashAlgorithm::Sha1),
            "SHA256" => Some(HashAlgorithm::Sha256),
            "SHA384" => Some(HashAlgorithm::Sha384),
            "SHA512" => Some(HashAlgorithm::Sha512),
            _ => None,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown hash algorithm: {}", s))
    }
}

/// Digest size assumed for hash names that are not recognized
pub const FALLBACK_DIGEST_SIZE: usize = 32;

/// Maximum OAEP plaintext size for a modulus length and hash name
///
/// Unknown hash names fall back to [`FALLBACK_DIGEST_SIZE`]. The result may
/// be zero or negative for very small moduli; see [`has_capacity`].
pub fn max_plaintext_bytes(modulus_bits: usize, hash: &str) -> i64 {
    let hash_bytes = match HashAlgorithm::from_name(hash) {
        Some(algorithm) => algorithm.digest_size(),
        None => {
            warn!(
                hash,
                fallback = FALLBACK_DIGEST_SIZE,
                "Unknown OAEP hash, assuming SHA-256 digest size"
            );
            FALLBACK_DIGEST_SIZE
        }
    };
    budget(modulus_bits, hash_bytes)
}

/// Maximum OAEP plaintext size for a modulus length and known hash
pub fn max_plaintext_bytes_for(modulus_bits: usize, hash: HashAlgorithm) -> i64 {
    budget(modulus_bits, hash.digest_size())
}

/// A budget of zero or less leaves no room for any plaintext
pub fn has_capacity(budget: i64) -> bool {
    budget > 0
}

fn budget(modulus_bits: usize, hash_bytes: usize) -> i64 {
    let modulus_bytes = (modulus_bits / 8) as i64;
    modulus_bytes - 2 * hash_bytes as i64 - 2
}
