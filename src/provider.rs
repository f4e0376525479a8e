//! Cryptographic provider abstraction
//!
//! [`KeyProvider`] is the capability set the form needs from a cryptographic
//! backend: key generation, SPKI/PKCS#8 import and export, and single-block
//! RSA-OAEP encryption and decryption. Key handles are opaque associated
//! types, so callers never depend on backend-specific key structures.
//!
//! # Backends
//!
//! - [`RustCryptoProvider`]: RustCrypto `rsa` crate with OAEP/SHA-256 and
//!   blinded private-key operations. Note RUSTSEC-2023-0071 (Marvin timing
//!   side channel) applies to this crate; blinding narrows but does not
//!   remove it.

use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Oaep, RsaPrivateKey, RsaPublicKey};
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

use crate::budget::{max_plaintext_bytes_for, HashAlgorithm};

/// Public exponent used for every generated key (F4)
pub const PUBLIC_EXPONENT: u64 = 65537;

/// Modulus lengths accepted for key generation
pub const SUPPORTED_MODULUS_BITS: [usize; 4] = [1024, 2048, 3072, 4096];

/// Provider-level errors
///
/// These carry backend detail and are classified into
/// [`FormError`](crate::FormError) variants before reaching callers.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unsupported modulus length: {0} bits")]
    UnsupportedModulus(usize),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Key export failed: {0}")]
    Export(String),

    #[error("RSA-OAEP encryption failed: {0}")]
    Encrypt(String),

    #[error("RSA-OAEP decryption failed: {0}")]
    Decrypt(String),
}

/// Parameters fixed for a key at generation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyProfile {
    pub modulus_bits: usize,
    pub hash: HashAlgorithm,
    pub public_exponent: u64,
}

impl KeyProfile {
    /// Largest plaintext one OAEP block can carry under this profile
    pub fn max_plaintext_bytes(&self) -> i64 {
        max_plaintext_bytes_for(self.modulus_bits, self.hash)
    }

    /// Ciphertext length in bytes (one RSA block)
    pub fn block_bytes(&self) -> usize {
        self.modulus_bits.div_ceil(8)
    }
}

/// Capability set of an RSA-OAEP backend
///
/// Every method is one blocking call to the backend; none of them chunk
/// payloads across several blocks.
pub trait KeyProvider {
    /// Handle for a public (encrypting) key
    type PublicKey;

    /// Handle for a private (decrypting) key
    type PrivateKey;

    /// Generate a key pair with exponent 65537 under the SHA-256 profile
    fn generate_key_pair(
        &self,
        modulus_bits: usize,
    ) -> Result<(Self::PublicKey, Self::PrivateKey), ProviderError>;

    /// Import a public key from SPKI DER
    fn import_public_key(&self, der: &[u8]) -> Result<Self::PublicKey, ProviderError>;

    /// Import a private key from PKCS#8 DER
    fn import_private_key(&self, der: &[u8]) -> Result<Self::PrivateKey, ProviderError>;

    /// Export a public key as SPKI DER
    fn export_public_key_der(&self, key: &Self::PublicKey) -> Result<Vec<u8>, ProviderError>;

    /// Export a private key as PKCS#8 DER
    fn export_private_key_der(
        &self,
        key: &Self::PrivateKey,
    ) -> Result<Zeroizing<Vec<u8>>, ProviderError>;

    /// Profile of a public key, used to compute the plaintext budget
    fn public_profile(&self, key: &Self::PublicKey) -> KeyProfile;

    /// One RSA-OAEP encryption of a single block
    fn encrypt_block(
        &self,
        key: &Self::PublicKey,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;

    /// One RSA-OAEP decryption of a single block
    fn decrypt_block(
        &self,
        key: &Self::PrivateKey,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;
}

/// RustCrypto `rsa` backend with OAEP/SHA-256
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoProvider;

impl RustCryptoProvider {
    pub fn new() -> Self {
        RustCryptoProvider
    }
}

impl KeyProvider for RustCryptoProvider {
    type PublicKey = RsaPublicKey;
    type PrivateKey = RsaPrivateKey;

    fn generate_key_pair(
        &self,
        modulus_bits: usize,
    ) -> Result<(RsaPublicKey, RsaPrivateKey), ProviderError> {
        if !SUPPORTED_MODULUS_BITS.contains(&modulus_bits) {
            return Err(ProviderError::UnsupportedModulus(modulus_bits));
        }

        debug!(modulus_bits, "Generating RSA key pair");
        let exponent = BigUint::from(PUBLIC_EXPONENT);
        let private_key = RsaPrivateKey::new_with_exp(&mut OsRng, modulus_bits, &exponent)
            .map_err(|e| ProviderError::KeyGeneration(e.to_string()))?;
        let public_key = private_key.to_public_key();

        Ok((public_key, private_key))
    }

    fn import_public_key(&self, der: &[u8]) -> Result<RsaPublicKey, ProviderError> {
        RsaPublicKey::from_public_key_der(der).map_err(|e| {
            ProviderError::InvalidKey(format!("Failed to parse RSA public key: {}", e))
        })
    }

    fn import_private_key(&self, der: &[u8]) -> Result<RsaPrivateKey, ProviderError> {
        RsaPrivateKey::from_pkcs8_der(der).map_err(|e| {
            ProviderError::InvalidKey(format!("Failed to parse RSA private key: {}", e))
        })
    }

    fn export_public_key_der(&self, key: &RsaPublicKey) -> Result<Vec<u8>, ProviderError> {
        let der = key
            .to_public_key_der()
            .map_err(|e| ProviderError::Export(e.to_string()))?;
        Ok(der.as_bytes().to_vec())
    }

    fn export_private_key_der(
        &self,
        key: &RsaPrivateKey,
    ) -> Result<Zeroizing<Vec<u8>>, ProviderError> {
        let der = key
            .to_pkcs8_der()
            .map_err(|e| ProviderError::Export(e.to_string()))?;
        Ok(der.to_bytes())
    }

    fn public_profile(&self, key: &RsaPublicKey) -> KeyProfile {
        // e is bounded to 33 bits by the rsa crate, so it fits a u64
        let public_exponent = key
            .e()
            .to_bytes_be()
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));

        KeyProfile {
            modulus_bits: key.n().bits(),
            hash: HashAlgorithm::Sha256,
            public_exponent,
        }
    }

    fn encrypt_block(&self, key: &RsaPublicKey, plaintext: &[u8]) -> Result<Vec<u8>, ProviderError> {
        key.encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext)
            .map_err(|e| ProviderError::Encrypt(e.to_string()))
    }

    fn decrypt_block(
        &self,
        key: &RsaPrivateKey,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        key.decrypt_blinded(&mut OsRng, Oaep::new::<Sha256>(), ciphertext)
            .map_err(|e| ProviderError::Decrypt(e.to_string()))
    }
}
