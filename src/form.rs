//! Encrypt/decrypt workflow over PEM keys and base64 ciphertext
//!
//! [`RsaForm`] composes the PEM framer, the text codec and the OAEP budget
//! with an injected [`KeyProvider`]. It is the boundary where provider errors
//! are classified into [`FormError`] variants.
//!
//! # Example
//!
//! ```no_run
//! use rsaform::RsaForm;
//!
//! # fn example() -> Result<(), rsaform::FormError> {
//! let form = RsaForm::rust_crypto();
//! let pair = form.generate_key_pair(2048)?;
//!
//! let ciphertext = form.encrypt(pair.public_key_pem(), "hello")?;
//! let plaintext = form.decrypt(pair.private_key_pem(), &ciphertext)?;
//! assert_eq!(plaintext, "hello");
//! # Ok(())
//! # }
//! ```

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::budget::has_capacity;
use crate::codec::{decode_text_lenient, encode_text};
use crate::error::FormError;
use crate::pem::{frame, unframe, PemLabel};
use crate::provider::{KeyProfile, KeyProvider, ProviderError, RustCryptoProvider};

/// Freshly generated key pair with its PEM snapshots
///
/// Created by one [`RsaForm::generate_key_pair`] call and never mutated.
pub struct KeyPair<Pub, Priv> {
    public_key: Pub,
    private_key: Priv,
    public_key_pem: String,
    private_key_pem: Zeroizing<String>,
}

impl<Pub, Priv> KeyPair<Pub, Priv> {
    pub fn public_key(&self) -> &Pub {
        &self.public_key
    }

    pub fn private_key(&self) -> &Priv {
        &self.private_key
    }

    /// SPKI public key as PEM text
    pub fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }

    /// PKCS#8 private key as PEM text
    pub fn private_key_pem(&self) -> &str {
        &self.private_key_pem
    }
}

/// Encrypt/decrypt orchestrator
#[derive(Debug, Clone, Default)]
pub struct RsaForm<P> {
    provider: P,
}

impl RsaForm<RustCryptoProvider> {
    /// Orchestrator backed by the RustCrypto `rsa` provider
    pub fn rust_crypto() -> Self {
        RsaForm::new(RustCryptoProvider::new())
    }
}

impl<P: KeyProvider> RsaForm<P> {
    pub fn new(provider: P) -> Self {
        RsaForm { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Generate a key pair and export both halves as PEM
    pub fn generate_key_pair(
        &self,
        modulus_bits: usize,
    ) -> Result<KeyPair<P::PublicKey, P::PrivateKey>, FormError> {
        let (public_key, private_key) = self
            .provider
            .generate_key_pair(modulus_bits)
            .map_err(classify_generation)?;

        let public_der = self
            .provider
            .export_public_key_der(&public_key)
            .map_err(classify_generation)?;
        let private_der = self
            .provider
            .export_private_key_der(&private_key)
            .map_err(classify_generation)?;

        info!(modulus_bits, "Generated RSA-OAEP key pair");
        Ok(KeyPair {
            public_key,
            private_key,
            public_key_pem: frame(PemLabel::PublicKey, &public_der),
            private_key_pem: Zeroizing::new(frame(PemLabel::PrivateKey, &private_der)),
        })
    }

    /// Profile of the public key in `public_key_pem`
    pub fn profile(&self, public_key_pem: &str) -> Result<KeyProfile, FormError> {
        let public_key = self.import_public_pem(public_key_pem)?;
        Ok(self.provider.public_profile(&public_key))
    }

    /// Largest plaintext (in UTF-8 bytes) that `public_key_pem` can encrypt
    pub fn budget(&self, public_key_pem: &str) -> Result<i64, FormError> {
        Ok(self.profile(public_key_pem)?.max_plaintext_bytes())
    }

    /// Encrypt `plaintext` under a PEM public key, returning base64 ciphertext
    pub fn encrypt(&self, public_key_pem: &str, plaintext: &str) -> Result<String, FormError> {
        let public_key = self.import_public_pem(public_key_pem)?;

        let bytes = plaintext.as_bytes();
        let max = self.provider.public_profile(&public_key).max_plaintext_bytes();
        if !has_capacity(max) || bytes.len() as i64 > max {
            return Err(FormError::PlaintextTooLarge {
                max,
                actual: bytes.len(),
            });
        }

        let ciphertext = self
            .provider
            .encrypt_block(&public_key, bytes)
            .map_err(|e| {
                debug!(error = %e, "Provider encryption failure");
                FormError::EncryptionFailed
            })?;

        Ok(encode_text(ciphertext))
    }

    /// Decrypt base64 ciphertext under a PEM private key
    ///
    /// Every provider failure is reported as [`FormError::DecryptionFailed`]
    /// without further detail.
    pub fn decrypt(&self, private_key_pem: &str, ciphertext: &str) -> Result<String, FormError> {
        let private_key = self.import_private_pem(private_key_pem)?;
        let ciphertext = decode_text_lenient(ciphertext)?;

        let plaintext = self
            .provider
            .decrypt_block(&private_key, &ciphertext)
            .map_err(|_| FormError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| FormError::InvalidUtf8)
    }

    fn import_public_pem(&self, pem: &str) -> Result<P::PublicKey, FormError> {
        let document = unframe(pem)?;
        document.expect_label(PemLabel::PublicKey)?;
        self.provider
            .import_public_key(document.der())
            .map_err(classify_import)
    }

    fn import_private_pem(&self, pem: &str) -> Result<P::PrivateKey, FormError> {
        let document = unframe(pem)?;
        document.expect_label(PemLabel::PrivateKey)?;
        self.provider
            .import_private_key(document.der())
            .map_err(classify_import)
    }
}

fn classify_generation(err: ProviderError) -> FormError {
    FormError::KeyGeneration(err.to_string())
}

fn classify_import(err: ProviderError) -> FormError {
    match err {
        ProviderError::InvalidKey(msg) => FormError::KeyImport(msg),
        other => FormError::KeyImport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::HashAlgorithm;

    /// Provider double with fixed failure modes and an identity "cipher"
    #[derive(Default)]
    struct StubProvider {
        modulus_bits: usize,
        fail_encrypt: bool,
        fail_export: bool,
    }

    impl KeyProvider for StubProvider {
        type PublicKey = Vec<u8>;
        type PrivateKey = Vec<u8>;

        fn generate_key_pair(&self, modulus_bits: usize) -> Result<(Vec<u8>, Vec<u8>), ProviderError> {
            if modulus_bits == 0 {
                return Err(ProviderError::UnsupportedModulus(0));
            }
            Ok((vec![1], vec![2]))
        }

        fn import_public_key(&self, der: &[u8]) -> Result<Vec<u8>, ProviderError> {
            if der.is_empty() {
                return Err(ProviderError::InvalidKey("empty".to_string()));
            }
            Ok(der.to_vec())
        }

        fn import_private_key(&self, der: &[u8]) -> Result<Vec<u8>, ProviderError> {
            self.import_public_key(der)
        }

        fn export_public_key_der(&self, key: &Vec<u8>) -> Result<Vec<u8>, ProviderError> {
            if self.fail_export {
                return Err(ProviderError::Export("export disabled".to_string()));
            }
            Ok(key.clone())
        }

        fn export_private_key_der(&self, key: &Vec<u8>) -> Result<Zeroizing<Vec<u8>>, ProviderError> {
            Ok(Zeroizing::new(key.clone()))
        }

        fn public_profile(&self, _key: &Vec<u8>) -> KeyProfile {
            KeyProfile {
                modulus_bits: self.modulus_bits,
                hash: HashAlgorithm::Sha256,
                public_exponent: 65537,
            }
        }

        fn encrypt_block(&self, _key: &Vec<u8>, plaintext: &[u8]) -> Result<Vec<u8>, ProviderError> {
            if self.fail_encrypt {
                return Err(ProviderError::Encrypt("internal state 0xdeadbeef".to_string()));
            }
            Ok(plaintext.to_vec())
        }

        fn decrypt_block(&self, key: &Vec<u8>, ciphertext: &[u8]) -> Result<Vec<u8>, ProviderError> {
            if key.as_slice() != [0xAA] {
                return Err(ProviderError::Decrypt("padding check failed at byte 3".to_string()));
            }
            Ok(ciphertext.to_vec())
        }
    }

    fn stub(modulus_bits: usize) -> RsaForm<StubProvider> {
        RsaForm::new(StubProvider {
            modulus_bits,
            ..Default::default()
        })
    }

    fn public_pem() -> String {
        frame(PemLabel::PublicKey, &[0xAA])
    }

    fn private_pem() -> String {
        frame(PemLabel::PrivateKey, &[0xAA])
    }

    #[test]
    fn test_budget_boundary() {
        let form = stub(1024);
        assert_eq!(form.budget(&public_pem()).unwrap(), 62);

        let exact = "a".repeat(62);
        assert!(form.encrypt(&public_pem(), &exact).is_ok());

        let over = "a".repeat(63);
        match form.encrypt(&public_pem(), &over) {
            Err(FormError::PlaintextTooLarge { max, actual }) => {
                assert_eq!(max, 62);
                assert_eq!(actual, 63);
            }
            other => panic!("expected PlaintextTooLarge, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_budget_counts_utf8_bytes() {
        let form = stub(1024);
        // 31 two-byte characters fit, 32 do not
        assert!(form.encrypt(&public_pem(), &"é".repeat(31)).is_ok());
        let err = form.encrypt(&public_pem(), &"é".repeat(32)).unwrap_err();
        assert!(matches!(err, FormError::PlaintextTooLarge { max: 62, actual: 64 }));
    }

    #[test]
    fn test_no_capacity_rejects_everything() {
        let form = stub(512);
        let err = form.encrypt(&public_pem(), "x").unwrap_err();
        assert!(matches!(err, FormError::PlaintextTooLarge { actual: 1, .. }));
    }

    #[test]
    fn test_encryption_failure_hides_provider_detail() {
        let form = RsaForm::new(StubProvider {
            modulus_bits: 2048,
            fail_encrypt: true,
            ..Default::default()
        });
        let err = form.encrypt(&public_pem(), "hello").unwrap_err();
        assert!(matches!(err, FormError::EncryptionFailed));
        assert!(!err.to_string().contains("deadbeef"));
    }

    #[test]
    fn test_decryption_failure_is_opaque() {
        let form = stub(2048);
        let wrong_key = frame(PemLabel::PrivateKey, &[0xBB]);
        let err = form.decrypt(&wrong_key, "aGVsbG8=").unwrap_err();
        assert!(matches!(err, FormError::DecryptionFailed));
        assert_eq!(err.to_string(), "Decryption failed");
    }

    #[test]
    fn test_decrypt_classifies_input_errors() {
        let form = stub(2048);

        let err = form.decrypt(&private_pem(), "not*base64").unwrap_err();
        assert!(matches!(err, FormError::MalformedEncoding(_)));

        let err = form.decrypt(&encode_text([0xffu8, 0xfe]), "aGVsbG8=").unwrap_err();
        assert!(matches!(err, FormError::InvalidPem(_)));

        let invalid_utf8 = encode_text([0xffu8, 0xfe, 0xfd]);
        let err = form.decrypt(&private_pem(), &invalid_utf8).unwrap_err();
        assert!(matches!(err, FormError::InvalidUtf8));
    }

    #[test]
    fn test_decrypt_accepts_wrapped_ciphertext() {
        let form = stub(2048);
        let plaintext = form.decrypt(&private_pem(), " aGVs\nbG8=\n").unwrap();
        assert_eq!(plaintext, "hello");
    }

    #[test]
    fn test_label_must_match_key_kind() {
        let form = stub(2048);
        let err = form.encrypt(&private_pem(), "hello").unwrap_err();
        assert!(matches!(err, FormError::InvalidPem(_)));

        let err = form.decrypt(&public_pem(), "aGVsbG8=").unwrap_err();
        assert!(matches!(err, FormError::InvalidPem(_)));
    }

    #[test]
    fn test_import_failure_is_key_import() {
        let form = stub(2048);
        let empty = frame(PemLabel::PublicKey, &[]);
        let err = form.encrypt(&empty, "hello").unwrap_err();
        assert!(matches!(err, FormError::KeyImport(_)));
    }

    #[test]
    fn test_generation_failures() {
        let form = stub(2048);
        assert!(matches!(
            form.generate_key_pair(0),
            Err(FormError::KeyGeneration(_))
        ));

        let form = RsaForm::new(StubProvider {
            modulus_bits: 2048,
            fail_export: true,
            ..Default::default()
        });
        assert!(matches!(
            form.generate_key_pair(2048),
            Err(FormError::KeyGeneration(_))
        ));
    }

    #[test]
    fn test_generated_pems_are_framed() {
        let form = stub(2048);
        let pair = form.generate_key_pair(2048).unwrap();
        assert_eq!(pair.public_key_pem(), frame(PemLabel::PublicKey, &[1]));
        assert_eq!(pair.private_key_pem(), frame(PemLabel::PrivateKey, &[2]));
        assert_eq!(pair.public_key(), &vec![1]);
        assert_eq!(pair.private_key(), &vec![2]);
    }
}
