//! Server configuration from environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `RSAFORM_DEFAULT_MODULUS_BITS` | 2048 |
//! | `RSAFORM_REQUEST_TIMEOUT_SECS` | 120 |
//!
//! Log filtering is configured separately through `RUST_LOG`.

use std::time::Duration;

use rsaform::SUPPORTED_MODULUS_BITS;
use thiserror::Error;

pub const DEFAULT_MODULUS_BITS_VAR: &str = "RSAFORM_DEFAULT_MODULUS_BITS";
pub const REQUEST_TIMEOUT_VAR: &str = "RSAFORM_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got \"{value}\"")]
    NotANumber { var: &'static str, value: String },

    #[error("{var}={bits} is not a supported modulus length (expected one of {supported:?})")]
    UnsupportedModulus {
        var: &'static str,
        bits: usize,
        supported: [usize; 4],
    },

    #[error("{var} must be greater than zero")]
    ZeroTimeout { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Modulus length used when `keypair_generate` omits `modulus_bits`
    pub default_modulus_bits: usize,
    /// Upper bound on one request, key generation included
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            default_modulus_bits: 2048,
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = ServerConfig::default();

        if let Some(value) = lookup(DEFAULT_MODULUS_BITS_VAR) {
            let bits = parse_number(DEFAULT_MODULUS_BITS_VAR, &value)?;
            if !SUPPORTED_MODULUS_BITS.contains(&(bits as usize)) {
                return Err(ConfigError::UnsupportedModulus {
                    var: DEFAULT_MODULUS_BITS_VAR,
                    bits: bits as usize,
                    supported: SUPPORTED_MODULUS_BITS,
                });
            }
            config.default_modulus_bits = bits as usize;
        }

        if let Some(value) = lookup(REQUEST_TIMEOUT_VAR) {
            let secs = parse_number(REQUEST_TIMEOUT_VAR, &value)?;
            if secs == 0 {
                return Err(ConfigError::ZeroTimeout {
                    var: REQUEST_TIMEOUT_VAR,
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::NotANumber {
        var,
        value: value.to_string(),
    })
}
