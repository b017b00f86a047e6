use log::debug;
use std::env;

use crate::codec::{Protocol, StatusLayout};
use crate::error::ConfigError;
use crate::models::HashType;

const SECRET_KEY_VAR: &str = "CUPL_SECRET_KEY";
const USE_HMAC_VAR: &str = "CUPL_USE_HMAC";
const PROTOCOL_VAR: &str = "CUPL_PROTOCOL";
const STATUS_LAYOUT_VAR: &str = "CUPL_STATUS_LAYOUT";

/// Per-call decoder settings that do not involve the secret key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// True if the endstop digest is HMAC-MD5, false if it is MD5
    pub use_hmac: bool,
    pub protocol: Protocol,
    pub status_layout: StatusLayout,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            use_hmac: true,
            protocol: Protocol::V2,
            status_layout: StatusLayout::Packed,
        }
    }
}

impl DecodeOptions {
    pub fn hash_type(&self) -> HashType {
        HashType::from_use_hmac(self.use_hmac)
    }
}

#[derive(Clone)]
pub struct DecoderConfig {
    pub secret_key: String,
    pub options: DecodeOptions,
}

// Keep the key out of debug output
impl std::fmt::Debug for DecoderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderConfig")
            .field("secret_key", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl DecoderConfig {
    /// Load configuration from the environment, reading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load environment variables
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup(SECRET_KEY_VAR)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::Missing(SECRET_KEY_VAR))?;

        let mut options = DecodeOptions::default();

        if let Some(value) = lookup(USE_HMAC_VAR) {
            options.use_hmac = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(invalid(USE_HMAC_VAR, value)),
            };
        }

        if let Some(value) = lookup(PROTOCOL_VAR) {
            options.protocol = match value.trim() {
                "1" => Protocol::V1,
                "2" => Protocol::V2,
                _ => return Err(invalid(PROTOCOL_VAR, value)),
            };
        }

        if let Some(value) = lookup(STATUS_LAYOUT_VAR) {
            options.status_layout = match value.trim().to_ascii_lowercase().as_str() {
                "packed" => StatusLayout::Packed,
                "split" => StatusLayout::Split,
                _ => return Err(invalid(STATUS_LAYOUT_VAR, value)),
            };
        }

        debug!("Decoder options loaded: {:?}", options);

        Ok(DecoderConfig {
            secret_key,
            options,
        })
    }
}

fn invalid(key: &'static str, value: String) -> ConfigError {
    ConfigError::Invalid { key, value }
}
