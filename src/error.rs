/// Error types returned by the decode pipeline and configuration loading
use thiserror::Error;

use crate::models::Status;

/// Everything that can go wrong while decoding a scanned URL.
///
/// Structural errors (`Malformed*`, `TooFewDemis`) mean the parameters did not
/// come from a well-behaved encoder. `NoCircularBuffer` means the encoder is
/// alive but has never written history. `MessageIntegrity` is the only
/// authentication failure.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed base64 string '{input}': {source}")]
    MalformedBase64 {
        input: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Status decodes to {len} bytes, expected 6")]
    MalformedStatus { len: usize },

    #[error("Time interval decodes to {len} bytes, expected 2")]
    MalformedInterval { len: usize },

    #[error("Malformed endstop: {reason}")]
    MalformedEndstop { reason: String },

    #[error("Malformed demi '{demi}': expected 8 characters")]
    MalformedDemi { demi: String },

    #[error("Payload holds {available} demis but {needed} are required")]
    TooFewDemis { needed: usize, available: usize },

    #[error("Malformed version tag '{tag}'")]
    MalformedVersionTag { tag: String },

    #[error(
        "No delimiting character found in the circular buffer string '{circular}'. \
         The encoder has been initialised but has not pushed data"
    )]
    DelimiterNotFound { circular: String },

    #[error(
        "There is no circular buffer. This indicates an error with the system running \
         the encoder. Status = {status}"
    )]
    NoCircularBuffer { status: Status },

    #[error("Mismatch between encoder major version {declared} and decoder major version {supported}")]
    InvalidMajorVersion { declared: u16, supported: u16 },

    #[error("Invalid circular buffer format = {code}")]
    InvalidFormat { code: u8 },

    #[error("Checksum mismatch. Calculated hash = {calculated}, URL hash = {received}")]
    MessageIntegrity { calculated: String, received: String },

    #[error("End marker position {endmarkerpos} does not fit in 16 bits")]
    BufferTooLong { endmarkerpos: usize },

    #[error("Secret key rejected by the MAC")]
    InvalidKey,

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Missing URL parameter '{0}'")]
    MissingParameter(&'static str),
}

/// Errors raised while loading a [`DecoderConfig`](crate::config::DecoderConfig).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("Invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },
}
