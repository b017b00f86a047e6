/// Extraction of decoder parameters from a scanned tag URL
use url::Url;

use crate::error::DecodeError;

const INTERVAL_KEY: &str = "t";
const SERIAL_KEY: &str = "s";
const VERSION_KEY: &str = "v";
const STATUS_KEY: &str = "x";
const CIRCULAR_KEY: &str = "q";

/// Raw query-string parameters written by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParams {
    /// `x`: base64 status record
    pub status: String,
    /// `t`: base64 minutes between samples
    pub interval: String,
    /// `q`: the circular buffer
    pub circular: String,
    /// `v`: version and format tag
    pub version: String,
    /// `s`: device serial, not used by the decoder
    pub serial: Option<String>,
}

impl UrlParams {
    /// Pull the decoder parameters out of a full URL.
    ///
    /// # Arguments
    /// * `url` - URL read from the NFC tag, including scheme
    ///
    /// # Returns
    /// The parameters, or `MissingParameter` naming the first absent key
    pub fn from_url(url: &str) -> Result<Self, DecodeError> {
        let url = Url::parse(url)?;

        let mut status = None;
        let mut interval = None;
        let mut circular = None;
        let mut version = None;
        let mut serial = None;

        for (key, value) in url.query_pairs() {
            let slot = match key.as_ref() {
                STATUS_KEY => &mut status,
                INTERVAL_KEY => &mut interval,
                CIRCULAR_KEY => &mut circular,
                VERSION_KEY => &mut version,
                SERIAL_KEY => &mut serial,
                _ => continue,
            };
            // First occurrence wins
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        Ok(UrlParams {
            status: status.ok_or(DecodeError::MissingParameter(STATUS_KEY))?,
            interval: interval.ok_or(DecodeError::MissingParameter(INTERVAL_KEY))?,
            circular: circular.ok_or(DecodeError::MissingParameter(CIRCULAR_KEY))?,
            version: version.ok_or(DecodeError::MissingParameter(VERSION_KEY))?,
            serial,
        })
    }
}
