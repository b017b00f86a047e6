/// Version/format dispatch and the single decode entry point
use log::{debug, info, warn};
use time::OffsetDateTime;

use crate::buffer::{auth, circular, extract_pairs};
use crate::codec::{interval, status};
use crate::config::{DecodeOptions, DecoderConfig};
use crate::error::DecodeError;
use crate::formats::CircFormat;
use crate::models::DecodeResult;
use crate::query::UrlParams;
use crate::timeline;
use crate::utils::format_datetime;

/// Check the version tag and pick the record format.
///
/// A major version other than the one implemented for `options.protocol` is
/// rejected before any other parameter is looked at.
pub fn dispatch(version_tag: &str, options: &DecodeOptions) -> Result<CircFormat, DecodeError> {
    let tag = options.protocol.parse_tag(version_tag)?;
    let supported = options.protocol.supported_major();

    if tag.major != supported {
        return Err(DecodeError::InvalidMajorVersion {
            declared: tag.major,
            supported,
        });
    }

    CircFormat::try_from(tag.format_code)
}

/// Decode and authenticate the parameters of one scanned URL.
///
/// # Arguments
/// * `secret_key` - HMAC key shared with the encoder, normally 16 characters
/// * `status_b64` - `x` parameter
/// * `interval_b64` - `t` parameter
/// * `circular_b64` - `q` parameter, the wrapped circular buffer
/// * `version_tag` - `v` parameter
/// * `options` - hash mode, protocol generation and status layout
/// * `scan_timestamp` - when the tag was scanned; defaults to now (UTC)
///
/// # Returns
/// Samples ordered newest first once the digest has been verified.
/// Nothing is returned on any failure.
pub fn decode(
    secret_key: &str,
    status_b64: &str,
    interval_b64: &str,
    circular_b64: &str,
    version_tag: &str,
    options: &DecodeOptions,
    scan_timestamp: Option<OffsetDateTime>,
) -> Result<DecodeResult, DecodeError> {
    let scan_timestamp = scan_timestamp.unwrap_or_else(OffsetDateTime::now_utc);

    let format = dispatch(version_tag, options)?;
    let status = status::decode(status_b64, options.status_layout)?;
    let interval_minutes = interval::decode(interval_b64)?;

    let buffer = match circular::decode(circular_b64) {
        Ok(buffer) => buffer,
        Err(DecodeError::DelimiterNotFound { .. }) => {
            warn!("No circular buffer history yet. Status: {}", status);
            return Err(DecodeError::NoCircularBuffer { status });
        }
        Err(e) => return Err(e),
    };

    let pairs = extract_pairs(&buffer.payload, buffer.endstop.npairs)?;

    let hash_type = options.hash_type();
    auth::verify(
        &pairs,
        &status,
        buffer.endmarkerpos,
        hash_type,
        secret_key.as_bytes(),
        &buffer.endstop.digest,
    )?;

    let measurements = format.decode(&pairs);
    debug!(
        "{:?} format produced {} measurements from {} pairs",
        format,
        measurements.len(),
        pairs.len()
    );

    let newest_timestamp = timeline::newest_timestamp(scan_timestamp, buffer.endstop.elapsed_minutes);
    let samples = timeline::apply_timestamps(measurements, newest_timestamp, interval_minutes);

    info!(
        "Decoded {} samples, newest at {}, interval {} min",
        samples.len(),
        format_datetime(&newest_timestamp),
        interval_minutes
    );

    Ok(DecodeResult {
        status,
        format,
        interval_minutes,
        elapsed_minutes: buffer.endstop.elapsed_minutes,
        npairs: buffer.endstop.npairs,
        scan_timestamp,
        newest_timestamp,
        hash_type,
        digest_verified: true,
        serial: None,
        samples,
    })
}

/// Decode parameters already split out of a URL.
pub fn decode_params(
    secret_key: &str,
    params: &UrlParams,
    options: &DecodeOptions,
    scan_timestamp: Option<OffsetDateTime>,
) -> Result<DecodeResult, DecodeError> {
    let mut result = decode(
        secret_key,
        &params.status,
        &params.interval,
        &params.circular,
        &params.version,
        options,
        scan_timestamp,
    )?;
    result.serial = params.serial.clone();
    Ok(result)
}

/// Decode a full tag URL.
pub fn decode_url(
    secret_key: &str,
    url: &str,
    options: &DecodeOptions,
    scan_timestamp: Option<OffsetDateTime>,
) -> Result<DecodeResult, DecodeError> {
    let params = UrlParams::from_url(url)?;
    decode_params(secret_key, &params, options, scan_timestamp)
}

impl DecoderConfig {
    /// Decode a full tag URL with this configuration.
    pub fn decode_url(
        &self,
        url: &str,
        scan_timestamp: Option<OffsetDateTime>,
    ) -> Result<DecodeResult, DecodeError> {
        decode_url(&self.secret_key, url, &self.options, scan_timestamp)
    }
}
