/// URL-safe base64 with a URL-friendly padding character
use base64::alphabet;
use base64::engine::general_purpose::GeneralPurpose;
use base64::engine::{DecodePaddingMode, GeneralPurposeConfig};
use base64::Engine as _;

use crate::error::DecodeError;

/// Padding character the encoder writes in place of `=`.
pub const URLSAFE_PADDING_BYTE: char = '.';
/// Standard RFC 3548 padding.
pub const RFC3548_PADDING: &str = "=";

// The encoder does not always pad, and does not zero unused trailing bits.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode a URL-safe base64 string, accepting `.` as padding.
pub fn decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    let normalised = input.replace(URLSAFE_PADDING_BYTE, RFC3548_PADDING);
    URL_SAFE_LENIENT
        .decode(normalised.as_bytes())
        .map_err(|source| DecodeError::MalformedBase64 {
            input: input.to_string(),
            source,
        })
}
