/// Version and format tag parsing for each protocol generation
use serde::Serialize;

use crate::codec::base64url;
use crate::error::DecodeError;

// Generation 2 tags are 3 bytes of base64, left padded with '0' to align the URL
const V2_TAG_LEN_B64: usize = 4;
const V2_TAG_LEN_BYTES: usize = 3;

/// Encoder protocol generation. Selects how the `v` parameter is encoded
/// and which major version the decoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Protocol {
    /// Two ASCII digits, major version then format code.
    V1,
    /// Base64 of `[major_hi, major_lo, format]`.
    #[default]
    V2,
}

impl Protocol {
    /// Major version implemented by this decoder for the generation.
    pub fn supported_major(self) -> u16 {
        match self {
            Protocol::V1 => 1,
            Protocol::V2 => 2,
        }
    }

    /// Split a version tag into its declared major version and format code.
    pub fn parse_tag(self, tag: &str) -> Result<VersionTag, DecodeError> {
        match self {
            Protocol::V1 => parse_digits(tag),
            Protocol::V2 => parse_b64(tag),
        }
    }
}

/// Contents of a version tag. Nothing here has been validated yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionTag {
    pub major: u16,
    pub format_code: u8,
}

fn malformed(tag: &str) -> DecodeError {
    DecodeError::MalformedVersionTag {
        tag: tag.to_string(),
    }
}

fn parse_digits(tag: &str) -> Result<VersionTag, DecodeError> {
    let bytes = tag.as_bytes();
    if bytes.len() < 2 {
        return Err(malformed(tag));
    }

    let digits = &bytes[bytes.len() - 2..];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(malformed(tag));
    }

    Ok(VersionTag {
        major: u16::from(digits[0] - b'0'),
        format_code: digits[1] - b'0',
    })
}

fn parse_b64(tag: &str) -> Result<VersionTag, DecodeError> {
    let bytes = tag.as_bytes();
    if bytes.len() < V2_TAG_LEN_B64 {
        return Err(malformed(tag));
    }

    // Padding sits in front of the tag, so only the last 4 characters matter
    let tail = std::str::from_utf8(&bytes[bytes.len() - V2_TAG_LEN_B64..])
        .map_err(|_| malformed(tag))?;
    let decoded = base64url::decode(tail)?;
    if decoded.len() != V2_TAG_LEN_BYTES {
        return Err(malformed(tag));
    }

    Ok(VersionTag {
        major: u16::from_be_bytes([decoded[0], decoded[1]]),
        format_code: decoded[2],
    })
}
