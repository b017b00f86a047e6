/// Linearisation of the circular buffer and decoding of its endstop
use log::debug;

use crate::codec::base64url::{self, RFC3548_PADDING};
use crate::error::DecodeError;

/// Last character of the endstop. Marks the boundary between the newest and
/// oldest data in the circular buffer. Must be URL safe.
pub const DELIMITER: char = '~';
/// Length of the endstop in base64 characters, delimiter included.
pub const ENDSTOP_LEN: usize = 16;
/// Length of the elapsed minutes field, delimiter included.
const ELAPSED_LEN: usize = 4;
/// Digest and pair count: 7 + 2 bytes.
const HASHN_LEN_BYTES: usize = 9;
const DIGEST_LEN_BYTES: usize = 7;

/// The circular buffer unwrapped into oldest-to-newest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearBuffer {
    /// Base64 demis, oldest first
    pub payload: String,
    /// The final 16 characters of the linear buffer
    pub endstop: String,
    /// Number of characters before the delimiter in the wrapped string
    pub endmarkerpos: usize,
}

/// Fields carried by the endstop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endstop {
    /// Minutes since the newest sample was written
    pub elapsed_minutes: u32,
    /// Truncated digest computed by the encoder
    pub digest: Vec<u8>,
    /// Number of valid pairs in the buffer
    pub npairs: u16,
}

/// A fully parsed circular buffer, ready for pair extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularBuffer {
    pub payload: String,
    pub endmarkerpos: u16,
    pub endstop: Endstop,
}

/// Unwrap the circular buffer around its delimiter.
///
/// The buffer is made linear by concatenating the part after the delimiter
/// (oldest data) with the part before it (newest data) and putting the
/// delimiter back at the end.
pub fn linearize(circular_b64: &str) -> Result<LinearBuffer, DecodeError> {
    let segments: Vec<&str> = circular_b64.split(DELIMITER).collect();
    if segments.len() != 2 {
        return Err(DecodeError::DelimiterNotFound {
            circular: circular_b64.to_string(),
        });
    }

    let (newest, oldest) = (segments[0], segments[1]);
    let endmarkerpos = newest.len();

    let mut linear = String::with_capacity(circular_b64.len());
    linear.push_str(oldest);
    linear.push_str(newest);
    linear.push(DELIMITER);

    if linear.len() < ENDSTOP_LEN || !linear.is_char_boundary(linear.len() - ENDSTOP_LEN) {
        return Err(DecodeError::MalformedEndstop {
            reason: format!("linear buffer of {} characters has no endstop", linear.len()),
        });
    }

    let endstop = linear.split_off(linear.len() - ENDSTOP_LEN);
    debug!(
        "Linearised circular buffer: endmarkerpos={}, payload={} chars",
        endmarkerpos,
        linear.len()
    );

    Ok(LinearBuffer {
        payload: linear,
        endstop,
        endmarkerpos,
    })
}

/// Decode the 16 character endstop.
///
/// The last 4 characters hold the elapsed minutes, with the delimiter standing
/// in for the padding byte. The first 12 decode to 9 bytes: a 7 byte digest
/// followed by the big-endian pair count.
pub fn decode_endstop(endstop: &str) -> Result<Endstop, DecodeError> {
    if endstop.len() != ENDSTOP_LEN {
        return Err(DecodeError::MalformedEndstop {
            reason: format!("expected {} characters, got {}", ENDSTOP_LEN, endstop.len()),
        });
    }

    let endstop = endstop.replace(DELIMITER, RFC3548_PADDING);
    let split = ENDSTOP_LEN - ELAPSED_LEN;
    let (hashn_b64, elapsed_b64) = match (endstop.get(..split), endstop.get(split..)) {
        (Some(hashn), Some(elapsed)) => (hashn, elapsed),
        _ => {
            return Err(DecodeError::MalformedEndstop {
                reason: "endstop is not ASCII".to_string(),
            })
        }
    };

    let elapsed = base64url::decode(elapsed_b64)?;
    if elapsed.is_empty() || elapsed.len() > 4 {
        return Err(DecodeError::MalformedEndstop {
            reason: format!("elapsed minutes field is {} bytes", elapsed.len()),
        });
    }
    // Little endian, any width up to 32 bits
    let elapsed_minutes = elapsed
        .iter()
        .rev()
        .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));

    let hashn = base64url::decode(hashn_b64)?;
    if hashn.len() != HASHN_LEN_BYTES {
        return Err(DecodeError::MalformedEndstop {
            reason: format!("digest and pair count field is {} bytes", hashn.len()),
        });
    }

    let digest = hashn[..DIGEST_LEN_BYTES].to_vec();
    let npairs = u16::from_be_bytes([hashn[7], hashn[8]]);

    debug!(
        "Decoded endstop: elapsed={} min, npairs={}",
        elapsed_minutes, npairs
    );

    Ok(Endstop {
        elapsed_minutes,
        digest,
        npairs,
    })
}

/// Linearise the buffer and decode its endstop.
pub fn decode(circular_b64: &str) -> Result<CircularBuffer, DecodeError> {
    let linear = linearize(circular_b64)?;
    let endmarkerpos = u16::try_from(linear.endmarkerpos).map_err(|_| DecodeError::BufferTooLong {
        endmarkerpos: linear.endmarkerpos,
    })?;
    let endstop = decode_endstop(&linear.endstop)?;

    Ok(CircularBuffer {
        payload: linear.payload,
        endmarkerpos,
        endstop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Digest 01..07, npairs=3 -> "AQIDBAUGBwAD", elapsed=5 -> "BQA~"
    const ENDSTOP: &str = "AQIDBAUGBwADBQA~";

    #[test]
    fn linearize_swaps_arcs() {
        // Newest demi and the endstop sit before the delimiter,
        // the oldest demi after it.
        let circ = "NEWDEMI1AQIDBAUGBwADBQA~OLDDEMI0";
        let linear = linearize(circ).unwrap();
        assert_eq!(linear.endmarkerpos, 23);
        assert_eq!(linear.payload, "OLDDEMI0NEWDEMI1");
        assert_eq!(linear.endstop, ENDSTOP);
    }

    #[test]
    fn linearize_without_wrap() {
        let circ = format!("{}{}", "AAAAAAAA", ENDSTOP);
        let linear = linearize(&circ).unwrap();
        assert_eq!(linear.endmarkerpos, 23);
        assert_eq!(linear.payload, "AAAAAAAA");
    }

    #[test]
    fn missing_delimiter() {
        assert!(matches!(
            linearize("MDAwMDAwMDAw"),
            Err(DecodeError::DelimiterNotFound { .. })
        ));
        assert!(matches!(linearize(""), Err(DecodeError::DelimiterNotFound { .. })));
    }

    #[test]
    fn repeated_delimiter() {
        assert!(matches!(
            linearize("AAAA~BBBB~CCCC"),
            Err(DecodeError::DelimiterNotFound { .. })
        ));
    }

    #[test]
    fn short_buffer_has_no_endstop() {
        assert!(matches!(
            linearize("BQA~"),
            Err(DecodeError::MalformedEndstop { .. })
        ));
    }

    #[test]
    fn endstop_fields() {
        let endstop = decode_endstop(ENDSTOP).unwrap();
        assert_eq!(endstop.elapsed_minutes, 5);
        assert_eq!(endstop.digest, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(endstop.npairs, 3);
    }

    #[test]
    fn elapsed_is_little_endian() {
        // 0x0102 minutes
        let endstop = decode_endstop("AQIDBAUGBwADAgE~").unwrap();
        assert_eq!(endstop.elapsed_minutes, 0x0102);
    }

    #[test]
    fn endstop_wrong_length() {
        assert!(matches!(
            decode_endstop("AQIDBAUGBwADBQ~"),
            Err(DecodeError::MalformedEndstop { .. })
        ));
    }

    #[test]
    fn decode_full_buffer() {
        let circ = format!("{}{}{}", "AAAAAAAA", ENDSTOP, "MDAwMDAw");
        let buffer = decode(&circ).unwrap();
        assert_eq!(buffer.endmarkerpos, 23);
        assert_eq!(buffer.payload, "MDAwMDAwAAAAAAAA");
        assert_eq!(buffer.endstop.npairs, 3);
    }
}
