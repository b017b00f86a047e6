/// Decoding of the encoder status record
use log::debug;
use serde::Serialize;

use crate::codec::base64url;
use crate::error::DecodeError;
use crate::models::Status;

const STATUS_LEN_BYTES: usize = 6;

/// Byte layout of the 6-byte status record.
///
/// Both layouts start with two little-endian u16 words: loop count and
/// resets all time. They differ in how battery and reset cause follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum StatusLayout {
    /// Third word is a little-endian u16 with the battery ADC value in the
    /// high byte and the reset cause in the low byte.
    #[default]
    Packed,
    /// Battery ADC byte followed by reset cause byte.
    Split,
}

/// Decode the base64 status parameter.
///
/// # Arguments
/// * `status_b64` - Value of the `x` URL parameter
/// * `layout` - Record layout used by the encoder generation
///
/// # Returns
/// The decoded status, or `MalformedStatus` if the record is not 6 bytes
pub fn decode(status_b64: &str, layout: StatusLayout) -> Result<Status, DecodeError> {
    let bytes = base64url::decode(status_b64)?;
    if bytes.len() != STATUS_LEN_BYTES {
        return Err(DecodeError::MalformedStatus { len: bytes.len() });
    }

    let loopcount = u16::from_le_bytes([bytes[0], bytes[1]]);
    let resets_all_time = u16::from_le_bytes([bytes[2], bytes[3]]);

    let (battery_raw, reset_cause_raw) = match layout {
        StatusLayout::Packed => {
            let batv_resetcause = u16::from_le_bytes([bytes[4], bytes[5]]);
            ((batv_resetcause >> 8) as u8, (batv_resetcause & 0xFF) as u8)
        }
        StatusLayout::Split => (bytes[4], bytes[5]),
    };

    let status = Status::new(loopcount, resets_all_time, battery_raw, reset_cause_raw);
    debug!("Decoded status ({:?} layout): {}", layout, status);
    Ok(status)
}
