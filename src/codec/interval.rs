use crate::codec::base64url;
use crate::error::DecodeError;

/// Decode the `t` parameter: minutes between samples as a little-endian u16.
pub fn decode(interval_b64: &str) -> Result<u16, DecodeError> {
    let bytes = base64url::decode(interval_b64)?;
    match bytes.as_slice() {
        [lsb, msb] => Ok(u16::from_le_bytes([*lsb, *msb])),
        _ => Err(DecodeError::MalformedInterval { len: bytes.len() }),
    }
}
