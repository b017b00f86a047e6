/// Message authentication of the decoded pair history
use hmac::{Hmac, Mac};
use log::{debug, warn};
use md5::{Digest, Md5};

use crate::error::DecodeError;
use crate::models::{HashType, Pair, Status};

type HmacMd5 = Hmac<Md5>;

/// Build the message the encoder hashes.
///
/// Pairs newest first, 3 bytes each, then loop count, resets all time, the
/// battery/reset cause word and the end marker position as big-endian u16s.
pub fn build_frame(pairs: &[Pair], status: &Status, endmarkerpos: u16) -> Vec<u8> {
    let mut frame = Vec::with_capacity(pairs.len() * 3 + 8);

    for pair in pairs {
        frame.extend_from_slice(&pair.to_bytes());
    }

    frame.extend_from_slice(&status.loopcount.to_be_bytes());
    frame.extend_from_slice(&status.resets_all_time.to_be_bytes());
    frame.extend_from_slice(&status.batv_resetcause().to_be_bytes());
    frame.extend_from_slice(&endmarkerpos.to_be_bytes());

    frame
}

/// Full-length digest of a frame: HMAC-MD5 keyed with `secret_key`, or plain
/// MD5 when `hash_type` is `Md5` (the key is then ignored).
pub fn digest(frame: &[u8], hash_type: HashType, secret_key: &[u8]) -> Result<Vec<u8>, DecodeError> {
    match hash_type {
        HashType::HmacMd5 => {
            let mut mac =
                <HmacMd5 as Mac>::new_from_slice(secret_key).map_err(|_| DecodeError::InvalidKey)?;
            mac.update(frame);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        HashType::Md5 => Ok(Md5::digest(frame).to_vec()),
    }
}

/// Check the digest carried in the URL against one computed from the pairs.
///
/// The computed digest is truncated to the length of `url_digest` before
/// comparison. On mismatch both digests are returned as hex for diagnostics.
pub fn verify(
    pairs: &[Pair],
    status: &Status,
    endmarkerpos: u16,
    hash_type: HashType,
    secret_key: &[u8],
    url_digest: &[u8],
) -> Result<(), DecodeError> {
    let frame = build_frame(pairs, status, endmarkerpos);
    let calculated = digest(&frame, hash_type, secret_key)?;

    let truncated = &calculated[..url_digest.len().min(calculated.len())];
    if url_digest.is_empty() || truncated != url_digest {
        warn!(
            "Message integrity check failed ({:?}) over {} pairs",
            hash_type,
            pairs.len()
        );
        return Err(DecodeError::MessageIntegrity {
            calculated: to_hex(truncated),
            received: to_hex(url_digest),
        });
    }

    debug!("Verified {:?} digest over {} byte frame", hash_type, frame.len());
    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
