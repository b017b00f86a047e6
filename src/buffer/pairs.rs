/// Extraction of packed reading pairs from the linear payload
use log::debug;

use crate::codec::base64url;
use crate::error::DecodeError;
use crate::models::Pair;

/// Base64 characters per demi.
pub const BYTES_PER_DEMI: usize = 8;
/// Base64 characters per pair.
pub const BYTES_PER_PAIRB64: usize = 4;
pub const PAIRS_PER_DEMI: usize = 2;

/// Decode `npairs` pairs from the payload, newest first.
///
/// The payload is cut into 8 character demis from its start. The newest demi
/// is the last one. When `npairs` is odd it holds a single valid pair, in its
/// first four characters; the other slot is stale. Every older demi holds two
/// pairs, the newer of which is in its last four characters.
pub fn extract_pairs(payload: &str, npairs: u16) -> Result<Vec<Pair>, DecodeError> {
    let npairs = usize::from(npairs);
    let partial = npairs % PAIRS_PER_DEMI;
    let full = npairs / PAIRS_PER_DEMI;
    let needed = full + partial;

    let demis: Vec<&[u8]> = payload.as_bytes().chunks(BYTES_PER_DEMI).collect();
    if needed > demis.len() {
        return Err(DecodeError::TooFewDemis {
            needed,
            available: demis.len(),
        });
    }

    let mut newest_first = demis.iter().rev();
    let mut pairs = Vec::with_capacity(npairs);

    if partial != 0 {
        if let Some(demi) = newest_first.next() {
            let [_, valid] = pairs_from_demi(demi)?;
            pairs.push(valid);
        }
    }

    for demi in newest_first.take(full) {
        pairs.extend(pairs_from_demi(demi)?);
    }

    debug!(
        "Extracted {} pairs from {} demis ({} partial)",
        pairs.len(),
        needed,
        partial
    );
    Ok(pairs)
}

/// Decode one demi into two pairs, newest first.
fn pairs_from_demi(demi: &[u8]) -> Result<[Pair; 2], DecodeError> {
    if demi.len() != BYTES_PER_DEMI {
        return Err(malformed(demi));
    }

    let (older_b64, newer_b64) = demi.split_at(BYTES_PER_PAIRB64);
    let older = pair_from_b64(older_b64, demi)?;
    let newer = pair_from_b64(newer_b64, demi)?;

    Ok([newer, older])
}

fn pair_from_b64(pair_b64: &[u8], demi: &[u8]) -> Result<Pair, DecodeError> {
    let text = std::str::from_utf8(pair_b64).map_err(|_| malformed(demi))?;
    let bytes: [u8; 3] = base64url::decode(text)?
        .try_into()
        .map_err(|_| malformed(demi))?;
    Ok(Pair::from_bytes(bytes))
}

fn malformed(demi: &[u8]) -> DecodeError {
    DecodeError::MalformedDemi {
        demi: String::from_utf8_lossy(demi).into_owned(),
    }
}
