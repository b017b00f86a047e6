pub mod hdc2021;

use serde::Serialize;

use crate::error::DecodeError;
use crate::models::{Measurement, Pair};

// Format codes written by the encoder into the version tag
const FORMAT_HDC2021_TRH: u8 = 1;
const FORMAT_HDC2021_TEMPONLY: u8 = 2;

/// Record format of the circular buffer, selected by the format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CircFormat {
    /// HDC2021 temperature and relative humidity, one sample per pair
    TempRh,
    /// HDC2021 temperature only, up to two samples per pair
    TempOnly,
}

impl CircFormat {
    pub fn code(self) -> u8 {
        match self {
            CircFormat::TempRh => FORMAT_HDC2021_TRH,
            CircFormat::TempOnly => FORMAT_HDC2021_TEMPONLY,
        }
    }

    /// Convert pairs (newest first) into measurements (newest first).
    pub fn decode(self, pairs: &[Pair]) -> Vec<Measurement> {
        match self {
            CircFormat::TempRh => hdc2021::decode_temp_rh(pairs),
            CircFormat::TempOnly => hdc2021::decode_temp(pairs),
        }
    }
}

impl TryFrom<u8> for CircFormat {
    type Error = DecodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            FORMAT_HDC2021_TRH => Ok(CircFormat::TempRh),
            FORMAT_HDC2021_TEMPONLY => Ok(CircFormat::TempOnly),
            _ => Err(DecodeError::InvalidFormat { code }),
        }
    }
}
