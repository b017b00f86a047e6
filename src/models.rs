use serde::Serialize;
use std::fmt;
use time::OffsetDateTime;

use crate::formats::CircFormat;

// Reset cause bits written by the encoder firmware
const BOR_BIT: u8 = 0x01;
const SVSH_BIT: u8 = 0x02;
const WDT_BIT: u8 = 0x04;
const MISC_BIT: u8 = 0x08;
const LPM5WU_BIT: u8 = 0x10;
const CLOCKFAIL_BIT: u8 = 0x20;
const SCANTIMEOUT_BIT: u8 = 0x80;

/// Flags describing why the encoder last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ResetCause {
    pub brownout: bool,
    pub supervisor: bool,
    pub watchdog: bool,
    pub misc: bool,
    pub lpm5wakeup: bool,
    pub clockfail: bool,
    pub scantimeout: bool,
}

impl ResetCause {
    pub fn from_raw(raw: u8) -> Self {
        ResetCause {
            brownout: raw & BOR_BIT > 0,
            supervisor: raw & SVSH_BIT > 0,
            watchdog: raw & WDT_BIT > 0,
            misc: raw & MISC_BIT > 0,
            lpm5wakeup: raw & LPM5WU_BIT > 0,
            clockfail: raw & CLOCKFAIL_BIT > 0,
            scantimeout: raw & SCANTIMEOUT_BIT > 0,
        }
    }
}

/// Encoder status carried in the `x` URL parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub loopcount: u16,
    pub resets_all_time: u16,
    pub battery_raw: u8,
    pub reset_cause_raw: u8,
    pub reset_cause: ResetCause,
}

impl Status {
    pub fn new(loopcount: u16, resets_all_time: u16, battery_raw: u8, reset_cause_raw: u8) -> Self {
        Status {
            loopcount,
            resets_all_time,
            battery_raw,
            reset_cause_raw,
            reset_cause: ResetCause::from_raw(reset_cause_raw),
        }
    }

    /// Battery ADC value in the high byte, reset cause in the low byte.
    /// This is the word the encoder feeds into its digest.
    pub fn batv_resetcause(&self) -> u16 {
        (u16::from(self.battery_raw) << 8) | u16::from(self.reset_cause_raw)
    }

    /// Battery voltage in mV as the encoder documents it: `256 * 1500 / raw`.
    ///
    /// Returns None when the raw value is zero.
    pub fn battery_mv(&self) -> Option<f64> {
        if self.battery_raw == 0 {
            return None;
        }
        Some((256.0 * 1500.0) / f64::from(self.battery_raw))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reset cause: {:?}, Loop count: {}, Resets all time: {}, Battery voltage: ",
            self.reset_cause, self.loopcount, self.resets_all_time
        )?;
        match self.battery_mv() {
            Some(mv) => write!(f, "{:.0} mV", mv),
            None => write!(f, "unknown"),
        }
    }
}

/// Two 12-bit readings packed into three bytes.
///
/// The upper nibble of `lsb` completes `rd0`, the lower nibble completes `rd1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pair {
    pub rd0_msb: u8,
    pub rd1_msb: u8,
    pub lsb: u8,
}

impl Pair {
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        Pair {
            rd0_msb: bytes[0],
            rd1_msb: bytes[1],
            lsb: bytes[2],
        }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.rd0_msb, self.rd1_msb, self.lsb]
    }

    pub fn rd0(&self) -> u16 {
        (u16::from(self.rd0_msb) << 4) | u16::from((self.lsb >> 4) & 0xF)
    }

    pub fn rd1(&self) -> u16 {
        (u16::from(self.rd1_msb) << 4) | u16::from(self.lsb & 0xF)
    }
}

/// A reading converted to physical units, not yet placed in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub raw_temp: u16,
    pub temp: f64,
    pub raw_rh: Option<u16>,
    pub rh: Option<f64>,
}

/// A timestamped sample. Temperature is in degrees C, humidity in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub raw_temp: u16,
    pub temp: f64,
    pub raw_rh: Option<u16>,
    pub rh: Option<f64>,
}

impl Sample {
    pub fn new(measurement: Measurement, timestamp: OffsetDateTime) -> Self {
        Sample {
            timestamp,
            raw_temp: measurement.raw_temp,
            temp: measurement.temp,
            raw_rh: measurement.raw_rh,
            rh: measurement.rh,
        }
    }
}

/// Digest algorithm used to authenticate the pair history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HashType {
    HmacMd5,
    Md5,
}

impl HashType {
    pub fn from_use_hmac(use_hmac: bool) -> Self {
        if use_hmac {
            HashType::HmacMd5
        } else {
            HashType::Md5
        }
    }
}

/// Output of a successful decode. Samples are ordered newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeResult {
    pub status: Status,
    pub format: CircFormat,
    pub interval_minutes: u16,
    pub elapsed_minutes: u32,
    pub npairs: u16,
    #[serde(with = "time::serde::rfc3339")]
    pub scan_timestamp: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub newest_timestamp: OffsetDateTime,
    pub hash_type: HashType,
    pub digest_verified: bool,
    pub serial: Option<String>,
    pub samples: Vec<Sample>,
}
