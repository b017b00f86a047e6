/// HDC2021 raw reading conversions and the two record formats built on them
use crate::models::{Measurement, Pair};

/// Raw value the encoder writes into `rd1` when a temperature-only pair
/// holds a single reading.
pub const NO_READING: u16 = 4095;

/// Convert a 12-bit temperature reading to degrees C.
pub fn reading_to_temp(reading: u16) -> f64 {
    (f64::from(reading) * 165.0) / 4096.0 - 40.0
}

/// Convert a 12-bit relative humidity reading to percent.
pub fn reading_to_rh(reading: u16) -> f64 {
    (f64::from(reading) * 100.0) / 4096.0
}

fn temp_only(raw_temp: u16) -> Measurement {
    Measurement {
        raw_temp,
        temp: reading_to_temp(raw_temp),
        raw_rh: None,
        rh: None,
    }
}

/// Temperature and humidity: one measurement per pair.
///
/// - `rd0`: temperature
/// - `rd1`: relative humidity
pub fn decode_temp_rh(pairs: &[Pair]) -> Vec<Measurement> {
    pairs
        .iter()
        .map(|pair| {
            let (raw_temp, raw_rh) = (pair.rd0(), pair.rd1());
            Measurement {
                raw_temp,
                temp: reading_to_temp(raw_temp),
                raw_rh: Some(raw_rh),
                rh: Some(reading_to_rh(raw_rh)),
            }
        })
        .collect()
}

/// Temperature only: up to two measurements per pair.
///
/// The encoder writes the first reading into `rd0` and the second, later one
/// into `rd1`. Until the second arrives `rd1` holds [`NO_READING`], which is
/// dropped. Emitting `rd1` before `rd0` keeps the output newest first.
pub fn decode_temp(pairs: &[Pair]) -> Vec<Measurement> {
    let mut measurements = Vec::with_capacity(pairs.len() * 2);

    for pair in pairs {
        if pair.rd1() != NO_READING {
            measurements.push(temp_only(pair.rd1()));
        }
        measurements.push(temp_only(pair.rd0()));
    }

    measurements
}
