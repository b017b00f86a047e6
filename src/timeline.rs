/// Back-computes absolute timestamps for decoded samples
use time::{Duration, OffsetDateTime};

use crate::models::{Measurement, Sample};

/// Timestamp of the newest sample: the scan time less the minutes elapsed
/// since that sample was written.
pub fn newest_timestamp(scan_timestamp: OffsetDateTime, elapsed_minutes: u32) -> OffsetDateTime {
    scan_timestamp - Duration::minutes(i64::from(elapsed_minutes))
}

/// Attach a timestamp to every measurement.
///
/// Measurements must be ordered newest first. The one at index `i` is
/// stamped `newest - i * interval`.
pub fn apply_timestamps(
    measurements: Vec<Measurement>,
    newest: OffsetDateTime,
    interval_minutes: u16,
) -> Vec<Sample> {
    let interval = Duration::minutes(i64::from(interval_minutes));

    measurements
        .into_iter()
        .enumerate()
        .map(|(index, measurement)| {
            // Sample counts are bounded by the tag size, so this cannot overflow i32
            let offset = interval * index as i32;
            Sample::new(measurement, newest - offset)
        })
        .collect()
}
