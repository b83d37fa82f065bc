//! Look-back window selection relative to the newest reading
use log::debug;
use time::Duration;

use crate::models::Reading;

/// Keep the readings within `hours` of the latest timestamp, both ends inclusive
///
/// The window is anchored at the newest reading in the data set, not at the
/// current wall-clock time, so a stale log still produces a full chart.
pub fn filter_window(readings: &[Reading], hours: u32) -> Vec<Reading> {
    let Some(latest) = readings.iter().map(|r| r.timestamp).max() else {
        return Vec::new();
    };
    let cutoff = latest - Duration::hours(i64::from(hours));

    let kept: Vec<Reading> = readings
        .iter()
        .filter(|r| r.timestamp >= cutoff && r.timestamp <= latest)
        .cloned()
        .collect();

    debug!(
        "Window of {} hours keeps {} of {} readings",
        hours,
        kept.len(),
        readings.len()
    );
    kept
}
