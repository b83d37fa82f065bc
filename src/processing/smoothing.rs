//! Equal-population time binning used to de-noise series before plotting
use log::debug;
use time::OffsetDateTime;
use time_tz::Tz;

use crate::models::SmoothedPoint;
use crate::utils::{mean, to_display_zone};

/// Smooth a series by binning it into `num_bins` equal-population time bins
///
/// Bin edges are the quantiles of the numeric timestamps, so every bin covers
/// roughly the same number of readings. Duplicate edges are dropped, which
/// means fewer bins than requested come back when timestamps repeat. Each
/// non-empty bin produces the mean value and the median timestamp, the latter
/// expressed in `tz`.
///
/// # Arguments
/// * `points` - (timestamp, value) pairs, in any order
/// * `num_bins` - Upper bound on the number of output points
/// * `tz` - Display time zone for the output timestamps
///
/// # Returns
/// Smoothed points ordered by timestamp; empty if `points` is empty
pub fn smooth_series(
    points: &[(OffsetDateTime, f64)],
    num_bins: usize,
    tz: &Tz,
) -> Vec<SmoothedPoint> {
    if points.is_empty() || num_bins == 0 {
        return Vec::new();
    }

    let mut sorted = points.to_vec();
    sorted.sort_by_key(|(timestamp, _)| *timestamp);

    let keys: Vec<f64> = sorted
        .iter()
        .map(|(timestamp, _)| timestamp.unix_timestamp_nanos() as f64)
        .collect();
    let edges = bin_edges(&keys, num_bins);

    let mut smoothed = Vec::with_capacity(edges.len().saturating_sub(1).max(1));
    let mut start = 0;
    while start < sorted.len() {
        let bin = bin_index(&edges, keys[start]);
        let mut end = start + 1;
        while end < sorted.len() && bin_index(&edges, keys[end]) == bin {
            end += 1;
        }

        let group = &sorted[start..end];
        let values: Vec<f64> = group.iter().map(|(_, value)| *value).collect();
        if let Some(value) = mean(&values) {
            smoothed.push(SmoothedPoint {
                timestamp: to_display_zone(median_timestamp(group), tz),
                value,
            });
        }
        start = end;
    }

    debug!(
        "Smoothed {} readings into {} bins (requested {})",
        points.len(),
        smoothed.len(),
        num_bins
    );

    smoothed
}

/// Quantile edges `q(k / num_bins)` for `k = 0..=num_bins`, duplicates removed
///
/// `keys` must be sorted ascending and non-empty.
fn bin_edges(keys: &[f64], num_bins: usize) -> Vec<f64> {
    let mut edges: Vec<f64> = (0..=num_bins)
        .map(|k| quantile(keys, k as f64 / num_bins as f64))
        .collect();
    edges.dedup();
    edges
}

/// Linear-interpolation quantile of sorted data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Right-closed bin lookup; the first bin also takes the lowest edge
fn bin_index(edges: &[f64], key: f64) -> usize {
    if edges.len() < 2 {
        return 0;
    }
    let last = edges.len() - 2;
    edges[1..].partition_point(|edge| *edge < key).min(last)
}

/// Median timestamp of a time-sorted group, midpoint for even counts
fn median_timestamp(group: &[(OffsetDateTime, f64)]) -> OffsetDateTime {
    let mid = group.len() / 2;
    if group.len() % 2 == 1 {
        group[mid].0
    } else {
        let (lo, hi) = (group[mid - 1].0, group[mid].0);
        lo + (hi - lo) / 2_i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::datetime;
    use time::Duration;
    use time_tz::timezones;

    fn zone() -> &'static Tz {
        timezones::get_by_name("Europe/London").unwrap()
    }

    fn minutes(values: &[f64]) -> Vec<(OffsetDateTime, f64)> {
        let start = datetime!(2024-05-01 00:00 UTC);
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (start + Duration::minutes(i as i64), *v))
            .collect()
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(smooth_series(&[], 100, zone()).is_empty());
        assert!(smooth_series(&minutes(&[1.0]), 0, zone()).is_empty());
    }

    #[test]
    fn single_reading_gives_one_bin() {
        let points = minutes(&[42.0]);
        let smoothed = smooth_series(&points, 100, zone());
        assert_eq!(smoothed.len(), 1);
        assert_eq!(smoothed[0].value, 42.0);
        assert_eq!(smoothed[0].timestamp, points[0].0);
    }

    #[test]
    fn identical_timestamps_collapse_to_one_bin() {
        let t = datetime!(2024-05-01 12:00 UTC);
        let points = vec![(t, 1.0), (t, 2.0), (t, 6.0)];
        let smoothed = smooth_series(&points, 10, zone());
        assert_eq!(smoothed.len(), 1);
        assert_eq!(smoothed[0].value, 3.0);
        assert_eq!(smoothed[0].timestamp, t);
    }

    #[test]
    fn equal_population_bins() {
        let values: Vec<f64> = (0..8).map(f64::from).collect();
        let smoothed = smooth_series(&minutes(&values), 4, zone());
        let means: Vec<f64> = smoothed.iter().map(|p| p.value).collect();
        assert_eq!(means, vec![0.5, 2.5, 4.5, 6.5]);

        // Median of minutes 0 and 1 is 00:00:30
        assert_eq!(smoothed[0].timestamp, datetime!(2024-05-01 00:00:30 UTC));
    }

    #[test]
    fn fewer_points_than_bins() {
        let smoothed = smooth_series(&minutes(&[1.0, 2.0, 3.0]), 100, zone());
        assert_eq!(smoothed.len(), 3);
        assert_eq!(
            smoothed.iter().map(|p| p.value).collect::<Vec<_>>(),
            vec![1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn unsorted_input_is_ordered() {
        let mut points = minutes(&[1.0, 2.0, 3.0, 4.0]);
        points.reverse();
        let smoothed = smooth_series(&points, 2, zone());
        assert_eq!(
            smoothed.iter().map(|p| p.value).collect::<Vec<_>>(),
            vec![1.5, 3.5]
        );
    }

    #[test]
    fn output_uses_display_zone() {
        let denver = timezones::get_by_name("America/Denver").unwrap();
        let smoothed = smooth_series(&minutes(&[1.0]), 10, denver);
        assert_eq!(smoothed[0].timestamp.offset().whole_hours(), -6);
        assert_eq!(smoothed[0].timestamp, datetime!(2024-05-01 00:00 UTC));
    }

    #[test]
    fn quantile_interpolates() {
        let sorted = [0.0, 10.0, 20.0];
        assert_eq!(quantile(&sorted, 0.0), 0.0);
        assert_eq!(quantile(&sorted, 0.25), 5.0);
        assert_eq!(quantile(&sorted, 1.0), 20.0);
    }

    proptest! {
        #[test]
        fn bins_bounded_and_ordered(
            offsets in prop::collection::vec(0i64..100_000, 1..400),
            num_bins in 1usize..150,
        ) {
            let start = datetime!(2024-01-01 00:00 UTC);
            let points: Vec<(OffsetDateTime, f64)> = offsets
                .iter()
                .map(|s| (start + Duration::seconds(*s), *s as f64))
                .collect();
            let smoothed = smooth_series(&points, num_bins, zone());

            prop_assert!(!smoothed.is_empty());
            prop_assert!(smoothed.len() <= num_bins);
            prop_assert!(smoothed.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        }
    }
}
