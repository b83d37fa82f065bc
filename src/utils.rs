//! Utility functions for time zone handling, formatting and simple statistics
use time::macros::format_description;
use time::{Duration, OffsetDateTime};
use time_tz::{Offset, TimeZone, Tz};

/// Re-express an instant in the given display time zone
pub fn to_display_zone(dt: OffsetDateTime, tz: &Tz) -> OffsetDateTime {
    dt.to_offset(tz.get_offset_utc(&dt).to_utc())
}

/// Format a timestamp for the chart header
///
/// Produces `YYYY-MM-DD HH:MM ZZZ` where the zone is the abbreviation in
/// effect at that instant (e.g. `MST` or `MDT`). Falls back to the default
/// string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime, tz: &Tz) -> String {
    let local = to_display_zone(*dt, tz);
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    match local.format(&format) {
        Ok(text) => format!("{} {}", text, tz.get_offset_utc(dt).name()),
        Err(_) => local.to_string(),
    }
}

/// Format an axis tick as `HH:MM DD-Mon` in the display zone
pub fn format_axis_time(dt: &OffsetDateTime, tz: &Tz) -> String {
    let local = to_display_zone(*dt, tz);
    let format = format_description!("[hour]:[minute] [day]-[month repr:short]");
    local.format(&format).unwrap_or_else(|_| local.to_string())
}

/// Seconds since the Unix epoch as a plot coordinate
pub fn to_plot_x(dt: &OffsetDateTime) -> f64 {
    dt.unix_timestamp() as f64 + f64::from(dt.nanosecond()) / 1e9
}

/// Inverse of [`to_plot_x`]; `None` outside the representable range
pub fn from_plot_x(x: f64) -> Option<OffsetDateTime> {
    if !x.is_finite() {
        return None;
    }
    let seconds = x.floor();
    let nanos = ((x - seconds) * 1e9).round() as i64;
    OffsetDateTime::from_unix_timestamp(seconds as i64)
        .ok()
        .map(|dt| dt + Duration::nanoseconds(nanos))
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Arithmetic mean; NaN values (gaps in the log) are ignored
pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

/// Median with the usual even-count midpoint; NaN values are ignored
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time_tz::timezones;

    fn denver() -> &'static Tz {
        timezones::get_by_name("America/Denver").unwrap()
    }

    #[test]
    fn converts_to_mountain_time() {
        let winter = to_display_zone(datetime!(2024-01-15 19:00 UTC), denver());
        assert_eq!(winter.hour(), 12);
        assert_eq!(winter.offset().whole_hours(), -7);

        let summer = to_display_zone(datetime!(2024-07-15 19:00 UTC), denver());
        assert_eq!(summer.hour(), 13);
        assert_eq!(summer.offset().whole_hours(), -6);
    }

    #[test]
    fn header_format_carries_abbreviation() {
        assert_eq!(
            format_datetime(&datetime!(2024-01-15 19:05 UTC), denver()),
            "2024-01-15 12:05 MST"
        );
        assert_eq!(
            format_datetime(&datetime!(2024-07-15 19:05 UTC), denver()),
            "2024-07-15 13:05 MDT"
        );
    }

    #[test]
    fn axis_format() {
        assert_eq!(
            format_axis_time(&datetime!(2024-03-02 07:30 UTC), denver()),
            "00:30 02-Mar"
        );
    }

    #[test]
    fn plot_x_round_trip() {
        let dt = datetime!(2024-03-02 07:30:15 UTC);
        assert_eq!(from_plot_x(to_plot_x(&dt)), Some(dt));
    }

    #[test]
    fn fahrenheit() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn median_and_mean() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[f64::NAN, 5.0]), Some(5.0));
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[40.0, f64::NAN]), Some(40.0));
        assert_eq!(mean(&[f64::NAN, f64::NAN]), None);
    }
}
