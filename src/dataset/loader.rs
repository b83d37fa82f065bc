//! CSV loading and timestamp parsing for the sensor log
use std::path::Path;

use log::debug;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::errors::PlotError;
use crate::models::{RawReading, Reading};

/// Parse a `Timestamp` cell into a UTC instant
///
/// Accepts RFC 3339 / ISO-8601 date-times with either `T` or a space between
/// date and time, optional fractional seconds and an optional `Z`, `±HH:MM`
/// or `±HHMM` offset.
/// Timestamps without any zone designator are taken to be UTC. A bare date
/// means midnight UTC.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    let normalized = raw.trim().replacen(' ', "T", 1);

    if let Ok(dt) = OffsetDateTime::parse(&normalized, &Rfc3339) {
        return Ok(dt.to_offset(UtcOffset::UTC));
    }

    let with_offset = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]][offset_hour sign:mandatory][optional [:]][offset_minute]"
    );
    if let Ok(dt) = OffsetDateTime::parse(&normalized, &with_offset) {
        return Ok(dt.to_offset(UtcOffset::UTC));
    }

    let naive = format_description!(
        "[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
    );
    match PrimitiveDateTime::parse(&normalized, &naive) {
        Ok(dt) => Ok(dt.assume_utc()),
        Err(err) => {
            let date_only = format_description!("[year]-[month]-[day]");
            Date::parse(&normalized, &date_only)
                .map(|date| date.midnight().assume_utc())
                .map_err(|_| err)
        }
    }
}

impl TryFrom<(u64, RawReading)> for Reading {
    type Error = PlotError;

    fn try_from((line, raw): (u64, RawReading)) -> Result<Self, Self::Error> {
        let timestamp =
            parse_timestamp(&raw.timestamp).map_err(|e| PlotError::TimestampParse {
                value: raw.timestamp.clone(),
                line,
                reason: e.to_string(),
            })?;

        Ok(Reading {
            timestamp,
            soil_moisture: [
                raw.soil_moisture_1,
                raw.soil_moisture_2,
                raw.soil_moisture_3,
                raw.soil_moisture_4,
            ],
            temperature_c: raw.temperature_c,
            pressure_hpa: raw.pressure_hpa,
            humidity_percent: raw.humidity_percent,
        })
    }
}

/// Load every reading from the sensor CSV
///
/// Columns are matched by header name, so extra columns are ignored.
///
/// # Returns
/// Readings in file order, `MissingInput` if the file does not exist,
/// `TimestampParse` for the first unparseable timestamp and `Csv` for
/// any other malformed row
pub fn load_readings(path: &Path) -> Result<Vec<Reading>, PlotError> {
    if !path.exists() {
        return Err(PlotError::MissingInput(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut readings = Vec::new();
    for (index, result) in reader.deserialize::<RawReading>().enumerate() {
        let raw = result?;
        // Line 1 holds the header
        let line = index as u64 + 2;
        readings.push(Reading::try_from((line, raw))?);
    }

    debug!("Loaded {} readings from {}", readings.len(), path.display());
    Ok(readings)
}
