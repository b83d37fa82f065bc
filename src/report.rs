//! Per-window report driver: load, filter, calibrate, smooth and render
use std::path::PathBuf;

use log::{debug, info};
use time::OffsetDateTime;

use crate::config::PlotConfig;
use crate::dataset::{filter_window, load_readings};
use crate::errors::PlotError;
use crate::models::{PlotReport, PlotWindow, Reading, SmoothedPoint, MOISTURE_CHANNELS};
use crate::processing::smooth_series;
use crate::rendering::render_report;
use crate::utils::{format_datetime, median, to_display_zone};

/// Render the chart for one look-back window
///
/// # Arguments
/// * `config` - Input path, calibration, display zone and bin count
/// * `window` - Look-back duration and output file name
///
/// # Returns
/// Path of the written image. `MissingInput`, `TimestampParse` and
/// `EmptyWindow` mean the window was skipped; no file is written in any
/// error case.
pub fn save_plot(config: &PlotConfig, window: &PlotWindow) -> Result<PathBuf, PlotError> {
    let report = build_report(config, window.hours)?;

    let output_path = config.output_path(window);
    render_report(&report, &output_path, config.timezone)?;

    info!("Plot saved as {}", output_path.display());
    Ok(output_path)
}

/// Run every pipeline stage up to, but not including, rendering
pub fn build_report(config: &PlotConfig, hours: u32) -> Result<PlotReport, PlotError> {
    let mut readings = load_readings(&config.csv_path)?;
    for reading in readings.iter_mut() {
        reading.timestamp = to_display_zone(reading.timestamp, config.timezone);
    }
    readings.sort_by_key(|r| r.timestamp);

    let mut window = filter_window(&readings, hours);
    let (Some(first), Some(last)) = (window.first(), window.last()) else {
        return Err(PlotError::EmptyWindow(hours));
    };
    let earliest = format_datetime(&first.timestamp, config.timezone);
    let latest = format_datetime(&last.timestamp, config.timezone);

    for reading in window.iter_mut() {
        for (value, cal) in reading.soil_moisture.iter_mut().zip(&config.calibration) {
            *value = cal.scale(*value);
        }
    }

    let mut moisture_medians = [f64::NAN; MOISTURE_CHANNELS];
    for (channel, slot) in moisture_medians.iter_mut().enumerate() {
        let values: Vec<f64> = window.iter().map(|r| r.soil_moisture[channel]).collect();
        *slot = median(&values).unwrap_or(f64::NAN);
    }
    debug!("Median moisture for {}h window: {:?}", hours, moisture_medians);

    let smooth = |column: fn(&Reading) -> f64| -> Vec<SmoothedPoint> {
        let points: Vec<(OffsetDateTime, f64)> =
            window.iter().map(|r| (r.timestamp, column(r))).collect();
        smooth_series(&points, config.num_bins, config.timezone)
    };

    Ok(PlotReport {
        earliest,
        latest,
        moisture_medians,
        moisture: [
            smooth(|r| r.soil_moisture[0]),
            smooth(|r| r.soil_moisture[1]),
            smooth(|r| r.soil_moisture[2]),
            smooth(|r| r.soil_moisture[3]),
        ],
        temperature: smooth(|r| r.temperature_c),
        pressure: smooth(|r| r.pressure_hpa),
        humidity: smooth(|r| r.humidity_percent),
    })
}
