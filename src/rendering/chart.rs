//! Three-panel report figure: moisture, temperature, pressure and humidity
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use log::debug;
use plotters::coord::Shift;
use plotters::prelude::*;
use time_tz::Tz;

use super::style::*;
use crate::errors::PlotError;
use crate::models::{PlotReport, SmoothedPoint};
use crate::utils::{celsius_to_fahrenheit, format_axis_time, from_plot_x, to_plot_x};

const MEDIAN_STEP: i32 = 150;
const SEPARATOR_STEP: i32 = 60;
const SINGLE_POINT_PADDING_SECS: f64 = 1800.0;

/// Render a report to `path`
///
/// A `.svg` extension selects the SVG backend, anything else is written as a
/// PNG bitmap. Missing parent directories are created. The figure is drawn
/// into a staging file next to `path` and only moved into place once drawing
/// has succeeded, so a failed render leaves any previous image untouched.
pub fn render_report(report: &PlotReport, path: &Path, tz: &Tz) -> Result<(), PlotError> {
    write_staged(path, |staging| {
        if is_svg(path) {
            let root = SVGBackend::new(staging, FIGURE_SIZE).into_drawing_area();
            draw_figure(&root, report, tz)?;
            root.present()?;
        } else {
            let root = BitMapBackend::new(staging, FIGURE_SIZE).into_drawing_area();
            draw_figure(&root, report, tz)?;
            root.present()?;
        }
        Ok(())
    })?;

    debug!("Rendered {}", path.display());
    Ok(())
}

/// Run `draw` against a staging path and rename the result onto `path`
///
/// plotters backends flush to disk when dropped, even after an error, so the
/// staging file is removed whenever `draw` fails.
fn write_staged<F>(path: &Path, draw: F) -> Result<(), PlotError>
where
    F: FnOnce(&Path) -> Result<(), PlotError>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let staging = staging_path(path);
    match draw(&staging) {
        Ok(()) => {
            fs::rename(&staging, path)?;
            Ok(())
        }
        Err(e) => {
            if staging.exists() {
                let _ = fs::remove_file(&staging);
            }
            Err(e)
        }
    }
}

/// Hidden sibling of `path` that keeps its extension, e.g. `.plot.partial.png`
fn staging_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!(".{}.partial.{}", stem, ext.to_string_lossy()),
        None => format!(".{}.partial", stem),
    };
    path.with_file_name(name)
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("svg"))
        .unwrap_or(false)
}

fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    report: &PlotReport,
    tz: &Tz,
) -> Result<(), PlotError> {
    root.fill(&WHITE)?;

    let (header, body) = root.split_vertically(HEADER_HEIGHT);
    draw_header(&header, report)?;

    // Equal plot heights; the bottom panel also carries the time labels
    let (_, body_height) = body.dim_in_pixel();
    let panel_height = body_height.saturating_sub(X_LABEL_AREA) / 3;
    let (top, rest) = body.split_vertically(panel_height);
    let (middle, bottom) = rest.split_vertically(panel_height);

    let x_range = time_range(report);
    draw_moisture_panel(&top, report, x_range.clone())?;
    draw_temperature_panel(&middle, &report.temperature, x_range.clone())?;
    draw_atmosphere_panel(&bottom, &report.pressure, &report.humidity, x_range, tz)?;

    Ok(())
}

fn draw_header<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    report: &PlotReport,
) -> Result<(), PlotError> {
    let left = SIDE_MARGIN as i32;
    let title = format!("Time Span: {} - {}", report.earliest, report.latest);
    area.draw(&Text::new(title, (left, 30), title_font().color(&BLACK)))?;

    let mut x = left;
    for (i, median) in report.moisture_medians.iter().enumerate() {
        let text = format!("{:.2}", median);
        area.draw(&Text::new(
            text,
            (x, 120),
            median_font().color(&MOISTURE_COLORS[i]),
        ))?;
        x += MEDIAN_STEP;

        if i + 1 < report.moisture_medians.len() {
            area.draw(&Text::new("|", (x, 120), median_font().color(&BLACK)))?;
            x += SEPARATOR_STEP;
        }
    }

    Ok(())
}

fn draw_moisture_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    report: &PlotReport,
    x_range: Range<f64>,
) -> Result<(), PlotError> {
    let mut chart = ChartBuilder::on(area)
        .margin_left(SIDE_MARGIN)
        .margin_right(SIDE_MARGIN)
        .y_label_area_size(Y_LABEL_AREA)
        .right_y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x_range, -0.1f64..1.1f64)?;

    chart
        .configure_mesh()
        .bold_line_style(grid_style())
        .light_line_style(WHITE)
        .y_desc("Soil Moisture")
        .axis_desc_style(axis_font())
        .label_style(tick_font())
        .draw()?;

    for (i, series) in report.moisture.iter().enumerate() {
        let color = MOISTURE_COLORS[i];
        chart
            .draw_series(LineSeries::new(series.iter().map(xy), series_style(color)))?
            .label(format!("Moisture {}", i + 1))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 60, y)], series_style(color)));
        if series.len() == 1 {
            chart.draw_series(series.iter().map(|p| Circle::new(xy(p), 8, color.filled())))?;
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .label_font(tick_font())
        .draw()?;

    Ok(())
}

fn draw_temperature_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    temperature: &[SmoothedPoint],
    x_range: Range<f64>,
) -> Result<(), PlotError> {
    let celsius = value_range(temperature.iter().map(|p| p.value));
    let fahrenheit = celsius_to_fahrenheit(celsius.start)..celsius_to_fahrenheit(celsius.end);

    let mut chart = ChartBuilder::on(area)
        .margin_left(SIDE_MARGIN)
        .margin_right(SIDE_MARGIN)
        .y_label_area_size(Y_LABEL_AREA)
        .right_y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x_range.clone(), celsius)?
        .set_secondary_coord(x_range, fahrenheit);

    chart
        .configure_mesh()
        .bold_line_style(grid_style())
        .light_line_style(WHITE)
        .y_desc("Temperature (°C)")
        .axis_desc_style(axis_font().color(&TEMP_C_COLOR))
        .label_style(tick_font())
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc("Temperature (°F)")
        .axis_desc_style(axis_font().color(&TEMP_F_COLOR))
        .label_style(tick_font())
        .draw()?;

    chart.draw_series(LineSeries::new(
        temperature.iter().map(xy),
        series_style(TEMP_C_COLOR),
    ))?;
    chart.draw_secondary_series(DashedLineSeries::new(
        temperature
            .iter()
            .map(|p| (to_plot_x(&p.timestamp), celsius_to_fahrenheit(p.value))),
        24,
        16,
        series_style(TEMP_F_COLOR),
    ))?;
    if temperature.len() == 1 {
        chart.draw_series(
            temperature
                .iter()
                .map(|p| Circle::new(xy(p), 8, TEMP_C_COLOR.filled())),
        )?;
    }

    Ok(())
}

fn draw_atmosphere_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    pressure: &[SmoothedPoint],
    humidity: &[SmoothedPoint],
    x_range: Range<f64>,
    tz: &Tz,
) -> Result<(), PlotError> {
    let mut chart = ChartBuilder::on(area)
        .margin_left(SIDE_MARGIN)
        .margin_right(SIDE_MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .right_y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(
            x_range.clone(),
            value_range(pressure.iter().map(|p| p.value)),
        )?
        .set_secondary_coord(x_range, value_range(humidity.iter().map(|p| p.value)));

    let time_label = |x: &f64| axis_label(*x, tz);
    chart
        .configure_mesh()
        .bold_line_style(grid_style())
        .light_line_style(WHITE)
        .x_labels(8)
        .x_label_formatter(&time_label)
        .x_desc("Time")
        .y_desc("Pressure (hPa)")
        .axis_desc_style(axis_font().color(&PRESSURE_COLOR))
        .label_style(tick_font())
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc("Humidity (%)")
        .axis_desc_style(axis_font().color(&HUMIDITY_COLOR))
        .label_style(tick_font())
        .draw()?;

    chart.draw_series(LineSeries::new(
        pressure.iter().map(xy),
        series_style(PRESSURE_COLOR),
    ))?;
    chart.draw_secondary_series(LineSeries::new(
        humidity.iter().map(xy),
        series_style(HUMIDITY_COLOR),
    ))?;
    if pressure.len() == 1 {
        chart.draw_series(
            pressure
                .iter()
                .map(|p| Circle::new(xy(p), 8, PRESSURE_COLOR.filled())),
        )?;
    }

    Ok(())
}

fn xy(point: &SmoothedPoint) -> (f64, f64) {
    (to_plot_x(&point.timestamp), point.value)
}

fn axis_label(x: f64, tz: &Tz) -> String {
    from_plot_x(x)
        .map(|dt| format_axis_time(&dt, tz))
        .unwrap_or_default()
}

/// Shared time axis covering every series of the report
fn time_range(report: &PlotReport) -> Range<f64> {
    let xs = report
        .moisture
        .iter()
        .flatten()
        .chain(&report.temperature)
        .chain(&report.pressure)
        .chain(&report.humidity)
        .map(|p| to_plot_x(&p.timestamp));

    let (min, max) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), x| {
        (min.min(x), max.max(x))
    });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if min == max {
        return (min - SINGLE_POINT_PADDING_SECS)..(max + SINGLE_POINT_PADDING_SECS);
    }
    min..max
}

/// Data range padded by 5% on each side, or by 1.0 when the series is flat
fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(v), max.max(v))
        });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if min == max {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}
