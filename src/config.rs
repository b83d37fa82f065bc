use std::env;
use std::fmt;
use std::path::PathBuf;

use log::info;
use time_tz::{timezones, Tz};

use crate::errors::PlotError;
use crate::models::{Calibration, PlotWindow, MOISTURE_CHANNELS};

const DEFAULT_CSV_PATH: &str = "/media/bigdata/plant_station/all_plant_data.csv";
const DEFAULT_OUTPUT_DIR: &str = "/media/bigdata/plant_station";
const DEFAULT_TIMEZONE: &str = "America/Denver";
const DEFAULT_NUM_BINS: usize = 100;
const DEFAULT_DRY_VALUES: [f64; MOISTURE_CHANNELS] = [14500.0, 14500.0, 14500.0, 14500.0];
const DEFAULT_WET_VALUES: [f64; MOISTURE_CHANNELS] = [6000.0, 6300.0, 6100.0, 5800.0];

#[derive(Clone)]
pub struct PlotConfig {
    pub csv_path: PathBuf,
    pub output_dir: PathBuf,
    pub timezone_name: String,
    pub timezone: &'static Tz,
    pub num_bins: usize,
    pub calibration: [Calibration; MOISTURE_CHANNELS],
    pub windows: Vec<PlotWindow>,
}

impl PlotConfig {
    pub fn new() -> Result<Self, PlotError> {
        // Load environment variables
        dotenv::dotenv().ok();

        let csv_path = env::var("PLANT_CSV_PATH").unwrap_or_else(|_| DEFAULT_CSV_PATH.to_string());
        let output_dir =
            env::var("PLANT_OUTPUT_DIR").unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string());
        let timezone_name =
            env::var("PLANT_TIMEZONE").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string());

        let num_bins = match env::var("PLANT_NUM_BINS") {
            Ok(raw) => parse_num_bins(&raw)?,
            Err(_) => DEFAULT_NUM_BINS,
        };

        let dry = match env::var("PLANT_DRY_VALUES") {
            Ok(raw) => parse_channel_values("PLANT_DRY_VALUES", &raw)?,
            Err(_) => DEFAULT_DRY_VALUES,
        };
        let wet = match env::var("PLANT_WET_VALUES") {
            Ok(raw) => parse_channel_values("PLANT_WET_VALUES", &raw)?,
            Err(_) => DEFAULT_WET_VALUES,
        };

        let config = Self::build(
            PathBuf::from(csv_path),
            PathBuf::from(output_dir),
            &timezone_name,
            num_bins,
            dry,
            wet,
        )?;

        info!("CSV input: {}", config.csv_path.display());
        info!("Output directory: {}", config.output_dir.display());
        info!(
            "Display time zone: {}, {} bins",
            config.timezone_name, config.num_bins
        );
        for (i, cal) in config.calibration.iter().enumerate() {
            info!("Moisture {}: dry={} wet={}", i + 1, cal.dry, cal.wet);
        }

        Ok(config)
    }

    /// Assemble and validate a configuration from explicit values
    pub fn build(
        csv_path: PathBuf,
        output_dir: PathBuf,
        timezone_name: &str,
        num_bins: usize,
        dry: [f64; MOISTURE_CHANNELS],
        wet: [f64; MOISTURE_CHANNELS],
    ) -> Result<Self, PlotError> {
        let timezone = timezones::get_by_name(timezone_name)
            .ok_or_else(|| PlotError::Config(format!("unknown time zone '{}'", timezone_name)))?;

        if num_bins == 0 {
            return Err(PlotError::Config("bin count must be at least 1".into()));
        }

        let mut calibration = [Calibration { dry: 0.0, wet: 0.0 }; MOISTURE_CHANNELS];
        for i in 0..MOISTURE_CHANNELS {
            let cal = Calibration {
                dry: dry[i],
                wet: wet[i],
            };
            cal.validate()
                .map_err(|e| PlotError::Config(format!("moisture {}: {}", i + 1, e)))?;
            calibration[i] = cal;
        }

        Ok(PlotConfig {
            csv_path,
            output_dir,
            timezone_name: timezone_name.to_string(),
            timezone,
            num_bins,
            calibration,
            windows: default_windows(),
        })
    }

    pub fn output_path(&self, window: &PlotWindow) -> PathBuf {
        self.output_dir.join(&window.file_name)
    }
}

impl fmt::Debug for PlotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlotConfig")
            .field("csv_path", &self.csv_path)
            .field("output_dir", &self.output_dir)
            .field("timezone", &self.timezone_name)
            .field("num_bins", &self.num_bins)
            .field("calibration", &self.calibration)
            .field("windows", &self.windows)
            .finish()
    }
}

/// The look-back windows rendered on every run, in rendering order
pub fn default_windows() -> Vec<PlotWindow> {
    vec![
        PlotWindow::new(24, "last_24h_plant_plot.png"),
        PlotWindow::new(1, "last_1h_plant_plot.png"),
        PlotWindow::new(168, "last_week_plant_plot.png"),
        PlotWindow::new(720, "last_month_plant_plot.png"),
        PlotWindow::new(8760, "last_year_plant_plot.png"),
    ]
}

fn parse_num_bins(raw: &str) -> Result<usize, PlotError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| PlotError::Config(format!("PLANT_NUM_BINS '{}': {}", raw, e)))
}

/// Parse four comma-separated calibration values, e.g. `6000,6300,6100,5800`
fn parse_channel_values(key: &str, raw: &str) -> Result<[f64; MOISTURE_CHANNELS], PlotError> {
    let values = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| PlotError::Config(format!("{} '{}': {}", key, raw, e)))?;

    values.try_into().map_err(|v: Vec<f64>| {
        PlotError::Config(format!(
            "{} needs {} values, got {}",
            key,
            MOISTURE_CHANNELS,
            v.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(tz: &str, bins: usize, wet: [f64; 4]) -> Result<PlotConfig, PlotError> {
        PlotConfig::build(
            PathBuf::from("data.csv"),
            PathBuf::from("out"),
            tz,
            bins,
            DEFAULT_DRY_VALUES,
            wet,
        )
    }

    #[test]
    fn defaults_build() {
        let config = build(DEFAULT_TIMEZONE, DEFAULT_NUM_BINS, DEFAULT_WET_VALUES).unwrap();
        assert_eq!(config.num_bins, 100);
        assert_eq!(config.calibration[3], Calibration { dry: 14500.0, wet: 5800.0 });
        assert_eq!(config.windows.len(), 5);
        assert_eq!(
            config.output_path(&config.windows[0]),
            PathBuf::from("out/last_24h_plant_plot.png")
        );
    }

    #[test]
    fn window_hours_in_render_order() {
        let hours: Vec<u32> = default_windows().iter().map(|w| w.hours).collect();
        assert_eq!(hours, vec![24, 1, 168, 720, 8760]);
    }

    #[test]
    fn rejects_unknown_timezone() {
        let err = build("Mars/Olympus_Mons", 100, DEFAULT_WET_VALUES).unwrap_err();
        assert!(matches!(err, PlotError::Config(_)));
    }

    #[test]
    fn rejects_zero_bins() {
        assert!(build(DEFAULT_TIMEZONE, 0, DEFAULT_WET_VALUES).is_err());
    }

    #[test]
    fn rejects_equal_calibration_points() {
        let err = build(DEFAULT_TIMEZONE, 100, [6000.0, 14500.0, 6100.0, 5800.0]).unwrap_err();
        assert!(err.to_string().contains("moisture 2"));
    }

    #[test]
    fn parses_channel_lists() {
        assert_eq!(
            parse_channel_values("K", " 1, 2,3 ,4").unwrap(),
            [1.0, 2.0, 3.0, 4.0]
        );
        assert!(parse_channel_values("K", "1,2,3").is_err());
        assert!(parse_channel_values("K", "1,2,x,4").is_err());
        assert_eq!(parse_num_bins(" 50 ").unwrap(), 50);
        assert!(parse_num_bins("-1").is_err());
    }
}
