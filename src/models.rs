use serde::{Deserialize, Deserializer};
use time::OffsetDateTime;

pub const MOISTURE_CHANNELS: usize = 4;

/// Empty numeric cells are sensor gaps and read as NaN; other text must parse
fn empty_as_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// One row of the sensor log exactly as it appears in the CSV file
#[derive(Debug, Clone, Deserialize)]
pub struct RawReading {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Soil_Moisture_1", deserialize_with = "empty_as_nan")]
    pub soil_moisture_1: f64,
    #[serde(rename = "Soil_Moisture_2", deserialize_with = "empty_as_nan")]
    pub soil_moisture_2: f64,
    #[serde(rename = "Soil_Moisture_3", deserialize_with = "empty_as_nan")]
    pub soil_moisture_3: f64,
    #[serde(rename = "Soil_Moisture_4", deserialize_with = "empty_as_nan")]
    pub soil_moisture_4: f64,
    #[serde(rename = "Temperature_C", deserialize_with = "empty_as_nan")]
    pub temperature_c: f64,
    #[serde(rename = "Pressure_hPa", deserialize_with = "empty_as_nan")]
    pub pressure_hpa: f64,
    #[serde(rename = "Humidity_percent", deserialize_with = "empty_as_nan")]
    pub humidity_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: OffsetDateTime,
    pub soil_moisture: [f64; MOISTURE_CHANNELS],
    pub temperature_c: f64,
    pub pressure_hpa: f64,
    pub humidity_percent: f64,
}

/// Dry/wet ADC calibration points of one moisture sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub dry: f64,
    pub wet: f64,
}

/// One aggregated bin of a smoothed series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedPoint {
    pub timestamp: OffsetDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotWindow {
    pub hours: u32,
    pub file_name: String,
}

impl PlotWindow {
    pub fn new(hours: u32, file_name: &str) -> Self {
        PlotWindow {
            hours,
            file_name: file_name.to_string(),
        }
    }
}

/// Everything the renderer needs for one figure
#[derive(Debug, Clone)]
pub struct PlotReport {
    pub earliest: String,
    pub latest: String,
    pub moisture_medians: [f64; MOISTURE_CHANNELS],
    pub moisture: [Vec<SmoothedPoint>; MOISTURE_CHANNELS],
    pub temperature: Vec<SmoothedPoint>,
    pub pressure: Vec<SmoothedPoint>,
    pub humidity: Vec<SmoothedPoint>,
}
