pub mod calibration;
pub mod smoothing;

pub use smoothing::smooth_series;
