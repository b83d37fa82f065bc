//! Error type shared by every stage of the plotting pipeline
use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("CSV file {} not found!", .0.display())]
    MissingInput(PathBuf),

    #[error("Error parsing timestamps: {value:?} on line {line}: {reason}")]
    TimestampParse {
        value: String,
        line: u64,
        reason: String,
    },

    #[error("No data available for the last {0} hours.")]
    EmptyWindow(u32),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PlotError {
    /// Conditions that skip a window without being treated as a failure.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            PlotError::MissingInput(_) | PlotError::TimestampParse { .. } | PlotError::EmptyWindow(_)
        )
    }
}

impl<E> From<DrawingAreaErrorKind<E>> for PlotError
where
    E: std::error::Error + Send + Sync,
{
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        PlotError::Render(e.to_string())
    }
}
