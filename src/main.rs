mod config;
mod dataset;
mod errors;
mod models;
mod processing;
mod rendering;
mod report;
mod utils;

use log::{error, info, warn};

use config::PlotConfig;
use errors::PlotError;
use report::save_plot;

fn main() -> Result<(), PlotError> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match PlotConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let mut saved = 0;
    for window in &config.windows {
        match save_plot(&config, window) {
            Ok(_) => saved += 1,
            Err(e) if e.is_skip() => warn!("Skipping {}: {}", window.file_name, e),
            Err(e) => error!("Failed to render {}: {}", window.file_name, e),
        }
    }

    info!("{} of {} plots written", saved, config.windows.len());
    Ok(())
}
