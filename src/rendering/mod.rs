pub mod chart;
pub mod style;

pub use chart::render_report;
