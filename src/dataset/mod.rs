pub mod loader;
pub mod window;

pub use loader::load_readings;
pub use window::filter_window;
