//! Colours, fonts and sizes of the report figure
use plotters::prelude::*;

/// 12 x 10 inches at 300 dpi
pub const FIGURE_SIZE: (u32, u32) = (3600, 3000);

pub const HEADER_HEIGHT: u32 = 220;
pub const X_LABEL_AREA: u32 = 200;
pub const Y_LABEL_AREA: u32 = 240;
pub const SIDE_MARGIN: u32 = 40;
pub const LINE_WIDTH: u32 = 6;
pub const SERIES_ALPHA: f64 = 0.8;

pub const MOISTURE_COLORS: [RGBColor; 4] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
];
pub const TEMP_C_COLOR: RGBColor = RGBColor(0xe4, 0x1a, 0x1c);
pub const TEMP_F_COLOR: RGBColor = RGBColor(0x37, 0x7e, 0xb8);
pub const PRESSURE_COLOR: RGBColor = RGBColor(0x4d, 0xaf, 0x4a);
pub const HUMIDITY_COLOR: RGBColor = RGBColor(0x98, 0x4e, 0xa3);

pub fn title_font() -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, 56.0, FontStyle::Bold)
}

pub fn median_font() -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, 48.0, FontStyle::Bold)
}

pub fn axis_font() -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, 48.0, FontStyle::Normal)
}

pub fn tick_font() -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, 40.0, FontStyle::Normal)
}

pub fn series_style(color: RGBColor) -> ShapeStyle {
    color.mix(SERIES_ALPHA).stroke_width(LINE_WIDTH)
}

/// Faint grid lines
pub fn grid_style() -> ShapeStyle {
    BLACK.mix(0.15).stroke_width(1)
}
