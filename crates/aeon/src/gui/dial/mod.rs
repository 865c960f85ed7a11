pub mod view;

pub use view::draw;

pub const RING_LINE_WIDTH: f64 = 28.0; // visual stroke; hit bands are wider
pub const SUN_RADIUS: f64 = 26.0;
pub const MARKER_RADIUS: f64 = 6.0;
pub const SELECTED_RING_RADIUS: f64 = 11.0;
pub const LABEL_FONT_SIZE: f64 = 13.0;
pub const TITLE_FONT_SIZE: f64 = 34.0;
pub const SUBTITLE_FONT_SIZE: f64 = 16.0;
pub const BODY_FONT_SIZE: f64 = 18.0;
pub const BODY_LINE_HEIGHT: f64 = 1.5;
pub const CONTENT_PADDING: f64 = 48.0;
pub const SURFACE_ALPHA: f64 = 0.92;
pub const LOADING_TEXT: &str = "Loading ages…";
