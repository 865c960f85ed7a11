//! Geometry, motion and animation engine for the orbital age dial.
//!
//! Everything in this crate is host-agnostic: a renderer feeds it categories, pointer events
//! and frame deltas through [`DialEngine`], and reads back a [`DialFrame`] snapshot holding
//! paths, marker positions and animation progress.

pub mod macros;

pub mod category;
pub mod config;
pub mod easing;
pub mod engine;
pub mod expansion;
pub mod hit;
pub mod layout;
pub mod orbit;
pub mod path;
pub mod perf;
pub mod space;

pub use category::{Category, CategoryId};
pub use config::{ConfigError, DialConfig};
pub use engine::{BandFrame, DialEngine, DialFrame, Notice, PointerEvent};
pub use expansion::{ExpansionState, Phase};
pub use layout::{Band, BandColor};
pub use path::{MorphShape, Path, PathCommand, SegmentedPath};
pub use space::{Point, Rect, Viewport};
