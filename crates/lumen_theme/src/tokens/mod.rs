//! Design tokens derived from the theme's base colors
//!
//! - Shade variants (base, hover, active, lighter, dark)

mod color;

pub use color::*;
