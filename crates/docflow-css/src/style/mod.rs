//! CSS Computed Style representation and value parsing
//!
//! This module implements CSS value types and computed style representation per:
//! - [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//! - [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
//! - [CSS Display Module Level 3](https://www.w3.org/TR/css-display-3/)
//! - [CSS Fonts Level 4](https://www.w3.org/TR/css-fonts-4/)

pub mod computed;
pub mod display;
pub mod values;

pub use computed::{ComputedStyle, StyleParseError, is_inherited, resolve_font_size};
pub use display::{
    Display, DisplayValue, InnerDisplayType, InternalDisplayType, OuterDisplayType, parse_display,
};
pub use values::{AutoLength, ColorValue, ComputedLength, DEFAULT_FONT_SIZE_PX, LengthValue, Sides};
