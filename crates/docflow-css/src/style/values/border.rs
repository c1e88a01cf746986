//! CSS Border values
//!
//! [CSS Backgrounds and Borders Level 3](https://www.w3.org/TR/css-backgrounds-3/)

use serde::Serialize;
use strum_macros::{Display, EnumString};

use super::color::{ColorValue, parse_color};
use super::length::{LengthValue, parse_length};

/// [§ 4.2 'border-style'](https://www.w3.org/TR/css-backgrounds-3/#border-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BorderStyle {
    /// "No border. Color and width are ignored." Initial value.
    #[default]
    None,
    /// Same as `none` outside collapsed tables.
    Hidden,
    /// Dotted.
    Dotted,
    /// Dashed.
    Dashed,
    /// Solid.
    Solid,
    /// Double.
    Double,
    /// Groove.
    Groove,
    /// Ridge.
    Ridge,
    /// Inset.
    Inset,
    /// Outset.
    Outset,
}

impl BorderStyle {
    /// Whether the side draws anything.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::None | Self::Hidden)
    }
}

/// [§ 4.3 'border-width'](https://www.w3.org/TR/css-backgrounds-3/#border-width)
///
/// "The lengths corresponding to 'thin', 'medium', and 'thick' are not
/// specified, but the values are constant throughout a document and thin ≤
/// medium ≤ thick."
pub const MEDIUM_BORDER_WIDTH: f32 = 3.0;

/// One side of a computed border.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BorderSide {
    /// Computed width in px. Zero whenever the style is not visible.
    pub width: f32,
    /// Line style.
    pub style: BorderStyle,
    /// Line color. `None` means `currentcolor`.
    pub color: Option<ColorValue>,
}

impl Default for BorderSide {
    fn default() -> Self {
        Self {
            width: MEDIUM_BORDER_WIDTH,
            style: BorderStyle::None,
            color: None,
        }
    }
}

impl BorderSide {
    /// [§ 4.3](https://www.w3.org/TR/css-backgrounds-3/#border-width)
    ///
    /// "Computed value: absolute length, snapped as a border width; zero if
    /// the border style is 'none' or 'hidden'"
    #[must_use]
    pub const fn used_width(&self) -> f32 {
        if self.style.is_visible() {
            self.width
        } else {
            0.0
        }
    }
}

/// Parse a `<line-width>`: a non-percentage length or a keyword.
#[must_use]
pub fn parse_border_width(text: &str) -> Option<LengthValue> {
    match text.to_ascii_lowercase().as_str() {
        "thin" => Some(LengthValue::Px(1.0)),
        "medium" => Some(LengthValue::Px(MEDIUM_BORDER_WIDTH)),
        "thick" => Some(LengthValue::Px(5.0)),
        _ => parse_length(text).filter(|l| !matches!(l, LengthValue::Percent(_))),
    }
}

/// A parsed `border` / `border-<side>` shorthand. Omitted components reset
/// to their initial values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderShorthand {
    /// `<line-width>`, medium when omitted.
    pub width: LengthValue,
    /// `<line-style>`, none when omitted.
    pub style: BorderStyle,
    /// `<color>`, currentcolor when omitted.
    pub color: Option<ColorValue>,
}

/// [§ 4.4 'border' shorthands](https://www.w3.org/TR/css-backgrounds-3/#border-shorthands)
///
/// "`<line-width>` || `<line-style>` || `<color>`": any order, each at most once.
#[must_use]
pub fn parse_border_shorthand(components: &[&str]) -> Option<BorderShorthand> {
    let mut width = None;
    let mut style = None;
    let mut color = None;
    let mut current_color = false;
    for component in components {
        let as_width = width.is_none().then(|| parse_border_width(component)).flatten();
        let as_style = style
            .is_none()
            .then(|| component.parse::<BorderStyle>().ok())
            .flatten();
        if as_width.is_some() {
            width = as_width;
        } else if as_style.is_some() {
            style = as_style;
        } else if color.is_none() && !current_color {
            if component.eq_ignore_ascii_case("currentcolor") {
                current_color = true;
            } else {
                color = Some(parse_color(component)?);
            }
        } else {
            return None;
        }
    }
    if components.is_empty() {
        return None;
    }
    Some(BorderShorthand {
        width: width.unwrap_or(LengthValue::Px(MEDIUM_BORDER_WIDTH)),
        style: style.unwrap_or_default(),
        color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_any_order() {
        let b = parse_border_shorthand(&["red", "2px", "dashed"]).expect("valid");
        assert_eq!(b.width, LengthValue::Px(2.0));
        assert_eq!(b.style, BorderStyle::Dashed);
        assert_eq!(b.color, Some(ColorValue::rgb(255, 0, 0)));
    }

    #[test]
    fn test_shorthand_defaults() {
        let b = parse_border_shorthand(&["solid"]).expect("valid");
        assert_eq!(b.width, LengthValue::Px(MEDIUM_BORDER_WIDTH));
        assert_eq!(b.color, None);
    }

    #[test]
    fn test_shorthand_rejects_duplicates_and_garbage() {
        assert_eq!(parse_border_shorthand(&["solid", "dotted"]), None);
        assert_eq!(parse_border_shorthand(&["1px", "wiggly"]), None);
        assert_eq!(parse_border_shorthand(&["10%"]), None);
        assert_eq!(parse_border_shorthand(&[]), None);
    }

    #[test]
    fn test_invisible_style_has_zero_width() {
        let side = BorderSide {
            width: 4.0,
            style: BorderStyle::Hidden,
            color: None,
        };
        assert!(side.used_width().abs() < f32::EPSILON);
    }
}
