//! CSS value types and parsers.
//!
//! Declarations reach the core as raw text; these parsers turn one value
//! string into a typed value or `None`.

pub mod border;
pub mod color;
pub mod font;
pub mod length;
pub mod text;

use serde::Serialize;

pub use border::{BorderSide, BorderStyle};
pub use color::{ColorValue, parse_color};
pub use font::FontStyle;
pub use length::{
    AutoLength, ComputedLength, DEFAULT_FONT_SIZE_PX, LengthValue, parse_dimension_attribute,
    parse_length, parse_number,
};
pub use text::{
    BorderCollapse, BoxSizing, LineHeight, ListStyleType, PageBreak, TextAlign, TextDecoration,
    TextTransform, VerticalAlign, WhiteSpace,
};

/// Split a value into whitespace-separated components, keeping
/// parenthesized groups (`rgb(1, 2, 3)`) and quoted strings together.
#[must_use]
pub fn split_components(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;
    for (i, ch) in value.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => {
                quote = Some(ch);
                let _ = start.get_or_insert(i);
            }
            (None, '(') => {
                depth += 1;
                let _ = start.get_or_insert(i);
            }
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&value[s..i]);
                }
            }
            _ => {
                let _ = start.get_or_insert(i);
            }
        }
    }
    if let Some(s) = start {
        parts.push(&value[s..]);
    }
    parts
}

/// Four per-side values in CSS order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Sides<T> {
    /// Top side.
    pub top: T,
    /// Right side.
    pub right: T,
    /// Bottom side.
    pub bottom: T,
    /// Left side.
    pub left: T,
}

impl<T: Copy> Sides<T> {
    /// The same value on every side.
    pub const fn uniform(value: T) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    ///
    /// "If there is only one component value, it applies to all sides. If
    /// there are two values, the top and bottom margins are set to the first
    /// value and the right and left margins are set to the second. If there
    /// are three values, the top is set to the first value, the left and
    /// right are set to the second, and the bottom is set to the third. If
    /// there are four values, they apply to the top, right, bottom, and left,
    /// respectively."
    #[must_use]
    pub fn from_shorthand(values: &[T]) -> Option<Self> {
        let (top, right, bottom, left) = match *values {
            [all] => (all, all, all, all),
            [vertical, horizontal] => (vertical, horizontal, vertical, horizontal),
            [top, horizontal, bottom] => (top, horizontal, bottom, horizontal),
            [top, right, bottom, left] => (top, right, bottom, left),
            _ => return None,
        };
        Some(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    /// Apply `f` to every side.
    pub fn map<U>(self, f: impl Fn(T) -> U) -> Sides<U> {
        Sides {
            top: f(self.top),
            right: f(self.right),
            bottom: f(self.bottom),
            left: f(self.left),
        }
    }

    /// Mutable access by side name.
    pub fn side_mut(&mut self, side: &str) -> Option<&mut T> {
        match side {
            "top" => Some(&mut self.top),
            "right" => Some(&mut self.right),
            "bottom" => Some(&mut self.bottom),
            "left" => Some(&mut self.left),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_components_keeps_groups() {
        assert_eq!(
            split_components("  1px solid rgb(1, 2, 3) "),
            vec!["1px", "solid", "rgb(1, 2, 3)"]
        );
        assert_eq!(
            split_components("\"Times New Roman\", serif"),
            vec!["\"Times New Roman\",", "serif"]
        );
        assert!(split_components("   ").is_empty());
    }

    #[test]
    fn test_shorthand_expansion() {
        assert_eq!(
            Sides::from_shorthand(&[1, 2, 3]),
            Some(Sides {
                top: 1,
                right: 2,
                bottom: 3,
                left: 2
            })
        );
        assert_eq!(Sides::from_shorthand(&[1, 2]).map(|s| s.left), Some(2));
        assert_eq!(Sides::<i32>::from_shorthand(&[]), None);
        assert_eq!(Sides::from_shorthand(&[1, 2, 3, 4, 5]), None);
    }
}
