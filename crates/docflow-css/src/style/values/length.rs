//! CSS Length values and parsing
//!
//! [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)

use serde::Serialize;

/// User agent default font size.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// [§ 6.2 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
///
/// "1in = 2.54cm = 96px", "1pt = 1/72th of 1in", "1pc = 1/6th of 1in"
const PX_PER_IN: f32 = 96.0;

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
/// "Lengths refer to distance measurements and are denoted by `<length>` in the
/// property definitions."
///
/// A specified length. Absolute units are folded into [`LengthValue::Px`] at
/// parse time; font-relative units wait for the element's font size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthValue {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// "1px = 1/96th of 1in"
    Px(f32),
    /// [§ 5.1.1 Font-relative lengths](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
    /// "Equal to the computed value of the font-size property of the element"
    Em(f32),
    /// "Equal to the computed value of the font-size property of the root element."
    Rem(f32),
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    Percent(f32),
}

impl LengthValue {
    /// Resolve font-relative units, leaving percentages symbolic.
    ///
    /// `font_size` is the basis for `em`: the element's own font size for
    /// every property except `font-size` itself, where callers pass the
    /// parent's.
    #[must_use]
    pub fn to_computed(self, font_size: f32, root_font_size: f32) -> ComputedLength {
        match self {
            Self::Px(px) => ComputedLength::Px(px),
            Self::Em(em) => ComputedLength::Px(em * font_size),
            Self::Rem(rem) => ComputedLength::Px(rem * root_font_size),
            Self::Percent(pct) => ComputedLength::Percent(pct),
        }
    }
}

/// [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
///
/// A length after the cascade: either absolute pixels or a percentage that
/// the box model resolves against the containing block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ComputedLength {
    /// Absolute pixels.
    Px(f32),
    /// Percentage of the containing block's content width.
    Percent(f32),
}

impl ComputedLength {
    /// Zero pixels.
    pub const ZERO: Self = Self::Px(0.0);

    /// Resolve against a containing-block dimension.
    ///
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    /// NOTE: Margin AND padding percentages both resolve against the containing
    /// block's **width**, even for top/bottom.
    #[must_use]
    pub fn resolve(self, basis: f32) -> f32 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => pct * basis / 100.0,
        }
    }

    /// The pixel value if this length does not depend on a basis.
    #[must_use]
    pub const fn as_px(self) -> Option<f32> {
        match self {
            Self::Px(px) => Some(px),
            Self::Percent(_) => None,
        }
    }
}

impl Default for ComputedLength {
    fn default() -> Self {
        Self::ZERO
    }
}

/// A computed length that may also be `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub enum AutoLength {
    /// [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    /// "The value 'auto' means that the width depends on the values of other properties."
    #[default]
    Auto,
    /// A definite length.
    Length(ComputedLength),
}

impl AutoLength {
    /// Zero pixels.
    pub const ZERO: Self = Self::Length(ComputedLength::ZERO);

    /// Whether this is `auto`.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Resolve against a basis, `None` for `auto`.
    #[must_use]
    pub fn resolve(self, basis: f32) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Length(length) => Some(length.resolve(basis)),
        }
    }
}

/// Parse a `<number>`.
#[must_use]
pub fn parse_number(text: &str) -> Option<f32> {
    let text = text.trim();
    if text.is_empty() || text.ends_with('.') {
        return None;
    }
    text.parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Split `12.5px` into `(12.5, "px")`.
fn split_dimension(text: &str) -> Option<(f32, &str)> {
    let text = text.trim();
    let end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(text.len(), |(i, _)| i);
    let value = parse_number(&text[..end])?;
    Some((value, &text[end..]))
}

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
///
/// Parse a single `<length-percentage>` token.
///
/// "For zero lengths the unit identifier is optional (i.e. can be
/// syntactically represented as the `<number>` 0)."
#[must_use]
pub fn parse_length(text: &str) -> Option<LengthValue> {
    let (value, unit) = split_dimension(text)?;
    let length = match unit.to_ascii_lowercase().as_str() {
        "" if value.abs() < f32::EPSILON => LengthValue::Px(0.0),
        "px" => LengthValue::Px(value),
        "pt" => LengthValue::Px(value * PX_PER_IN / 72.0),
        "pc" => LengthValue::Px(value * PX_PER_IN / 6.0),
        "in" => LengthValue::Px(value * PX_PER_IN),
        "cm" => LengthValue::Px(value * PX_PER_IN / 2.54),
        "mm" => LengthValue::Px(value * PX_PER_IN / 25.4),
        "q" => LengthValue::Px(value * PX_PER_IN / 101.6),
        "em" => LengthValue::Em(value),
        // [§ 6.1.1](https://www.w3.org/TR/css-values-4/#ex)
        // "In the cases where it is impossible or impractical to determine
        // the x-height, a value of 0.5em must be assumed."
        "ex" => LengthValue::Em(value * 0.5),
        "rem" => LengthValue::Rem(value),
        "%" => LengthValue::Percent(value),
        _ => return None,
    };
    Some(length)
}

/// HTML dimension attributes (`width="150"`, `width="40%"`): a bare number
/// means pixels.
#[must_use]
pub fn parse_dimension_attribute(text: &str) -> Option<LengthValue> {
    let text = text.trim();
    match parse_number(text) {
        Some(px) => Some(LengthValue::Px(px)),
        None => parse_length(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute_units() {
        assert_eq!(parse_length("12px"), Some(LengthValue::Px(12.0)));
        assert_eq!(parse_length("12pt"), Some(LengthValue::Px(16.0)));
        assert_eq!(parse_length("1in"), Some(LengthValue::Px(96.0)));
        assert_eq!(parse_length("-4PX"), Some(LengthValue::Px(-4.0)));
        assert_eq!(parse_length(".5em"), Some(LengthValue::Em(0.5)));
        assert_eq!(parse_length("0"), Some(LengthValue::Px(0.0)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_length("12"), None);
        assert_eq!(parse_length("px"), None);
        assert_eq!(parse_length("12furlongs"), None);
        assert_eq!(parse_length("1.2.3px"), None);
        assert_eq!(parse_length(""), None);
    }

    #[test]
    fn test_dimension_attribute() {
        assert_eq!(parse_dimension_attribute("150"), Some(LengthValue::Px(150.0)));
        assert_eq!(
            parse_dimension_attribute("40%"),
            Some(LengthValue::Percent(40.0))
        );
    }

    #[test]
    fn test_to_computed_keeps_percentages_symbolic() {
        assert_eq!(
            LengthValue::Em(2.0).to_computed(10.0, 16.0),
            ComputedLength::Px(20.0)
        );
        assert_eq!(
            LengthValue::Rem(2.0).to_computed(10.0, 16.0),
            ComputedLength::Px(32.0)
        );
        let pct = LengthValue::Percent(25.0).to_computed(10.0, 16.0);
        assert_eq!(pct, ComputedLength::Percent(25.0));
        assert!((pct.resolve(400.0) - 100.0).abs() < f32::EPSILON);
    }
}
