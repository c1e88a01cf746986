//! CSS Font value parsing
//!
//! [CSS Fonts Module Level 4](https://www.w3.org/TR/css-fonts-4/)

use serde::Serialize;
use strum_macros::{Display, EnumString};

use super::length::parse_number;

/// [§ 3.3 'font-style'](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic face.
    Italic,
    /// Slanted face; emitted as italic.
    Oblique,
}

/// Parse `font-family`, keeping the first family name.
///
/// Font substitution happens in the emitter, so the rest of the fallback
/// list is not needed here.
#[must_use]
pub fn parse_font_family(value: &str) -> Option<String> {
    let first = value.split(',').next()?.trim();
    let unquoted = first.trim_matches(|c| c == '"' || c == '\'').trim();
    (!unquoted.is_empty()).then(|| unquoted.to_string())
}

/// [§ 3.2 'font-weight'](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
///
/// `bolder`/`lighter` follow the relative weight table:
/// "bolder: ... 100-349 → 400, 350-549 → 700, 550-899 → 900".
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_font_weight(value: &str, parent_weight: u16) -> Option<u16> {
    match value.to_ascii_lowercase().as_str() {
        "normal" => Some(400),
        "bold" => Some(700),
        "bolder" => Some(match parent_weight {
            0..=349 => 400,
            350..=549 => 700,
            _ => 900,
        }),
        "lighter" => Some(match parent_weight {
            0..=549 => 100,
            550..=749 => 400,
            _ => 700,
        }),
        other => {
            let weight = parse_number(other)?;
            (1.0..=1000.0).contains(&weight).then(|| weight as u16)
        }
    }
}

/// [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#absolute-size-value)
///
/// "`<absolute-size>` ... scaling factor: xx-small 3/5, x-small 3/4,
/// small 8/9, medium 1, large 6/5, x-large 3/2, xx-large 2/1, xxx-large 3/1"
#[must_use]
pub fn absolute_size_factor(keyword: &str) -> Option<f32> {
    Some(match keyword.to_ascii_lowercase().as_str() {
        "xx-small" => 3.0 / 5.0,
        "x-small" => 3.0 / 4.0,
        "small" => 8.0 / 9.0,
        "medium" => 1.0,
        "large" => 6.0 / 5.0,
        "x-large" => 3.0 / 2.0,
        "xx-large" => 2.0,
        "xxx-large" => 3.0,
        _ => return None,
    })
}

/// `<relative-size>`: `smaller` / `larger` scale the parent's size by the
/// ratio between adjacent keywords.
#[must_use]
pub fn relative_size_factor(keyword: &str) -> Option<f32> {
    match keyword.to_ascii_lowercase().as_str() {
        "smaller" => Some(1.0 / 1.2),
        "larger" => Some(1.2),
        _ => None,
    }
}
