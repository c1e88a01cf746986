//! Keyword-valued text, list, table and fragmentation properties.

use serde::Serialize;
use strum_macros::{Display, EnumString};

/// [§ 6.1 'text-align'](https://www.w3.org/TR/css-text-3/#text-align-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TextAlign {
    /// Initial value in a left-to-right document.
    #[default]
    #[strum(serialize = "left", serialize = "start")]
    Left,
    /// `right` / `end`.
    #[strum(serialize = "right", serialize = "end")]
    Right,
    /// `center`.
    Center,
    /// `justify`.
    Justify,
}

/// [§ 2 Text Decoration Lines](https://www.w3.org/TR/css-text-decor-3/#text-decoration-line-property)
///
/// "Specifies what line decorations, if any, are added to the element."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TextDecoration {
    /// `underline`
    pub underline: bool,
    /// `overline`
    pub overline: bool,
    /// `line-through`
    pub line_through: bool,
}

impl TextDecoration {
    /// Parse `none` or any combination of line keywords. Style and color
    /// components of the shorthand are accepted and ignored.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let mut decoration = Self::default();
        let mut saw_keyword = false;
        for word in value.split_whitespace() {
            match word.to_ascii_lowercase().as_str() {
                "none" => saw_keyword = true,
                "underline" => decoration.underline = true,
                "overline" => decoration.overline = true,
                "line-through" => decoration.line_through = true,
                "solid" | "double" | "dotted" | "dashed" | "wavy" => {}
                other if super::parse_color(other).is_some() => {}
                _ => return None,
            }
        }
        (saw_keyword || decoration.any()).then_some(decoration)
    }

    /// Whether any line is drawn.
    #[must_use]
    pub const fn any(self) -> bool {
        self.underline || self.overline || self.line_through
    }

    /// [§ 2.1 Propagation](https://www.w3.org/TR/css-text-decor-3/#line-decoration)
    ///
    /// "When specified on or propagated to an inline box, that box's
    /// decorations are propagated to all its in-flow children."
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            underline: self.underline || other.underline,
            overline: self.overline || other.overline,
            line_through: self.line_through || other.line_through,
        }
    }
}

/// [§ 2.1 'text-transform'](https://www.w3.org/TR/css-text-3/#text-transform-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TextTransform {
    /// No effect.
    #[default]
    None,
    /// "Puts all letters in uppercase."
    Uppercase,
    /// "Puts all letters in lowercase."
    Lowercase,
    /// "Puts the first typographic letter unit of each word in titlecase."
    Capitalize,
}

impl TextTransform {
    /// Apply to a run of text. `word_start` says whether the run begins a
    /// word, for `capitalize` across run boundaries.
    #[must_use]
    pub fn apply(self, text: &str, word_start: bool) -> String {
        match self {
            Self::None => text.to_string(),
            Self::Uppercase => text.to_uppercase(),
            Self::Lowercase => text.to_lowercase(),
            Self::Capitalize => {
                let mut out = String::with_capacity(text.len());
                let mut at_start = word_start;
                for ch in text.chars() {
                    if at_start && ch.is_alphabetic() {
                        out.extend(ch.to_uppercase());
                    } else {
                        out.push(ch);
                    }
                    at_start = ch.is_whitespace();
                }
                out
            }
        }
    }
}

/// [§ 4.2 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
///
/// Only the keywords that map onto run positioning are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum VerticalAlign {
    /// Initial value.
    #[default]
    Baseline,
    /// Subscript.
    Sub,
    /// Superscript.
    Super,
    /// Top of the line box, or the cell.
    Top,
    /// Middle.
    Middle,
    /// Bottom.
    Bottom,
    /// `text-top`.
    TextTop,
    /// `text-bottom`.
    TextBottom,
}

/// [§ 3 'white-space'](https://www.w3.org/TR/css-text-3/#white-space-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum WhiteSpace {
    /// Collapse spaces and newlines.
    #[default]
    Normal,
    /// Collapse, never wrap.
    Nowrap,
    /// Preserve everything.
    Pre,
    /// Preserve, wrap.
    PreWrap,
    /// Collapse spaces, preserve newlines.
    PreLine,
    /// Preserve, breakable spaces.
    BreakSpaces,
}

impl WhiteSpace {
    /// "spaces and tabs are collapsed"
    #[must_use]
    pub const fn collapses_spaces(self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap | Self::PreLine)
    }

    /// "segment breaks are preserved as forced line breaks"
    #[must_use]
    pub const fn preserves_newlines(self) -> bool {
        !matches!(self, Self::Normal | Self::Nowrap)
    }
}

/// [§ 4.2 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#propdef-line-height)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum LineHeight {
    /// "Tells user agents to set the used value to a 'reasonable' value
    /// based on the font of the element."
    #[default]
    Normal,
    /// "The used value of the property is this number multiplied by the
    /// element's font size." The number, not the product, is inherited.
    Number(f32),
    /// An absolute line height in px. Percentages and `em` compute to this.
    Px(f32),
}

impl LineHeight {
    /// Multiplier used for `normal`.
    pub const NORMAL_FACTOR: f32 = 1.2;

    /// Used line height in px for a given font size.
    #[must_use]
    pub fn to_px(self, font_size: f32) -> f32 {
        match self {
            Self::Normal => font_size * Self::NORMAL_FACTOR,
            Self::Number(n) => font_size * n,
            Self::Px(px) => px,
        }
    }
}

/// [§ 3 'list-style-type'](https://www.w3.org/TR/css-lists-3/#text-markers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ListStyleType {
    /// Filled circle. Initial value.
    #[default]
    Disc,
    /// Hollow circle.
    Circle,
    /// Filled square.
    Square,
    /// 1, 2, 3
    Decimal,
    /// 01, 02, 03
    DecimalLeadingZero,
    /// a, b, c
    #[strum(serialize = "lower-alpha", serialize = "lower-latin")]
    LowerAlpha,
    /// A, B, C
    #[strum(serialize = "upper-alpha", serialize = "upper-latin")]
    UpperAlpha,
    /// i, ii, iii
    LowerRoman,
    /// I, II, III
    UpperRoman,
    /// No marker.
    None,
}

impl ListStyleType {
    /// Whether the marker counts.
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        matches!(
            self,
            Self::Decimal
                | Self::DecimalLeadingZero
                | Self::LowerAlpha
                | Self::UpperAlpha
                | Self::LowerRoman
                | Self::UpperRoman
        )
    }

    /// HTML `type` attribute on `ol`/`ul`.
    #[must_use]
    pub fn from_type_attribute(value: &str) -> Option<Self> {
        Some(match value.trim() {
            "1" => Self::Decimal,
            "a" => Self::LowerAlpha,
            "A" => Self::UpperAlpha,
            "i" => Self::LowerRoman,
            "I" => Self::UpperRoman,
            other => match other.to_ascii_lowercase().as_str() {
                "disc" => Self::Disc,
                "circle" => Self::Circle,
                "square" => Self::Square,
                _ => return None,
            },
        })
    }
}

/// [§ 13.3.1 Page break properties](https://www.w3.org/TR/CSS2/page.html#page-break-props)
///
/// Forwarded to the emitter unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PageBreak {
    /// "Neither force nor forbid a page break."
    #[default]
    Auto,
    /// "Always force a page break." `break-before: page` maps here.
    #[strum(serialize = "always", serialize = "page")]
    Always,
    /// "Avoid a page break."
    #[strum(serialize = "avoid", serialize = "avoid-page")]
    Avoid,
    /// Break to a left page.
    Left,
    /// Break to a right page.
    Right,
}

/// [§ 4.1 'box-sizing'](https://www.w3.org/TR/css-sizing-3/#box-sizing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BoxSizing {
    /// `width` sizes the content box.
    #[default]
    ContentBox,
    /// `width` includes padding and border.
    BorderBox,
}

/// [§ 17.6 Borders](https://www.w3.org/TR/CSS2/tables.html#borders)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BorderCollapse {
    /// Separated borders model. Initial value.
    #[default]
    Separate,
    /// Collapsing border model.
    Collapse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_parsing_is_case_insensitive() {
        assert_eq!("CENTER".parse::<TextAlign>().ok(), Some(TextAlign::Center));
        assert_eq!("start".parse::<TextAlign>().ok(), Some(TextAlign::Left));
        assert_eq!(
            "lower-latin".parse::<ListStyleType>().ok(),
            Some(ListStyleType::LowerAlpha)
        );
        assert_eq!("page".parse::<PageBreak>().ok(), Some(PageBreak::Always));
        assert!("sideways".parse::<WhiteSpace>().is_err());
    }

    #[test]
    fn test_text_decoration_parse() {
        let d = TextDecoration::parse("underline line-through red").expect("valid");
        assert!(d.underline && d.line_through && !d.overline);
        assert_eq!(TextDecoration::parse("none"), Some(TextDecoration::default()));
        assert_eq!(TextDecoration::parse("blink"), None);
    }

    #[test]
    fn test_capitalize_respects_run_boundaries() {
        assert_eq!(TextTransform::Capitalize.apply("hello big world", true), "Hello Big World");
        assert_eq!(TextTransform::Capitalize.apply("llo there", false), "llo There");
    }

    #[test]
    fn test_line_height_to_px() {
        assert!((LineHeight::Number(1.5).to_px(10.0) - 15.0).abs() < f32::EPSILON);
        assert!((LineHeight::Normal.to_px(10.0) - 12.0).abs() < 1e-5);
    }
}
