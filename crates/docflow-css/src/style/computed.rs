//! CSS Computed Style
//!
//! [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//! "The computed value is the result of resolving the specified value..."
//!
//! Unlike a browser, the layout core needs every property concrete once the
//! cascade is done: there is no later pass that fills in missing values. A
//! [`ComputedStyle`] therefore starts from the parent's inherited values (or
//! the initial values) and each winning declaration overwrites one field.

use serde::Serialize;
use thiserror::Error;

use super::display::{Display, parse_display};
use super::values::border::{parse_border_shorthand, parse_border_width};
use super::values::font::{
    absolute_size_factor, parse_font_family, parse_font_weight, relative_size_factor,
};
use super::values::{
    AutoLength, BorderCollapse, BorderSide, BorderStyle, BoxSizing, ColorValue, ComputedLength,
    DEFAULT_FONT_SIZE_PX, FontStyle, LengthValue, LineHeight, ListStyleType, PageBreak, Sides,
    TextAlign, TextDecoration, TextTransform, VerticalAlign, WhiteSpace, parse_color, parse_length,
    parse_number, split_components,
};

/// Font family used when nothing else is configured.
pub const DEFAULT_FONT_FAMILY: &str = "Times New Roman";

/// A declaration the resolver could not apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleParseError {
    /// The value does not match the property's grammar.
    #[error("invalid value '{value}' for '{property}'")]
    InvalidValue {
        /// Property name.
        property: String,
        /// Offending value.
        value: String,
    },
    /// A shorthand the resolver does not expand.
    #[error("unsupported shorthand '{0}'")]
    UnsupportedShorthand(String),
}

/// [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
///
/// "Some properties are inherited properties, as defined in their property
/// definition table. This means that, unless the cascade results in a value,
/// the value will be determined by inheritance."
pub const INHERITED_PROPERTIES: &[&str] = &[
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "color",
    "text-align",
    "line-height",
    "text-indent",
    "text-transform",
    "list-style-type",
    "white-space",
    "border-collapse",
    "border-spacing",
];

/// Whether a property inherits by default.
#[must_use]
pub fn is_inherited(property: &str) -> bool {
    INHERITED_PROPERTIES.contains(&property)
}

/// Computed styles for an element.
///
/// [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
///
/// Lengths are in CSS px. Percentages that depend on the containing block
/// stay symbolic ([`ComputedLength::Percent`]) until the box model resolves
/// them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedStyle {
    /// [§ 2 'display'](https://www.w3.org/TR/css-display-3/#the-display-properties)
    pub display: Display,

    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    ///
    /// "Margins can be negative, but there may be implementation-specific limits."
    pub margin: Sides<AutoLength>,
    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    pub padding: Sides<ComputedLength>,
    /// [§ 8.5 Border properties](https://www.w3.org/TR/CSS2/box.html#border-properties)
    pub border: Sides<BorderSide>,

    /// [§ 10.2 'width'](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
    pub width: AutoLength,
    /// [§ 10.5 'height'](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    pub height: AutoLength,
    /// [§ 10.4 'max-width'](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    /// `None` is the initial `none`.
    pub max_width: Option<ComputedLength>,
    /// [§ 4.1 'box-sizing'](https://www.w3.org/TR/css-sizing-3/#box-sizing)
    pub box_sizing: BoxSizing,

    /// [§ 8.1 'row-gap'](https://www.w3.org/TR/css-align-3/#column-row-gap)
    /// `None` is the initial `normal`.
    pub row_gap: Option<ComputedLength>,
    /// [§ 8.1 'column-gap'](https://www.w3.org/TR/css-align-3/#column-row-gap)
    pub column_gap: Option<ComputedLength>,

    /// [§ 3.1 'font-family'](https://www.w3.org/TR/css-fonts-4/#font-family-prop)
    pub font_family: String,
    /// [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#font-size-prop), px.
    pub font_size: f32,
    /// [§ 3.2 'font-weight'](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
    pub font_weight: u16,
    /// [§ 3.3 'font-style'](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
    pub font_style: FontStyle,
    /// [§ 3.1 'color'](https://www.w3.org/TR/css-color-4/#the-color-property)
    pub color: ColorValue,
    /// [§ 3.2 'background-color'](https://www.w3.org/TR/css-backgrounds-3/#background-color)
    /// `None` is the initial `transparent`.
    pub background_color: Option<ColorValue>,

    /// [§ 16.2 'text-align'](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    pub text_align: TextAlign,
    /// [§ 10.8 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    pub line_height: LineHeight,
    /// [§ 16.1 'text-indent'](https://www.w3.org/TR/CSS2/text.html#indentation-prop)
    pub text_indent: ComputedLength,
    /// [§ 2 'text-decoration'](https://www.w3.org/TR/css-text-decor-3/#line-decoration)
    ///
    /// Not inherited; it propagates to inline descendants during run
    /// building instead.
    pub text_decoration: TextDecoration,
    /// [§ 2.1 'text-transform'](https://www.w3.org/TR/css-text-3/#text-transform-property)
    pub text_transform: TextTransform,
    /// [§ 10.8 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
    pub vertical_align: VerticalAlign,
    /// [§ 3 'white-space'](https://www.w3.org/TR/css-text-3/#white-space-property)
    pub white_space: WhiteSpace,

    /// [§ 3 'list-style-type'](https://www.w3.org/TR/css-lists-3/#text-markers)
    pub list_style_type: ListStyleType,

    /// [§ 17.6 'border-collapse'](https://www.w3.org/TR/CSS2/tables.html#borders)
    pub border_collapse: BorderCollapse,
    /// [§ 17.6.1 'border-spacing'](https://www.w3.org/TR/CSS2/tables.html#separated-borders), px.
    pub border_spacing: f32,

    /// [§ 13.3.1 'page-break-before'](https://www.w3.org/TR/CSS2/page.html#page-break-props)
    pub page_break_before: PageBreak,
    /// [§ 13.3.1 'page-break-after'](https://www.w3.org/TR/CSS2/page.html#page-break-props)
    pub page_break_after: PageBreak,
}

impl Default for ComputedStyle {
    /// Initial values for every property.
    fn default() -> Self {
        let border_side = BorderSide::default();
        Self {
            display: Display::default(),
            margin: Sides::uniform(AutoLength::ZERO),
            padding: Sides::uniform(ComputedLength::ZERO),
            border: Sides::uniform(border_side),
            width: AutoLength::Auto,
            height: AutoLength::Auto,
            max_width: None,
            box_sizing: BoxSizing::default(),
            row_gap: None,
            column_gap: None,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE_PX,
            font_weight: 400,
            font_style: FontStyle::default(),
            color: ColorValue::BLACK,
            background_color: None,
            text_align: TextAlign::default(),
            line_height: LineHeight::default(),
            text_indent: ComputedLength::ZERO,
            text_decoration: TextDecoration::default(),
            text_transform: TextTransform::default(),
            vertical_align: VerticalAlign::default(),
            white_space: WhiteSpace::default(),
            list_style_type: ListStyleType::default(),
            border_collapse: BorderCollapse::default(),
            border_spacing: 2.0,
            page_break_before: PageBreak::default(),
            page_break_after: PageBreak::default(),
        }
    }
}

impl ComputedStyle {
    /// Initial style for the root element, with the configured font.
    #[must_use]
    pub fn root(font_family: &str, font_size: f32) -> Self {
        Self {
            font_family: font_family.to_string(),
            font_size,
            ..Self::default()
        }
    }

    /// [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
    ///
    /// "The inherited value of a property on an element is the computed value
    /// of the property on the element's parent element."
    ///
    /// Inherited properties copy the parent's computed value; everything else
    /// starts at its initial value, never the parent's.
    #[must_use]
    pub fn inherit_from(parent: &Self) -> Self {
        Self {
            font_family: parent.font_family.clone(),
            font_size: parent.font_size,
            font_weight: parent.font_weight,
            font_style: parent.font_style,
            color: parent.color,
            text_align: parent.text_align,
            line_height: parent.line_height,
            text_indent: parent.text_indent,
            text_transform: parent.text_transform,
            list_style_type: parent.list_style_type,
            white_space: parent.white_space,
            border_collapse: parent.border_collapse,
            border_spacing: parent.border_spacing,
            ..Self::default()
        }
    }

    /// Whether the font is bold enough to emit as bold.
    #[must_use]
    pub const fn is_bold(&self) -> bool {
        self.font_weight >= 600
    }

    /// Whether the font is italic or oblique.
    #[must_use]
    pub fn is_italic(&self) -> bool {
        self.font_style != FontStyle::Normal
    }

    /// Apply one winning declaration.
    ///
    /// `parent` supplies `inherit` values and the basis for `font-size`
    /// relative units. `initial` is the root element's starting style: it
    /// supplies `initial` values and its font size is the `rem` basis.
    /// Properties the document model has no use for are accepted and ignored.
    ///
    /// # Errors
    /// Returns [`StyleParseError`] when the value does not parse. The style is
    /// left unchanged.
    pub fn apply_declaration(
        &mut self,
        property: &str,
        value: &str,
        parent: &Self,
        initial: &Self,
    ) -> Result<(), StyleParseError> {
        let invalid = || StyleParseError::InvalidValue {
            property: property.to_string(),
            value: value.to_string(),
        };
        let value = value.trim();
        let basis = FontBasis {
            em: self.font_size,
            rem: initial.font_size,
        };

        // [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
        match value.to_ascii_lowercase().as_str() {
            "inherit" => return self.copy_property(property, parent).ok_or_else(invalid),
            "initial" => return self.copy_property(property, initial).ok_or_else(invalid),
            "unset" => {
                let source = if is_inherited(property) {
                    parent.clone()
                } else {
                    Self::default()
                };
                return self.copy_property(property, &source).ok_or_else(invalid);
            }
            _ => {}
        }

        let applied = match property {
            "display" => parse_display(value).map(|d| self.display = d),

            "margin" => self.apply_margin_shorthand(value, basis),
            "margin-top" | "margin-right" | "margin-bottom" | "margin-left" => {
                let length = basis.auto_length(value);
                let side = &property["margin-".len()..];
                length.and_then(|l| self.margin.side_mut(side).map(|m| *m = l))
            }
            "margin-block-start" => basis.auto_length(value).map(|l| self.margin.top = l),
            "margin-block-end" => basis.auto_length(value).map(|l| self.margin.bottom = l),
            "margin-inline-start" => basis.auto_length(value).map(|l| self.margin.left = l),
            "margin-inline-end" => basis.auto_length(value).map(|l| self.margin.right = l),

            "padding" => self.apply_padding_shorthand(value, basis),
            "padding-top" | "padding-right" | "padding-bottom" | "padding-left" => {
                let length = basis.length(value);
                let side = &property["padding-".len()..];
                length.and_then(|l| self.padding.side_mut(side).map(|p| *p = l))
            }
            "padding-block-start" => basis.length(value).map(|l| self.padding.top = l),
            "padding-block-end" => basis.length(value).map(|l| self.padding.bottom = l),
            "padding-inline-start" => basis.length(value).map(|l| self.padding.left = l),
            "padding-inline-end" => basis.length(value).map(|l| self.padding.right = l),

            "border" => {
                self.apply_border_shorthand(value, basis, &["top", "right", "bottom", "left"])
            }
            "border-top" | "border-right" | "border-bottom" | "border-left" => {
                self.apply_border_shorthand(value, basis, &[&property["border-".len()..]])
            }
            "border-width" => self.apply_border_widths(value, basis),
            "border-style" => self.apply_border_styles(value),
            "border-color" => self.apply_border_colors(value),
            p if p.starts_with("border-") && p.matches('-').count() == 2 => {
                self.apply_border_longhand(p, value, basis)
            }

            "width" => basis.auto_length(value).map(|l| self.width = l),
            "height" => basis.auto_length(value).map(|l| self.height = l),
            "max-width" => {
                if value.eq_ignore_ascii_case("none") {
                    self.max_width = None;
                    Some(())
                } else {
                    basis.length(value).map(|l| self.max_width = Some(l))
                }
            }
            "box-sizing" => value.parse().ok().map(|b| self.box_sizing = b),

            // [§ 8.3 'gap' shorthand](https://www.w3.org/TR/css-align-3/#gap-shorthand)
            // "Sets the row-gap and column-gap in one declaration. If
            // <'column-gap'> is omitted, it's set to the same value as <'row-gap'>."
            "gap" | "grid-gap" => {
                let parts = split_components(value);
                match parts.as_slice() {
                    [row] => basis.gap(row).map(|g| {
                        self.row_gap = g;
                        self.column_gap = g;
                    }),
                    [row, column] => basis
                        .gap(row)
                        .zip(basis.gap(column))
                        .map(|(r, c)| {
                            self.row_gap = r;
                            self.column_gap = c;
                        }),
                    _ => None,
                }
            }
            "row-gap" | "grid-row-gap" => basis.gap(value).map(|g| self.row_gap = g),
            "column-gap" | "grid-column-gap" => basis.gap(value).map(|g| self.column_gap = g),

            "font" => self.apply_font_shorthand(value, parent, initial.font_size),
            "font-family" => parse_font_family(value).map(|f| self.font_family = f),
            "font-size" => resolve_font_size(value, parent.font_size, initial.font_size)
                .map(|size| self.font_size = size),
            "font-weight" => {
                parse_font_weight(value, parent.font_weight).map(|w| self.font_weight = w)
            }
            "font-style" => value
                .split_whitespace()
                .next()
                .and_then(|s| s.parse().ok())
                .map(|s| self.font_style = s),

            // "currentcolor ... If used as the value of the color property, it
            // instead refers to the inherited value of the color property."
            "color" => {
                if value.eq_ignore_ascii_case("currentcolor") {
                    self.color = parent.color;
                    Some(())
                } else {
                    parse_color(value).map(|c| self.color = c)
                }
            }
            "background-color" => self.color_or_current(value).map(|c| {
                self.background_color = (c.a > 0).then_some(c);
            }),
            // Only the color layer of the shorthand matters to the document model.
            "background" => {
                let colors: Vec<_> = split_components(value)
                    .into_iter()
                    .filter_map(|c| self.color_or_current(c))
                    .collect();
                self.background_color = colors.last().copied().filter(|c| c.a > 0);
                Some(())
            }

            "text-align" => value.parse().ok().map(|a| self.text_align = a),
            "line-height" => basis.line_height(value).map(|lh| self.line_height = lh),
            "text-indent" => basis.length(value).map(|l| self.text_indent = l),
            "text-decoration" | "text-decoration-line" => {
                TextDecoration::parse(value).map(|d| self.text_decoration = d)
            }
            "text-transform" => value.parse().ok().map(|t| self.text_transform = t),
            "vertical-align" => match value.parse::<VerticalAlign>() {
                Ok(v) => {
                    self.vertical_align = v;
                    Some(())
                }
                // Length and percentage shifts have no run equivalent.
                Err(_) => {
                    parse_length(value).map(|_| self.vertical_align = VerticalAlign::Baseline)
                }
            },
            "white-space" => value.parse().ok().map(|w| self.white_space = w),

            "list-style-type" => value.parse().ok().map(|t| self.list_style_type = t),
            // [§ 4 'list-style'](https://www.w3.org/TR/css-lists-3/#list-style-property)
            // Position and image components are accepted and ignored.
            "list-style" => {
                let mut found = None;
                for part in split_components(value) {
                    if let Ok(t) = part.parse::<ListStyleType>() {
                        found = Some(t);
                    } else if !matches!(
                        part.to_ascii_lowercase().as_str(),
                        "inside" | "outside"
                    ) && !part.starts_with("url(")
                    {
                        found = None;
                        break;
                    }
                }
                found.map(|t| self.list_style_type = t)
            }

            "border-collapse" => value.parse().ok().map(|c| self.border_collapse = c),
            // "The lengths specify the distance that separates adjoining cell
            // borders. If one length is specified, it gives both the horizontal
            // and vertical spacing." Only the horizontal length is kept.
            "border-spacing" => split_components(value)
                .first()
                .and_then(|first| parse_length(first))
                .and_then(|l| basis.px(l))
                .map(|px| self.border_spacing = px.max(0.0)),

            "page-break-before" | "break-before" => {
                value.parse().ok().map(|b| self.page_break_before = b)
            }
            "page-break-after" | "break-after" => {
                value.parse().ok().map(|b| self.page_break_after = b)
            }

            // Anything else has no counterpart in the target document model.
            _ => {
                log::trace!(target: "docflow::style", "ignoring property '{property}'");
                Some(())
            }
        };
        applied.ok_or_else(invalid)
    }

    /// Copy one property (or every longhand of a shorthand) from `source`.
    /// `None` when the property is unknown.
    fn copy_property(&mut self, property: &str, source: &Self) -> Option<()> {
        match property {
            "display" => self.display = source.display,
            "margin" => self.margin = source.margin,
            "margin-top" | "margin-block-start" => self.margin.top = source.margin.top,
            "margin-right" | "margin-inline-end" => self.margin.right = source.margin.right,
            "margin-bottom" | "margin-block-end" => self.margin.bottom = source.margin.bottom,
            "margin-left" | "margin-inline-start" => self.margin.left = source.margin.left,
            "padding" => self.padding = source.padding,
            "padding-top" => self.padding.top = source.padding.top,
            "padding-right" => self.padding.right = source.padding.right,
            "padding-bottom" => self.padding.bottom = source.padding.bottom,
            "padding-left" => self.padding.left = source.padding.left,
            "border" | "border-width" | "border-style" | "border-color" => {
                self.border = source.border;
            }
            "border-top" => self.border.top = source.border.top,
            "border-right" => self.border.right = source.border.right,
            "border-bottom" => self.border.bottom = source.border.bottom,
            "border-left" => self.border.left = source.border.left,
            "width" => self.width = source.width,
            "height" => self.height = source.height,
            "max-width" => self.max_width = source.max_width,
            "box-sizing" => self.box_sizing = source.box_sizing,
            "gap" => {
                self.row_gap = source.row_gap;
                self.column_gap = source.column_gap;
            }
            "row-gap" => self.row_gap = source.row_gap,
            "column-gap" => self.column_gap = source.column_gap,
            "font" => {
                self.font_family.clone_from(&source.font_family);
                self.font_size = source.font_size;
                self.font_weight = source.font_weight;
                self.font_style = source.font_style;
                self.line_height = source.line_height;
            }
            "font-family" => self.font_family.clone_from(&source.font_family),
            "font-size" => self.font_size = source.font_size,
            "font-weight" => self.font_weight = source.font_weight,
            "font-style" => self.font_style = source.font_style,
            "color" => self.color = source.color,
            "background" | "background-color" => self.background_color = source.background_color,
            "text-align" => self.text_align = source.text_align,
            "line-height" => self.line_height = source.line_height,
            "text-indent" => self.text_indent = source.text_indent,
            "text-decoration" | "text-decoration-line" => {
                self.text_decoration = source.text_decoration;
            }
            "text-transform" => self.text_transform = source.text_transform,
            "vertical-align" => self.vertical_align = source.vertical_align,
            "white-space" => self.white_space = source.white_space,
            "list-style" | "list-style-type" => self.list_style_type = source.list_style_type,
            "border-collapse" => self.border_collapse = source.border_collapse,
            "border-spacing" => self.border_spacing = source.border_spacing,
            "page-break-before" | "break-before" => {
                self.page_break_before = source.page_break_before;
            }
            "page-break-after" | "break-after" => self.page_break_after = source.page_break_after,
            _ => return None,
        }
        Some(())
    }

    /// [§ 8.3 'margin' shorthand](https://www.w3.org/TR/CSS2/box.html#propdef-margin)
    fn apply_margin_shorthand(&mut self, value: &str, basis: FontBasis) -> Option<()> {
        let values = split_components(value)
            .into_iter()
            .map(|v| basis.auto_length(v))
            .collect::<Option<Vec<_>>>()?;
        self.margin = Sides::from_shorthand(&values)?;
        Some(())
    }

    /// [§ 8.4 'padding' shorthand](https://www.w3.org/TR/CSS2/box.html#propdef-padding)
    fn apply_padding_shorthand(&mut self, value: &str, basis: FontBasis) -> Option<()> {
        let values = split_components(value)
            .into_iter()
            .map(|v| basis.length(v))
            .collect::<Option<Vec<_>>>()?;
        self.padding = Sides::from_shorthand(&values)?;
        Some(())
    }

    /// [§ 4.4 'border' shorthands](https://www.w3.org/TR/css-backgrounds-3/#border-shorthands)
    ///
    /// `border: none` and `border: 0` both clear the affected sides.
    fn apply_border_shorthand(
        &mut self,
        value: &str,
        basis: FontBasis,
        sides: &[&str],
    ) -> Option<()> {
        let components = split_components(value);
        let parsed = parse_border_shorthand(&components)?;
        let side = BorderSide {
            width: basis.px(parsed.width)?.max(0.0),
            style: parsed.style,
            color: parsed.color,
        };
        for name in sides {
            *self.border.side_mut(name)? = side;
        }
        Some(())
    }

    fn apply_border_widths(&mut self, value: &str, basis: FontBasis) -> Option<()> {
        let widths = split_components(value)
            .into_iter()
            .map(|v| parse_border_width(v).and_then(|l| basis.px(l)).map(|w| w.max(0.0)))
            .collect::<Option<Vec<_>>>()?;
        let widths = Sides::from_shorthand(&widths)?;
        self.border.top.width = widths.top;
        self.border.right.width = widths.right;
        self.border.bottom.width = widths.bottom;
        self.border.left.width = widths.left;
        Some(())
    }

    fn apply_border_styles(&mut self, value: &str) -> Option<()> {
        let styles = split_components(value)
            .into_iter()
            .map(|v| v.parse::<BorderStyle>().ok())
            .collect::<Option<Vec<_>>>()?;
        let styles = Sides::from_shorthand(&styles)?;
        self.border.top.style = styles.top;
        self.border.right.style = styles.right;
        self.border.bottom.style = styles.bottom;
        self.border.left.style = styles.left;
        Some(())
    }

    fn apply_border_colors(&mut self, value: &str) -> Option<()> {
        let colors = split_components(value)
            .into_iter()
            .map(|v| self.color_or_current(v))
            .collect::<Option<Vec<_>>>()?;
        let colors = Sides::from_shorthand(&colors)?;
        self.border.top.color = Some(colors.top);
        self.border.right.color = Some(colors.right);
        self.border.bottom.color = Some(colors.bottom);
        self.border.left.color = Some(colors.left);
        Some(())
    }

    /// `border-<side>-<width|style|color>`.
    fn apply_border_longhand(
        &mut self,
        property: &str,
        value: &str,
        basis: FontBasis,
    ) -> Option<()> {
        let mut parts = property.splitn(3, '-').skip(1);
        let (side, component) = (parts.next()?, parts.next()?);
        match component {
            "width" => {
                let width = basis.px(parse_border_width(value)?)?.max(0.0);
                self.border.side_mut(side)?.width = width;
            }
            "style" => {
                let style = value.parse::<BorderStyle>().ok()?;
                self.border.side_mut(side)?.style = style;
            }
            "color" => {
                let color = self.color_or_current(value)?;
                self.border.side_mut(side)?.color = Some(color);
            }
            // border-top-left-radius and friends
            _ => {}
        }
        Some(())
    }

    /// "`currentcolor`: The keyword currentcolor represents value of the
    /// color property on the same element."
    fn color_or_current(&self, text: &str) -> Option<ColorValue> {
        if text.eq_ignore_ascii_case("currentcolor") {
            Some(self.color)
        } else {
            parse_color(text)
        }
    }

    /// [§ 4.7 'font' shorthand](https://www.w3.org/TR/css-fonts-4/#font-prop)
    ///
    /// "`[ <'font-style'> || <font-variant-css2> || <'font-weight'> ]?
    /// <'font-size'> [ / <'line-height'> ]? <'font-family'>#`"
    ///
    /// Omitted style, weight and line-height reset to their initial values.
    fn apply_font_shorthand(&mut self, value: &str, parent: &Self, root: f32) -> Option<()> {
        let components = split_components(value);
        let mut style = FontStyle::Normal;
        let mut weight = 400;
        let mut index = 0;
        while let Some(&part) = components.get(index) {
            let lower = part.to_ascii_lowercase();
            match lower.as_str() {
                "normal" | "small-caps" => {}
                _ => {
                    if let Ok(s) = lower.parse::<FontStyle>() {
                        style = s;
                    } else if let Some(w) = parse_font_weight(&lower, parent.font_weight) {
                        weight = w;
                    } else {
                        break;
                    }
                }
            }
            index += 1;
        }
        let size_part = components.get(index)?;
        let (size_text, line_height_text) = match size_part.split_once('/') {
            Some((size, lh)) => (size, Some(lh)),
            None => (*size_part, None),
        };
        let size = resolve_font_size(size_text, parent.font_size, root)?;
        let family = parse_font_family(&components.get(index + 1..)?.join(" "))?;
        let basis = FontBasis { em: size, rem: root };
        let line_height = match line_height_text {
            Some(text) => basis.line_height(text)?,
            None => LineHeight::Normal,
        };

        self.font_size = size;
        self.font_style = style;
        self.font_weight = weight;
        self.line_height = line_height;
        self.font_family = family;
        Some(())
    }

    /// Normalize after the cascade: borders with an invisible style have zero
    /// computed width.
    pub(crate) fn finish(&mut self) {
        for side in [
            &mut self.border.top,
            &mut self.border.right,
            &mut self.border.bottom,
            &mut self.border.left,
        ] {
            side.width = side.used_width();
        }
    }
}

/// [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// "Percentages: refer to parent element's font size". `em` on `font-size`
/// also refers to the parent. Negative sizes are invalid.
#[must_use]
pub fn resolve_font_size(value: &str, parent_size: f32, root_size: f32) -> Option<f32> {
    let value = value.trim();
    if let Some(factor) = absolute_size_factor(value) {
        return Some(root_size * factor);
    }
    if let Some(factor) = relative_size_factor(value) {
        return Some(parent_size * factor);
    }
    let size = match parse_length(value)? {
        LengthValue::Percent(pct) => parent_size * pct / 100.0,
        other => match other.to_computed(parent_size, root_size) {
            ComputedLength::Px(px) | ComputedLength::Percent(px) => px,
        },
    };
    (size >= 0.0).then_some(size)
}

/// Bases for font-relative units at the point a declaration applies.
#[derive(Debug, Clone, Copy)]
struct FontBasis {
    em: f32,
    rem: f32,
}

impl FontBasis {
    fn computed(self, length: LengthValue) -> ComputedLength {
        length.to_computed(self.em, self.rem)
    }

    fn length(self, text: &str) -> Option<ComputedLength> {
        parse_length(text).map(|l| self.computed(l))
    }

    fn auto_length(self, text: &str) -> Option<AutoLength> {
        if text.eq_ignore_ascii_case("auto") {
            Some(AutoLength::Auto)
        } else {
            self.length(text).map(AutoLength::Length)
        }
    }

    /// Absolute px; `None` for percentages.
    fn px(self, length: LengthValue) -> Option<f32> {
        self.computed(length).as_px()
    }

    fn gap(self, text: &str) -> Option<Option<ComputedLength>> {
        if text.eq_ignore_ascii_case("normal") {
            Some(None)
        } else {
            self.length(text).map(Some)
        }
    }

    /// [§ 10.8 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#propdef-line-height)
    ///
    /// "`<percentage>`: The computed value of the property is this percentage
    /// multiplied by the element's computed font size."
    fn line_height(self, text: &str) -> Option<LineHeight> {
        if text.eq_ignore_ascii_case("normal") {
            return Some(LineHeight::Normal);
        }
        if let Some(n) = parse_number(text) {
            return (n >= 0.0).then_some(LineHeight::Number(n));
        }
        let px = match parse_length(text)? {
            LengthValue::Percent(pct) => self.em * pct / 100.0,
            other => self.px(other)?,
        };
        (px >= 0.0).then_some(LineHeight::Px(px))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(
        style: &mut ComputedStyle,
        property: &str,
        value: &str,
    ) -> Result<(), StyleParseError> {
        let parent = ComputedStyle::default();
        style.apply_declaration(property, value, &parent, &parent)
    }

    #[test]
    fn test_margin_shorthand_expansion() {
        let mut style = ComputedStyle::default();
        apply(&mut style, "margin", "10px auto 5%").expect("valid margin");
        assert_eq!(style.margin.top, AutoLength::Length(ComputedLength::Px(10.0)));
        assert_eq!(style.margin.right, AutoLength::Auto);
        assert_eq!(style.margin.left, AutoLength::Auto);
        assert_eq!(
            style.margin.bottom,
            AutoLength::Length(ComputedLength::Percent(5.0))
        );
    }

    #[test]
    fn test_invalid_value_leaves_style_unchanged() {
        let mut style = ComputedStyle::default();
        apply(&mut style, "padding", "4px").expect("valid padding");
        let before = style.clone();
        let err = apply(&mut style, "padding", "4px banana").unwrap_err();
        assert_eq!(
            err,
            StyleParseError::InvalidValue {
                property: "padding".into(),
                value: "4px banana".into()
            }
        );
        assert_eq!(style, before);
    }

    #[test]
    fn test_em_uses_own_font_size() {
        let mut style = ComputedStyle::default();
        style.font_size = 20.0;
        apply(&mut style, "margin-top", "1.5em").expect("valid");
        assert_eq!(style.margin.top, AutoLength::Length(ComputedLength::Px(30.0)));
    }

    #[test]
    fn test_font_size_relative_to_parent() {
        assert_eq!(resolve_font_size("2em", 10.0, 16.0), Some(20.0));
        assert_eq!(resolve_font_size("150%", 10.0, 16.0), Some(15.0));
        assert_eq!(resolve_font_size("1rem", 10.0, 16.0), Some(16.0));
        assert_eq!(resolve_font_size("xx-large", 10.0, 16.0), Some(32.0));
        assert_eq!(resolve_font_size("-1px", 10.0, 16.0), None);
    }

    #[test]
    fn test_border_shorthand_and_finish() {
        let mut style = ComputedStyle::default();
        apply(&mut style, "border", "2px solid #000").expect("valid");
        apply(&mut style, "border-left-style", "none").expect("valid");
        style.finish();
        assert!((style.border.top.width - 2.0).abs() < f32::EPSILON);
        assert!(style.border.left.width.abs() < f32::EPSILON);
    }

    #[test]
    fn test_initial_border_width_is_zero_without_style() {
        let mut style = ComputedStyle::default();
        style.finish();
        assert!(style.border.top.width.abs() < f32::EPSILON);
    }

    #[test]
    fn test_font_shorthand() {
        let mut style = ComputedStyle::default();
        apply(&mut style, "font", "italic bold 12px/1.5 \"Open Sans\", sans-serif")
            .expect("valid font");
        assert_eq!(style.font_style, FontStyle::Italic);
        assert_eq!(style.font_weight, 700);
        assert!((style.font_size - 12.0).abs() < f32::EPSILON);
        assert_eq!(style.line_height, LineHeight::Number(1.5));
        assert_eq!(style.font_family, "Open Sans");

        assert!(apply(&mut style, "font", "bold").is_err());
    }

    #[test]
    fn test_inherit_and_initial_keywords() {
        let mut parent = ComputedStyle::default();
        parent.margin.top = AutoLength::Length(ComputedLength::Px(7.0));
        parent.color = ColorValue::rgb(1, 2, 3);

        let root = ComputedStyle::root("Georgia", 16.0);
        let mut style = ComputedStyle::inherit_from(&parent);
        assert_eq!(style.margin.top, AutoLength::ZERO);
        style
            .apply_declaration("margin-top", "inherit", &parent, &root)
            .expect("inherit");
        assert_eq!(style.margin.top, parent.margin.top);

        style
            .apply_declaration("color", "initial", &parent, &root)
            .expect("initial");
        assert_eq!(style.color, ColorValue::BLACK);

        // The configured root font, not the built-in default.
        style
            .apply_declaration("font-family", "initial", &parent, &root)
            .expect("initial");
        assert_eq!(style.font_family, "Georgia");
    }

    #[test]
    fn test_gap_shorthand() {
        let mut style = ComputedStyle::default();
        apply(&mut style, "gap", "20px 1em").expect("valid");
        assert_eq!(style.row_gap, Some(ComputedLength::Px(20.0)));
        assert_eq!(style.column_gap, Some(ComputedLength::Px(16.0)));
        apply(&mut style, "row-gap", "normal").expect("valid");
        assert_eq!(style.row_gap, None);
    }

    #[test]
    fn test_unknown_property_is_ignored() {
        let mut style = ComputedStyle::default();
        let before = style.clone();
        apply(&mut style, "cursor", "pointer").expect("ignored");
        assert_eq!(style, before);
    }
}
