//! CSS Box Model geometry.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//!
//! Only horizontal placement is computed here. Heights depend on text
//! shaping, which belongs to the document emitter; a box carries a content
//! height only when its style makes one definite.

use serde::Serialize;

use crate::style::ComputedStyle;
use crate::style::values::{AutoLength, BoxSizing, ComputedLength, Sides};

/// Edge sizes for padding, border, or margin.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// `left + right`.
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// `top + bottom`.
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    fn from_lengths(sides: Sides<ComputedLength>, basis: f32) -> Self {
        Self {
            top: clamp(sides.top.resolve(basis)),
            right: clamp(sides.right.resolve(basis)),
            bottom: clamp(sides.bottom.resolve(basis)),
            left: clamp(sides.left.resolve(basis)),
        }
    }
}

/// [§ 3. The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
///
/// "Each box has a content area and optional surrounding padding, border,
/// and margin areas."
///
/// Every value is a non-negative CSS px length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoxModel {
    /// Content box width.
    pub content_width: f32,
    /// Content box height when definite.
    pub content_height: Option<f32>,
    /// Padding edges.
    pub padding: EdgeSizes,
    /// Border edges.
    pub border: EdgeSizes,
    /// Margin edges as declared, before collapsing.
    pub margin: EdgeSizes,
}

impl BoxModel {
    /// A box of the given content width with no edges.
    #[must_use]
    pub fn with_content_width(width: f32) -> Self {
        Self {
            content_width: clamp(width),
            ..Self::default()
        }
    }

    /// [§ 3.3 Borders](https://www.w3.org/TR/css-box-3/#borders)
    ///
    /// "The border box contains content, padding, and border areas."
    #[must_use]
    pub fn border_box_width(&self) -> f32 {
        self.content_width + self.padding.horizontal() + self.border.horizontal()
    }

    /// [§ 3.1 Margins](https://www.w3.org/TR/css-box-3/#margins)
    ///
    /// "The margin box is the outermost box, and contains all four areas."
    #[must_use]
    pub fn margin_box_width(&self) -> f32 {
        self.border_box_width() + self.margin.horizontal()
    }

    /// Whether padding or border separates the top margin from the content.
    #[must_use]
    pub fn has_top_separation(&self) -> bool {
        self.padding.top > 0.0 || self.border.top > 0.0
    }

    /// Whether padding or border separates the bottom margin from the content.
    #[must_use]
    pub fn has_bottom_separation(&self) -> bool {
        self.padding.bottom > 0.0 || self.border.bottom > 0.0
    }
}

/// Negative and non-finite lengths clamp to zero: the target document model
/// has no negative spacing.
fn clamp(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// Compute the box geometry of a block-level box against the containing
/// block's content width.
///
/// "The following constraints must hold among the used values of the
/// other properties:
///
///   'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
///   'padding-right' + 'border-right-width' + 'margin-right'
///   = width of containing block"
///
/// Unlike a browser, an over-constrained box keeps its declared right
/// margin; the emitter places boxes by their own margins.
#[must_use]
pub fn compute_box(style: &ComputedStyle, containing_block_width: f32) -> BoxModel {
    let cb = clamp(containing_block_width);

    // STEP 1: Resolve computed values to used values.
    // [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    // "The percentage is calculated with respect to the width of the
    // generated box's containing block, even for 'padding-top' and
    // 'padding-bottom'."
    let padding = EdgeSizes::from_lengths(style.padding, cb);
    let border = EdgeSizes {
        top: clamp(style.border.top.used_width()),
        right: clamp(style.border.right.used_width()),
        bottom: clamp(style.border.bottom.used_width()),
        left: clamp(style.border.left.used_width()),
    };
    let margin_px = |m: AutoLength| m.resolve(cb).map(clamp);
    let mut margin = EdgeSizes {
        top: margin_px(style.margin.top).unwrap_or(0.0),
        right: 0.0,
        bottom: margin_px(style.margin.bottom).unwrap_or(0.0),
        left: 0.0,
    };
    let margin_left = margin_px(style.margin.left);
    let margin_right = margin_px(style.margin.right);
    let edges = padding.horizontal() + border.horizontal();

    // STEP 2: Specified width, converted to a content width.
    // [§ 4.4 box-sizing](https://www.w3.org/TR/css-box-4/#box-sizing)
    let content_width = |length: ComputedLength| {
        let specified = clamp(length.resolve(cb));
        match style.box_sizing {
            BoxSizing::ContentBox => specified,
            BoxSizing::BorderBox => clamp(specified - edges),
        }
    };
    let mut width = match style.width {
        AutoLength::Length(length) => Some(content_width(length)),
        AutoLength::Auto => None,
    };

    // [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    // "If the tentative used width is greater than 'max-width', the rules
    // above are applied again using the computed value of 'max-width' as the
    // computed value for 'width'."
    if let Some(max) = style.max_width.map(content_width) {
        let tentative = width.unwrap_or_else(|| {
            cb - margin_left.unwrap_or(0.0) - margin_right.unwrap_or(0.0) - edges
        });
        if tentative > max {
            width = Some(max);
        }
    }

    // STEP 3: Apply the constraint rules.
    let used_width = match width {
        // RULE A: "If 'width' is set to 'auto', any other 'auto' values become
        //         '0' and 'width' follows from the resulting equality."
        None => {
            margin.left = margin_left.unwrap_or(0.0);
            margin.right = margin_right.unwrap_or(0.0);
            clamp(cb - margin.left - margin.right - edges)
        }
        Some(width) => {
            let remaining = clamp(cb - width - edges);
            match (margin_left, margin_right) {
                // RULE B: "If both 'margin-left' and 'margin-right' are 'auto',
                //         their used values are equal."
                (None, None) => {
                    margin.left = remaining / 2.0;
                    margin.right = remaining / 2.0;
                }
                // RULE C: "If there is exactly one value specified as 'auto',
                //         its used value follows from the equality."
                (None, Some(right)) => {
                    margin.right = right;
                    margin.left = clamp(remaining - right);
                }
                (Some(left), None) => {
                    margin.left = left;
                    margin.right = clamp(remaining - left);
                }
                (Some(left), Some(right)) => {
                    margin.left = left;
                    margin.right = right;
                }
            }
            width
        }
    };

    // [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    // "If the height of the containing block is not specified explicitly
    // ... the value computes to 'auto'." Paged flow never has a definite
    // containing-block height, so percentages are auto.
    let content_height = match style.height {
        AutoLength::Length(ComputedLength::Px(px)) => Some(match style.box_sizing {
            BoxSizing::ContentBox => clamp(px),
            BoxSizing::BorderBox => clamp(px - padding.vertical() - border.vertical()),
        }),
        AutoLength::Length(ComputedLength::Percent(_)) | AutoLength::Auto => None,
    };

    BoxModel {
        content_width: used_width,
        content_height,
        padding,
        border,
        margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::values::{BorderSide, BorderStyle};

    fn px(v: f32) -> AutoLength {
        AutoLength::Length(ComputedLength::Px(v))
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_auto_width_fills_containing_block() {
        let mut style = ComputedStyle::default();
        style.margin.left = px(10.0);
        style.margin.right = px(20.0);
        style.padding = Sides::uniform(ComputedLength::Px(5.0));
        style.border.left = BorderSide {
            width: 2.0,
            style: BorderStyle::Solid,
            color: None,
        };
        let b = compute_box(&style, 400.0);
        assert!(approx(b.content_width, 400.0 - 10.0 - 20.0 - 10.0 - 2.0));
        assert!(approx(b.margin_box_width(), 400.0));
    }

    #[test]
    fn test_percentages_resolve_against_containing_block() {
        let mut style = ComputedStyle::default();
        style.width = AutoLength::Length(ComputedLength::Percent(50.0));
        style.padding.top = ComputedLength::Percent(10.0);
        let b = compute_box(&style, 300.0);
        assert!(approx(b.content_width, 150.0));
        assert!(approx(b.padding.top, 30.0));
    }

    #[test]
    fn test_negative_values_clamp_to_zero() {
        let mut style = ComputedStyle::default();
        style.margin.top = px(-12.0);
        style.padding.left = ComputedLength::Px(-3.0);
        style.width = px(-50.0);
        let b = compute_box(&style, 200.0);
        assert!(approx(b.margin.top, 0.0));
        assert!(approx(b.padding.left, 0.0));
        assert!(approx(b.content_width, 0.0));
    }

    #[test]
    fn test_auto_margins_center_explicit_width() {
        let mut style = ComputedStyle::default();
        style.width = px(200.0);
        style.margin.left = AutoLength::Auto;
        style.margin.right = AutoLength::Auto;
        let b = compute_box(&style, 600.0);
        assert!(approx(b.margin.left, 200.0));
        assert!(approx(b.margin.right, 200.0));
    }

    #[test]
    fn test_border_box_and_max_width() {
        let mut style = ComputedStyle::default();
        style.box_sizing = BoxSizing::BorderBox;
        style.width = px(100.0);
        style.padding = Sides::uniform(ComputedLength::Px(10.0));
        let b = compute_box(&style, 500.0);
        assert!(approx(b.content_width, 80.0));
        assert!(approx(b.border_box_width(), 100.0));

        let mut style = ComputedStyle::default();
        style.max_width = Some(ComputedLength::Px(120.0));
        let b = compute_box(&style, 500.0);
        assert!(approx(b.content_width, 120.0));
    }

    #[test]
    fn test_percentage_height_is_auto() {
        let mut style = ComputedStyle::default();
        style.height = AutoLength::Length(ComputedLength::Percent(50.0));
        assert_eq!(compute_box(&style, 100.0).content_height, None);
        style.height = px(40.0);
        assert_eq!(compute_box(&style, 100.0).content_height, Some(40.0));
    }
}
