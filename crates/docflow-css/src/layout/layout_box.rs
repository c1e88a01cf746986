//! Layout box types.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! A [`LayoutBox`] is the unit handed to the document emitter. Each variant
//! of [`BoxKind`] maps onto one construct of the target document model:
//! paragraphs, runs, tables, images and list paragraphs.

use std::sync::Arc;

use serde::Serialize;

use docflow_dom::NodeId;

use super::box_model::BoxModel;
use super::image::ImageBox;
use super::margin::Spacing;
use super::table::{CellPlacement, TableGeometry};
use crate::style::ComputedStyle;
use crate::style::values::{ListStyleType, PageBreak, TextDecoration};

/// [§ 13.3.1 Page break properties](https://www.w3.org/TR/CSS2/page.html#page-break-props)
///
/// Forwarded unresolved; the emitter decides where pages actually end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageBreaks {
    /// `page-break-before`
    pub before: PageBreak,
    /// `page-break-after`
    pub after: PageBreak,
}

impl PageBreaks {
    /// Read the markers from a computed style.
    #[must_use]
    pub const fn from_style(style: &ComputedStyle) -> Self {
        Self {
            before: style.page_break_before,
            after: style.page_break_after,
        }
    }

    /// Whether neither side carries a marker.
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.before == PageBreak::Auto && self.after == PageBreak::Auto
    }
}

/// [§ 9.2.2.1 Anonymous inline boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous)
///
/// A piece of text with uniform formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextRun {
    /// Text after white-space processing and `text-transform`.
    pub text: String,
    /// A forced line break (`br` or a preserved newline). `text` is empty.
    pub line_break: bool,
    /// Decoration of the run itself plus every inline ancestor's.
    pub decoration: TextDecoration,
    /// `href` of the nearest enclosing `a`.
    pub link: Option<String>,
}

/// Table payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableBox {
    /// Column widths and cell placement.
    pub geometry: TableGeometry,
    /// The first `caption`, laid out as a block.
    pub caption: Option<Box<LayoutBox>>,
}

/// A list item's marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListMarker {
    /// Ordinal within the list, honouring `ol[start]` and `li[value]`.
    pub ordinal: i64,
    /// Nesting depth among `ul`/`ol` ancestors, 0 for a top-level list.
    pub level: usize,
    /// How the marker is drawn.
    pub style_type: ListStyleType,
}

/// The role-specific part of a [`LayoutBox`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BoxKind {
    /// A paragraph-like block container.
    Block {
        /// Generated to wrap inline content next to blocks.
        anonymous: bool,
    },
    /// A run of text or a forced break.
    InlineRun(TextRun),
    /// A table; its rows are the children.
    Table(TableBox),
    /// A table row; its cells are the children.
    TableRow {
        /// The row belongs to `thead`.
        header: bool,
        /// Row index after header/footer reordering.
        index: usize,
    },
    /// A table cell.
    TableCell {
        /// Where the cell sits in the column grid.
        placement: CellPlacement,
        /// An empty cell added to fill a ragged row.
        placeholder: bool,
        /// `th`, or any cell in a header row.
        header: bool,
    },
    /// An image reference or a rasterized vector.
    Image(ImageBox),
    /// A list item paragraph.
    List(ListMarker),
}

/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
///
/// "a box ... has a content area and optional surrounding padding, border,
/// and margin areas"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutBox {
    /// What this box is.
    pub kind: BoxKind,
    /// The source node, `None` for anonymous boxes and placeholders.
    pub node: Option<NodeId>,
    /// The source element's tag.
    pub tag_name: Option<String>,
    /// Resolved style, shared with descendants that inherit it unchanged.
    pub style: Arc<ComputedStyle>,
    /// Geometry against the containing block.
    pub dimensions: BoxModel,
    /// Applied vertical spacing after margin collapsing.
    pub spacing: Spacing,
    /// Page-break markers.
    pub breaks: PageBreaks,
    /// Child boxes in document order.
    pub children: Vec<LayoutBox>,
}

impl LayoutBox {
    /// A box with no children and no spacing.
    #[must_use]
    pub fn new(kind: BoxKind, style: Arc<ComputedStyle>, dimensions: BoxModel) -> Self {
        let breaks = PageBreaks::from_style(&style);
        Self {
            kind,
            node: None,
            tag_name: None,
            style,
            dimensions,
            spacing: Spacing::default(),
            breaks,
            children: Vec::new(),
        }
    }

    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// "The properties of anonymous boxes are inherited from the enclosing
    /// non-anonymous box."
    #[must_use]
    pub fn anonymous_block(parent_style: &ComputedStyle, width: f32, children: Vec<Self>) -> Self {
        let style = Arc::new(ComputedStyle::inherit_from(parent_style));
        let mut block = Self::new(
            BoxKind::Block { anonymous: true },
            style,
            BoxModel::with_content_width(width),
        );
        block.breaks = PageBreaks::default();
        block.children = children;
        block
    }

    /// An inline run for a text node or `br`.
    #[must_use]
    pub fn text_run(node: NodeId, style: Arc<ComputedStyle>, run: TextRun) -> Self {
        let mut run_box = Self::new(BoxKind::InlineRun(run), style, BoxModel::default());
        run_box.node = Some(node);
        run_box.breaks = PageBreaks::default();
        run_box
    }

    /// Attach the source element.
    #[must_use]
    pub fn with_source(mut self, node: NodeId, tag_name: &str) -> Self {
        self.node = Some(node);
        self.tag_name = Some(tag_name.to_string());
        self
    }

    /// Set the applied spacing.
    #[must_use]
    pub const fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    /// Whether the box stacks vertically in its container.
    #[must_use]
    pub const fn is_block_level(&self) -> bool {
        matches!(
            self.kind,
            BoxKind::Block { .. } | BoxKind::Table(_) | BoxKind::List(_)
        )
    }

    /// The run payload, if this is an inline run.
    #[must_use]
    pub const fn as_text_run(&self) -> Option<&TextRun> {
        match &self.kind {
            BoxKind::InlineRun(run) => Some(run),
            _ => None,
        }
    }

    /// The table payload, if this is a table.
    #[must_use]
    pub const fn as_table(&self) -> Option<&TableBox> {
        match &self.kind {
            BoxKind::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Concatenated run text of this subtree; breaks become `\n`.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        if let BoxKind::InlineRun(run) = &self.kind {
            if run.line_break {
                out.push('\n');
            } else {
                out.push_str(&run.text);
            }
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Depth-first iterator over this box and its descendants.
    pub fn descendants(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// A short label for outlines: `<tag>` or the variant name.
    #[must_use]
    pub fn label(&self) -> String {
        let variant = match &self.kind {
            BoxKind::Block { anonymous: true } => return "AnonymousBlock".to_string(),
            BoxKind::Block { .. } => "Block",
            BoxKind::InlineRun(run) if run.line_break => return "Break".to_string(),
            BoxKind::InlineRun(run) => {
                let preview: String = run.text.chars().take(30).collect();
                let suffix = if run.text.chars().count() > 30 { "..." } else { "" };
                return format!("Run(\"{}{suffix}\")", preview.replace('\n', "\\n"));
            }
            BoxKind::Table(_) => "Table",
            BoxKind::TableRow { .. } => "Row",
            BoxKind::TableCell {
                placeholder: true, ..
            } => return "PlaceholderCell".to_string(),
            BoxKind::TableCell { .. } => "Cell",
            BoxKind::Image(_) => "Image",
            BoxKind::List(_) => "ListItem",
        };
        self.tag_name
            .as_ref()
            .map_or_else(|| variant.to_string(), |tag| format!("{variant} <{tag}>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> LayoutBox {
        LayoutBox::text_run(
            NodeId(1),
            Arc::new(ComputedStyle::default()),
            TextRun {
                text: text.to_string(),
                ..TextRun::default()
            },
        )
    }

    #[test]
    fn test_anonymous_block_inherits_and_wraps() {
        let parent = ComputedStyle {
            font_size: 20.0,
            ..ComputedStyle::default()
        };
        let block = LayoutBox::anonymous_block(&parent, 300.0, vec![run("a"), run("b")]);
        assert!(block.is_block_level());
        assert!((block.style.font_size - 20.0).abs() < f32::EPSILON);
        assert_eq!(block.text_content(), "ab");
        assert_eq!(block.label(), "AnonymousBlock");
        assert_eq!(block.descendants().count(), 3);
    }

    #[test]
    fn test_runs_are_inline_level() {
        let r = run("hello");
        assert!(!r.is_block_level());
        assert_eq!(r.as_text_run().map(|t| t.text.as_str()), Some("hello"));
        assert_eq!(r.label(), "Run(\"hello\")");
    }
}
