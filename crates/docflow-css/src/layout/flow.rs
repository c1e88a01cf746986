//! Flow classification: which layout strategy a node gets.
//!
//! [§ 2 Box Layout Modes](https://www.w3.org/TR/css-display-3/#the-display-properties)
//!
//! The target document model has a fixed set of constructs (paragraphs,
//! runs, tables, images, list paragraphs), so every element is mapped onto
//! one of them from its computed `display` plus its tag.

use serde::Serialize;
use strum_macros::Display;

use docflow_dom::ElementData;

use crate::style::{ComputedStyle, Display as CssDisplay, InnerDisplayType, OuterDisplayType};

/// Tags whose content the document model cannot express.
const UNSUPPORTED_TAGS: &[&str] = &[
    "iframe", "video", "audio", "canvas", "object", "embed", "input", "select", "textarea",
    "button", "frame", "frameset", "applet", "math",
];

/// [§ 15.3.1 Hidden elements](https://html.spec.whatwg.org/multipage/rendering.html#hidden-elements)
const HIDDEN_TAGS: &[&str] = &[
    "head", "script", "style", "meta", "link", "title", "template", "noscript", "base",
    "datalist", "area", "param", "rp", "noembed", "noframes",
];

/// The structural role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FlowRole {
    /// A block container: paragraph-like.
    Block,
    /// Inline-level: contributes runs to the enclosing paragraph.
    Inline,
    /// A block that carries a list marker.
    ListItem,
    /// [§ 17.2 The CSS table model](https://www.w3.org/TR/CSS2/tables.html#table-display)
    Table,
    /// `thead`, `tbody` or `tfoot`.
    TableRowGroup,
    /// `tr`.
    TableRow,
    /// `td` or `th`.
    TableCell,
    /// `colgroup`.
    TableColumnGroup,
    /// `col`.
    TableColumn,
    /// `caption`.
    TableCaption,
    /// A raster image reference (`img`).
    Image,
    /// Vector markup (`svg`) that must be rasterized.
    Vector,
    /// A forced line break (`br`).
    LineBreak,
    /// Generates no box at all.
    Hidden,
    /// Content the document model cannot express; dropped with a diagnostic.
    Unsupported,
}

impl FlowRole {
    /// Whether this role participates in its parent's block flow.
    #[must_use]
    pub const fn is_block_level(self) -> bool {
        matches!(self, Self::Block | Self::ListItem | Self::Table)
    }

    /// Whether this role only makes sense inside a table.
    #[must_use]
    pub const fn is_table_part(self) -> bool {
        matches!(
            self,
            Self::TableRowGroup
                | Self::TableRow
                | Self::TableCell
                | Self::TableColumnGroup
                | Self::TableColumn
                | Self::TableCaption
        )
    }
}

/// The classification plus whether the declared display had to degrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The assigned role.
    pub role: FlowRole,
    /// Set when a declared `display` the document model cannot honour was
    /// replaced by `block`.
    pub degraded: bool,
}

impl Classification {
    const fn exact(role: FlowRole) -> Self {
        Self {
            role,
            degraded: false,
        }
    }
}

/// Classify an element. Pure: depends only on the tag and computed style.
///
/// Table-structural tags are forced to their structural role whatever their
/// declared display, the same outcome anonymous table-box generation would
/// produce for well-formed tables.
#[must_use]
pub fn classify(element: &ElementData, style: &ComputedStyle) -> FlowRole {
    classify_detailed(element, style).role
}

/// [`classify`], also reporting whether the declared display degraded.
#[must_use]
pub fn classify_detailed(element: &ElementData, style: &ComputedStyle) -> Classification {
    let tag = element.tag_name.as_str();
    if UNSUPPORTED_TAGS.contains(&tag) {
        return Classification::exact(FlowRole::Unsupported);
    }
    // [§ 2.5 Box Generation](https://www.w3.org/TR/css-display-3/#box-generation)
    // "display: none ... The element and its descendants generate no boxes."
    if HIDDEN_TAGS.contains(&tag) || style.display.is_none() {
        return Classification::exact(FlowRole::Hidden);
    }

    let structural = match tag {
        "table" => Some(FlowRole::Table),
        "thead" | "tbody" | "tfoot" => Some(FlowRole::TableRowGroup),
        "tr" => Some(FlowRole::TableRow),
        "td" | "th" => Some(FlowRole::TableCell),
        "colgroup" => Some(FlowRole::TableColumnGroup),
        "col" => Some(FlowRole::TableColumn),
        "caption" => Some(FlowRole::TableCaption),
        "img" => Some(FlowRole::Image),
        "svg" => Some(FlowRole::Vector),
        "br" => Some(FlowRole::LineBreak),
        _ => None,
    };
    if let Some(role) = structural {
        return Classification::exact(role);
    }

    match style.display {
        CssDisplay::None => Classification::exact(FlowRole::Hidden),
        CssDisplay::Flow(value) if value.list_item => Classification::exact(FlowRole::ListItem),
        CssDisplay::Flow(value) => match (value.outer, value.inner) {
            (OuterDisplayType::Inline, InnerDisplayType::Flow | InnerDisplayType::FlowRoot) => {
                Classification::exact(FlowRole::Inline)
            }
            (OuterDisplayType::Block, InnerDisplayType::Table) => {
                Classification::exact(FlowRole::Table)
            }
            // [§ 8 Gaps](https://www.w3.org/TR/css-align-3/#gaps)
            // Flex and grid containers keep their gap; their items stack.
            (
                OuterDisplayType::Block,
                InnerDisplayType::Flow
                | InnerDisplayType::FlowRoot
                | InnerDisplayType::Flex
                | InnerDisplayType::Grid,
            ) => Classification::exact(FlowRole::Block),
            // inline-table, inline-flex, inline-grid and run-in.
            _ => degraded(),
        },
        CssDisplay::Contents | CssDisplay::Internal(_) => degraded(),
    }
}

/// Unsupported display values degrade to block.
const fn degraded() -> Classification {
    Classification {
        role: FlowRole::Block,
        degraded: true,
    }
}
