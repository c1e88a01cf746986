//! CSS Display property types and parsing
//!
//! [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)

use serde::Serialize;

// [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
//
// "The display property defines an element's display type, which consists of
// the two basic qualities of how an element generates boxes:
//   - the inner display type, which defines the kind of formatting context
//     it generates, dictating how its descendant boxes are laid out.
//   - the outer display type, which dictates how the principal box itself
//     participates in flow layout."

/// [§ 2.1 Outer Display Roles](https://www.w3.org/TR/css-display-3/#outer-role)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OuterDisplayType {
    /// "The element generates a block-level box when placed in flow layout."
    Block,
    /// "The element generates an inline-level box when placed in flow layout."
    Inline,
    /// "The element generates a run-in box, which is a type of inline-level box."
    RunIn,
}

/// [§ 2.2 Inner Display Layout Models](https://www.w3.org/TR/css-display-3/#inner-model)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InnerDisplayType {
    /// "The element lays out its contents using flow layout (block-and-inline layout)."
    Flow,
    /// Flow layout in a new block formatting context.
    FlowRoot,
    /// "The element lays out its contents using table layout."
    Table,
    /// "The element lays out its contents using flex layout."
    Flex,
    /// "The element lays out its contents using grid layout."
    Grid,
}

/// [§ 2.4 Layout-Internal Display Types](https://www.w3.org/TR/css-display-3/#layout-specific-display)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InternalDisplayType {
    /// `table-row-group`
    TableRowGroup,
    /// `table-header-group`
    TableHeaderGroup,
    /// `table-footer-group`
    TableFooterGroup,
    /// `table-row`
    TableRow,
    /// `table-cell`
    TableCell,
    /// `table-column-group`
    TableColumnGroup,
    /// `table-column`
    TableColumn,
    /// `table-caption`
    TableCaption,
}

/// Combined outer/inner display value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayValue {
    /// How the box participates in its parent's flow.
    pub outer: OuterDisplayType,
    /// How the box lays out its contents.
    pub inner: InnerDisplayType,
    /// [§ 2.3 Generating Marker Boxes](https://www.w3.org/TR/css-display-3/#list-items)
    /// "The list-item keyword causes the element to generate a ::marker
    /// pseudo-element box."
    pub list_item: bool,
}

/// A computed `display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Display {
    /// [§ 2.5 Box Generation](https://www.w3.org/TR/css-display-3/#box-generation)
    /// "The element and its descendants generate no boxes or text runs."
    None,
    /// "The element itself does not generate any boxes, but its children and
    /// pseudo-elements still generate boxes and text runs as normal."
    Contents,
    /// An outer/inner pair.
    Flow(DisplayValue),
    /// A table-internal role.
    Internal(InternalDisplayType),
}

impl Default for Display {
    /// "Initial: inline"
    fn default() -> Self {
        Self::inline()
    }
}

impl Display {
    const fn pair(outer: OuterDisplayType, inner: InnerDisplayType) -> Self {
        Self::Flow(DisplayValue {
            outer,
            inner,
            list_item: false,
        })
    }

    /// `display: block`
    #[must_use]
    pub const fn block() -> Self {
        Self::pair(OuterDisplayType::Block, InnerDisplayType::Flow)
    }

    /// `display: inline`
    #[must_use]
    pub const fn inline() -> Self {
        Self::pair(OuterDisplayType::Inline, InnerDisplayType::Flow)
    }

    /// `display: inline-block`
    #[must_use]
    pub const fn inline_block() -> Self {
        Self::pair(OuterDisplayType::Inline, InnerDisplayType::FlowRoot)
    }

    /// `display: list-item`
    #[must_use]
    pub const fn list_item() -> Self {
        Self::Flow(DisplayValue {
            outer: OuterDisplayType::Block,
            inner: InnerDisplayType::Flow,
            list_item: true,
        })
    }

    /// `display: table`
    #[must_use]
    pub const fn table() -> Self {
        Self::pair(OuterDisplayType::Block, InnerDisplayType::Table)
    }

    /// `display: flex`
    #[must_use]
    pub const fn flex() -> Self {
        Self::pair(OuterDisplayType::Block, InnerDisplayType::Flex)
    }

    /// `display: grid`
    #[must_use]
    pub const fn grid() -> Self {
        Self::pair(OuterDisplayType::Block, InnerDisplayType::Grid)
    }

    /// Whether the element generates no boxes at all.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

/// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// Parse a `display` value: the precomposed keywords of § 2.7 and the
/// two-keyword `<display-outside> <display-inside>` form. Unknown values
/// return `None`.
#[must_use]
pub fn parse_display(value: &str) -> Option<Display> {
    use InnerDisplayType as In;
    use OuterDisplayType as Out;

    let lowered: Vec<String> = value
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect();
    let words: Vec<&str> = lowered.iter().map(String::as_str).collect();
    let display = match words.as_slice() {
        ["none"] => Display::None,
        ["contents"] => Display::Contents,
        ["block"] | ["block", "flow"] => Display::block(),
        ["inline"] | ["inline", "flow"] => Display::inline(),
        ["run-in"] => Display::pair(Out::RunIn, In::Flow),
        ["flow-root"] | ["block", "flow-root"] => Display::pair(Out::Block, In::FlowRoot),
        ["inline-block"] | ["inline", "flow-root"] => Display::inline_block(),
        ["list-item"] | ["block", "list-item"] | ["list-item", "block"] => Display::list_item(),
        ["table"] | ["block", "table"] => Display::table(),
        ["inline-table"] | ["inline", "table"] => Display::pair(Out::Inline, In::Table),
        ["flex"] | ["block", "flex"] => Display::flex(),
        ["inline-flex"] | ["inline", "flex"] => Display::pair(Out::Inline, In::Flex),
        ["grid"] | ["block", "grid"] => Display::grid(),
        ["inline-grid"] | ["inline", "grid"] => Display::pair(Out::Inline, In::Grid),
        [internal] => Display::Internal(match *internal {
            "table-row-group" => InternalDisplayType::TableRowGroup,
            "table-header-group" => InternalDisplayType::TableHeaderGroup,
            "table-footer-group" => InternalDisplayType::TableFooterGroup,
            "table-row" => InternalDisplayType::TableRow,
            "table-cell" => InternalDisplayType::TableCell,
            "table-column-group" => InternalDisplayType::TableColumnGroup,
            "table-column" => InternalDisplayType::TableColumn,
            "table-caption" => InternalDisplayType::TableCaption,
            _ => return None,
        }),
        _ => return None,
    };
    Some(display)
}
