//! Layout tree construction.
//!
//! [§ 9 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html)
//!
//! One recursive descent over the styled tree. Each element is resolved
//! (style, box, role) against its containing block's content width, its
//! children are built with its own content width, and then its block-level
//! children's margins are collapsed into applied spacing. Nothing here is
//! fatal: problems become [`Diagnostic`]s next to a best-effort tree.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use docflow_common::{Diagnostic, DiagnosticKind, Diagnostics};
use docflow_dom::markup::serialize_subtree;
use docflow_dom::{ElementData, NodeId, StyledTree};

use super::box_model::{BoxModel, EdgeSizes, compute_box};
use super::flow::{FlowRole, classify_detailed};
use super::image::{
    ImageBox, ImageSize, Rasterizer, declared_intrinsic_size, rasterize_vector, target_size,
};
use super::inline::{InlineContext, InlineFlow};
use super::layout_box::{BoxKind, LayoutBox, ListMarker, TableBox};
use super::margin::{BlockMargins, ContainerEdges, Spacing, collapse_children, collapse_margins};
use super::table::{CellPlacement, CellSpec, ColumnWidth, TableShape, resolve_table};
use crate::cascade::{resolve, root_style};
use crate::config::LayoutConfig;
use crate::style::{AutoLength, ComputedLength, ComputedStyle, Display, InnerDisplayType};

/// Component name used in diagnostics.
const COMPONENT: &str = "layout";

/// The result of one conversion run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutOutput {
    /// The box for the root element.
    pub root: LayoutBox,
    /// Every recoverable problem met along the way, deduplicated.
    pub diagnostics: Vec<Diagnostic>,
}

/// Build the layout tree for `tree`.
///
/// `rasterizer` converts `svg` subtrees to pixels; without one, vector
/// content becomes placeholder images.
///
/// # Example
/// ```
/// use docflow_css::{LayoutConfig, build};
/// use docflow_dom::{ElementData, StyledTree};
///
/// let mut tree = StyledTree::new(ElementData::new("body"));
/// let p = tree.append_element(tree.root(), ElementData::new("p"));
/// let _ = tree.append_text(p, "Hello");
/// let output = build(&tree, &LayoutConfig::default(), None);
/// assert_eq!(output.root.text_content(), "Hello");
/// ```
#[must_use]
pub fn build(
    tree: &StyledTree,
    config: &LayoutConfig,
    rasterizer: Option<&dyn Rasterizer>,
) -> LayoutOutput {
    let mut builder = LayoutBuilder {
        tree,
        config,
        rasterizer,
        diagnostics: Diagnostics::new(),
        styles: HashMap::new(),
    };
    let root = builder.build_root();
    log::debug!(
        target: "docflow::layout",
        "built {} boxes from {} nodes, {} diagnostic(s)",
        root.descendants().count(),
        tree.len(),
        builder.diagnostics.len()
    );
    LayoutOutput {
        root,
        diagnostics: builder.diagnostics.into_vec(),
    }
}

/// Per-run state.
struct LayoutBuilder<'a> {
    tree: &'a StyledTree,
    config: &'a LayoutConfig,
    rasterizer: Option<&'a dyn Rasterizer>,
    diagnostics: Diagnostics,
    /// Each node's style is resolved once per run.
    styles: HashMap<NodeId, Arc<ComputedStyle>>,
}

/// A block-level box and the margins its parent collapses.
struct Placed {
    layout: LayoutBox,
    margins: BlockMargins,
}

/// A container's children before anonymous block wrapping.
enum Segment {
    Inline(Vec<LayoutBox>),
    Block(Placed),
}

/// A container's children after margin collapsing.
struct Contents {
    children: Vec<LayoutBox>,
    escaped_top: Option<f32>,
    escaped_bottom: Option<f32>,
    /// No content, or only children whose own margins adjoin.
    through: bool,
}

/// Whether a container's edges can let child margins through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Containment {
    /// A block in normal flow: edges open unless padding, border or height
    /// separate them.
    Flow,
    /// The page root, a table cell or a caption.
    Closed,
}

struct CellSource<'a> {
    node: NodeId,
    element: &'a ElementData,
    style: Arc<ComputedStyle>,
    spec: CellSpec,
}

struct RowSource<'a> {
    node: Option<NodeId>,
    style: Arc<ComputedStyle>,
    header: bool,
    cells: Vec<CellSource<'a>>,
}

#[derive(Default)]
struct TableSource<'a> {
    head: Vec<RowSource<'a>>,
    body: Vec<RowSource<'a>>,
    foot: Vec<RowSource<'a>>,
    columns: Vec<Option<ColumnWidth>>,
    caption: Option<(NodeId, &'a ElementData, Arc<ComputedStyle>)>,
}

impl<'a> LayoutBuilder<'a> {
    fn build_root(&mut self) -> LayoutBox {
        let tree = self.tree;
        let root = tree.root();
        let initial = root_style(self.config);
        let style = self.style_of(root, &initial);
        let width = self.config.page_content_width;
        let Some(element) = tree.as_element(root) else {
            return LayoutBox::anonymous_block(&style, width, Vec::new());
        };

        let context = InlineContext::default();
        let placed = match self.classify(element, &style) {
            FlowRole::Table => self.build_table(root, element, style, width, &context),
            FlowRole::ListItem => {
                let marker = self.list_marker(root, &style, 1);
                self.build_container(
                    root,
                    element,
                    style,
                    BoxKind::List(marker),
                    width,
                    &context,
                    Containment::Closed,
                )
            }
            _ => self.build_container(
                root,
                element,
                style,
                BoxKind::Block { anonymous: false },
                width,
                &context,
                Containment::Closed,
            ),
        };
        let spacing = Spacing {
            before: placed.margins.top,
            after: placed.margins.bottom,
        };
        placed.layout.with_spacing(spacing)
    }

    /// The computed style of `node`, resolved on first use and shared after
    /// that.
    fn style_of(&mut self, node: NodeId, parent: &ComputedStyle) -> Arc<ComputedStyle> {
        if let Some(style) = self.styles.get(&node) {
            return Arc::clone(style);
        }
        let style = Arc::new(resolve(
            self.tree,
            node,
            parent,
            self.config,
            &mut self.diagnostics,
        ));
        let _ = self.styles.insert(node, Arc::clone(&style));
        style
    }

    fn classify(&mut self, element: &ElementData, style: &ComputedStyle) -> FlowRole {
        let classification = classify_detailed(element, style);
        if classification.degraded {
            self.diagnostics.report(
                DiagnosticKind::StyleParse,
                COMPONENT,
                format!(
                    "display of <{}> cannot be represented; laid out as a block",
                    element.tag_name
                ),
            );
        }
        classification.role
    }

    fn report(&mut self, kind: DiagnosticKind, message: String) {
        self.diagnostics.report(kind, COMPONENT, message);
    }

    // ------------------------------------------------------------------
    // Block containers
    // ------------------------------------------------------------------

    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// "In a block formatting context, boxes are laid out one after the
    /// other, vertically, beginning at the top of a containing block. The
    /// vertical distance between two sibling boxes is determined by the
    /// 'margin' properties."
    #[allow(clippy::too_many_arguments)]
    fn build_container(
        &mut self,
        node: NodeId,
        element: &ElementData,
        style: Arc<ComputedStyle>,
        kind: BoxKind,
        containing_block_width: f32,
        parent_context: &InlineContext,
        containment: Containment,
    ) -> Placed {
        let dimensions = compute_box(&style, containing_block_width);
        let context = parent_context.enter(&style, link_target(element));

        // [§ 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
        // "top margin of a box and top margin of its first in-flow child"
        // adjoin when "no line boxes, no clearance, no padding and no border
        // separate them".
        let edges = match containment {
            Containment::Closed => ContainerEdges::CLOSED,
            Containment::Flow => ContainerEdges {
                top_open: !dimensions.has_top_separation(),
                bottom_open: !dimensions.has_bottom_separation()
                    && dimensions.content_height.is_none(),
            },
        };
        let contents = self.lay_out_children(
            node,
            element,
            &style,
            dimensions.content_width,
            &context,
            edges,
        );

        let top = collapse_margins(std::iter::once(dimensions.margin.top).chain(contents.escaped_top));
        let bottom = collapse_margins(
            std::iter::once(dimensions.margin.bottom).chain(contents.escaped_bottom),
        );
        let margins = if contents.through && edges == ContainerEdges::OPEN {
            BlockMargins::through(top, bottom)
        } else {
            BlockMargins::new(top, bottom)
        };

        let mut layout = LayoutBox::new(kind, style, dimensions).with_source(node, &element.tag_name);
        layout.children = contents.children;
        Placed { layout, margins }
    }

    /// Build and collapse the children of a block container whose content
    /// box is `width` px wide.
    fn lay_out_children(
        &mut self,
        node: NodeId,
        element: &ElementData,
        style: &Arc<ComputedStyle>,
        width: f32,
        context: &InlineContext,
        edges: ContainerEdges,
    ) -> Contents {
        let segments = self.flow_children(node, style, width, context);
        let gap = explicit_gap(element, style);
        // [§ 8 Gaps](https://www.w3.org/TR/css-align-3/#gaps)
        // A gap container's children never collapse through its edges.
        let edges = if gap.is_some() {
            ContainerEdges::CLOSED
        } else {
            edges
        };
        place_segments(segments, style, width, edges, gap)
    }

    /// Build every child of a block container, grouping inline-level content
    /// into runs.
    fn flow_children(
        &mut self,
        node: NodeId,
        style: &Arc<ComputedStyle>,
        width: f32,
        context: &InlineContext,
    ) -> Vec<Segment> {
        let tree = self.tree;
        let mut segments = Vec::new();
        let mut flow = InlineFlow::new();
        let mut next_ordinal = list_start(tree.as_element(node));

        for &child in tree.children(node) {
            if let Some(text) = tree.as_text(child) {
                let text_style = self.style_of(child, style);
                flow.push_text(child, text, &text_style, context);
                continue;
            }
            let Some(element) = tree.as_element(child) else {
                continue;
            };
            let child_style = self.style_of(child, style);
            let mut role = self.classify(element, &child_style);
            if role.is_table_part() {
                self.report(
                    DiagnosticKind::LayoutInconsistency,
                    format!("<{}> outside a table; laid out as a block", element.tag_name),
                );
                role = FlowRole::Block;
            }
            // [§ 9.2.1.1](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
            // An inline box containing a block is laid out as a block.
            if role == FlowRole::Inline && self.contains_block(child, &child_style) {
                role = FlowRole::Block;
            }

            let placed = match role {
                FlowRole::Hidden => continue,
                FlowRole::Unsupported => {
                    self.report_unsupported(element);
                    continue;
                }
                FlowRole::Inline | FlowRole::Image | FlowRole::Vector | FlowRole::LineBreak => {
                    self.push_inline(&mut flow, child, element, child_style, role, width, context);
                    continue;
                }
                FlowRole::Table => self.build_table(child, element, child_style, width, context),
                FlowRole::ListItem => {
                    // [§ 4.4.8 The li element](https://html.spec.whatwg.org/multipage/grouping-content.html#the-li-element)
                    // "If the value attribute is present ... the ordinal value of
                    // the list item is the value attribute's value."
                    let ordinal = element
                        .attr("value")
                        .and_then(|v| v.trim().parse::<i64>().ok())
                        .unwrap_or(next_ordinal);
                    next_ordinal = ordinal.saturating_add(1);
                    let marker = self.list_marker(child, &child_style, ordinal);
                    self.build_container(
                        child,
                        element,
                        child_style,
                        BoxKind::List(marker),
                        width,
                        context,
                        Containment::Flow,
                    )
                }
                _ => self.build_container(
                    child,
                    element,
                    child_style,
                    BoxKind::Block { anonymous: false },
                    width,
                    context,
                    Containment::Flow,
                ),
            };

            let pending = std::mem::take(&mut flow).finish();
            if !pending.is_empty() {
                segments.push(Segment::Inline(pending));
            }
            segments.push(Segment::Block(placed));
        }

        let pending = flow.finish();
        if !pending.is_empty() {
            segments.push(Segment::Inline(pending));
        }
        segments
    }

    /// Whether an inline element has a block-level descendant reachable
    /// through inline elements only.
    fn contains_block(&mut self, node: NodeId, style: &ComputedStyle) -> bool {
        let tree = self.tree;
        for &child in tree.children(node) {
            let Some(element) = tree.as_element(child) else {
                continue;
            };
            let child_style = self.style_of(child, style);
            let role = classify_detailed(element, &child_style).role;
            if role.is_block_level()
                || role.is_table_part()
                || (role == FlowRole::Inline && self.contains_block(child, &child_style))
            {
                return true;
            }
        }
        false
    }

    fn report_unsupported(&mut self, element: &ElementData) {
        self.report(
            DiagnosticKind::UnsupportedNodeKind,
            format!("<{}> is not supported; skipped with its content", element.tag_name),
        );
    }

    fn list_marker(&self, node: NodeId, style: &ComputedStyle, ordinal: i64) -> ListMarker {
        let tree = self.tree;
        let level = tree
            .ancestors(node)
            .filter(|&ancestor| matches!(tree.tag_name(ancestor), Some("ul" | "ol")))
            .count()
            .saturating_sub(1);
        ListMarker {
            ordinal,
            level,
            style_type: style.list_style_type,
        }
    }

    // ------------------------------------------------------------------
    // Inline content
    // ------------------------------------------------------------------

    /// [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    ///
    /// "An inline box is one that is both inline-level and whose contents
    /// participate in its containing inline formatting context."
    #[allow(clippy::too_many_arguments)]
    fn push_inline(
        &mut self,
        flow: &mut InlineFlow,
        node: NodeId,
        element: &ElementData,
        style: Arc<ComputedStyle>,
        role: FlowRole,
        containing_block_width: f32,
        context: &InlineContext,
    ) {
        match role {
            FlowRole::LineBreak => flow.push_break(node, &style, context),
            FlowRole::Image | FlowRole::Vector => {
                let image = self.build_image(node, element, style, role, containing_block_width);
                flow.push_atomic(image);
            }
            _ => {
                let inner = context.enter(&style, link_target(element));
                let tree = self.tree;
                for &child in tree.children(node) {
                    if let Some(text) = tree.as_text(child) {
                        let text_style = self.style_of(child, &style);
                        flow.push_text(child, text, &text_style, &inner);
                        continue;
                    }
                    let Some(child_element) = tree.as_element(child) else {
                        continue;
                    };
                    let child_style = self.style_of(child, &style);
                    match self.classify(child_element, &child_style) {
                        FlowRole::Hidden => {}
                        FlowRole::Unsupported => self.report_unsupported(child_element),
                        child_role => self.push_inline(
                            flow,
                            child,
                            child_element,
                            child_style,
                            child_role,
                            containing_block_width,
                            &inner,
                        ),
                    }
                }
            }
        }
    }

    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    fn build_image(
        &mut self,
        node: NodeId,
        element: &ElementData,
        style: Arc<ComputedStyle>,
        role: FlowRole,
        containing_block_width: f32,
    ) -> LayoutBox {
        let declared = declared_intrinsic_size(element);
        let target = target_size(&style, declared, containing_block_width, self.config);
        let intrinsic = declared.unwrap_or_else(|| {
            ImageSize::new(self.config.default_image_width, self.config.default_image_height)
        });

        let (source, raster) = if role == FlowRole::Vector {
            let markup = serialize_subtree(self.tree, node);
            let raster = rasterize_vector(self.rasterizer, &markup, target, &mut self.diagnostics);
            (None, raster)
        } else {
            (element.attr("src").map(str::to_string), None)
        };
        let placeholder = if role == FlowRole::Vector {
            raster.is_none()
        } else {
            source.as_deref().is_none_or(|src| src.trim().is_empty())
        };

        let mut dimensions = BoxModel::with_content_width(target.width);
        dimensions.content_height = Some(target.height);
        let image = ImageBox {
            source,
            alt: element.attr("alt").map(str::to_string),
            intrinsic,
            target,
            placeholder,
            raster,
        };
        LayoutBox::new(BoxKind::Image(image), style, dimensions).with_source(node, &element.tag_name)
    }

    // ------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------

    /// [§ 17.2 The CSS table model](https://www.w3.org/TR/CSS2/tables.html#table-display)
    ///
    /// Rows are reordered so that `thead` rows come first and `tfoot` rows
    /// last; the first `caption` is carried on the table box.
    fn build_table(
        &mut self,
        node: NodeId,
        element: &ElementData,
        style: Arc<ComputedStyle>,
        containing_block_width: f32,
        parent_context: &InlineContext,
    ) -> Placed {
        let dimensions = compute_box(&style, containing_block_width);
        let width = dimensions.content_width;
        let context = parent_context.enter(&style, None);

        // STEP 1: Collect structure.
        let source = self.collect_table(node, &style);
        let caption = source.caption;
        let rows: Vec<RowSource<'a>> = source
            .head
            .into_iter()
            .chain(source.body)
            .chain(source.foot)
            .collect();

        // STEP 2: Resolve column widths.
        let shape = TableShape {
            rows: rows
                .iter()
                .map(|row| row.cells.iter().map(|cell| cell.spec).collect())
                .collect(),
            columns: source.columns,
        };
        let geometry = resolve_table(&shape, width, self.config.min_column_width, &mut self.diagnostics);

        // STEP 3: Lay out each cell in its resolved width.
        let mut placements = geometry.cells.iter().copied();
        let mut row_boxes = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            let min_height = row_height(&row);
            let mut cells = Vec::with_capacity(row.cells.len());
            for cell in row.cells {
                let Some(placement) = placements.next() else {
                    break;
                };
                cells.push(self.build_cell(cell, placement, row.header, &context));
            }
            for slot in geometry.placeholders.iter().filter(|slot| slot.row == index) {
                let placement = CellPlacement {
                    row: index,
                    column: slot.column,
                    colspan: 1,
                    rowspan: 1,
                    width: geometry.column_widths.get(slot.column).copied().unwrap_or(0.0),
                };
                cells.push(LayoutBox::new(
                    BoxKind::TableCell {
                        placement,
                        placeholder: true,
                        header: row.header,
                    },
                    Arc::new(ComputedStyle::inherit_from(&row.style)),
                    BoxModel::with_content_width(placement.width),
                ));
            }
            cells.sort_by_key(cell_column);

            let mut row_box = LayoutBox::new(
                BoxKind::TableRow {
                    header: row.header,
                    index,
                },
                row.style,
                BoxModel {
                    content_height: min_height,
                    ..BoxModel::with_content_width(geometry.total_width())
                },
            );
            if let Some(row_node) = row.node {
                row_box = row_box.with_source(row_node, "tr");
            }
            row_box.children = cells;
            row_boxes.push(row_box);
        }

        // STEP 4: The caption spans the table's content width.
        let caption = caption.map(|(caption_node, caption_element, caption_style)| {
            let placed = self.build_container(
                caption_node,
                caption_element,
                caption_style,
                BoxKind::Block { anonymous: false },
                width,
                &context,
                Containment::Closed,
            );
            Box::new(placed.layout)
        });

        let margins = BlockMargins::new(dimensions.margin.top, dimensions.margin.bottom);
        let table = TableBox { geometry, caption };
        let mut layout = LayoutBox::new(BoxKind::Table(table), style, dimensions)
            .with_source(node, &element.tag_name);
        layout.children = row_boxes;
        Placed { layout, margins }
    }

    fn build_cell(
        &mut self,
        cell: CellSource<'a>,
        placement: CellPlacement,
        header_row: bool,
        context: &InlineContext,
    ) -> LayoutBox {
        // [§ 17.5](https://www.w3.org/TR/CSS2/tables.html#table-layout)
        // "Cells have padding but no margins." The border box fills the
        // spanned columns.
        let mut dimensions = compute_box(&cell.style, placement.width);
        dimensions.margin = EdgeSizes::default();
        dimensions.content_width = (placement.width
            - dimensions.padding.horizontal()
            - dimensions.border.horizontal())
        .max(0.0);

        let inner = context.enter(&cell.style, None);
        let contents = self.lay_out_children(
            cell.node,
            cell.element,
            &cell.style,
            dimensions.content_width,
            &inner,
            ContainerEdges::CLOSED,
        );
        let header = header_row || cell.element.tag_name == "th";
        let mut layout = LayoutBox::new(
            BoxKind::TableCell {
                placement,
                placeholder: false,
                header,
            },
            cell.style,
            dimensions,
        )
        .with_source(cell.node, &cell.element.tag_name);
        layout.children = contents.children;
        layout
    }

    /// Walk the table's children into row groups, columns and a caption.
    fn collect_table(&mut self, node: NodeId, style: &Arc<ComputedStyle>) -> TableSource<'a> {
        let tree = self.tree;
        let mut source = TableSource::default();
        let mut loose_cells = Vec::new();

        for &child in tree.children(node) {
            if let Some(text) = tree.as_text(child) {
                self.check_table_text(text, "table");
                continue;
            }
            let Some(element) = tree.as_element(child) else {
                continue;
            };
            let child_style = self.style_of(child, style);
            let role = self.classify(element, &child_style);
            if role != FlowRole::TableCell {
                self.flush_loose_cells(&mut loose_cells, style, &mut source.body);
            }
            match role {
                FlowRole::TableCaption if source.caption.is_none() => {
                    source.caption = Some((child, element, child_style));
                }
                FlowRole::TableCaption => self.report(
                    DiagnosticKind::LayoutInconsistency,
                    "only the first <caption> of a table is kept".to_string(),
                ),
                FlowRole::TableColumnGroup => {
                    self.collect_column_group(child, element, &child_style, &mut source.columns);
                }
                FlowRole::TableColumn => {
                    let width = column_width(&child_style);
                    source
                        .columns
                        .extend(std::iter::repeat_n(width, element.span()));
                }
                FlowRole::TableRowGroup => {
                    let header = element.tag_name == "thead";
                    let rows = self.collect_row_group(child, &child_style, header);
                    match element.tag_name.as_str() {
                        "thead" => source.head.extend(rows),
                        "tfoot" => source.foot.extend(rows),
                        _ => source.body.extend(rows),
                    }
                }
                FlowRole::TableRow => {
                    let row = self.collect_row(child, child_style, false);
                    source.body.push(row);
                }
                FlowRole::TableCell => loose_cells.push(cell_source(child, element, child_style)),
                FlowRole::Hidden => {}
                _ => self.report(
                    DiagnosticKind::LayoutInconsistency,
                    format!("<{}> directly inside <table> dropped", element.tag_name),
                ),
            }
        }
        self.flush_loose_cells(&mut loose_cells, style, &mut source.body);
        source
    }

    fn collect_row_group(
        &mut self,
        node: NodeId,
        style: &Arc<ComputedStyle>,
        header: bool,
    ) -> Vec<RowSource<'a>> {
        let tree = self.tree;
        let mut rows = Vec::new();
        let mut loose_cells = Vec::new();
        for &child in tree.children(node) {
            if let Some(text) = tree.as_text(child) {
                self.check_table_text(text, "row group");
                continue;
            }
            let Some(element) = tree.as_element(child) else {
                continue;
            };
            let child_style = self.style_of(child, style);
            match self.classify(element, &child_style) {
                FlowRole::TableRow => {
                    self.flush_loose_cells(&mut loose_cells, style, &mut rows);
                    rows.push(self.collect_row(child, child_style, header));
                }
                FlowRole::TableCell => loose_cells.push(cell_source(child, element, child_style)),
                FlowRole::Hidden => {}
                _ => self.report(
                    DiagnosticKind::LayoutInconsistency,
                    format!("<{}> directly inside a row group dropped", element.tag_name),
                ),
            }
        }
        self.flush_loose_cells(&mut loose_cells, style, &mut rows);
        for row in &mut rows {
            row.header = header;
        }
        rows
    }

    fn collect_row(&mut self, node: NodeId, style: Arc<ComputedStyle>, header: bool) -> RowSource<'a> {
        let tree = self.tree;
        let mut cells = Vec::new();
        for &child in tree.children(node) {
            if let Some(text) = tree.as_text(child) {
                self.check_table_text(text, "tr");
                continue;
            }
            let Some(element) = tree.as_element(child) else {
                continue;
            };
            let child_style = self.style_of(child, &style);
            match self.classify(element, &child_style) {
                FlowRole::TableCell => cells.push(cell_source(child, element, child_style)),
                FlowRole::Hidden => {}
                _ => self.report(
                    DiagnosticKind::LayoutInconsistency,
                    format!("<{}> directly inside <tr> dropped", element.tag_name),
                ),
            }
        }
        RowSource {
            node: Some(node),
            style,
            header,
            cells,
        }
    }

    /// [§ 4.9.3 The colgroup element](https://html.spec.whatwg.org/multipage/tables.html#the-colgroup-element)
    ///
    /// "If the colgroup element contains no col elements, then the element
    /// may have a span content attribute specified."
    fn collect_column_group(
        &mut self,
        node: NodeId,
        element: &ElementData,
        style: &Arc<ComputedStyle>,
        columns: &mut Vec<Option<ColumnWidth>>,
    ) {
        let tree = self.tree;
        let group_width = column_width(style);
        let cols: Vec<NodeId> = tree.children_with_tag(node, "col").collect();
        if cols.is_empty() {
            columns.extend(std::iter::repeat_n(group_width, element.span()));
            return;
        }
        for col in cols {
            let Some(col_element) = tree.as_element(col) else {
                continue;
            };
            let col_style = self.style_of(col, style);
            let width = column_width(&col_style).or(group_width);
            columns.extend(std::iter::repeat_n(width, col_element.span()));
        }
    }

    /// Cells outside any row are gathered into an anonymous row.
    fn flush_loose_cells(
        &mut self,
        cells: &mut Vec<CellSource<'a>>,
        parent_style: &ComputedStyle,
        rows: &mut Vec<RowSource<'a>>,
    ) {
        if cells.is_empty() {
            return;
        }
        self.report(
            DiagnosticKind::LayoutInconsistency,
            "table cells outside a row wrapped in an anonymous row".to_string(),
        );
        rows.push(RowSource {
            node: None,
            style: Arc::new(ComputedStyle::inherit_from(parent_style)),
            header: false,
            cells: std::mem::take(cells),
        });
    }

    fn check_table_text(&mut self, text: &str, parent: &str) {
        if !text.trim().is_empty() {
            self.report(
                DiagnosticKind::LayoutInconsistency,
                format!("text directly inside {parent} dropped"),
            );
        }
    }
}

/// Wrap inline groups in anonymous blocks when block-level siblings exist,
/// then collapse the block-level children's margins.
fn place_segments(
    segments: Vec<Segment>,
    style: &ComputedStyle,
    width: f32,
    edges: ContainerEdges,
    gap: Option<f32>,
) -> Contents {
    // [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    // "if a block container box has a block-level box inside it, then we
    // force it to have only block-level boxes inside it."
    if !segments.iter().any(|s| matches!(s, Segment::Block(_))) {
        let children: Vec<LayoutBox> = segments
            .into_iter()
            .flat_map(|segment| match segment {
                Segment::Inline(items) => items,
                Segment::Block(_) => Vec::new(),
            })
            .collect();
        return Contents {
            through: children.is_empty(),
            children,
            escaped_top: None,
            escaped_bottom: None,
        };
    }

    let placed: Vec<Placed> = segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Inline(items) => Placed {
                layout: LayoutBox::anonymous_block(style, width, items),
                margins: BlockMargins::new(0.0, 0.0),
            },
            Segment::Block(placed) => placed,
        })
        .collect();
    let margins: Vec<BlockMargins> = placed.iter().map(|p| p.margins).collect();
    let collapsed = collapse_children(&margins, edges, gap);

    Contents {
        through: gap.is_none() && margins.iter().all(|m| m.through),
        children: placed
            .into_iter()
            .zip(collapsed.spacing)
            .map(|(p, spacing)| p.layout.with_spacing(spacing))
            .collect(),
        escaped_top: collapsed.escaped_top,
        escaped_bottom: collapsed.escaped_bottom,
    }
}

/// The gap between a container's children: the pre-parsed value when the
/// input carries one, else a declared `row-gap` on a flex or grid container.
fn explicit_gap(element: &ElementData, style: &ComputedStyle) -> Option<f32> {
    element.explicit_gap.or_else(|| {
        let gap_container = matches!(
            style.display,
            Display::Flow(value) if matches!(value.inner, InnerDisplayType::Flex | InnerDisplayType::Grid)
        );
        if gap_container {
            style.row_gap.and_then(ComputedLength::as_px)
        } else {
            None
        }
    })
}

/// `href` of an `a` element.
fn link_target(element: &ElementData) -> Option<&str> {
    element.attr("href").filter(|_| element.tag_name == "a")
}

/// [§ 4.4.5 The ol element](https://html.spec.whatwg.org/multipage/grouping-content.html#the-ol-element)
///
/// "The start attribute, if present, must be a valid integer giving the
/// ordinal value of the first list item."
fn list_start(element: Option<&ElementData>) -> i64 {
    element
        .filter(|e| e.tag_name == "ol")
        .and_then(|e| e.attr("start"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(1)
}

fn column_width(style: &ComputedStyle) -> Option<ColumnWidth> {
    match style.width {
        AutoLength::Length(ComputedLength::Px(px)) => Some(ColumnWidth::Px(px)),
        AutoLength::Length(ComputedLength::Percent(pct)) => Some(ColumnWidth::Percent(pct)),
        AutoLength::Auto => None,
    }
}

/// [§ 17.5.3 Table height algorithms](https://www.w3.org/TR/CSS2/tables.html#height-layout)
///
/// "The height of a 'table-row' element's box is calculated once the user
/// agent has all the cells in the row available: it is the maximum of the
/// row's computed 'height', the computed 'height' of each cell in the row,
/// and the minimum height (MIN) required by the cells."
///
/// The row's own px height wins; otherwise the first cell that declares one.
fn row_height(row: &RowSource<'_>) -> Option<f32> {
    let px = |style: &ComputedStyle| match style.height {
        AutoLength::Length(ComputedLength::Px(px)) if px > 0.0 => Some(px),
        _ => None,
    };
    px(&row.style).or_else(|| row.cells.iter().find_map(|cell| px(&cell.style)))
}

fn cell_source(node: NodeId, element: &ElementData, style: Arc<ComputedStyle>) -> CellSource<'_> {
    let spec = CellSpec {
        colspan: element.colspan(),
        rowspan: element.rowspan(),
        width: column_width(&style),
    };
    CellSource {
        node,
        element,
        style,
        spec,
    }
}

fn cell_column(cell: &LayoutBox) -> usize {
    match &cell.kind {
        BoxKind::TableCell { placement, .. } => placement.column,
        _ => usize::MAX,
    }
}
