//! Layout core: from computed styles to the layout tree.
//!
//! # Relevant Specifications
//!
//! - [CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html)
//! - [CSS 2.1 Visual Formatting Model Details](https://www.w3.org/TR/CSS2/visudet.html)
//! - [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//! - [CSS 2.1 Tables](https://www.w3.org/TR/CSS2/tables.html)
//! - [CSS Text Module Level 3](https://www.w3.org/TR/css-text-3/)
//!
//! # Module Structure
//!
//! - [`box_model`] - Content width and edge sizes against a containing block
//! - [`margin`] - Vertical margin collapsing into applied spacing
//! - [`flow`] - Flow role classification
//! - [`table`] - Table column widths and cell placement
//! - [`image`] - Replaced content sizing and the rasterizer seam
//! - [`inline`] - White-space processing and text runs
//! - [`layout_box`] - Layout box types
//! - [`builder`] - The recursive layout tree builder

pub mod box_model;
pub mod builder;
pub mod flow;
pub mod image;
pub mod inline;
pub mod layout_box;
pub mod margin;
pub mod table;

// Re-exports for convenience
pub use box_model::{BoxModel, EdgeSizes, compute_box};
pub use builder::{LayoutOutput, build};
pub use flow::{Classification, FlowRole, classify, classify_detailed};
pub use image::{ImageBox, ImageSize, RasterError, RasterImage, Rasterizer};
pub use inline::{InlineContext, InlineFlow};
pub use layout_box::{BoxKind, LayoutBox, ListMarker, PageBreaks, TableBox, TextRun};
pub use margin::{
    BlockMargins, CollapsedChildren, ContainerEdges, Spacing, collapse_children, collapse_margins,
    collapse_siblings, collapse_two_margins,
};
pub use table::{
    CellPlacement, CellSpec, ColumnWidth, SlotRef, TableGeometry, TableShape, WidthSource,
    resolve_table,
};
