//! Style resolution and layout for the docflow document converter.
//!
//! # Scope
//!
//! This crate turns a [`StyledTree`](docflow_dom::StyledTree) into a tree of
//! [`LayoutBox`]es that a document emitter walks to produce paragraphs, runs,
//! tables and images. It implements:
//!
//! - **Computed Style Resolver** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Cascade ordering by importance, origin, specificity and source order
//!   - Inheritance, `inherit`/`initial`/`unset`
//!   - UA defaults and HTML presentational hints
//!   - Shorthand expansion (margin, padding, border, font, gap, list-style)
//!
//! - **Box Model Calculator** ([CSS 2.1 § 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth))
//!
//! - **Margin Collapse Engine** ([CSS 2.1 § 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins))
//!
//! - **Flow Classifier** ([CSS Display Level 3](https://www.w3.org/TR/css-display-3/))
//!
//! - **Table Geometry Resolver** ([CSS 2.1 § 17](https://www.w3.org/TR/CSS2/tables.html))
//!
//! - **Layout Tree Builder**
//!
//! # Not Implemented
//!
//! - Selector matching and stylesheet parsing (declarations arrive matched)
//! - Line breaking, text shaping and vertical positions (the emitter's job)
//! - Floats, positioning and the flex/grid algorithms

/// CSS cascade and style computation per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// Run configuration.
pub mod config;
/// Box geometry, margin collapsing, tables and the layout tree.
pub mod layout;
/// Computed style representation per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod style;
/// User-agent stylesheet per [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html).
pub mod ua_stylesheet;

// Re-exports for convenience
pub use cascade::{compute_styles, resolve};
pub use config::{ConfigError, LayoutConfig};
pub use layout::{
    BoxKind, BoxModel, FlowRole, LayoutBox, LayoutOutput, RasterError, RasterImage, Rasterizer,
    TableGeometry, build, classify, collapse_siblings, compute_box, resolve_table,
};
pub use style::{ComputedStyle, StyleParseError};
