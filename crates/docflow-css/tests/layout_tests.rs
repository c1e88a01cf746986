//! End-to-end tests: styled tree in, layout tree out.

use std::sync::Mutex;
use std::time::Duration;

use docflow_common::DiagnosticKind;
use docflow_css::layout::{ImageSize, ListMarker};
use docflow_css::style::values::{ListStyleType, PageBreak};
use docflow_css::{
    BoxKind, LayoutBox, LayoutConfig, LayoutOutput, RasterError, RasterImage, Rasterizer, build,
};
use docflow_dom::StyledTree;

fn layout(json: &str) -> LayoutOutput {
    let _ = env_logger::builder().is_test(true).try_init();
    let tree = StyledTree::from_json(json).expect("valid document");
    build(&tree, &LayoutConfig::default(), None)
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn runs(layout_box: &LayoutBox) -> Vec<String> {
    layout_box
        .descendants()
        .filter_map(LayoutBox::as_text_run)
        .filter(|run| !run.line_break)
        .map(|run| run.text.clone())
        .collect()
}

// ========== margin collapsing ==========

#[test]
fn test_sibling_margins_collapse_to_the_larger() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "div", "attrs": { "style": "margin-bottom: 16px" }, "children": [ { "text": "a" } ] },
            { "tag": "div", "attrs": { "style": "margin-top: 24px" }, "children": [ { "text": "b" } ] }
        ] }"#,
    );
    let children = &output.root.children;
    assert!(approx(children[1].spacing.before, 24.0));
    assert!(approx(children[0].spacing.after, 0.0));
}

#[test]
fn test_empty_box_margin_collapses_with_following_sibling() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "div", "attrs": { "style": "margin-bottom: 20px" } },
            { "tag": "div", "attrs": { "style": "margin-top: 10px" }, "children": [ { "text": "X" } ] }
        ] }"#,
    );
    let children = &output.root.children;
    assert_eq!(children.len(), 2);
    let applied: f32 = children.iter().map(|c| c.spacing.before + c.spacing.after).sum();
    assert!(approx(applied, 20.0));
    assert!(approx(children[1].spacing.before, 20.0));

    let second = &children[1];
    assert_eq!(second.children.len(), 1);
    assert_eq!(second.children[0].as_text_run().map(|r| r.text.as_str()), Some("X"));
}

#[test]
fn test_explicit_gap_overrides_collapsing() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "div", "gap": 20, "children": [
                { "tag": "p", "attrs": { "style": "margin: 0 0 10px 0" }, "children": [ { "text": "a" } ] },
                { "tag": "p", "attrs": { "style": "margin: 30px 0 0 0" }, "children": [ { "text": "b" } ] }
            ] }
        ] }"#,
    );
    let container = &output.root.children[0];
    assert!(approx(container.children[1].spacing.before, 20.0));
}

#[test]
fn test_declared_gap_applies_to_flex_containers_only() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "div", "attrs": { "style": "display: flex; row-gap: 8px" }, "children": [
                { "tag": "div", "children": [ { "text": "a" } ] },
                { "tag": "div", "children": [ { "text": "b" } ] }
            ] },
            { "tag": "div", "attrs": { "style": "row-gap: 8px" }, "children": [
                { "tag": "div", "children": [ { "text": "a" } ] },
                { "tag": "div", "children": [ { "text": "b" } ] }
            ] }
        ] }"#,
    );
    let flex = &output.root.children[0];
    let plain = &output.root.children[1];
    assert!(approx(flex.children[1].spacing.before, 8.0));
    assert!(approx(plain.children[1].spacing.before, 0.0));
}

#[test]
fn test_ua_paragraph_margins_collapse() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "p", "children": [ { "text": "one" } ] },
            { "tag": "p", "children": [ { "text": "two" } ] }
        ] }"#,
    );
    // 1em each side at the default 16px font.
    assert!(approx(output.root.children[1].spacing.before, 16.0));
    assert!(approx(output.root.children[0].spacing.before, 16.0));
    assert!(approx(output.root.children[1].spacing.after, 16.0));
}

// ========== box model ==========

#[test]
fn test_percentages_resolve_against_containing_block() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "div", "attrs": { "style": "width: 400px; padding: 0 10px" }, "children": [
                { "tag": "div", "attrs": { "style": "width: 50%" }, "children": [ { "text": "x" } ] }
            ] }
        ] }"#,
    );
    let outer = &output.root.children[0];
    assert!(approx(outer.dimensions.content_width, 400.0));
    assert!(approx(outer.children[0].dimensions.content_width, 200.0));
}

#[test]
fn test_root_uses_configured_page_width() {
    let tree = StyledTree::from_json(r#"{ "tag": "body" }"#).expect("valid document");
    let config = LayoutConfig::default().with_page_width(500.0);
    let output = build(&tree, &config, None);
    assert!(approx(output.root.dimensions.content_width, 500.0));
}

// ========== inline content ==========

#[test]
fn test_whitespace_collapses_and_inline_styles_split_runs() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "p", "children": [
                { "text": "\n   Hello   " },
                { "tag": "b", "children": [ { "text": " bold " } ] },
                { "text": "  world\n" }
            ] }
        ] }"#,
    );
    let p = &output.root.children[0];
    assert_eq!(runs(p), vec!["Hello ", "bold ", "world"]);
    assert!(p.children[1].style.is_bold());
    assert!(!p.children[0].style.is_bold());
}

#[test]
fn test_links_carry_target_and_underline() {
    let output = layout(
        r##"{ "tag": "body", "children": [
            { "tag": "p", "children": [
                { "tag": "a", "attrs": { "href": "https://example.org" }, "children": [
                    { "tag": "em", "children": [ { "text": "here" } ] }
                ] }
            ] }
        ] }"##,
    );
    let run = output.root.children[0].children[0]
        .as_text_run()
        .cloned()
        .expect("run");
    assert_eq!(run.link.as_deref(), Some("https://example.org"));
    assert!(run.decoration.underline);
    assert!(output.root.children[0].children[0].style.is_italic());
}

#[test]
fn test_text_transform_and_line_breaks() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "p", "attrs": { "style": "text-transform: uppercase" }, "children": [
                { "text": "first " }, { "tag": "br" }, { "text": " second" }
            ] }
        ] }"#,
    );
    let p = &output.root.children[0];
    assert_eq!(p.text_content(), "FIRST\nSECOND");
}

#[test]
fn test_pre_preserves_whitespace() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "pre", "children": [ { "text": "a  b\n  c" } ] }
        ] }"#,
    );
    assert_eq!(output.root.children[0].text_content(), "a  b\n  c");
}

// ========== lists ==========

fn markers(list: &LayoutBox) -> Vec<ListMarker> {
    list.children
        .iter()
        .filter_map(|child| match child.kind {
            BoxKind::List(marker) => Some(marker),
            _ => None,
        })
        .collect()
}

#[test]
fn test_ordered_list_ordinals_honour_start_and_value() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "ol", "attrs": { "start": "3" }, "children": [
                { "tag": "li", "children": [ { "text": "a" } ] },
                { "tag": "li", "attrs": { "value": "10" }, "children": [ { "text": "b" } ] },
                { "tag": "li", "children": [ { "text": "c" } ] }
            ] }
        ] }"#,
    );
    let ordinals: Vec<i64> = markers(&output.root.children[0])
        .iter()
        .map(|m| m.ordinal)
        .collect();
    assert_eq!(ordinals, vec![3, 10, 11]);
    assert!(markers(&output.root.children[0])
        .iter()
        .all(|m| m.style_type == ListStyleType::Decimal));
}

#[test]
fn test_nested_list_level() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "ul", "children": [
                { "tag": "li", "children": [
                    { "text": "outer" },
                    { "tag": "ul", "children": [ { "tag": "li", "children": [ { "text": "inner" } ] } ] }
                ] }
            ] }
        ] }"#,
    );
    let outer_list = &output.root.children[0];
    let outer_item = markers(outer_list)[0];
    assert_eq!(outer_item.level, 0);
    assert_eq!(outer_item.style_type, ListStyleType::Disc);

    let inner_list = outer_list.children[0]
        .children
        .iter()
        .find(|c| c.tag_name.as_deref() == Some("ul"))
        .expect("nested list");
    assert_eq!(markers(inner_list)[0].level, 1);
}

// ========== page breaks ==========

#[test]
fn test_page_break_markers_are_forwarded() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "h1", "attrs": { "style": "page-break-before: always" }, "children": [ { "text": "Title" } ] },
            { "tag": "p", "attrs": { "style": "break-after: avoid" }, "children": [ { "text": "Body" } ] }
        ] }"#,
    );
    assert_eq!(output.root.children[0].breaks.before, PageBreak::Always);
    assert_eq!(output.root.children[1].breaks.after, PageBreak::Avoid);
    assert!(output.root.children[1].children[0].breaks.is_auto());
}

// ========== diagnostics ==========

#[test]
fn test_unsupported_content_is_skipped_with_diagnostic() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "video", "children": [ { "text": "fallback" } ] },
            { "tag": "p", "children": [ { "text": "kept" } ] }
        ] }"#,
    );
    assert_eq!(output.root.text_content(), "kept");
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::UnsupportedNodeKind));
}

#[test]
fn test_bad_declarations_do_not_abort() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "p", "attrs": { "style": "margin-top: wide; color: nope" }, "children": [ { "text": "still here" } ] },
            { "tag": "p", "attrs": { "style": "margin-top: wide" }, "children": [ { "text": "and here" } ] }
        ] }"#,
    );
    assert_eq!(runs(&output.root), vec!["still here", "and here"]);
    let style_errors = output
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::StyleParse)
        .count();
    assert_eq!(style_errors, 2);
}

#[test]
fn test_stray_table_cell_is_kept_as_block() {
    let output = layout(
        r#"{ "tag": "body", "children": [ { "tag": "td", "children": [ { "text": "loose" } ] } ] }"#,
    );
    assert!(output.root.children[0].is_block_level());
    assert_eq!(output.root.text_content(), "loose");
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::LayoutInconsistency));
}

// ========== images ==========

struct FixedRasterizer {
    calls: Mutex<Vec<String>>,
}

impl Rasterizer for FixedRasterizer {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize(&self, markup: &str, size_hint: ImageSize) -> Result<RasterImage, RasterError> {
        self.calls
            .lock()
            .map_err(|_| RasterError::Unavailable("poisoned".to_string()))?
            .push(markup.to_string());
        Ok(RasterImage {
            width: size_hint.width as u32,
            height: size_hint.height as u32,
            media_type: "image/png".to_string(),
            data: vec![0x89, b'P', b'N', b'G'],
        })
    }
}

struct TimingOut;

impl Rasterizer for TimingOut {
    fn rasterize(&self, _: &str, _: ImageSize) -> Result<RasterImage, RasterError> {
        Err(RasterError::Timeout(Duration::from_millis(1500)))
    }
}

const SVG_DOC: &str = r#"{ "tag": "body", "children": [
    { "tag": "p", "children": [
        { "tag": "svg", "attrs": { "width": "40", "height": "20" }, "children": [
            { "tag": "rect", "attrs": { "width": "40", "height": "20" } }
        ] }
    ] }
] }"#;

fn image_box(output: &LayoutOutput) -> docflow_css::layout::ImageBox {
    output
        .root
        .descendants()
        .find_map(|b| match &b.kind {
            BoxKind::Image(image) => Some(image.clone()),
            _ => None,
        })
        .expect("image box")
}

#[test]
fn test_vector_content_is_rasterized() {
    let tree = StyledTree::from_json(SVG_DOC).expect("valid document");
    let rasterizer = FixedRasterizer {
        calls: Mutex::new(Vec::new()),
    };
    let output = build(&tree, &LayoutConfig::default(), Some(&rasterizer));
    let image = image_box(&output);
    assert!(!image.placeholder);
    assert_eq!(image.raster.as_ref().map(|r| (r.width, r.height)), Some((40, 20)));

    let calls = rasterizer.calls.lock().expect("lock");
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("<svg"));
    assert!(calls[0].contains("<rect"));
}

#[test]
fn test_failed_rasterization_leaves_placeholder() {
    let tree = StyledTree::from_json(SVG_DOC).expect("valid document");
    let output = build(&tree, &LayoutConfig::default(), Some(&TimingOut));
    let image = image_box(&output);
    assert!(image.placeholder);
    assert_eq!(image.intrinsic, ImageSize::new(40.0, 20.0));
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::ExternalServiceFailure));
}

#[test]
fn test_wide_image_is_scaled_to_fit() {
    let output = layout(
        r#"{ "tag": "body", "children": [
            { "tag": "div", "attrs": { "style": "width: 300px" }, "children": [
                { "tag": "img", "attrs": { "src": "chart.png", "width": "600", "height": "400" } }
            ] }
        ] }"#,
    );
    let image = image_box(&output);
    assert_eq!(image.source.as_deref(), Some("chart.png"));
    assert!(approx(image.target.width, 300.0));
    assert!(approx(image.target.height, 200.0));
}

// ========== determinism ==========

#[test]
fn test_layout_is_idempotent() {
    let json = r#"{ "tag": "body", "children": [
        { "tag": "h2", "children": [ { "text": "Heading" } ] },
        { "tag": "table", "children": [ { "tag": "tr", "children": [
            { "tag": "td", "children": [ { "text": "a" } ] },
            { "tag": "td", "children": [ { "tag": "p", "children": [ { "text": "b" } ] } ] }
        ] } ] },
        { "tag": "ul", "children": [ { "tag": "li", "children": [ { "text": "item" } ] } ] }
    ] }"#;
    let tree = StyledTree::from_json(json).expect("valid document");
    let config = LayoutConfig::default();
    let first = build(&tree, &config, None);
    let second = build(&tree, &config, None);
    assert_eq!(first, second);
}
