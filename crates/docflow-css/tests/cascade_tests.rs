//! Computed style resolution over whole documents.

use std::collections::HashMap;

use docflow_common::{DiagnosticKind, Diagnostics};
use docflow_css::style::values::TextAlign;
use docflow_css::style::{AutoLength, ColorValue, ComputedLength};
use docflow_css::{ComputedStyle, LayoutConfig, compute_styles};
use docflow_dom::{NodeId, StyledTree};

fn styles_of(json: &str) -> (StyledTree, HashMap<NodeId, ComputedStyle>, Diagnostics) {
    let tree = StyledTree::from_json(json).expect("valid document");
    let mut diagnostics = Diagnostics::new();
    let styles = compute_styles(&tree, &LayoutConfig::default(), &mut diagnostics);
    (tree, styles, diagnostics)
}

/// The first element with `tag`, in document order.
fn find(tree: &StyledTree, tag: &str) -> NodeId {
    (0..tree.len())
        .map(NodeId)
        .find(|&id| tree.tag_name(id) == Some(tag))
        .expect("element present")
}

fn px(value: f32) -> AutoLength {
    AutoLength::Length(ComputedLength::Px(value))
}

// ========== inheritance ==========

#[test]
fn test_inherited_properties_flow_to_descendants() {
    let (tree, styles, _) = styles_of(
        r#"{ "tag": "body", "children": [
            { "tag": "div", "attrs": { "style": "color: #336699; font-size: 20px; margin-top: 12px; text-align: center" },
              "children": [ { "tag": "span", "children": [ { "text": "x" } ] } ] }
        ] }"#,
    );
    let span = &styles[&find(&tree, "span")];
    assert_eq!(span.color, ColorValue::rgb(0x33, 0x66, 0x99));
    assert!((span.font_size - 20.0).abs() < f32::EPSILON);
    assert_eq!(span.text_align, TextAlign::Center);
    // Margins are not inherited.
    assert_eq!(span.margin.top, px(0.0));
}

#[test]
fn test_text_nodes_take_parent_style() {
    let (tree, styles, _) = styles_of(
        r#"{ "tag": "body", "children": [ { "tag": "b", "children": [ { "text": "bold" } ] } ] }"#,
    );
    let b = find(&tree, "b");
    let text = tree.children(b)[0];
    assert!(styles[&text].is_bold());
    assert_eq!(styles[&text].font_weight, styles[&b].font_weight);
}

#[test]
fn test_em_lengths_use_own_font_size() {
    let (tree, styles, _) = styles_of(
        r#"{ "tag": "body", "children": [
            { "tag": "h1", "attrs": { "style": "margin-bottom: 1em" } }
        ] }"#,
    );
    let h1 = &styles[&find(&tree, "h1")];
    assert!((h1.font_size - 32.0).abs() < 1e-3);
    assert_eq!(h1.margin.bottom, px(32.0));
    // UA `margin-block-start: 0.67em` against the heading's own size.
    let AutoLength::Length(ComputedLength::Px(top)) = h1.margin.top else {
        panic!("expected px margin, got {:?}", h1.margin.top);
    };
    assert!((top - 21.44).abs() < 1e-2);
}

#[test]
fn test_resized_heading_margins_use_the_winning_font_size() {
    let (tree, styles, _) = styles_of(
        r#"{ "tag": "body", "children": [
            { "tag": "h1", "attrs": { "style": "font-size: 12px" } }
        ] }"#,
    );
    let h1 = &styles[&find(&tree, "h1")];
    assert!((h1.font_size - 12.0).abs() < 1e-3);
    // 0.67em of 12px, not of the UA's 2em.
    let AutoLength::Length(ComputedLength::Px(top)) = h1.margin.top else {
        panic!("expected px margin, got {:?}", h1.margin.top);
    };
    assert!((top - 8.04).abs() < 1e-3);
}

#[test]
fn test_font_shorthand_below_a_font_size_rule_keeps_the_rule_size() {
    let (tree, styles, _) = styles_of(
        r#"{ "tag": "body", "children": [
            { "tag": "h2", "style": [
                { "property": "font-size", "value": "10px", "specificity": [0, 1, 0], "order": 1 },
                { "property": "font", "value": "italic 40px serif", "specificity": [0, 0, 1], "order": 2 },
                { "property": "padding-top", "value": "2em", "specificity": [0, 0, 1], "order": 3 }
            ] }
        ] }"#,
    );
    let h2 = &styles[&find(&tree, "h2")];
    assert!((h2.font_size - 10.0).abs() < 1e-3);
    assert_eq!(h2.padding.top, ComputedLength::Px(20.0));
    assert_eq!(h2.font_family, "serif");
}

#[test]
fn test_explicit_inherit_for_non_inherited_property() {
    let (tree, styles, _) = styles_of(
        r#"{ "tag": "body", "children": [
            { "tag": "div", "attrs": { "style": "padding-left: 15px" }, "children": [
                { "tag": "div", "attrs": { "style": "padding-left: inherit" } }
            ] }
        ] }"#,
    );
    let inner = (0..tree.len())
        .map(NodeId)
        .filter(|&id| tree.tag_name(id) == Some("div"))
        .nth(1)
        .expect("inner div");
    assert_eq!(styles[&inner].padding.left, ComputedLength::Px(15.0));
}

// ========== cascade order ==========

#[test]
fn test_matched_rules_sort_by_specificity_then_inline() {
    let (tree, styles, _) = styles_of(
        r#"{ "tag": "body", "children": [
            { "tag": "p",
              "style": [
                { "property": "color", "value": "red", "specificity": [0, 1, 0] },
                { "property": "color", "value": "blue", "specificity": [0, 0, 1] },
                { "property": "font-weight", "value": "bold", "specificity": [0, 0, 1] }
              ],
              "attrs": { "style": "font-weight: normal" } }
        ] }"#,
    );
    let p = &styles[&find(&tree, "p")];
    assert_eq!(p.color, ColorValue::rgb(255, 0, 0));
    assert_eq!(p.font_weight, 400);
}

#[test]
fn test_important_author_rule_beats_inline() {
    let (tree, styles, _) = styles_of(
        r#"{ "tag": "body", "children": [
            { "tag": "p",
              "style": [ { "property": "text-align", "value": "right !important", "specificity": [0, 0, 1] } ],
              "attrs": { "style": "text-align: left" } }
        ] }"#,
    );
    assert_eq!(styles[&find(&tree, "p")].text_align, TextAlign::Right);
}

#[test]
fn test_presentational_hints_lose_to_author_rules() {
    let (tree, styles, _) = styles_of(
        r#"{ "tag": "body", "children": [
            { "tag": "table", "attrs": { "width": "300" }, "children": [] },
            { "tag": "img", "attrs": { "width": "300", "style": "width: 120px" } }
        ] }"#,
    );
    assert_eq!(styles[&find(&tree, "table")].width, px(300.0));
    assert_eq!(styles[&find(&tree, "img")].width, px(120.0));
}

// ========== errors ==========

#[test]
fn test_invalid_values_are_reported_and_skipped() {
    let (tree, styles, diagnostics) = styles_of(
        r#"{ "tag": "body", "children": [
            { "tag": "p",
              "style": [ { "property": "margin-top", "value": "8px", "specificity": [0, 0, 1] } ],
              "attrs": { "style": "margin-top: lots; unknown-thing: 3" } }
        ] }"#,
    );
    assert_eq!(styles[&find(&tree, "p")].margin.top, px(8.0));
    assert_eq!(diagnostics.count(DiagnosticKind::StyleParse), 1);
    assert_eq!(diagnostics.len(), 1);
}

// ========== determinism ==========

#[test]
fn test_compute_styles_is_idempotent() {
    let json = r#"{ "tag": "body", "attrs": { "style": "font: italic 18px Georgia" }, "children": [
        { "tag": "h2", "children": [ { "text": "t" } ] },
        { "tag": "ul", "children": [ { "tag": "li", "attrs": { "style": "color: green" } } ] }
    ] }"#;
    let (_, first, _) = styles_of(json);
    let (_, second, _) = styles_of(json);
    assert_eq!(first, second);
}
