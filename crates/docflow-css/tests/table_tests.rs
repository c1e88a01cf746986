//! Table layout through the full pipeline.

use docflow_common::DiagnosticKind;
use docflow_css::layout::WidthSource;
use docflow_css::{BoxKind, LayoutBox, LayoutConfig, LayoutOutput, build};
use docflow_dom::StyledTree;

fn layout_at(width: f32, json: &str) -> LayoutOutput {
    let tree = StyledTree::from_json(json).expect("valid document");
    build(&tree, &LayoutConfig::default().with_page_width(width), None)
}

fn first_table(output: &LayoutOutput) -> &LayoutBox {
    output
        .root
        .descendants()
        .find(|b| b.as_table().is_some())
        .expect("table box")
}

fn widths(table: &LayoutBox) -> Vec<f32> {
    table
        .as_table()
        .map(|t| t.geometry.column_widths.clone())
        .unwrap_or_default()
}

fn assert_widths(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-3, "{actual:?} vs {expected:?}");
    }
}

fn cell_texts(row: &LayoutBox) -> Vec<String> {
    row.children.iter().map(LayoutBox::text_content).collect()
}

// ========== column widths ==========

#[test]
fn test_column_percentages_resolve_against_table_width() {
    let output = layout_at(
        400.0,
        r#"{ "tag": "body", "children": [
            { "tag": "table", "children": [
                { "tag": "colgroup", "children": [
                    { "tag": "col", "attrs": { "style": "width: 40%" } },
                    { "tag": "col" }
                ] },
                { "tag": "tr", "children": [
                    { "tag": "td", "children": [ { "text": "a" } ] },
                    { "tag": "td", "children": [ { "text": "b" } ] }
                ] }
            ] }
        ] }"#,
    );
    let table = first_table(&output);
    assert_widths(&widths(table), &[160.0, 240.0]);
    assert_eq!(
        table.as_table().and_then(|t| t.geometry.width_source),
        Some(WidthSource::Mixed)
    );
}

#[test]
fn test_undeclared_columns_share_evenly() {
    let output = layout_at(
        300.0,
        r#"{ "tag": "body", "children": [
            { "tag": "table", "children": [ { "tag": "tbody", "children": [
                { "tag": "tr", "children": [
                    { "tag": "td", "attrs": { "colspan": "2" }, "children": [ { "text": "wide" } ] },
                    { "tag": "td", "children": [ { "text": "c" } ] }
                ] },
                { "tag": "tr", "children": [
                    { "tag": "td", "children": [ { "text": "1" } ] },
                    { "tag": "td", "children": [ { "text": "2" } ] },
                    { "tag": "td", "children": [ { "text": "3" } ] }
                ] }
            ] } ] }
        ] }"#,
    );
    let table = first_table(&output);
    assert_widths(&widths(table), &[100.0, 100.0, 100.0]);

    let spanning = &table.children[0].children[0];
    let BoxKind::TableCell { placement, .. } = spanning.kind else {
        panic!("expected a cell, got {}", spanning.label());
    };
    assert_eq!(placement.colspan, 2);
    assert!((placement.width - 200.0).abs() < 1e-3);
    // Cells have padding but no margins; the UA gives them 1px each side.
    assert!((spanning.dimensions.content_width - 198.0).abs() < 1e-3);
    assert!(spanning.dimensions.margin.left.abs() < f32::EPSILON);
}

#[test]
fn test_width_attribute_on_first_row_cells() {
    let output = layout_at(
        300.0,
        r#"{ "tag": "body", "children": [
            { "tag": "table", "children": [
                { "tag": "tr", "children": [
                    { "tag": "td", "attrs": { "width": "150" }, "children": [ { "text": "a" } ] },
                    { "tag": "td", "children": [ { "text": "b" } ] },
                    { "tag": "td", "children": [ { "text": "c" } ] }
                ] }
            ] }
        ] }"#,
    );
    assert_widths(&widths(first_table(&output)), &[150.0, 75.0, 75.0]);
}

// ========== structure ==========

#[test]
fn test_header_rows_first_and_footer_rows_last() {
    let output = layout_at(
        600.0,
        r#"{ "tag": "body", "children": [
            { "tag": "table", "children": [
                { "tag": "tfoot", "children": [ { "tag": "tr", "children": [ { "tag": "td", "children": [ { "text": "total" } ] } ] } ] },
                { "tag": "tbody", "children": [ { "tag": "tr", "children": [ { "tag": "td", "children": [ { "text": "row" } ] } ] } ] },
                { "tag": "thead", "children": [ { "tag": "tr", "children": [ { "tag": "th", "children": [ { "text": "name" } ] } ] } ] }
            ] }
        ] }"#,
    );
    let table = first_table(&output);
    let texts: Vec<String> = table.children.iter().map(LayoutBox::text_content).collect();
    assert_eq!(texts, vec!["name", "row", "total"]);

    let flags: Vec<(bool, usize)> = table
        .children
        .iter()
        .map(|row| match row.kind {
            BoxKind::TableRow { header, index } => (header, index),
            _ => (false, usize::MAX),
        })
        .collect();
    assert_eq!(flags, vec![(true, 0), (false, 1), (false, 2)]);

    let header_cell = &table.children[0].children[0];
    assert!(matches!(header_cell.kind, BoxKind::TableCell { header: true, .. }));
    assert!(header_cell.children[0].style.is_bold());
}

#[test]
fn test_only_first_caption_is_kept() {
    let output = layout_at(
        600.0,
        r#"{ "tag": "body", "children": [
            { "tag": "table", "children": [
                { "tag": "caption", "children": [ { "text": "Quarterly results" } ] },
                { "tag": "caption", "children": [ { "text": "ignored" } ] },
                { "tag": "tr", "children": [ { "tag": "td", "children": [ { "text": "x" } ] } ] }
            ] }
        ] }"#,
    );
    let table = first_table(&output);
    let caption = table
        .as_table()
        .and_then(|t| t.caption.as_deref())
        .expect("caption");
    assert_eq!(caption.text_content(), "Quarterly results");
    assert!(!table.text_content().contains("ignored"));
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::LayoutInconsistency && d.message.contains("caption")));
}

#[test]
fn test_ragged_rows_get_placeholder_cells() {
    let output = layout_at(
        300.0,
        r#"{ "tag": "body", "children": [
            { "tag": "table", "children": [
                { "tag": "tr", "children": [
                    { "tag": "td", "children": [ { "text": "a" } ] },
                    { "tag": "td", "children": [ { "text": "b" } ] },
                    { "tag": "td", "children": [ { "text": "c" } ] }
                ] },
                { "tag": "tr", "children": [ { "tag": "td", "children": [ { "text": "d" } ] } ] }
            ] }
        ] }"#,
    );
    let table = first_table(&output);
    let short_row = &table.children[1];
    let labels: Vec<String> = short_row.children.iter().map(LayoutBox::label).collect();
    assert_eq!(labels, vec!["Cell <td>", "PlaceholderCell", "PlaceholderCell"]);
    assert_eq!(cell_texts(short_row), vec!["d", "", ""]);
    assert_eq!(
        output
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::LayoutInconsistency)
            .count(),
        1
    );
}

#[test]
fn test_rowspan_shifts_later_cells() {
    let output = layout_at(
        300.0,
        r#"{ "tag": "body", "children": [
            { "tag": "table", "children": [
                { "tag": "tr", "children": [
                    { "tag": "td", "attrs": { "rowspan": "2" }, "children": [ { "text": "tall" } ] },
                    { "tag": "td", "children": [ { "text": "b" } ] }
                ] },
                { "tag": "tr", "children": [ { "tag": "td", "children": [ { "text": "c" } ] } ] }
            ] }
        ] }"#,
    );
    let table = first_table(&output);
    let cell = &table.children[1].children[0];
    let BoxKind::TableCell { placement, .. } = cell.kind else {
        panic!("expected a cell, got {}", cell.label());
    };
    assert_eq!(placement.column, 1);
    assert_eq!(table.children[1].children.len(), 1);
}

#[test]
fn test_loose_cells_are_wrapped_in_a_row() {
    let output = layout_at(
        300.0,
        r#"{ "tag": "body", "children": [
            { "tag": "table", "children": [
                { "tag": "td", "children": [ { "text": "a" } ] },
                { "tag": "td", "children": [ { "text": "b" } ] }
            ] }
        ] }"#,
    );
    let table = first_table(&output);
    assert_eq!(table.children.len(), 1);
    assert_eq!(table.children[0].label(), "Row");
    assert_eq!(cell_texts(&table.children[0]), vec!["a", "b"]);
}

#[test]
fn test_cell_content_keeps_block_structure() {
    let output = layout_at(
        400.0,
        r#"{ "tag": "body", "children": [
            { "tag": "table", "children": [ { "tag": "tr", "children": [
                { "tag": "td", "children": [
                    { "tag": "p", "children": [ { "text": "one" } ] },
                    { "tag": "p", "children": [ { "text": "two" } ] }
                ] }
            ] } ] }
        ] }"#,
    );
    let cell = &first_table(&output).children[0].children[0];
    assert_eq!(cell.children.len(), 2);
    // Cell edges are closed: the first paragraph's margin stays inside.
    assert!((cell.children[0].spacing.before - 16.0).abs() < 1e-3);
    assert!((cell.children[1].spacing.before - 16.0).abs() < 1e-3);
}

// ========== row height ==========

#[test]
fn test_row_height_comes_from_row_then_first_sized_cell() {
    let output = layout_at(
        300.0,
        r#"{ "tag": "body", "children": [
            { "tag": "table", "children": [
                { "tag": "tr", "attrs": { "style": "height: 40px" }, "children": [
                    { "tag": "td", "attrs": { "height": "90" }, "children": [ { "text": "a" } ] }
                ] },
                { "tag": "tr", "children": [
                    { "tag": "td", "children": [ { "text": "b" } ] },
                    { "tag": "td", "attrs": { "height": "25" }, "children": [ { "text": "c" } ] }
                ] },
                { "tag": "tr", "children": [
                    { "tag": "td", "children": [ { "text": "d" } ] }
                ] }
            ] }
        ] }"#,
    );
    let heights: Vec<Option<f32>> = first_table(&output)
        .children
        .iter()
        .map(|row| row.dimensions.content_height)
        .collect();
    assert_eq!(heights, vec![Some(40.0), Some(25.0), None]);
}
