//! CSS Cascading and Style Computation
//!
//! This module implements style computation per
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/).
//!
//! Selector matching has already happened: every element arrives with the
//! declarations that matched it. Resolution orders those declarations,
//! together with the UA defaults and the element's presentational
//! attributes, and applies them on top of the inherited style.

use std::collections::HashMap;

use docflow_common::{DiagnosticKind, Diagnostics};
use docflow_dom::{Declaration, ElementData, NodeId, Specificity, StyledTree};

use crate::config::LayoutConfig;
use crate::style::{ComputedStyle, StyleParseError};
use crate::style::values::{LengthValue, ListStyleType, parse_dimension_attribute};
use crate::ua_stylesheet::ua_declarations;

/// Component name used in diagnostics.
const COMPONENT: &str = "style";

/// Elements whose `width`/`height` attributes map to CSS sizes.
const SIZED_ELEMENTS: &[&str] = &["table", "td", "th", "col", "colgroup", "img", "svg"];

/// Elements whose `align` attribute maps to `text-align`.
const ALIGNED_ELEMENTS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "td", "th", "tr", "thead", "tbody", "tfoot",
    "caption", "center",
];

/// The style of the root element before its own declarations apply.
#[must_use]
pub fn root_style(config: &LayoutConfig) -> ComputedStyle {
    ComputedStyle::root(&config.default_font_family, config.default_font_size)
}

/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
/// "The cascade takes an unordered list of declared values for a given property
/// on a given element, sorts them by their declaration's precedence..."
///
/// Resolve the computed style of `node` given its parent's computed style.
/// Text nodes take the inherited style unchanged.
///
/// Declarations that fail to parse are skipped with a
/// [`DiagnosticKind::StyleParse`] diagnostic; the property keeps whatever
/// lower-priority declaration or inherited/initial value it had.
pub fn resolve(
    tree: &StyledTree,
    node: NodeId,
    parent: &ComputedStyle,
    config: &LayoutConfig,
    diagnostics: &mut Diagnostics,
) -> ComputedStyle {
    // [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
    let mut computed = ComputedStyle::inherit_from(parent);
    let Some(element) = tree.as_element(node) else {
        return computed;
    };

    let declarations = cascaded_declarations(element);
    let initial = root_style(config);
    let mut report = |err: StyleParseError| {
        diagnostics.report(
            DiagnosticKind::StyleParse,
            COMPONENT,
            format!("<{}> {err}", element.tag_name),
        );
    };

    // [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
    // `em` lengths on every other property resolve against this element's
    // own font size, so the font size must settle first.
    for decl in declarations.iter().filter(|d| sets_font_size(&d.property)) {
        if let Err(err) = computed.apply_declaration(&decl.property, &decl.value, parent, &initial)
        {
            report(err);
        }
    }
    let font_size = computed.font_size;

    // The winning font size stays fixed from here on: a lower-priority
    // `font-size` or `font` must not become the `em` basis of a later
    // declaration.
    for decl in &declarations {
        match decl.property.as_str() {
            "font-size" => {}
            "font" => {
                let _ = computed.apply_declaration(&decl.property, &decl.value, parent, &initial);
                computed.font_size = font_size;
            }
            _ => {
                if let Err(err) =
                    computed.apply_declaration(&decl.property, &decl.value, parent, &initial)
                {
                    report(err);
                }
            }
        }
    }

    computed.finish();
    computed
}

fn sets_font_size(property: &str) -> bool {
    matches!(property, "font-size" | "font")
}

/// [§ 6.1 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
///
/// All declarations that apply to `element`, lowest precedence first:
/// UA defaults, then presentational hints, then the element's own
/// declarations, stably sorted by importance, origin, specificity and source
/// order.
#[must_use]
pub fn cascaded_declarations(element: &ElementData) -> Vec<Declaration> {
    let mut declarations: Vec<Declaration> = ua_declarations(&element.tag_name).to_vec();
    declarations.extend(presentational_hints(element));
    declarations.extend(element.declarations.iter().cloned());
    declarations.sort_by_key(Declaration::cascade_key);
    declarations
}

/// [HTML § 15.1 Presentational hints](https://html.spec.whatwg.org/multipage/rendering.html#presentational-hints)
///
/// "The user agent is expected to treat the attribute as a presentational
/// hint ... These presentational hints are treated as author-level
/// declarations with a specificity of zero, placed before all other author
/// rules."
#[must_use]
pub fn presentational_hints(element: &ElementData) -> Vec<Declaration> {
    let tag = element.tag_name.as_str();
    let mut hints = Vec::new();
    let mut hint = |property: &str, value: &str| {
        hints.push(Declaration::author(property, value, Specificity::default(), 0));
    };

    // [§ 15.4.3 Maps to the dimension property](https://html.spec.whatwg.org/multipage/rendering.html#maps-to-the-dimension-property)
    if SIZED_ELEMENTS.contains(&tag) {
        for property in ["width", "height"] {
            let length = element.attr(property).and_then(parse_dimension_attribute);
            match length {
                Some(LengthValue::Px(px)) if px > 0.0 => hint(property, &format!("{px}px")),
                Some(LengthValue::Percent(pct)) if pct > 0.0 => {
                    hint(property, &format!("{pct}%"));
                }
                _ => {}
            }
        }
    }

    // [§ 15.3.3 Flow content](https://html.spec.whatwg.org/multipage/rendering.html#flow-content-3)
    // "The table element's align attribute ... center: margin-inline-start and
    // margin-inline-end to 'auto'"
    if let Some(align) = element.attr("align").map(str::trim) {
        let align = align.to_ascii_lowercase();
        if tag == "table" {
            match align.as_str() {
                "center" => {
                    hint("margin-left", "auto");
                    hint("margin-right", "auto");
                }
                "right" => hint("margin-left", "auto"),
                _ => {}
            }
        } else if ALIGNED_ELEMENTS.contains(&tag)
            && matches!(align.as_str(), "left" | "right" | "center" | "justify")
        {
            hint("text-align", &align);
        }
    }

    let valign = element.attr("valign");
    if let Some(valign) = valign.filter(|_| matches!(tag, "td" | "th" | "tr" | "tbody")) {
        hint("vertical-align", valign.trim());
    }

    let bgcolor = element.attr("bgcolor");
    let colored = matches!(tag, "body" | "table" | "tr" | "td" | "th");
    if let Some(color) = bgcolor.filter(|_| colored) {
        hint("background-color", color.trim());
    }

    let list_type = element.attr("type").and_then(ListStyleType::from_type_attribute);
    if let Some(kind) = list_type.filter(|_| matches!(tag, "ol" | "ul" | "li")) {
        hint("list-style-type", &kind.to_string());
    }

    if tag == "table" {
        let spacing = element.attr("cellspacing").and_then(parse_dimension_attribute);
        if let Some(LengthValue::Px(px)) = spacing {
            hint("border-spacing", &format!("{px}px"));
        }
        // "If the table element has a border attribute whose value ... is
        // greater than zero, ... border-style: outset"
        if let Some(width) = element.attr_u32("border").filter(|&b| b > 0) {
            hint("border", &format!("{width}px outset"));
        }
    }

    hints
}

/// Compute styles for the entire tree in document order.
/// Returns a map from `NodeId` to computed style; text nodes are included.
pub fn compute_styles(
    tree: &StyledTree,
    config: &LayoutConfig,
    diagnostics: &mut Diagnostics,
) -> HashMap<NodeId, ComputedStyle> {
    let mut styles = HashMap::new();
    let initial = root_style(config);
    compute_node_styles(tree, tree.root(), &initial, config, diagnostics, &mut styles);
    styles
}

fn compute_node_styles(
    tree: &StyledTree,
    id: NodeId,
    inherited: &ComputedStyle,
    config: &LayoutConfig,
    diagnostics: &mut Diagnostics,
    styles: &mut HashMap<NodeId, ComputedStyle>,
) {
    let computed = resolve(tree, id, inherited, config, diagnostics);
    for &child in tree.children(id) {
        compute_node_styles(tree, child, &computed, config, diagnostics, styles);
    }
    let _ = styles.insert(id, computed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::values::{AutoLength, ColorValue, ComputedLength, TextAlign};
    use docflow_dom::Origin;

    fn author(property: &str, value: &str, spec: (u32, u32, u32), order: u32) -> Declaration {
        Declaration::author(property, value, Specificity::new(spec.0, spec.1, spec.2), order)
    }

    fn resolve_single(element: ElementData) -> (ComputedStyle, Diagnostics) {
        let tree = StyledTree::new(element);
        let config = LayoutConfig::default();
        let mut diagnostics = Diagnostics::new();
        let style = resolve(
            &tree,
            tree.root(),
            &root_style(&config),
            &config,
            &mut diagnostics,
        );
        (style, diagnostics)
    }

    #[test]
    fn test_specificity_beats_source_order() {
        let element = ElementData::new("div")
            .with_declaration(author("color", "red", (0, 1, 0), 5))
            .with_declaration(author("color", "blue", (0, 0, 1), 9));
        let (style, _) = resolve_single(element);
        assert_eq!(style.color, ColorValue::rgb(255, 0, 0));
    }

    #[test]
    fn test_inline_beats_id_rule_and_important_beats_inline() {
        let element = ElementData::new("div")
            .with_declaration(author("color", "red", (1, 0, 0), 1))
            .with_declaration(Declaration::inline("color", "green", 2));
        let (style, _) = resolve_single(element);
        assert_eq!(style.color, ColorValue::rgb(0, 128, 0));

        let element = ElementData::new("div")
            .with_declaration(author("color", "red !important", (0, 0, 1), 1))
            .with_declaration(Declaration::inline("color", "green", 2));
        let (style, _) = resolve_single(element);
        assert_eq!(style.color, ColorValue::rgb(255, 0, 0));
    }

    #[test]
    fn test_font_size_settles_before_em_margins() {
        // margin-top is declared before font-size but still uses the new size.
        let element = ElementData::new("div")
            .with_declaration(author("margin-top", "1em", (0, 0, 1), 1))
            .with_declaration(author("font-size", "20px", (0, 0, 1), 2));
        let (style, _) = resolve_single(element);
        assert_eq!(style.margin.top, AutoLength::Length(ComputedLength::Px(20.0)));
    }

    #[test]
    fn test_lower_priority_font_size_is_not_the_em_basis() {
        // UA `h1 { font-size: 2em; margin-block-end: 0.67em }` sorts before
        // the author size, yet the margin follows the author's 10px.
        let element =
            ElementData::new("h1").with_declaration(author("font-size", "10px", (0, 0, 1), 1));
        let (style, _) = resolve_single(element);
        assert!((style.font_size - 10.0).abs() < f32::EPSILON);
        let AutoLength::Length(ComputedLength::Px(bottom)) = style.margin.bottom else {
            panic!("expected px margin, got {:?}", style.margin.bottom);
        };
        assert!((bottom - 6.7).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_font_size_reported_once() {
        let element =
            ElementData::new("p").with_declaration(author("font-size", "huge-ish", (0, 0, 1), 1));
        let (style, diagnostics) = resolve_single(element);
        assert!((style.font_size - 16.0).abs() < f32::EPSILON);
        assert_eq!(diagnostics.count(DiagnosticKind::StyleParse), 1);
    }

    #[test]
    fn test_invalid_value_falls_back_and_reports() {
        let element = ElementData::new("p")
            .with_declaration(author("margin-top", "5px", (0, 0, 1), 1))
            .with_declaration(author("margin-top", "lots", (0, 1, 0), 2));
        let (style, diagnostics) = resolve_single(element);
        assert_eq!(style.margin.top, AutoLength::Length(ComputedLength::Px(5.0)));
        assert_eq!(diagnostics.count(DiagnosticKind::StyleParse), 1);
    }

    #[test]
    fn test_ua_defaults_lose_to_author_rules() {
        let (style, _) = resolve_single(ElementData::new("h1"));
        assert!((style.font_size - 32.0).abs() < f32::EPSILON);
        assert!(style.is_bold());

        let element =
            ElementData::new("h1").with_declaration(author("font-weight", "normal", (0, 0, 0), 0));
        let (style, _) = resolve_single(element);
        assert!(!style.is_bold());
    }

    #[test]
    fn test_presentational_hints() {
        let element = ElementData::new("td")
            .with_attr("width", "40%")
            .with_attr("align", "CENTER")
            .with_attr("bgcolor", "#ff0000");
        let hints = presentational_hints(&element);
        assert!(hints.iter().all(|h| h.origin == Origin::Author));
        assert!(hints.iter().all(|h| h.specificity == Specificity::default()));

        let (style, _) = resolve_single(element);
        assert_eq!(style.width, AutoLength::Length(ComputedLength::Percent(40.0)));
        assert_eq!(style.text_align, TextAlign::Center);
        assert_eq!(style.background_color, Some(ColorValue::rgb(255, 0, 0)));
    }

    #[test]
    fn test_author_rule_beats_presentational_hint() {
        let element = ElementData::new("img")
            .with_attr("width", "100")
            .with_declaration(author("width", "50px", (0, 0, 1), 0));
        let (style, _) = resolve_single(element);
        assert_eq!(style.width, AutoLength::Length(ComputedLength::Px(50.0)));
    }

    #[test]
    fn test_non_inherited_properties_reset_per_child() {
        let mut tree = StyledTree::new(
            ElementData::new("div")
                .with_declaration(author("margin-top", "12px", (0, 0, 1), 0))
                .with_declaration(author("color", "blue", (0, 0, 1), 1)),
        );
        let child = tree.append_element(tree.root(), ElementData::new("p"));
        let mut diagnostics = Diagnostics::new();
        let styles = compute_styles(&tree, &LayoutConfig::default(), &mut diagnostics);

        let child_style = &styles[&child];
        assert_eq!(child_style.color, ColorValue::rgb(0, 0, 255));
        // p's UA margin is 1em, not the parent's 12px.
        assert_eq!(
            child_style.margin.top,
            AutoLength::Length(ComputedLength::Px(16.0))
        );
    }
}
