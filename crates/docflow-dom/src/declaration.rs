//! Declared property values attached to elements.
//!
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/)
//!
//! Selector matching happens outside the core. What arrives here is, per
//! element, the list of declarations that applied, each tagged with
//! everything the cascade needs to order them.

use serde::{Deserialize, Serialize};

/// [§ 17 Calculating a selector's specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
///
/// "A selector's specificity is calculated for a given element as follows:
/// - count the number of ID selectors in the selector (= A)
/// - count the number of class selectors, attributes selectors, and
///   pseudo-classes in the selector (= B)
/// - count the number of type selectors and pseudo-elements in the selector (= C)"
///
/// "Specificities are compared by comparing the three components in order."
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Specificity {
    /// Create a new specificity value.
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self(a, b, c)
    }
}

/// [§ 6.1 Cascade Origins](https://www.w3.org/TR/css-cascade-4/#cascading-origins)
///
/// Where a declaration came from. Variants are ordered by precedence, so
/// `Origin::Inline > Origin::Author > Origin::UserAgent`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Built-in defaults for HTML elements.
    UserAgent,
    /// Stylesheet rules and presentational attributes.
    #[default]
    Author,
    /// The element's own `style` attribute. Outranks every stylesheet rule
    /// regardless of specificity.
    Inline,
}

/// One declared `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Lowercase property name.
    pub property: String,
    /// Raw value text with any `!important` suffix removed.
    pub value: String,
    /// Specificity of the selector that matched.
    pub specificity: Specificity,
    /// Position of the declaration in document order. Later wins ties.
    pub source_order: u32,
    /// Cascade origin.
    pub origin: Origin,
    /// [§ 6.4 Important Declarations](https://www.w3.org/TR/css-cascade-4/#importance)
    pub important: bool,
}

impl Declaration {
    /// A stylesheet declaration.
    #[must_use]
    pub fn author(property: &str, value: &str, specificity: Specificity, source_order: u32) -> Self {
        let (value, important) = split_important(value);
        Self {
            property: property.trim().to_ascii_lowercase(),
            value,
            specificity,
            source_order,
            origin: Origin::Author,
            important,
        }
    }

    /// A declaration from the element's `style` attribute.
    #[must_use]
    pub fn inline(property: &str, value: &str, source_order: u32) -> Self {
        Self {
            origin: Origin::Inline,
            ..Self::author(property, value, Specificity::default(), source_order)
        }
    }

    /// A user-agent default.
    #[must_use]
    pub fn user_agent(property: &str, value: &str) -> Self {
        Self {
            origin: Origin::UserAgent,
            ..Self::author(property, value, Specificity::new(0, 0, 1), 0)
        }
    }

    /// The key the cascade sorts by, lowest precedence first.
    #[must_use]
    pub const fn cascade_key(&self) -> (bool, Origin, Specificity, u32) {
        (self.important, self.origin, self.specificity, self.source_order)
    }
}

/// Strip a trailing `!important` and report whether it was present.
fn split_important(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    if let Some(bang) = trimmed.rfind('!') {
        let flag = trimmed[bang + 1..].trim();
        if flag.eq_ignore_ascii_case("important") {
            return (trimmed[..bang].trim_end().to_string(), true);
        }
    }
    (trimmed.to_string(), false)
}

/// [§ 3 Syntax of a style attribute](https://www.w3.org/TR/css-style-attr/#syntax)
///
/// "The value of the style attribute must match the syntax of the contents
/// of a CSS declaration block."
///
/// Splits `a: b; c: d` into inline declarations numbered from
/// `first_order`. Semicolons inside parentheses or quotes do not split.
/// Entries without a colon or with an empty name are dropped.
#[must_use]
pub fn parse_inline_style(style: &str, first_order: u32) -> Vec<Declaration> {
    let mut out = Vec::new();
    let mut order = first_order;
    for entry in split_top_level(style, ';') {
        let Some((name, value)) = entry.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() || value.trim().is_empty() {
            continue;
        }
        out.push(Declaration::inline(name, value, order));
        order += 1;
    }
    out
}

fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c == separator && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}
