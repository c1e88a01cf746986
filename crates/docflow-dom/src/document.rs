//! JSON description of a styled document.
//!
//! The layout core takes a [`StyledTree`]; this module is the serialized
//! form an external parser can emit to hand one over:
//!
//! ```json
//! { "tag": "body", "children": [
//!     { "tag": "p", "attrs": { "style": "margin-top: 10px" },
//!       "style": [ { "property": "color", "value": "red", "specificity": [0, 1, 0] } ],
//!       "children": [ { "text": "Hello" } ] }
//! ] }
//! ```

use serde::Deserialize;
use thiserror::Error;

use crate::declaration::{Declaration, Origin, Specificity, parse_inline_style};
use crate::{AttributesMap, ElementData, NodeId, StyledTree};

/// Errors converting a serialized document into a tree.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The input was not a valid document description.
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The outermost node must be an element.
    #[error("document root must be an element, found a text node")]
    TextRoot,
}

/// One node of a serialized document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DocumentNode {
    /// An element with attributes, matched declarations and children.
    Element {
        /// Tag name.
        tag: String,
        /// Attributes. A `style` attribute is split into inline declarations.
        #[serde(default)]
        attrs: AttributesMap,
        /// Matched stylesheet declarations.
        #[serde(default)]
        style: Vec<StyleEntry>,
        /// Pre-computed container gap in px.
        #[serde(default)]
        gap: Option<f32>,
        /// Children in document order.
        #[serde(default)]
        children: Vec<DocumentNode>,
    },
    /// Character data.
    Text {
        /// The text.
        text: String,
    },
}

/// A matched declaration in a serialized document.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleEntry {
    /// Property name.
    pub property: String,
    /// Raw value, optionally ending in `!important`.
    pub value: String,
    /// `[ids, classes, types]` of the matching selector.
    #[serde(default)]
    pub specificity: Specificity,
    /// Explicit source order. Entries without one are numbered in document
    /// order.
    #[serde(default)]
    pub order: Option<u32>,
    /// Cascade origin, `author` unless stated.
    #[serde(default)]
    pub origin: Origin,
}

impl DocumentNode {
    /// Parse a JSON document description.
    ///
    /// # Errors
    /// Returns [`DocumentError::Json`] when the text is not a valid
    /// description.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert into an arena tree.
    ///
    /// # Errors
    /// Returns [`DocumentError::TextRoot`] when the outermost node is text.
    pub fn into_tree(self) -> Result<StyledTree, DocumentError> {
        let Self::Element {
            tag,
            attrs,
            style,
            gap,
            children,
        } = self
        else {
            return Err(DocumentError::TextRoot);
        };
        let mut order = 0;
        let root = element_data(&tag, attrs, style, gap, &mut order);
        let mut tree = StyledTree::new(root);
        for child in children {
            child.append_to(&mut tree, NodeId::ROOT, &mut order);
        }
        Ok(tree)
    }

    fn append_to(self, tree: &mut StyledTree, parent: NodeId, order: &mut u32) {
        match self {
            Self::Text { text } => {
                let _ = tree.append_text(parent, &text);
            }
            Self::Element {
                tag,
                attrs,
                style,
                gap,
                children,
            } => {
                let data = element_data(&tag, attrs, style, gap, order);
                let id = tree.append_element(parent, data);
                for child in children {
                    child.append_to(tree, id, order);
                }
            }
        }
    }
}

impl StyledTree {
    /// Parse a JSON document description straight into a tree.
    ///
    /// # Errors
    /// See [`DocumentNode::from_json`] and [`DocumentNode::into_tree`].
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        DocumentNode::from_json(json)?.into_tree()
    }
}

fn element_data(
    tag: &str,
    attrs: AttributesMap,
    style: Vec<StyleEntry>,
    gap: Option<f32>,
    order: &mut u32,
) -> ElementData {
    let mut declarations = Vec::with_capacity(style.len());
    for entry in style {
        let source_order = entry.order.unwrap_or(*order);
        *order += 1;
        let mut declaration =
            Declaration::author(&entry.property, &entry.value, entry.specificity, source_order);
        declaration.origin = entry.origin;
        declarations.push(declaration);
    }
    if let Some(inline) = attrs.get("style") {
        let parsed = parse_inline_style(inline, *order);
        *order = order.saturating_add(u32::try_from(parsed.len()).unwrap_or(u32::MAX));
        declarations.extend(parsed);
    }
    ElementData {
        tag_name: tag.to_ascii_lowercase(),
        attrs,
        declarations,
        explicit_gap: gap,
    }
}
