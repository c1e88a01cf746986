//! Styled node tree for the docflow layout core.
//!
//! The external HTML parser and CSS matcher hand the core a tree of typed
//! nodes, each element carrying the raw declarations that matched it. This
//! crate is that tree.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all
//! relationships. Children are owned by their parent's `children` list; the
//! `parent` link is a plain index used only for ancestor lookups, so there is
//! no shared ownership and no cycle.
//!
//! Nodes are a closed two-way variant ([`NodeKind::Element`] or
//! [`NodeKind::Text`]). Attribute probing goes through typed accessors on
//! [`ElementData`] such as [`ElementData::colspan`].

pub mod declaration;
pub mod document;
pub mod markup;

use std::collections::{BTreeMap, HashSet};

pub use declaration::{Declaration, Origin, Specificity, parse_inline_style};
pub use document::{DocumentError, DocumentNode, StyleEntry};

/// Map of attribute names to values for an element.
///
/// Ordered so serialized markup is stable across runs.
pub type AttributesMap = BTreeMap<String, String>;

/// A type-safe index into a [`StyledTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root element is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    /// Element or text payload.
    pub kind: NodeKind,
    /// Non-owning link to the parent. `None` only for the root.
    pub parent: Option<NodeId>,
    /// Owned, ordered children.
    pub children: Vec<NodeId>,
}

/// The closed set of node kinds the layout core understands.
///
/// Comments, doctypes and processing instructions are dropped by the parser
/// before the tree reaches the core.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// An element with its declarations.
    Element(ElementData),
    /// A run of character data.
    Text(String),
}

/// Element-specific data.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// Lowercase local name.
    pub tag_name: String,
    /// Attribute list.
    pub attrs: AttributesMap,
    /// Declarations that matched this element, in any order. The cascade
    /// sorts them.
    pub declarations: Vec<Declaration>,
    /// A container-level gap computed by the external parser. When present it
    /// takes precedence over any declared `gap`/`row-gap`.
    pub explicit_gap: Option<f32>,
}

impl ElementData {
    /// Create an element with no attributes or declarations.
    #[must_use]
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        let _ = self
            .attrs
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Builder-style declaration setter.
    #[must_use]
    pub fn with_declaration(mut self, declaration: Declaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Builder-style explicit gap setter.
    #[must_use]
    pub const fn with_explicit_gap(mut self, gap: f32) -> Self {
        self.explicit_gap = Some(gap);
        self
    }

    /// Returns an attribute value if present.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Returns the element's id attribute value if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Returns the set of class names from the class attribute.
    #[must_use]
    pub fn classes(&self) -> HashSet<&str> {
        self.attr("class")
            .map(|list| list.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Parse a non-negative integer attribute, ignoring surrounding space.
    #[must_use]
    pub fn attr_u32(&self, name: &str) -> Option<u32> {
        self.attr(name).and_then(|v| v.trim().parse().ok())
    }

    /// [HTML § 4.9.11 The td element](https://html.spec.whatwg.org/multipage/tables.html#attr-tdth-colspan)
    ///
    /// "The td and th elements may have a colspan content attribute
    /// specified, whose value must be a valid non-negative integer greater
    /// than zero and less than or equal to 1000."
    ///
    /// Invalid or zero values yield 1.
    #[must_use]
    pub fn colspan(&self) -> usize {
        self.attr_u32("colspan")
            .filter(|&n| n > 0)
            .map_or(1, |n| n.min(1000) as usize)
    }

    /// "The td and th elements may also have a rowspan content attribute
    /// specified, whose value must be a valid non-negative integer less than
    /// or equal to 65534."
    ///
    /// `0` means the cell spans all remaining rows of its table; the table
    /// resolver interprets it. Invalid values yield 1.
    #[must_use]
    pub fn rowspan(&self) -> usize {
        self.attr_u32("rowspan").map_or(1, |n| n.min(65534) as usize)
    }

    /// `span` on `col`/`colgroup`. Invalid or zero values yield 1.
    #[must_use]
    pub fn span(&self) -> usize {
        self.attr_u32("span")
            .filter(|&n| n > 0)
            .map_or(1, |n| n.min(1000) as usize)
    }
}

/// Arena-based styled node tree.
///
/// The root is an element (usually `body`) stored at [`NodeId::ROOT`].
#[derive(Debug, Clone)]
pub struct StyledTree {
    nodes: Vec<Node>,
}

impl StyledTree {
    /// Create a tree whose root is the given element.
    #[must_use]
    pub fn new(root: ElementData) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Element(root),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Get the root node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// A node that already has a parent is left where it is; every node has
    /// exactly one parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child
            || parent.0 >= self.nodes.len()
            || child.0 >= self.nodes.len()
            || self.nodes[child.0].parent.is_some()
            || child == NodeId::ROOT
        {
            return;
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Allocate an element and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, element: ElementData) -> NodeId {
        let id = self.alloc(NodeKind::Element(element));
        self.append_child(parent, id);
        id
    }

    /// Allocate a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.alloc(NodeKind::Text(text.to_string()));
        self.append_child(parent, id);
        id
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Text(s) => Some(s.as_str()),
            NodeKind::Element(_) => None,
        })
    }

    /// Tag name of an element node.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(|e| e.tag_name.as_str())
    }

    /// Element children with the given tag name.
    pub fn children_with_tag<'a>(
        &'a self,
        id: NodeId,
        tag: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&c| self.tag_name(c) == Some(tag))
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.get(id).map(|n| &n.kind) {
            Some(NodeKind::Text(text)) => out.push_str(text),
            Some(NodeKind::Element(_)) => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a StyledTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
