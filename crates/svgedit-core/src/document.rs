#![forbid(unsafe_code)]

//! In-memory SVG document arena.
//!
//! Elements live in a flat arena keyed by [`NodeId`] and are linked into a
//! tree through parent/child lists. Detaching an element never frees it: the
//! undo layer relies on detached subtrees staying addressable so they can be
//! re-inserted later.
//!
//! # Invariants
//!
//! 1. The root `<svg>` element never has a parent and cannot be detached.
//! 2. A node appears in at most one parent's child list, and its `parent`
//!    field always names that list's owner.
//! 3. [`Document::find_by_id`] only returns nodes reachable from the root.
//!
//! # Growth
//!
//! Nothing is ever removed from the arena or the id index. Each undo of a
//! created resource leaves its subtree detached and its id entry in place,
//! so both grow with the number of distinct elements ever created. Redo
//! depends on this; a host that needs to bound memory should start a fresh
//! document rather than prune one with live history.
//!
//! [`Document::defs`] creates the `<defs>` container on demand and that
//! creation is not a recorded edit: undoing the first resource leaves an
//! empty `<defs>` behind, which later resources reuse.

use std::collections::BTreeMap;

use ahash::AHashMap;
use thiserror::Error;

/// Tag of the document root.
pub const SVG_TAG: &str = "svg";
/// Tag of the resource container holding filters, gradients, etc.
pub const DEFS_TAG: &str = "defs";
/// Attribute used for identifier lookup.
pub const ID_ATTR: &str = "id";

/// Stable handle to an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a node ID from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Errors produced by structural document operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The node does not exist in this document.
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),
    /// The node is already linked under a parent.
    #[error("node {child:?} is already attached under {parent:?}")]
    AlreadyAttached { child: NodeId, parent: NodeId },
    /// Linking would make a node its own ancestor.
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },
    /// The root element cannot be moved.
    #[error("the document root cannot be detached or re-parented")]
    RootImmovable,
    /// Insertion index past the end of the child list.
    #[error("index {index} out of bounds for {parent:?} with {len} children")]
    IndexOutOfBounds {
        parent: NodeId,
        index: usize,
        len: usize,
    },
}

/// A single SVG element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Element tag name (e.g. `rect`, `filter`).
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Iterate attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The element's identifier, if it has one.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attribute(ID_ATTR)
    }

    /// Parent node, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed SVG document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: AHashMap<NodeId, Element>,
    /// `id` attribute value to every node that has carried it.
    ids: AHashMap<String, Vec<NodeId>>,
    root: NodeId,
    next_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only an empty `<svg>` root.
    #[must_use]
    pub fn new() -> Self {
        let root = NodeId::new(0);
        let mut nodes = AHashMap::new();
        nodes.insert(root, Element::new(SVG_TAG));
        Self {
            nodes,
            ids: AHashMap::new(),
            root,
            next_id: 1,
        }
    }

    /// The root `<svg>` element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of elements in the arena, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a document holds at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether a node exists in the arena.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Borrow an element.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(&node)
    }

    /// Borrow an element, failing if it does not exist.
    pub fn element(&self, node: NodeId) -> Result<&Element, DocumentError> {
        self.nodes
            .get(&node)
            .ok_or(DocumentError::UnknownNode(node))
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element, DocumentError> {
        self.nodes
            .get_mut(&node)
            .ok_or(DocumentError::UnknownNode(node))
    }

    /// Tag of a node.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(Element::tag)
    }

    /// Attribute value of a node.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node).and_then(|el| el.attribute(name))
    }

    /// Parent of a node.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(Element::parent)
    }

    /// Children of a node (empty for unknown nodes).
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map(Element::children).unwrap_or(&[])
    }

    /// First child of a node.
    #[must_use]
    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    /// Create a detached element with the given attributes.
    pub fn create_element<I, K, V>(&mut self, tag: &str, attributes: I) -> NodeId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let node = NodeId::new(self.next_id);
        self.next_id += 1;
        let mut element = Element::new(tag);
        for (name, value) in attributes {
            element.attributes.insert(name.into(), value.into());
        }
        if let Some(id) = element.id() {
            self.ids.entry(id.to_owned()).or_default().push(node);
        }
        self.nodes.insert(node, element);
        node
    }

    /// Set an attribute, returning the previous value.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<Option<String>, DocumentError> {
        let value = value.into();
        self.element(node)?;
        if name == ID_ATTR {
            self.index_id(node, &value);
        }
        let element = self.element_mut(node)?;
        Ok(element.attributes.insert(name.to_owned(), value))
    }

    /// Remove an attribute, returning the previous value.
    pub fn remove_attribute(
        &mut self,
        node: NodeId,
        name: &str,
    ) -> Result<Option<String>, DocumentError> {
        let element = self.element_mut(node)?;
        Ok(element.attributes.remove(name))
    }

    /// Set or remove an attribute depending on `value`.
    pub fn restore_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<Option<String>, DocumentError> {
        match value {
            Some(v) => self.set_attribute(node, name, v),
            None => self.remove_attribute(node, name),
        }
    }

    fn index_id(&mut self, node: NodeId, id: &str) {
        let nodes = self.ids.entry(id.to_owned()).or_default();
        if !nodes.contains(&node) {
            nodes.push(node);
        }
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        let len = self.element(parent)?.children.len();
        self.insert_child(parent, len, child)
    }

    /// Insert `child` at `index` in `parent`'s child list.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), DocumentError> {
        if child == self.root {
            return Err(DocumentError::RootImmovable);
        }
        let len = self.element(parent)?.children.len();
        if let Some(existing) = self.element(child)?.parent {
            return Err(DocumentError::AlreadyAttached {
                child,
                parent: existing,
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(DocumentError::Cycle { child, parent });
        }
        if index > len {
            return Err(DocumentError::IndexOutOfBounds { parent, index, len });
        }

        self.element_mut(parent)?.children.insert(index, child);
        self.element_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Unlink a node from its parent.
    ///
    /// Returns the former parent and position, or `None` if the node was
    /// already detached. The node and its subtree stay in the arena.
    pub fn detach(&mut self, node: NodeId) -> Result<Option<(NodeId, usize)>, DocumentError> {
        if node == self.root {
            return Err(DocumentError::RootImmovable);
        }
        let Some(parent) = self.element(node)?.parent else {
            return Ok(None);
        };
        let siblings = &mut self.element_mut(parent)?.children;
        let Some(index) = siblings.iter().position(|&c| c == node) else {
            return Ok(None);
        };
        siblings.remove(index);
        self.element_mut(node)?.parent = None;
        Ok(Some((parent, index)))
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.parent(node) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Check whether a node is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(node) && self.is_ancestor_or_self(self.root, node)
    }

    /// Find an attached element by its `id` attribute.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id)?.iter().copied().find(|&node| {
            self.attribute(node, ID_ATTR) == Some(id) && self.is_attached(node)
        })
    }

    /// Find the resource container without creating one.
    #[must_use]
    pub fn find_defs(&self) -> Option<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|&node| self.tag(node) == Some(DEFS_TAG))
    }

    /// Find the resource container, creating it as the root's first child
    /// if the document has none.
    pub fn defs(&mut self) -> Result<NodeId, DocumentError> {
        if let Some(defs) = self.find_defs() {
            return Ok(defs);
        }
        let defs = self.create_element(DEFS_TAG, std::iter::empty::<(String, String)>());
        self.insert_child(self.root, 0, defs)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "svgedit.document", defs = ?defs, "created defs container");
        Ok(defs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(doc: &mut Document, id: &str) -> NodeId {
        let node = doc.create_element("rect", [("id", id), ("width", "10")]);
        doc.append_child(doc.root(), node).unwrap();
        node
    }

    #[test]
    fn new_document_has_root_only() {
        let doc = Document::new();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.tag(doc.root()), Some(SVG_TAG));
        assert!(doc.is_attached(doc.root()));
        assert!(doc.find_defs().is_none());
    }

    #[test]
    fn find_by_id_only_sees_attached_nodes() {
        let mut doc = Document::new();
        let node = doc.create_element("rect", [("id", "r1")]);
        assert_eq!(doc.find_by_id("r1"), None);

        doc.append_child(doc.root(), node).unwrap();
        assert_eq!(doc.find_by_id("r1"), Some(node));

        doc.detach(node).unwrap();
        assert_eq!(doc.find_by_id("r1"), None);
    }

    #[test]
    fn find_by_id_tracks_id_changes() {
        let mut doc = Document::new();
        let node = rect(&mut doc, "before");
        doc.set_attribute(node, ID_ATTR, "after").unwrap();
        assert_eq!(doc.find_by_id("before"), None);
        assert_eq!(doc.find_by_id("after"), Some(node));
    }

    #[test]
    fn defs_is_created_once_as_first_child() {
        let mut doc = Document::new();
        rect(&mut doc, "r1");
        let defs = doc.defs().unwrap();
        assert_eq!(doc.first_child(doc.root()), Some(defs));
        assert_eq!(doc.defs().unwrap(), defs);
        assert_eq!(doc.find_defs(), Some(defs));
    }

    #[test]
    fn detached_nodes_stay_in_arena_and_index() {
        let mut doc = Document::new();
        let node = rect(&mut doc, "r1");
        let before = doc.len();

        doc.detach(node).unwrap();
        assert_eq!(doc.len(), before);
        assert!(doc.contains(node));
        assert_eq!(doc.attribute(node, "width"), Some("10"));
        assert_eq!(doc.find_by_id("r1"), None);

        doc.append_child(doc.root(), node).unwrap();
        assert_eq!(doc.find_by_id("r1"), Some(node));
    }

    #[test]
    fn detach_and_reinsert_restores_position() {
        let mut doc = Document::new();
        let a = rect(&mut doc, "a");
        let b = rect(&mut doc, "b");
        let c = rect(&mut doc, "c");

        let (parent, index) = doc.detach(b).unwrap().unwrap();
        assert_eq!(doc.children(parent), &[a, c]);
        assert_eq!(doc.detach(b).unwrap(), None);

        doc.insert_child(parent, index, b).unwrap();
        assert_eq!(doc.children(doc.root()), &[a, b, c]);
    }

    #[test]
    fn structural_errors() {
        let mut doc = Document::new();
        let a = rect(&mut doc, "a");
        let inner = doc.create_element("g", [("id", "g")]);
        doc.append_child(a, inner).unwrap();

        assert_eq!(
            doc.append_child(doc.root(), inner),
            Err(DocumentError::AlreadyAttached {
                child: inner,
                parent: a
            })
        );
        doc.detach(a).unwrap();
        assert_eq!(
            doc.append_child(inner, a),
            Err(DocumentError::Cycle {
                child: a,
                parent: inner
            })
        );
        assert_eq!(doc.detach(doc.root()), Err(DocumentError::RootImmovable));
        assert_eq!(
            doc.insert_child(doc.root(), 5, a),
            Err(DocumentError::IndexOutOfBounds {
                parent: doc.root(),
                index: 5,
                len: 0
            })
        );
        let ghost = NodeId::new(999);
        assert_eq!(
            doc.set_attribute(ghost, "x", "1"),
            Err(DocumentError::UnknownNode(ghost))
        );
    }

    #[test]
    fn attribute_roundtrip_through_restore() {
        let mut doc = Document::new();
        let a = rect(&mut doc, "a");
        assert_eq!(doc.set_attribute(a, "filter", "url(#x)").unwrap(), None);
        assert_eq!(
            doc.restore_attribute(a, "filter", None).unwrap().as_deref(),
            Some("url(#x)")
        );
        assert_eq!(doc.attribute(a, "filter"), None);
        doc.restore_attribute(a, "filter", Some("url(#y)")).unwrap();
        assert_eq!(doc.attribute(a, "filter"), Some("url(#y)"));
    }

    #[test]
    fn attributes_iterate_in_name_order() {
        let mut doc = Document::new();
        let node = doc.create_element("filter", [("y", "1"), ("id", "f"), ("x", "0")]);
        let names: Vec<_> = doc.element(node).unwrap().attributes().map(|(k, _)| k).collect();
        assert_eq!(names, ["id", "x", "y"]);
    }
}
