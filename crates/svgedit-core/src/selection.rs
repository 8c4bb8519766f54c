#![forbid(unsafe_code)]

//! Ordered element selection.

use crate::document::{Document, NodeId};

/// The set of selected elements, in selection order.
///
/// Editing operations that act on "the selected element" read
/// [`Selection::first`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    elements: Vec<NodeId>,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a single element.
    pub fn select(&mut self, node: NodeId) {
        self.elements.clear();
        self.elements.push(node);
    }

    /// Add an element to the selection if it is not already selected.
    pub fn add(&mut self, node: NodeId) {
        if !self.elements.contains(&node) {
            self.elements.push(node);
        }
    }

    /// Clear the selection.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// First selected element.
    #[must_use]
    pub fn first(&self) -> Option<NodeId> {
        self.elements.first().copied()
    }

    /// All selected elements.
    #[must_use]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Drop elements that are no longer attached to `doc`.
    pub fn retain_attached(&mut self, doc: &Document) {
        self.elements.retain(|&node| doc.is_attached(node));
    }
}
