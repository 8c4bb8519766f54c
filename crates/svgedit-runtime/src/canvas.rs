#![forbid(unsafe_code)]

//! Editing surface: document, selection, and history in one host.
//!
//! Effect editors never own the document. They act through the
//! [`EditHost`] trait, which [`SvgCanvas`] implements; tests and embedders
//! can supply their own host.
//!
//! ```text
//! BlurEditor                      EditHost (SvgCanvas implements)
//! ┌──────────────────┐           ┌────────────────────────────┐
//! │ begin_edit()     │           │ selected_element()         │
//! │ update_preview() │◄─────────►│ document() / document_mut()│
//! │ commit_edit()    │           │ push_history()             │
//! └──────────────────┘           └────────────────────────────┘
//! ```

use svgedit_core::{Document, DocumentError, NodeId, Selection};

use crate::undo::{AttributeScope, CommandError, HistoryConfig, HistoryManager, UndoableCmd};

/// Operations an editor needs from the surface it edits.
///
/// Editors hold open edits across calls, referring to nodes by id. A host
/// must not replay history while an edit is open: undo can detach the
/// resource the edit previews, and the later commit would then record a
/// reference to it. Close edits first, e.g. with
/// [`BlurEditor::commit_all`](crate::BlurEditor::commit_all).
pub trait EditHost {
    /// First selected element, if any.
    fn selected_element(&self) -> Option<NodeId>;

    /// The edited document.
    fn document(&self) -> &Document;

    /// Mutable access for live (unrecorded) changes.
    fn document_mut(&mut self) -> &mut Document;

    /// Append an already-applied command to undo history.
    fn push_history(&mut self, entry: Box<dyn UndoableCmd>);
}

/// Default [`EditHost`] owning its document, selection, and history.
#[derive(Debug, Default)]
pub struct SvgCanvas {
    document: Document,
    selection: Selection,
    history: HistoryManager,
}

impl SvgCanvas {
    /// Create an empty canvas with default history limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty canvas with custom history limits.
    #[must_use]
    pub fn with_history(config: HistoryConfig) -> Self {
        Self {
            history: HistoryManager::new(config),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Replace the selection with one element.
    pub fn select(&mut self, node: NodeId) {
        self.selection.select(node);
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Append a new element under the root without recording history.
    pub fn add_element<I, K, V>(&mut self, tag: &str, attributes: I) -> Result<NodeId, DocumentError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let node = self.document.create_element(tag, attributes);
        self.document.append_child(self.document.root(), node)?;
        Ok(node)
    }

    /// Set an attribute on every selected element and record one history
    /// entry for the net change. Returns whether anything was recorded.
    pub fn change_selected_attribute(
        &mut self,
        name: &str,
        value: &str,
    ) -> Result<bool, DocumentError> {
        let targets = self.selection.as_slice().to_vec();
        let scope = AttributeScope::begin(&self.document, name, targets.iter().copied());
        self.change_selected_attribute_no_undo(name, value)?;
        let batch = scope.finish(&self.document);
        if batch.is_empty() {
            return Ok(false);
        }
        self.history.push(Box::new(batch));
        Ok(true)
    }

    /// Set an attribute on every selected element without touching history.
    pub fn change_selected_attribute_no_undo(
        &mut self,
        name: &str,
        value: &str,
    ) -> Result<(), DocumentError> {
        for &node in self.selection.as_slice() {
            self.document.set_attribute(node, name, value)?;
        }
        Ok(())
    }

    /// Undo the latest history entry.
    ///
    /// Open editor edits must be closed beforehand; see [`EditHost`].
    pub fn undo(&mut self) -> Option<Result<String, CommandError>> {
        let result = self.history.undo(&mut self.document);
        self.selection.retain_attached(&self.document);
        result
    }

    /// Redo the latest undone entry.
    ///
    /// Open editor edits must be closed beforehand; see [`EditHost`].
    pub fn redo(&mut self) -> Option<Result<String, CommandError>> {
        let result = self.history.redo(&mut self.document);
        self.selection.retain_attached(&self.document);
        result
    }
}

impl EditHost for SvgCanvas {
    fn selected_element(&self) -> Option<NodeId> {
        self.selection.first()
    }

    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn push_history(&mut self, entry: Box<dyn UndoableCmd>) {
        self.history.push(entry);
    }
}
