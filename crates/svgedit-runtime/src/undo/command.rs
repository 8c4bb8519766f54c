#![forbid(unsafe_code)]

//! Undoable command infrastructure for the undo/redo system.
//!
//! This module provides the [`UndoableCmd`] trait for reversible document
//! operations and the built-in commands the editors record.
//!
//! # Invariants
//!
//! - Commands are recorded *after* their effect has been applied to the
//!   document; history never executes a command on push.
//! - `undo()` followed by `redo()` restores the executed state exactly.
//! - `size_bytes()` is accurate enough for memory budgeting.
//!
//! # Failure Modes
//!
//! - **Stale reference**: a command names a node missing from the document.
//!   Surfaces as [`CommandError::Document`].
//! - **Detached capture**: an insertion recorded for a node without a parent
//!   is rejected at construction time.
//! - **Shifted siblings**: entries can be undone in a different order than
//!   their insertions happened, so [`InsertElementCmd`] replays against its
//!   recorded next sibling instead of an absolute index.

use std::any::Any;
use std::fmt;

use svgedit_core::{Document, DocumentError, NodeId};
use thiserror::Error;

/// Metadata attached to every command for tracing and UI display.
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    /// Human-readable description for UI (e.g., "Change filter").
    pub description: String,
}

impl CommandMetadata {
    /// Create new metadata with the given description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.description.len()
    }
}

impl Default for CommandMetadata {
    fn default() -> Self {
        Self::new("Unknown")
    }
}

/// Result of command execution or undo.
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur while replaying a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The document rejected the operation.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// An insertion was recorded for an element that has no parent.
    #[error("element {0:?} is not attached; cannot record its insertion")]
    Detached(NodeId),
}

/// A reversible document operation.
pub trait UndoableCmd: Send + Sync {
    /// Apply the command's effect to the document.
    fn execute(&mut self, doc: &mut Document) -> CommandResult;

    /// Revert the command's effect.
    fn undo(&mut self, doc: &mut Document) -> CommandResult;

    /// Re-apply the command after it was undone.
    fn redo(&mut self, doc: &mut Document) -> CommandResult {
        self.execute(doc)
    }

    /// Human-readable description for UI display.
    fn description(&self) -> &str {
        &self.metadata().description
    }

    /// Size of this command in bytes for memory budgeting.
    fn size_bytes(&self) -> usize;

    /// Get the command metadata.
    fn metadata(&self) -> &CommandMetadata;

    /// Element the command operates on, if it has a single target.
    fn target(&self) -> Option<NodeId> {
        None
    }

    /// Downcast to concrete type for inspection.
    fn as_any(&self) -> &dyn Any;

    /// Debug description of the command.
    fn debug_name(&self) -> &'static str {
        "UndoableCmd"
    }
}

impl fmt::Debug for dyn UndoableCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.debug_name())
            .field("description", &self.description())
            .field("target", &self.target())
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

/// A batch of commands that undo and redo together.
///
/// Used for edits that touch several elements or attributes but should
/// appear as a single undo entry.
pub struct CommandBatch {
    /// Commands in execution order.
    commands: Vec<Box<dyn UndoableCmd>>,
    /// Batch metadata.
    metadata: CommandMetadata,
    /// Number of leading commands whose effect is currently applied.
    executed_to: usize,
}

impl fmt::Debug for CommandBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBatch")
            .field("commands", &self.commands)
            .field("metadata", &self.metadata)
            .field("executed_to", &self.executed_to)
            .finish()
    }
}

impl CommandBatch {
    /// Create a new command batch.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            commands: Vec::new(),
            metadata: CommandMetadata::new(description),
            executed_to: 0,
        }
    }

    /// Add a command whose effect is already applied to the document.
    ///
    /// Everything pushed before it is treated as applied as well.
    pub fn push_executed(&mut self, cmd: Box<dyn UndoableCmd>) {
        self.commands.push(cmd);
        self.executed_to = self.commands.len();
    }

    /// Number of commands in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Sub-commands in execution order.
    pub fn commands(&self) -> impl Iterator<Item = &dyn UndoableCmd> {
        self.commands.iter().map(|c| c.as_ref())
    }
}

impl UndoableCmd for CommandBatch {
    fn execute(&mut self, doc: &mut Document) -> CommandResult {
        for i in self.executed_to..self.commands.len() {
            if let Err(e) = self.commands[i].execute(doc) {
                // Roll back what this call applied
                for j in (self.executed_to..i).rev() {
                    let _ = self.commands[j].undo(doc);
                }
                return Err(e);
            }
        }
        self.executed_to = self.commands.len();
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        // Undo in reverse order
        while self.executed_to > 0 {
            self.commands[self.executed_to - 1].undo(doc)?;
            self.executed_to -= 1;
        }
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.commands.iter().map(|c| c.size_bytes()).sum::<usize>()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "CommandBatch"
    }
}

// ============================================================================
// Built-in Document Commands
// ============================================================================

/// Records that an element was inserted into the document.
///
/// Replay puts the element back before the sibling that followed it at
/// capture time. If that sibling has since left the parent, the element is
/// appended.
#[derive(Debug)]
pub struct InsertElementCmd {
    /// Inserted element.
    pub node: NodeId,
    /// Parent it was inserted under.
    pub parent: NodeId,
    /// Sibling that followed it when captured.
    pub next_sibling: Option<NodeId>,
    /// Command metadata.
    pub metadata: CommandMetadata,
}

impl InsertElementCmd {
    /// Capture the current position of an already-inserted element.
    pub fn capture(doc: &Document, node: NodeId) -> Result<Self, CommandError> {
        let element = doc.element(node)?;
        let parent = element.parent().ok_or(CommandError::Detached(node))?;
        let siblings = doc.children(parent);
        let index = siblings
            .iter()
            .position(|&c| c == node)
            .ok_or(CommandError::Detached(node))?;
        Ok(Self {
            node,
            parent,
            next_sibling: siblings.get(index + 1).copied(),
            metadata: CommandMetadata::new(format!("Insert {}", element.tag())),
        })
    }
}

impl UndoableCmd for InsertElementCmd {
    fn execute(&mut self, doc: &mut Document) -> CommandResult {
        let anchor = self.next_sibling.and_then(|next| {
            doc.children(self.parent).iter().position(|&c| c == next)
        });
        match anchor {
            Some(index) => doc.insert_child(self.parent, index, self.node)?,
            None => doc.append_child(self.parent, self.node)?,
        }
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        doc.detach(self.node)?;
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.metadata.size_bytes()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn target(&self) -> Option<NodeId> {
        Some(self.node)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "InsertElementCmd"
    }
}

/// Records an attribute change on one element.
///
/// `None` means the attribute was (or becomes) absent.
#[derive(Debug)]
pub struct ChangeElementCmd {
    /// Changed element.
    pub node: NodeId,
    /// Attribute name.
    pub attribute: String,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
    /// Command metadata.
    pub metadata: CommandMetadata,
}

impl ChangeElementCmd {
    /// Create a new attribute change command.
    #[must_use]
    pub fn new(
        node: NodeId,
        attribute: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        let attribute = attribute.into();
        let metadata = CommandMetadata::new(format!("Change {attribute}"));
        Self {
            node,
            attribute,
            old_value,
            new_value,
            metadata,
        }
    }
}

impl UndoableCmd for ChangeElementCmd {
    fn execute(&mut self, doc: &mut Document) -> CommandResult {
        doc.restore_attribute(self.node, &self.attribute, self.new_value.as_deref())?;
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        doc.restore_attribute(self.node, &self.attribute, self.old_value.as_deref())?;
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.attribute.len()
            + self.old_value.as_ref().map_or(0, String::len)
            + self.new_value.as_ref().map_or(0, String::len)
            + self.metadata.size_bytes()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn target(&self) -> Option<NodeId> {
        Some(self.node)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "ChangeElementCmd"
    }
}

// ============================================================================
// Tests
// ============================================================================
