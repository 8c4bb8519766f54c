#![forbid(unsafe_code)]

//! Undo/Redo command history framework.
//!
//! This module provides infrastructure for reversible document edits. It
//! implements the Command Pattern with support for:
//!
//! - **Reversibility**: Every command can be undone and redone
//! - **Batching**: Multiple commands group into one atomic history entry
//! - **Attribute scopes**: Many live mutations collapse into their net change
//! - **Memory management**: Commands report size for bounded history
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        HistoryManager                           │
//! │  ┌──────────────────┐          ┌──────────────────┐             │
//! │  │   Undo Stack     │          │   Redo Stack     │             │
//! │  │  ┌────────────┐  │  undo()  │  ┌────────────┐  │             │
//! │  │  │ BatchN     │  │ ──────►  │  │ Batch1     │  │             │
//! │  │  ├────────────┤  │          │  ├────────────┤  │             │
//! │  │  │ Batch1     │  │  ◄────── │  │ BatchN     │  │             │
//! │  │  └────────────┘  │  redo()  │  └────────────┘  │             │
//! │  └──────────────────┘          └──────────────────┘             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Notes
//!
//! ## Commands Borrow the Document Per Call
//!
//! Commands store node handles and values, never references. The history
//! passes `&mut Document` into `undo`/`redo`, so commands stay owned and the
//! document stays the single source of truth.
//!
//! ## Record After Apply
//!
//! Editors mutate the document first and record what they did. History never
//! executes a command on push; it only replays on undo/redo.

pub mod attribute_scope;
pub mod command;
pub mod history;

// Re-export commonly used types
pub use attribute_scope::AttributeScope;
pub use command::{
    ChangeElementCmd, CommandBatch, CommandError, CommandMetadata, CommandResult,
    InsertElementCmd, UndoableCmd,
};
pub use history::{HistoryConfig, HistoryManager};
