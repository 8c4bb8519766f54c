#![forbid(unsafe_code)]

//! svgedit Runtime
//!
//! This crate provides the editing layer on top of `svgedit-core`: undo
//! history, the canvas host, and effect editors that turn continuous input
//! into single undoable edits.
//!
//! # Key Components
//!
//! - [`HistoryManager`] - Undo/redo stacks with depth and byte limits
//! - [`UndoableCmd`] - Trait for reversible document edits
//! - [`AttributeScope`] - Collapses many live attribute writes into one change
//! - [`SvgCanvas`] - Default [`EditHost`] owning document, selection, history
//! - [`BlurEditor`] - Transactional Gaussian blur editing
//! - [`EditorPolicyConfig`] - Tunables loadable from TOML/JSON
//!
//! # Role in svgedit
//! `svgedit-runtime` is where edits become history. Editors mutate the
//! document live through an [`EditHost`] and record the net effect as one
//! entry when the user finishes.
//!
//! # How it fits in the system
//! `svgedit-core` owns the data; this crate owns the verbs. A UI layer
//! forwards slider and selection events here and calls undo/redo.

pub mod blur;
pub mod canvas;
pub mod policy_config;
pub mod undo;

pub use blur::{
    BeginOutcome, BlurEditor, BlurError, BlurPolicy, CommitOutcome, FilterResource, RegionAction,
    SetBlurOutcome,
};
pub use canvas::{EditHost, SvgCanvas};
pub use policy_config::{EditorPolicyConfig, PolicyConfigError};
pub use undo::{
    AttributeScope, ChangeElementCmd, CommandBatch, CommandError, HistoryConfig, HistoryManager,
    InsertElementCmd, UndoableCmd,
};
