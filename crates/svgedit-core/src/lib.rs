#![forbid(unsafe_code)]

//! Core: SVG document model, selection, and rendering-engine capabilities.
//!
//! # Role in svgedit
//! `svgedit-core` is the data layer. It owns the element arena that editing
//! operations mutate, the ordered selection those operations read, and the
//! engine capability profile hosts inject into quirk-sensitive code.
//!
//! # Primary responsibilities
//! - **Document**: arena of elements with attribute access, id lookup, and
//!   detach/re-insert that keeps subtrees addressable for undo.
//! - **Selection**: ordered list of selected nodes.
//! - **EngineCapabilities**: quirk flags derived from user agent or env.
//!
//! # How it fits in the system
//! `svgedit-runtime` builds its undo history and effect editors on top of
//! these types; nothing here knows about history.

pub mod document;
pub mod engine_caps;
pub mod selection;

pub use document::{DEFS_TAG, Document, DocumentError, Element, ID_ATTR, NodeId, SVG_TAG};
pub use engine_caps::{EngineCapabilities, EngineProfile};
pub use selection::Selection;
