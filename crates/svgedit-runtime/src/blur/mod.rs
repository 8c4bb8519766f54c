#![forbid(unsafe_code)]

//! Gaussian blur editing for the selected element.
//!
//! Blur intensity typically arrives from a slider: one call when the drag
//! starts, many while it moves, one when it is released. This module turns
//! such a stream into exactly one undo entry while every intermediate value
//! is shown live.
//!
//! # State machine (per target element)
//!
//! ```text
//!            begin_edit / set_blur(v, false)
//!   Idle ─────────────────────────────────────► Editing
//!    ▲                                            │  update_preview(v)
//!    │        commit_edit / set_blur(v, _)        │  (live only)
//!    └────────────────────────────────────────────┘
//!
//!   set_blur(v, true) from Idle = begin + preview + commit in one call
//! ```
//!
//! # Invariants
//!
//! 1. A target owns at most one filter resource, found by the id
//!    `<target id>_blur`; a second one is never created.
//! 2. The target's `filter` attribute references the resource iff the
//!    current deviation is nonzero. A zero deviation detaches the filter but
//!    leaves the resource in `<defs>`.
//! 3. Committing pushes at most one history entry whose sub-commands run
//!    resource insertion, `filter` change, deviation change, region change.
//! 4. Previews never touch history.

mod editor;
pub mod offsets;
pub mod resource;

use svgedit_core::{DocumentError, NodeId};
use thiserror::Error;

use crate::undo::CommandError;

pub use editor::{BLUR_ENTRY_DESCRIPTION, BeginOutcome, BlurEditor, CommitOutcome, SetBlurOutcome};
pub use offsets::{BlurPolicy, RegionAction};
pub use resource::FilterResource;

/// Errors reported by blur editing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlurError {
    /// Nothing is selected.
    #[error("no element is selected")]
    NoSelection,
    /// The selected element has no `id`, so its filter cannot be named.
    #[error("selected element {0:?} has no id")]
    MissingIdentifier(NodeId),
    /// Deviation is negative, NaN, or infinite.
    #[error("invalid blur deviation {0}: must be finite and non-negative")]
    InvalidDeviation(f64),
    /// An element holds the filter id but is not a well-formed resource.
    #[error("filter resource `{filter_id}` is inconsistent: {reason}")]
    InconsistentResource {
        filter_id: String,
        reason: &'static str,
    },
    /// `begin_edit` on a target that already has an open edit.
    #[error("a blur edit is already open on `{target_id}`")]
    TransactionOpen { target_id: String },
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Reject deviations that cannot be written as a blur.
pub(crate) fn validate_deviation(value: f64) -> Result<f64, BlurError> {
    if value.is_finite() && value >= 0.0 {
        // Normalise -0.0
        Ok(if value == 0.0 { 0.0 } else { value })
    } else {
        Err(BlurError::InvalidDeviation(value))
    }
}
