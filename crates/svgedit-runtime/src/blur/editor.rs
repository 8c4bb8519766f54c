#![forbid(unsafe_code)]

//! Blur edit coordinator.

use ahash::AHashMap;
use svgedit_core::{Document, EngineCapabilities, ID_ATTR, NodeId};

use super::offsets::{self, BlurPolicy, REGION_ATTRS, RegionAction};
use super::resource::{FILTER_ATTR, FilterResource, STD_DEVIATION_ATTR, filter_url};
use super::{BlurError, validate_deviation};
use crate::canvas::EditHost;
use crate::undo::{AttributeScope, ChangeElementCmd, CommandBatch, InsertElementCmd};

/// Description of the history entry a committed blur edit produces.
pub const BLUR_ENTRY_DESCRIPTION: &str = "Change blur";

/// Result of [`BlurEditor::begin_edit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginOutcome {
    /// An edit is now open on the target.
    Opened,
    /// Zero deviation on a target without a resource: nothing to do.
    NothingToEdit,
}

/// Result of closing an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// One history entry was pushed.
    Recorded { sub_commands: usize },
    /// The edit ended where it started; nothing was pushed.
    Unchanged,
    /// No edit was open on the target.
    NoTransaction,
}

/// Result of the two-call [`BlurEditor::set_blur`] protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetBlurOutcome {
    /// An edit was opened and stays open for previews.
    Opened,
    /// The call closed an edit.
    Finished(CommitOutcome),
    /// Zero deviation on a target without a resource.
    NothingToEdit,
}

/// In-progress edit on one target.
#[derive(Debug)]
struct PendingEdit {
    target_id: String,
    resource: FilterResource,
    /// Set when this edit created the resource.
    inserted: Option<InsertElementCmd>,
    filter_before: Option<String>,
    deviation: AttributeScope,
    region: Vec<AttributeScope>,
    /// The target's `filter` attribute is currently detached.
    hidden: bool,
}

/// Coordinates blur edits into single undo entries.
///
/// One editor serves a whole canvas; open edits are keyed by target element
/// so an edit left open on one element is not clobbered by another.
#[derive(Debug, Default)]
pub struct BlurEditor {
    caps: EngineCapabilities,
    policy: BlurPolicy,
    pending: AHashMap<NodeId, PendingEdit>,
}

impl BlurEditor {
    /// Create an editor for an engine with the given capabilities.
    #[must_use]
    pub fn new(caps: EngineCapabilities) -> Self {
        Self::with_policy(caps, BlurPolicy::default())
    }

    /// Create an editor with custom region geometry.
    #[must_use]
    pub fn with_policy(caps: EngineCapabilities, policy: BlurPolicy) -> Self {
        Self {
            caps,
            policy,
            pending: AHashMap::new(),
        }
    }

    #[must_use]
    pub fn capabilities(&self) -> EngineCapabilities {
        self.caps
    }

    #[must_use]
    pub fn policy(&self) -> &BlurPolicy {
        &self.policy
    }

    /// Whether an edit is open on `target`.
    #[must_use]
    pub fn is_editing(&self, target: NodeId) -> bool {
        self.pending.contains_key(&target)
    }

    /// Number of open edits.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Open an edit on the selected element and show `value` live.
    ///
    /// Creates the filter resource if the element has none. A zero value on
    /// an element without a resource opens nothing.
    pub fn begin_edit<H: EditHost + ?Sized>(
        &mut self,
        host: &mut H,
        value: f64,
    ) -> Result<BeginOutcome, BlurError> {
        let value = validate_deviation(value)?;
        let (target, target_id) = selected_target(host)?;
        if self.pending.contains_key(&target) {
            return Err(BlurError::TransactionOpen { target_id });
        }
        self.open(host.document_mut(), target, target_id, value)
    }

    /// Show `value` live on the selected element without recording history.
    ///
    /// With no open edit on the element this opens one first.
    pub fn update_preview<H: EditHost + ?Sized>(
        &mut self,
        host: &mut H,
        value: f64,
    ) -> Result<(), BlurError> {
        let value = validate_deviation(value)?;
        let (target, target_id) = selected_target(host)?;
        if !self.pending.contains_key(&target) {
            tracing::trace!(target: "svgedit.blur", target_id = %target_id, "preview without open edit; opening one");
            self.open(host.document_mut(), target, target_id, value)?;
            return Ok(());
        }
        self.preview(host.document_mut(), target, value)
    }

    /// Alias of [`update_preview`](Self::update_preview).
    pub fn set_blur_no_undo<H: EditHost + ?Sized>(
        &mut self,
        host: &mut H,
        value: f64,
    ) -> Result<(), BlurError> {
        self.update_preview(host, value)
    }

    /// Close the edit on the selected element and record it.
    pub fn commit_edit<H: EditHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<CommitOutcome, BlurError> {
        let target = host.selected_element().ok_or(BlurError::NoSelection)?;
        self.commit_edit_for(host, target)
    }

    /// Close the edit on a specific element, selected or not.
    ///
    /// Without an open edit this is a logged no-op.
    pub fn commit_edit_for<H: EditHost + ?Sized>(
        &mut self,
        host: &mut H,
        target: NodeId,
    ) -> Result<CommitOutcome, BlurError> {
        let Some(edit) = self.pending.remove(&target) else {
            tracing::warn!(target: "svgedit.blur", node = ?target, "commit without an open blur edit ignored");
            return Ok(CommitOutcome::NoTransaction);
        };

        let doc = host.document();
        let mut entry = CommandBatch::new(BLUR_ENTRY_DESCRIPTION);
        if let Some(inserted) = edit.inserted {
            entry.push_executed(Box::new(inserted));
        }
        let filter_after = doc.attribute(target, FILTER_ATTR).map(str::to_owned);
        if filter_after != edit.filter_before {
            entry.push_executed(Box::new(ChangeElementCmd::new(
                target,
                FILTER_ATTR,
                edit.filter_before,
                filter_after,
            )));
        }
        let deviation = edit.deviation.finish(doc);
        if !deviation.is_empty() {
            entry.push_executed(Box::new(deviation));
        }
        let mut region = CommandBatch::new("Change filter region");
        for scope in edit.region {
            let changed = scope.finish(doc);
            if !changed.is_empty() {
                region.push_executed(Box::new(changed));
            }
        }
        if !region.is_empty() {
            entry.push_executed(Box::new(region));
        }

        if entry.is_empty() {
            tracing::debug!(target: "svgedit.blur", target_id = %edit.target_id, "blur edit closed without changes");
            return Ok(CommitOutcome::Unchanged);
        }
        let sub_commands = entry.len();
        tracing::debug!(
            target: "svgedit.blur",
            target_id = %edit.target_id,
            sub_commands,
            "blur edit committed"
        );
        host.push_history(Box::new(entry));
        Ok(CommitOutcome::Recorded { sub_commands })
    }

    /// Close every open edit, oldest target first, and record each.
    ///
    /// Hosts call this before replaying history so no open edit outlives
    /// the resource it previews. Returns how many entries were recorded.
    pub fn commit_all<H: EditHost + ?Sized>(&mut self, host: &mut H) -> Result<usize, BlurError> {
        let mut targets: Vec<NodeId> = self.pending.keys().copied().collect();
        targets.sort_unstable();
        let mut recorded = 0;
        for target in targets {
            if let CommitOutcome::Recorded { .. } = self.commit_edit_for(host, target)? {
                recorded += 1;
            }
        }
        Ok(recorded)
    }

    /// Two-call entry point for slider-style drivers.
    ///
    /// If an edit is open on the selected element, this call is terminal:
    /// `value` is shown and the edit is committed. Otherwise an edit is
    /// opened, and with `complete` it is committed in the same call.
    pub fn set_blur<H: EditHost + ?Sized>(
        &mut self,
        host: &mut H,
        value: f64,
        complete: bool,
    ) -> Result<SetBlurOutcome, BlurError> {
        let value = validate_deviation(value)?;
        let (target, target_id) = selected_target(host)?;

        if self.pending.contains_key(&target) {
            self.preview(host.document_mut(), target, value)?;
            let outcome = self.commit_edit_for(host, target)?;
            return Ok(SetBlurOutcome::Finished(outcome));
        }

        match self.open(host.document_mut(), target, target_id, value)? {
            BeginOutcome::NothingToEdit => Ok(SetBlurOutcome::NothingToEdit),
            BeginOutcome::Opened if complete => {
                let outcome = self.commit_edit_for(host, target)?;
                Ok(SetBlurOutcome::Finished(outcome))
            }
            BeginOutcome::Opened => Ok(SetBlurOutcome::Opened),
        }
    }

    /// Size `filter`'s region for `std_deviation` under this editor's
    /// capabilities and policy. Not recorded in history.
    pub fn compute_offsets(
        &self,
        doc: &mut Document,
        filter: NodeId,
        std_deviation: f64,
    ) -> Result<RegionAction, BlurError> {
        let action = offsets::apply_region(
            doc,
            filter,
            std_deviation,
            self.caps.stale_filter_cache,
            &self.policy,
        )?;
        Ok(action)
    }

    fn open(
        &mut self,
        doc: &mut Document,
        target: NodeId,
        target_id: String,
        value: f64,
    ) -> Result<BeginOutcome, BlurError> {
        let (resource, inserted) = match FilterResource::locate(doc, &target_id)? {
            Some(resource) => (resource, None),
            None if value == 0.0 => {
                tracing::debug!(target: "svgedit.blur", target_id = %target_id, "zero blur on element without filter");
                return Ok(BeginOutcome::NothingToEdit);
            }
            None => {
                let resource = FilterResource::create(doc, &target_id, value)?;
                let inserted = InsertElementCmd::capture(doc, resource.filter)?;
                (resource, Some(inserted))
            }
        };

        let filter_before = doc.attribute(target, FILTER_ATTR).map(str::to_owned);
        let hidden = filter_before.as_deref() != Some(filter_url(&target_id).as_str());
        let deviation = AttributeScope::begin(doc, STD_DEVIATION_ATTR, [resource.primitive]);
        let region: Vec<_> = REGION_ATTRS
            .iter()
            .map(|name| AttributeScope::begin(&*doc, *name, [resource.filter]))
            .collect();

        tracing::debug!(
            target: "svgedit.blur",
            target_id = %target_id,
            created = inserted.is_some(),
            std_deviation = value,
            "blur edit opened"
        );
        self.pending.insert(
            target,
            PendingEdit {
                target_id,
                resource,
                inserted,
                filter_before,
                deviation,
                region,
                hidden,
            },
        );
        self.preview(doc, target, value)?;
        Ok(BeginOutcome::Opened)
    }

    fn preview(&mut self, doc: &mut Document, target: NodeId, value: f64) -> Result<(), BlurError> {
        let Some(edit) = self.pending.get_mut(&target) else {
            return Ok(());
        };

        if value == 0.0 {
            doc.remove_attribute(target, FILTER_ATTR)?;
            edit.hidden = true;
            tracing::trace!(target: "svgedit.blur", target_id = %edit.target_id, "blur preview detached");
            return Ok(());
        }

        let url = filter_url(&edit.target_id);
        if edit.hidden {
            doc.set_attribute(target, FILTER_ATTR, url.clone())?;
            edit.hidden = false;
        }
        if self.caps.stale_filter_cache {
            // Reattach so the engine drops its cached filter output
            doc.remove_attribute(target, FILTER_ATTR)?;
            doc.set_attribute(target, FILTER_ATTR, url)?;
        }
        edit.resource.write_std_deviation(doc, value)?;
        let action = offsets::apply_region(
            doc,
            edit.resource.filter,
            value,
            self.caps.stale_filter_cache,
            &self.policy,
        )?;
        tracing::trace!(
            target: "svgedit.blur",
            target_id = %edit.target_id,
            std_deviation = value,
            region = ?action,
            "blur preview"
        );
        Ok(())
    }
}

/// First selected element and its id.
fn selected_target<H: EditHost + ?Sized>(host: &H) -> Result<(NodeId, String), BlurError> {
    let target = host.selected_element().ok_or(BlurError::NoSelection)?;
    let id = host
        .document()
        .element(target)?
        .attribute(ID_ATTR)
        .filter(|id| !id.is_empty())
        .ok_or(BlurError::MissingIdentifier(target))?;
    Ok((target, id.to_owned()))
}
