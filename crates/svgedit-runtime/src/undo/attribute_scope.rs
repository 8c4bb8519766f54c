#![forbid(unsafe_code)]

//! Attribute-level undoable-change scopes.
//!
//! An [`AttributeScope`] snapshots one attribute on a set of elements, lets
//! the caller mutate those attributes any number of times without touching
//! history, and on [`finish`](AttributeScope::finish) turns the net
//! difference into a single [`CommandBatch`].
//!
//! ```text
//! begin("stdDeviation", [blur])     snapshot: blur = "5"
//!   set "8" / set "9" / set "10"    live only, nothing recorded
//! finish()                          batch: [Change stdDeviation "5" -> "10"]
//! ```

use svgedit_core::{Document, NodeId};

use super::command::{ChangeElementCmd, CommandBatch};

/// An open undoable change over one attribute.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "an attribute scope records nothing until finished"]
pub struct AttributeScope {
    attribute: String,
    before: Vec<(NodeId, Option<String>)>,
}

impl AttributeScope {
    /// Snapshot `attribute` on every element in `nodes`.
    ///
    /// Nodes missing from the document are snapshotted as absent.
    pub fn begin(
        doc: &Document,
        attribute: impl Into<String>,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> Self {
        let attribute = attribute.into();
        let before = nodes
            .into_iter()
            .map(|node| (node, doc.attribute(node, &attribute).map(str::to_owned)))
            .collect();
        Self { attribute, before }
    }

    /// Attribute this scope tracks.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Elements this scope tracks.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.before.iter().map(|(node, _)| *node)
    }

    /// Close the scope, recording one change per element whose value differs
    /// from the snapshot. The returned batch is empty if nothing changed.
    pub fn finish(self, doc: &Document) -> CommandBatch {
        let mut batch = CommandBatch::new(format!("Change {}", self.attribute));
        for (node, old_value) in self.before {
            let new_value = doc.attribute(node, &self.attribute).map(str::to_owned);
            if new_value != old_value {
                batch.push_executed(Box::new(ChangeElementCmd::new(
                    node,
                    self.attribute.clone(),
                    old_value,
                    new_value,
                )));
            }
        }
        batch
    }
}
