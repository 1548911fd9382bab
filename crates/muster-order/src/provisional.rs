//! The editable, not-yet-confirmed selection.

use muster_types::{PatchDescriptor, PatchId};

use crate::error::OrderResult;
use crate::orderer::SelectionOrderer;

/// An editable ordered selection, distinct from the confirmed one.
///
/// UI surfaces mutate a provisional selection freely (toggle, reorder,
/// reset); it only reaches the authoritative confirmed set through an
/// explicit confirm.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProvisionalSelection {
    order: Vec<PatchId>,
}

impl ProvisionalSelection {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// A selection seeded with the given ids, in the given order.
    pub fn from_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PatchId>,
    {
        Self {
            order: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// The current order.
    pub fn as_slice(&self) -> &[PatchId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &PatchId) -> bool {
        self.order.contains(id)
    }

    /// Select the patch if absent, deselect (with cascade) if present.
    pub fn toggle(&mut self, orderer: &SelectionOrderer, id: &PatchId) -> OrderResult<()> {
        if self.contains(id) {
            self.order = orderer.deselect(&self.order, id);
        } else {
            self.order = orderer.select(&self.order, id)?;
        }
        Ok(())
    }

    /// Move the patch one step earlier, clamped by its dependencies.
    pub fn move_up(&mut self, orderer: &SelectionOrderer, id: &PatchId) {
        self.order = orderer.move_up(&self.order, id);
    }

    /// Move the patch one step later, clamped by its dependents.
    pub fn move_down(&mut self, orderer: &SelectionOrderer, id: &PatchId) {
        self.order = orderer.move_down(&self.order, id);
    }

    /// Discard edits and return to a previously confirmed order.
    pub fn reset_to(&mut self, confirmed: &[PatchId]) {
        self.order = confirmed.to_vec();
    }

    /// Drop entries no longer present in the catalog (post-reload
    /// reconciliation).
    pub fn retain_available(&mut self, available: &[PatchDescriptor]) {
        self.order
            .retain(|id| available.iter().any(|d| &d.id == id));
    }

    /// Empty the selection.
    pub fn clear(&mut self) {
        self.order.clear();
    }
}
