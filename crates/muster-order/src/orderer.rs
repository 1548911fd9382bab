//! Order repair and dependency cascades over a descriptor set.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use muster_types::{PatchDescriptor, PatchId};

use crate::error::{OrderError, OrderResult};

/// Repairs and manipulates selection orders against the dependency graph
/// declared by a set of catalog descriptors.
///
/// Dependencies on patches absent from the *selection* are ignored (they
/// simply do not constrain the order); dependencies absent from the
/// *catalog* block selection of the dependent patch.
pub struct SelectionOrderer {
    descriptors: HashMap<PatchId, PatchDescriptor>,
}

impl SelectionOrderer {
    /// Build an orderer from catalog descriptors.
    pub fn new(descriptors: impl IntoIterator<Item = PatchDescriptor>) -> Self {
        Self {
            descriptors: descriptors
                .into_iter()
                .map(|d| (d.id.clone(), d))
                .collect(),
        }
    }

    /// Number of known descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if no descriptors are known.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Declared dependencies of a patch; unknown patches have none.
    fn deps_of(&self, id: &PatchId) -> &[PatchId] {
        self.descriptors
            .get(id)
            .map(|d| d.dependencies())
            .unwrap_or(&[])
    }

    /// All patches in `order` that (directly) depend on `id`.
    fn dependents_in<'a>(&self, order: &'a [PatchId], id: &PatchId) -> Vec<&'a PatchId> {
        order
            .iter()
            .filter(|candidate| self.deps_of(candidate).contains(id))
            .collect()
    }

    // ---------------------------------------------------------------
    // Order repair
    // ---------------------------------------------------------------

    /// Repair a candidate order so every dependency precedes its dependents.
    ///
    /// Duplicates are dropped (first occurrence wins). The repair scans
    /// repeatedly, relocating a late dependency immediately before its
    /// dependent, until a fixed point. A dependency cycle among the
    /// selected patches is detected first and reported instead of looping.
    pub fn normalize(&self, order: &[PatchId]) -> OrderResult<Vec<PatchId>> {
        let mut repaired: Vec<PatchId> = Vec::with_capacity(order.len());
        for id in order {
            if !repaired.contains(id) {
                repaired.push(id.clone());
            }
        }

        self.check_acyclic(&repaired)?;

        let mut changed = true;
        while changed {
            changed = false;
            'scan: for i in 0..repaired.len() {
                let deps = self.deps_of(&repaired[i]).to_vec();
                for dep in deps {
                    if let Some(pos) = repaired.iter().position(|x| *x == dep) {
                        if pos > i {
                            let moved = repaired.remove(pos);
                            repaired.insert(i, moved);
                            changed = true;
                            break 'scan;
                        }
                    }
                }
            }
        }

        Ok(repaired)
    }

    /// Kahn's algorithm over the selected subgraph: if any selected patch
    /// remains after peeling all zero-in-degree patches, those remaining
    /// form the cycle.
    fn check_acyclic(&self, selected: &[PatchId]) -> OrderResult<()> {
        let selected_set: HashSet<&PatchId> = selected.iter().collect();
        let mut in_degree: HashMap<PatchId, usize> =
            selected.iter().map(|id| (id.clone(), 0)).collect();
        let mut dependents: HashMap<PatchId, Vec<PatchId>> = HashMap::new();

        for id in selected {
            for dep in self.deps_of(id) {
                if selected_set.contains(dep) {
                    *in_degree.get_mut(id).expect("selected id") += 1;
                    dependents.entry(dep.clone()).or_default().push(id.clone());
                }
            }
        }

        let mut queue: VecDeque<PatchId> = selected
            .iter()
            .filter(|id| in_degree[*id] == 0)
            .cloned()
            .collect();
        let mut peeled = 0usize;

        while let Some(current) = queue.pop_front() {
            peeled += 1;
            if let Some(children) = dependents.get(&current) {
                for child in children.clone() {
                    let degree = in_degree.get_mut(&child).expect("selected id");
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(child);
                    }
                }
            }
        }

        if peeled == selected.len() {
            Ok(())
        } else {
            let mut members: Vec<PatchId> = in_degree
                .into_iter()
                .filter(|(_, degree)| *degree > 0)
                .map(|(id, _)| id)
                .collect();
            members.sort();
            Err(OrderError::DependencyCycle(members))
        }
    }

    // ---------------------------------------------------------------
    // Select / deselect cascades
    // ---------------------------------------------------------------

    /// Add a patch plus any unselected transitive dependencies, then
    /// normalize.
    pub fn select(&self, current: &[PatchId], id: &PatchId) -> OrderResult<Vec<PatchId>> {
        if !self.descriptors.contains_key(id) {
            return Err(OrderError::UnknownPatch(id.clone()));
        }

        let mut order = current.to_vec();
        let mut seen: HashSet<PatchId> = current.iter().cloned().collect();
        let mut stack = vec![id.clone()];

        while let Some(next) = stack.pop() {
            if !seen.insert(next.clone()) {
                continue;
            }
            order.push(next.clone());
            for dep in self.deps_of(&next) {
                if !self.descriptors.contains_key(dep) {
                    return Err(OrderError::MissingDependency {
                        patch: next.clone(),
                        dependency: dep.clone(),
                    });
                }
                if !seen.contains(dep) {
                    stack.push(dep.clone());
                }
            }
        }

        debug!(patch = %id, selected = order.len(), "patch selected");
        self.normalize(&order)
    }

    /// Remove a patch and cascade removal through everything that
    /// (transitively) depends on it.
    pub fn deselect(&self, current: &[PatchId], id: &PatchId) -> Vec<PatchId> {
        let mut removed: HashSet<PatchId> = HashSet::new();
        removed.insert(id.clone());

        let mut changed = true;
        while changed {
            changed = false;
            for candidate in current {
                if removed.contains(candidate) {
                    continue;
                }
                if self.deps_of(candidate).iter().any(|d| removed.contains(d)) {
                    removed.insert(candidate.clone());
                    changed = true;
                }
            }
        }

        debug!(patch = %id, removed = removed.len(), "patch deselected");
        current
            .iter()
            .filter(|candidate| !removed.contains(candidate))
            .cloned()
            .collect()
    }

    // ---------------------------------------------------------------
    // Manual reorder
    // ---------------------------------------------------------------

    /// Lowest index `id` may occupy: just after its last dependency.
    fn min_index(&self, order: &[PatchId], id: &PatchId) -> usize {
        self.deps_of(id)
            .iter()
            .filter_map(|dep| order.iter().position(|x| x == dep))
            .map(|pos| pos + 1)
            .max()
            .unwrap_or(0)
    }

    /// Highest index `id` may occupy: just before its first dependent.
    fn max_index(&self, order: &[PatchId], id: &PatchId) -> usize {
        self.dependents_in(order, id)
            .iter()
            .filter_map(|dep| order.iter().position(|x| x == *dep))
            .map(|pos| pos.saturating_sub(1))
            .min()
            .unwrap_or(order.len().saturating_sub(1))
    }

    /// Whether `id` can move one step earlier without preceding a
    /// dependency.
    pub fn can_move_up(&self, order: &[PatchId], id: &PatchId) -> bool {
        match order.iter().position(|x| x == id) {
            Some(i) => i > 0 && i - 1 >= self.min_index(order, id),
            None => false,
        }
    }

    /// Whether `id` can move one step later without following a dependent.
    pub fn can_move_down(&self, order: &[PatchId], id: &PatchId) -> bool {
        match order.iter().position(|x| x == id) {
            Some(i) => i + 1 <= self.max_index(order, id),
            None => false,
        }
    }

    /// Move `id` one step earlier, if the dependency clamp allows it.
    pub fn move_up(&self, order: &[PatchId], id: &PatchId) -> Vec<PatchId> {
        let mut order = order.to_vec();
        if self.can_move_up(&order, id) {
            let i = order.iter().position(|x| x == id).expect("checked above");
            order.swap(i, i - 1);
        }
        order
    }

    /// Move `id` one step later, if the dependency clamp allows it.
    pub fn move_down(&self, order: &[PatchId], id: &PatchId) -> Vec<PatchId> {
        let mut order = order.to_vec();
        if self.can_move_down(&order, id) {
            let i = order.iter().position(|x| x == id).expect("checked above");
            order.swap(i, i + 1);
        }
        order
    }
}

impl std::fmt::Debug for SelectionOrderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionOrderer")
            .field("descriptor_count", &self.descriptors.len())
            .finish()
    }
}
