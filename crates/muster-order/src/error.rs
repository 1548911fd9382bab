//! Error types for selection ordering.

use muster_types::PatchId;

/// Errors that can occur while ordering a selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    /// The selected patches' dependencies form a cycle.
    #[error("dependency cycle among patches: {0:?}")]
    DependencyCycle(Vec<PatchId>),

    /// The patch is not present in the catalog.
    #[error("unknown patch: {0}")]
    UnknownPatch(PatchId),

    /// A declared dependency is not present in the catalog, so the patch
    /// cannot be selected.
    #[error("patch {patch} depends on {dependency}, which is not in the catalog")]
    MissingDependency {
        patch: PatchId,
        dependency: PatchId,
    },
}

/// Convenience alias for ordering results.
pub type OrderResult<T> = Result<T, OrderError>;
