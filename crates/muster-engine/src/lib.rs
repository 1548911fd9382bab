//! High-level facade for the Muster patch overlay engine.
//!
//! Wires the subsystems together — catalog, document loader, compositor,
//! dependency orderer, and the shared patch bus — behind one API. This is
//! the main entry point for applications embedding the engine.

pub mod engine;
pub mod error;

pub use engine::OverlayEngine;
pub use error::{EngineError, EngineResult};

// Re-export key types
pub use muster_bus::{BusConfig, PatchBus};
pub use muster_catalog::{CatalogConfig, DocumentSource, InMemoryDocumentSource};
pub use muster_merge::{provenance, PATCHED_BY};
pub use muster_order::{ProvisionalSelection, SelectionOrderer};
pub use muster_types::{AppliedPatch, ArtifactKind, PatchDescriptor, PatchId, PatchKind};
