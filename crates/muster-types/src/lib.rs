//! Foundation types for the Muster patch overlay engine.
//!
//! This crate provides the identity, descriptor, and document-shape types
//! used throughout the engine. Every other Muster crate depends on
//! `muster-types`.
//!
//! # Key Types
//!
//! - [`PatchId`] — Host-supplied logical identity of a patch
//! - [`PatchKind`] — Whether a patch merges into or wholesale-replaces a subtree
//! - [`PatchDescriptor`] — One catalog entry: id, kind, dependencies, metadata
//! - [`ArtifactKind`] — The named per-patch documents (rules, data, locale, brief)
//! - [`CatalogDocument`] — The three accepted catalog shapes, normalized to one
//!   canonical descriptor sequence
//! - [`AppliedPatch`] — A confirmed patch together with its loaded artifacts

pub mod applied;
pub mod artifact;
pub mod catalog;
pub mod patch;

pub use applied::AppliedPatch;
pub use artifact::ArtifactKind;
pub use catalog::{CatalogDocument, DescriptorFields};
pub use patch::{PatchDescriptor, PatchId, PatchKind, PatchMetadata};
