//! Merge engine for the Muster patch overlay engine.
//!
//! Implements the recursive value-tree overlay at the heart of patch
//! composition: mappings merge key-by-key, `null` is the delete sentinel,
//! and scalars and sequences always replace in full. Sequences are never
//! merged element-wise — patch authors specify them whole.
//!
//! # Key Functions
//!
//! - [`merge_value`] — Pure overlay of one value tree onto another
//! - [`merge_tagged`] — The same overlay, stamping [`PATCHED_BY`] provenance
//!   on every mapping the overlay touches or introduces
//! - [`tag_subtree`] / [`provenance`] — Provenance helpers for replaced
//!   subtrees and consumers

pub mod overlay;
pub mod provenance;

pub use overlay::{merge_tagged, merge_value};
pub use provenance::{provenance, tag_subtree, PATCHED_BY};
