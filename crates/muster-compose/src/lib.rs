//! Composition for the Muster patch overlay engine.
//!
//! A composition folds a base document through zero or more patch documents
//! in selection order, producing one merged artifact. Later patches win
//! conflicts. The fold never raises: a patch whose document is missing or
//! malformed simply contributes nothing, because a broken patch must
//! degrade to "its effect is missing", never to "the base app is unusable".
//!
//! # Key Types
//!
//! - [`Compositor`] — loads base and patch documents and drives the fold
//! - [`compose_rules`] / [`compose_mixed`] — pure specializations for
//!   faction-keyed rule trees and multi-section documents
//! - [`RecomposeGate`] — generation counter discarding superseded
//!   recompositions ("last request wins")

pub mod compositor;
pub mod document;
pub mod gate;

pub use compositor::{compose_mixed, compose_rules, Compositor};
pub use document::PatchDocument;
pub use gate::{RecomposeGate, RecomposeTicket};
