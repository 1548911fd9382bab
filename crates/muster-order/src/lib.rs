//! Dependency ordering for the Muster patch overlay engine.
//!
//! Patch selections are ordered sequences whose order must respect the
//! dependency partial order: if A depends on B, B precedes A. This crate
//! repairs candidate orders, cascades select/deselect through the
//! dependency graph, and clamps manual reordering.
//!
//! Dependency graphs are expected to be acyclic; a cycle is detected up
//! front and reported as [`OrderError::DependencyCycle`] rather than left
//! to send the fixed-point repair into an endless loop.

pub mod error;
pub mod orderer;
pub mod provisional;

pub use error::{OrderError, OrderResult};
pub use orderer::SelectionOrderer;
pub use provisional::ProvisionalSelection;
