//! Shared patch bus for the Muster patch overlay engine.
//!
//! Independent UI surfaces — the unit browser, rule lookup, the legality
//! checker — must observe one authoritative "currently applied" patch set
//! without sharing an ancestor. The bus is that single point of truth: the
//! confirmed selection plus two derived caches (merged locale strings and
//! merged rules), published over broadcast channels.
//!
//! Published state is an immutable value: reads hand out defensive copies,
//! and notifications travel as messages a subscriber consumes on its own
//! task, so a setter can never re-enter subscriber code synchronously.

pub mod bus;

pub use bus::{BusConfig, PatchBus};
