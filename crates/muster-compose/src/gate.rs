//! "Last request wins" for overlapping recompositions.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing generation counter for recomposition requests.
///
/// Each selection change begins a new generation; a composition that
/// finishes after a newer one began checks its ticket and discards its
/// result. The underlying fetches are not cancelled — a superseded
/// composition simply never publishes.
#[derive(Debug, Default)]
pub struct RecomposeGate {
    generation: AtomicU64,
}

/// Proof of which generation a recomposition belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecomposeTicket {
    generation: u64,
}

impl RecomposeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, superseding all earlier tickets.
    pub fn begin(&self) -> RecomposeTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        RecomposeTicket { generation }
    }

    /// Whether the ticket still belongs to the newest generation.
    pub fn is_current(&self, ticket: &RecomposeTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }
}
