//! Synthetic identity allocation.

use crate::model::BusId;

/// Allocator for synthetic bus identities.
///
/// IDs are monotonically increasing and never reused for the lifetime of
/// the allocator. One allocator is owned per tracked stop and passed into
/// each reconciliation, so identity uniqueness holds across every lane of
/// that stop without any ambient global state.
#[derive(Debug)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Create an allocator starting at ID 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Mint the next identity.
    pub fn next_id(&mut self) -> BusId {
        let id = BusId(self.next);
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
