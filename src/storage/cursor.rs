//! Allocation Cursor
//!
//! Hands out block positions in strictly increasing order. Positions are never
//! reissued, so space taken by deleted chains is never reused.

/// The next unused block position of a database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocationCursor {
    next: u64,
}

impl AllocationCursor {
    /// Resume from a persisted `nextFreePosition`
    pub fn new(next: u64) -> Self {
        Self { next }
    }

    /// Return the current position and advance past it
    pub fn next_position(&mut self) -> u64 {
        let position = self.next;
        self.next += 1;
        position
    }

    /// The position the next call to `next_position` will return
    pub fn peek(&self) -> u64 {
        self.next
    }
}
