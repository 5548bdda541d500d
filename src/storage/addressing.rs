//! Positional Addressing
//!
//! Maps a global block position to the chunk file and byte offset of its slot.
//! Pure arithmetic, no I/O.

use crate::config::Config;

use super::block::slot_size;

/// Location of one slot on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAddress {
    /// Index into the chunk file set (`chunk.<index>`)
    pub chunk: u64,
    /// Byte offset of the slot within that chunk file
    pub offset: u64,
}

/// Resolve `position` to its slot
///
/// `chunk = position / chunk_size`, `offset = (position % chunk_size) * slot_size`.
/// `chunk_size` must be non-zero. The chunk index stays a `u64` so that far
/// positions never alias onto a low chunk on narrow targets.
pub fn locate(position: u64, block_size: u64, chunk_size: u64) -> SlotAddress {
    SlotAddress {
        chunk: position / chunk_size,
        offset: (position % chunk_size).saturating_mul(slot_size(block_size)),
    }
}

/// Block and chunk sizes of an open database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub block_size: u64,
    pub chunk_size: u64,
}

impl Geometry {
    pub fn new(block_size: u64, chunk_size: u64) -> Self {
        Self {
            block_size,
            chunk_size,
        }
    }

    pub fn slot_size(&self) -> u64 {
        slot_size(self.block_size)
    }

    pub fn locate(&self, position: u64) -> SlotAddress {
        locate(position, self.block_size, self.chunk_size)
    }

    /// Number of blocks needed to hold a value of `len` bytes (at least one)
    pub fn blocks_for(&self, len: usize) -> u64 {
        (len as u64).div_ceil(self.block_size).max(1)
    }
}

impl From<&Config> for Geometry {
    fn from(config: &Config) -> Self {
        Self::new(config.block_size, config.chunk_size)
    }
}
