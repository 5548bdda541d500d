//! Chain Iterator
//!
//! Lazily walks the blocks of one stored value by following on-disk `next`
//! links from the head position.

use crate::error::{ChunkError, Result};

use super::addressing::Geometry;
use super::block::{Block, BlockKind, END_OF_CHAIN};
use super::chunk::ChunkSet;

/// Read and decode the block stored at `position`
pub fn read_block(chunks: &mut ChunkSet, geometry: Geometry, position: u64) -> Result<Block> {
    let mut buf = vec![0u8; geometry.slot_size() as usize];
    chunks.read_slot(position, geometry.locate(position), &mut buf)?;
    Block::decode(&buf)
}

/// Iterator over the blocks of a chain, head first
///
/// Yields `Err` at most once and then stops. The first block must be a head
/// (otherwise `KeyNotFound`); every later block must be a continuation. A chain
/// longer than the slot capacity of the open chunk files can only be a cycle and
/// is reported as `MalformedRecord`.
pub struct ChainIter<'a> {
    chunks: &'a mut ChunkSet,
    geometry: Geometry,
    key: u64,
    /// Position to read next; None once finished
    next: Option<u64>,
    /// Blocks yielded so far
    visited: u64,
    /// Upper bound on chain length
    limit: u64,
}

impl<'a> ChainIter<'a> {
    pub fn new(chunks: &'a mut ChunkSet, geometry: Geometry, key: u64) -> Self {
        let limit = chunks.capacity_slots(geometry.chunk_size);
        Self {
            chunks,
            geometry,
            key,
            next: Some(key),
            visited: 0,
            limit,
        }
    }

    /// Head position this iterator started from
    pub fn key(&self) -> u64 {
        self.key
    }

    fn step(&mut self, position: u64) -> Result<Block> {
        if self.visited > 0 && self.visited >= self.limit {
            return Err(ChunkError::MalformedRecord(format!(
                "chain starting at {} exceeds {} blocks (cycle?)",
                self.key, self.limit
            )));
        }

        let block = read_block(&mut *self.chunks, self.geometry, position)?;

        match (self.visited, block.kind) {
            (0, BlockKind::Head) => {}
            (0, _) => return Err(ChunkError::KeyNotFound(self.key)),
            (_, BlockKind::Continuation) => {}
            (_, kind) => {
                return Err(ChunkError::MalformedRecord(format!(
                    "block {} of chain {} has kind {:?}, expected Continuation",
                    position, self.key, kind
                )))
            }
        }

        self.next = match block.next {
            END_OF_CHAIN => None,
            n if n >= 0 => Some(n as u64),
            n => {
                return Err(ChunkError::MalformedRecord(format!(
                    "block {} has invalid next position {}",
                    position, n
                )))
            }
        };
        self.visited += 1;

        Ok(block)
    }
}

impl Iterator for ChainIter<'_> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.next.take()?;
        Some(self.step(position))
    }
}
