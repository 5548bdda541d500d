//! Block Codec
//!
//! Encodes and decodes the fixed-size on-disk record that backs one position.

use bytes::{Buf, BufMut};

use crate::error::{ChunkError, Result};

/// Header size: Kind (1) + Next (8) + Length (8) = 17 bytes
pub const HEADER_SIZE: u64 = 17;

/// `next` value marking the last block of a chain
pub const END_OF_CHAIN: i64 = -1;

/// Largest block size a database may be created with (16 MiB)
pub const MAX_BLOCK_SIZE: u64 = 16 * 1024 * 1024;

/// Bytes occupied by one slot, or None if that does not fit in a u64
pub fn checked_slot_size(block_size: u64) -> Option<u64> {
    HEADER_SIZE.checked_add(block_size)
}

/// Bytes occupied by one slot for the given block size
///
/// Saturates instead of overflowing; validated configs never get near it.
pub fn slot_size(block_size: u64) -> u64 {
    HEADER_SIZE.saturating_add(block_size)
}

/// Role of a block within its chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BlockKind {
    /// Deleted chain head (also what an all-zero, never-written slot decodes to)
    Tombstone = 0,
    /// First block of a chain; the only valid entry point for reads
    Head = 1,
    /// Any block after the head
    Continuation = 2,
}

impl TryFrom<u8> for BlockKind {
    type Error = ChunkError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(BlockKind::Tombstone),
            1 => Ok(BlockKind::Head),
            2 => Ok(BlockKind::Continuation),
            other => Err(ChunkError::MalformedRecord(format!("unknown block kind {}", other))),
        }
    }
}

/// A single decoded block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Position of the next block, or [`END_OF_CHAIN`]
    pub next: i64,
    /// Number of meaningful payload bytes
    pub length: u64,
    pub payload: Vec<u8>,
}

impl Block {
    /// Head block carrying the first segment of a value
    pub fn head(payload: &[u8], next: i64) -> Self {
        Self::with_kind(BlockKind::Head, payload, next)
    }

    /// Block carrying any later segment of a value
    pub fn continuation(payload: &[u8], next: i64) -> Self {
        Self::with_kind(BlockKind::Continuation, payload, next)
    }

    /// Empty terminal block that replaces a deleted head
    pub fn tombstone() -> Self {
        Self::with_kind(BlockKind::Tombstone, &[], END_OF_CHAIN)
    }

    fn with_kind(kind: BlockKind, payload: &[u8], next: i64) -> Self {
        Self {
            kind,
            next,
            length: payload.len() as u64,
            payload: payload.to_vec(),
        }
    }

    /// Whether this block terminates its chain
    pub fn is_last(&self) -> bool {
        self.next == END_OF_CHAIN
    }

    /// Serialize into a slot image of `HEADER_SIZE + block_size` bytes
    ///
    /// Layout (big-endian): `[kind: u8][next: i64][length: u64][payload][zero padding]`.
    /// The payload is not checked against `length` or `block_size`; an
    /// oversized payload yields an oversized image.
    pub fn encode(&self, block_size: u64) -> Vec<u8> {
        let slot = slot_size(block_size) as usize;
        let mut buf = Vec::with_capacity(slot);

        buf.put_u8(self.kind as u8);
        buf.put_i64(self.next);
        buf.put_u64(self.length);
        buf.put_slice(&self.payload);

        if buf.len() < slot {
            buf.resize(slot, 0);
        }
        buf
    }

    /// Parse a slot image
    ///
    /// Only `length` payload bytes are taken; trailing padding is ignored.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if (buf.len() as u64) < HEADER_SIZE {
            return Err(ChunkError::MalformedRecord(format!(
                "record of {} bytes is shorter than the {}-byte header",
                buf.len(),
                HEADER_SIZE
            )));
        }

        let mut cursor = buf;
        let kind = BlockKind::try_from(cursor.get_u8())?;
        let next = cursor.get_i64();
        let length = cursor.get_u64();

        if length > cursor.remaining() as u64 {
            return Err(ChunkError::MalformedRecord(format!(
                "declared length {} exceeds the {} payload bytes available",
                length,
                cursor.remaining()
            )));
        }

        Ok(Self {
            kind,
            next,
            length,
            payload: cursor[..length as usize].to_vec(),
        })
    }
}
