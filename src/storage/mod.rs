//! Storage Module
//!
//! Fixed-size block slots spread across rotating chunk files.
//!
//! ## Responsibilities
//! - Encode/decode one block per slot
//! - Map a global position to (chunk file, byte offset)
//! - Allocate positions that are never reused
//! - Walk block chains lazily
//!
//! ## Slot Format
//! ```text
//! ┌──────────┬──────────────┬────────────────┬──────────────────────────┐
//! │ Kind (1) │ Next i64 (8) │ Length u64 (8) │ Payload + zero padding   │
//! │          │  -1 = end    │                │   (block_size bytes)     │
//! └──────────┴──────────────┴────────────────┴──────────────────────────┘
//! ```
//! All integers are big-endian. Slot `i` of `chunk.<N>` starts at byte
//! `i * (17 + block_size)` and holds position `N * chunk_size + i`.

mod addressing;
mod block;
mod chain;
mod chunk;
mod cursor;

pub use addressing::{locate, Geometry, SlotAddress};
pub use block::{
    checked_slot_size, slot_size, Block, BlockKind, END_OF_CHAIN, HEADER_SIZE, MAX_BLOCK_SIZE,
};
pub use chain::{read_block, ChainIter};
pub use chunk::ChunkSet;
pub use cursor::AllocationCursor;
