//! Database Module
//!
//! The chain engine that coordinates all storage components.
//!
//! ## Responsibilities
//! - Split values into block chains on append
//! - Walk chains on read, rejecting anything that is not a head
//! - Tombstone chain heads on delete
//! - Own the allocation cursor and persist it with the configuration

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, CursorSync, Options};
use crate::error::{ChunkError, Result};
use crate::storage::{AllocationCursor, Block, ChainIter, ChunkSet, Geometry, END_OF_CHAIN};

/// An open database directory
///
/// ## Ownership Model
///
/// Single-threaded and exclusive: every operation that touches disk takes
/// `&mut self`. Two processes opening the same directory is undefined and
/// must be prevented by the caller.
///
/// The cursor lives in memory and is written to `config.json` on
/// [`Database::close`] (and after each append with [`CursorSync::EveryAppend`]).
/// Dropping a database without closing it loses cursor advances.
pub struct Database {
    /// Database directory
    dir: PathBuf,

    /// Persisted configuration; `next_free_position` is refreshed from the
    /// cursor before each save
    config: Config,

    /// Block and chunk sizes derived from `config`
    geometry: Geometry,

    /// Next unused position
    cursor: AllocationCursor,

    /// Open chunk files
    chunks: ChunkSet,

    /// Runtime options
    options: Options,
}

impl Database {
    /// Create a new database in `dir`
    ///
    /// Fails with `DirectoryAlreadyUsed` if `dir` exists. Writes `chunk.0` and
    /// `config.json` (with the cursor reset to 0), then opens the result.
    pub fn create(dir: impl AsRef<Path>, config: Config) -> Result<Self> {
        Self::create_with(dir, config, Options::default())
    }

    /// Create a new database with explicit runtime options
    pub fn create_with(dir: impl AsRef<Path>, mut config: Config, options: Options) -> Result<Self> {
        let dir = dir.as_ref();

        if dir.exists() {
            return Err(ChunkError::DirectoryAlreadyUsed(dir.to_path_buf()));
        }
        config.validate()?;

        // Step 1: Directory and the first chunk file
        fs::create_dir_all(dir)?;
        ChunkSet::create(dir)?;

        // Step 2: Configuration with a fresh cursor
        config.next_free_position = 0;
        config.save(dir)?;

        tracing::info!(
            "Created database at {} (block_size={}, chunk_size={})",
            dir.display(),
            config.block_size,
            config.chunk_size
        );

        Self::open_with(dir, options)
    }

    /// Open an existing database
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(dir, Options::default())
    }

    /// Open an existing database with explicit runtime options
    pub fn open_with(dir: impl AsRef<Path>, options: Options) -> Result<Self> {
        let dir = dir.as_ref();

        let config = Config::load(dir)?;
        let chunks = ChunkSet::open(dir)?;

        tracing::info!(
            "Opened database at {}: {} chunk file(s), next position {}",
            dir.display(),
            chunks.len(),
            config.next_free_position
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            geometry: Geometry::from(&config),
            cursor: AllocationCursor::new(config.next_free_position),
            config,
            chunks,
            options,
        })
    }

    /// Store a value and return its key (the head position)
    ///
    /// The value is cut into `ceil(len / block_size)` blocks (one empty head
    /// for an empty value). Each block reserves its successor's position before
    /// being written. If a write fails, blocks already written stay on disk
    /// unreachable and their positions stay consumed.
    pub fn append(&mut self, value: &[u8]) -> Result<u64> {
        let result = self.write_chain(value);

        if self.options.cursor_sync == CursorSync::EveryAppend {
            self.persist_config()?;
        }

        result
    }

    fn write_chain(&mut self, value: &[u8]) -> Result<u64> {
        let block_size = self.geometry.block_size as usize;
        let count = self.geometry.blocks_for(value.len());

        let key = self.cursor.next_position();
        let mut position = key;

        for i in 0..count {
            let start = (i as usize).saturating_mul(block_size).min(value.len());
            let end = start.saturating_add(block_size).min(value.len());
            let segment = &value[start..end];

            let next = if i + 1 < count {
                Self::link(self.cursor.next_position())?
            } else {
                END_OF_CHAIN
            };

            let block = if i == 0 {
                Block::head(segment, next)
            } else {
                Block::continuation(segment, next)
            };
            self.write_block(position, &block)?;

            // Only the last iteration sees END_OF_CHAIN, and it exits the loop
            position = next as u64;
        }

        tracing::debug!("Appended {} bytes as key {} ({} block(s))", value.len(), key, count);
        Ok(key)
    }

    /// Read the value stored under `key`
    ///
    /// Fails with `KeyNotFound` if `key` is not a live head: deleted,
    /// mid-chain, never written, or beyond the backing chunk files.
    pub fn read(&mut self, key: u64) -> Result<Vec<u8>> {
        let mut value = Vec::new();
        for block in self.blocks(key) {
            value.extend_from_slice(&block?.payload);
        }
        Ok(value)
    }

    /// Lazily iterate the blocks of the chain headed at `key`
    pub fn blocks(&mut self, key: u64) -> ChainIter<'_> {
        ChainIter::new(&mut self.chunks, self.geometry, key)
    }

    /// Tombstone the head slot at `key`
    ///
    /// Only the head is overwritten; the chain's continuation blocks stay on
    /// disk and are never reclaimed.
    pub fn delete(&mut self, key: u64) -> Result<()> {
        self.write_block(key, &Block::tombstone())?;
        tracing::debug!("Deleted key {}", key);
        Ok(())
    }

    /// Close every chunk file, then persist the configuration
    ///
    /// The configuration is saved even if closing a chunk file failed; the
    /// first error is returned.
    pub fn close(mut self) -> Result<()> {
        let closed = self.chunks.close();
        self.config.next_free_position = self.cursor.peek();
        let saved = self.config.save(&self.dir);

        tracing::info!(
            "Closed database at {} (next position {})",
            self.dir.display(),
            self.config.next_free_position
        );

        closed?;
        saved
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the database directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot of the configuration, with the live cursor value
    pub fn config(&self) -> Config {
        Config {
            next_free_position: self.cursor.peek(),
            ..self.config.clone()
        }
    }

    /// Get the block/chunk geometry
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Position the next append will start at
    pub fn next_free_position(&self) -> u64 {
        self.cursor.peek()
    }

    /// Number of open chunk files
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total slots addressable through the open chunk files
    pub fn capacity(&self) -> u64 {
        self.chunks.capacity_slots(self.geometry.chunk_size)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn write_block(&mut self, position: u64, block: &Block) -> Result<()> {
        let addr = self.geometry.locate(position);
        let bytes = block.encode(self.geometry.block_size);
        self.chunks.write_slot(position, addr, &bytes)
    }

    fn persist_config(&mut self) -> Result<()> {
        self.config.next_free_position = self.cursor.peek();
        self.config.save(&self.dir)
    }

    /// Convert a position into an on-disk `next` link
    fn link(position: u64) -> Result<i64> {
        i64::try_from(position).map_err(|_| {
            ChunkError::Storage(format!("position {} exceeds the addressable range", position))
        })
    }
}
