//! Configuration for chunkkv
//!
//! Two kinds of settings live here:
//! - [`Config`]: the persisted record stored as `config.json` in the database
//!   directory (block size, chunk size, allocation cursor)
//! - [`Options`]: runtime knobs chosen by the process opening the database

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChunkError, Result};
use crate::storage::{checked_slot_size, MAX_BLOCK_SIZE};

/// Name of the configuration file inside a database directory
pub const CONFIG_FILENAME: &str = "config.json";

/// Persisted configuration of a database
///
/// Serialized as `{"blockSize":..,"chunkSize":..,"nextFreePosition":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    // -------------------------------------------------------------------------
    // Geometry (fixed at creation)
    // -------------------------------------------------------------------------
    /// Max payload bytes per block
    pub block_size: u64,

    /// Max blocks per chunk file
    pub chunk_size: u64,

    // -------------------------------------------------------------------------
    // Allocation State
    // -------------------------------------------------------------------------
    /// Next unused block position (the allocation cursor)
    #[serde(default)]
    pub next_free_position: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: 100,
            chunk_size: 10_000,
            next_free_position: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject geometries that cannot address any slot
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(ChunkError::Config("block size must be greater than zero".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(ChunkError::Config("chunk size must be greater than zero".to_string()));
        }
        if self.block_size > MAX_BLOCK_SIZE {
            return Err(ChunkError::Config(format!(
                "block size {} exceeds the maximum of {}",
                self.block_size, MAX_BLOCK_SIZE
            )));
        }

        // Every byte offset inside a chunk file must fit in a u64
        let chunk_bytes = checked_slot_size(self.block_size)
            .and_then(|slot| slot.checked_mul(self.chunk_size));
        if chunk_bytes.is_none() {
            return Err(ChunkError::Config(format!(
                "chunk of {} blocks of {} bytes overflows the file offset range",
                self.chunk_size, self.block_size
            )));
        }
        Ok(())
    }

    /// Load `config.json` from a database directory
    pub fn load(dir: &Path) -> Result<Self> {
        let raw = fs::read(dir.join(CONFIG_FILENAME))?;
        let config: Config = serde_json::from_slice(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Write `config.json` into a database directory, replacing any previous content
    pub fn save(&self, dir: &Path) -> Result<()> {
        let raw = serde_json::to_vec(self)?;
        fs::write(dir.join(CONFIG_FILENAME), raw)?;
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the max payload bytes per block
    pub fn block_size(mut self, size: u64) -> Self {
        self.config.block_size = size;
        self
    }

    /// Set the max number of blocks per chunk file
    pub fn chunk_size(mut self, size: u64) -> Self {
        self.config.chunk_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// When the allocation cursor is written back to `config.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorSync {
    /// Only on close (an abrupt exit loses cursor advances)
    #[default]
    OnClose,

    /// After every append, in addition to close
    EveryAppend,
}

/// Runtime options for an open database
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Cursor persistence strategy
    pub cursor_sync: CursorSync,
}

impl Options {
    /// Set the cursor persistence strategy
    pub fn cursor_sync(mut self, sync: CursorSync) -> Self {
        self.cursor_sync = sync;
        self
    }
}
