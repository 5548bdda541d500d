//! Error types for chunkkv
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using ChunkError
pub type Result<T> = std::result::Result<T, ChunkError>;

/// Unified error type for chunkkv operations
#[derive(Debug, Error)]
pub enum ChunkError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Database Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("directory already used: {}", .0.display())]
    DirectoryAlreadyUsed(PathBuf),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("key not found: {0}")]
    KeyNotFound(u64),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// A write resolved to a chunk index that has no backing file
    #[error("Chunk {chunk} unavailable for position {position}")]
    ChunkUnavailable { position: u64, chunk: u64 },

    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChunkError {
    /// True for the "absent key" outcome of a read
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChunkError::KeyNotFound(_))
    }
}
