//! Chunk File Set
//!
//! The ordered collection of `chunk.<N>` files backing the position address
//! space.
//!
//! ## Responsibilities
//! - Discover existing chunk files on open
//! - Create `chunk.0` for a new database
//! - Read and write whole slots at a resolved [`SlotAddress`]

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{ChunkError, Result};

use super::addressing::SlotAddress;

/// Open chunk file handles, indexed by their numeric suffix
pub struct ChunkSet {
    /// Directory holding the chunk files
    dir: PathBuf,

    /// `files[i]` is `chunk.<i>`
    files: Vec<File>,
}

impl ChunkSet {
    /// Open every chunk file in `dir`
    ///
    /// Files are opened by the name they were found under, so `chunk.01` is
    /// index 1. Indices must be dense from 0 and unique; a gap or two names
    /// for the same index is reported as a storage error.
    pub fn open(dir: &Path) -> Result<Self> {
        let mut found: Vec<(usize, PathBuf)> = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_path = entry.path();

            if file_path.is_file() {
                if let Some(id) = Self::parse_chunk_id(&file_path) {
                    found.push((id, file_path));
                }
            }
        }

        found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        let mut files = Vec::with_capacity(found.len());
        for (expected, (id, file_path)) in found.iter().enumerate() {
            if *id < expected {
                return Err(ChunkError::Storage(format!(
                    "duplicate chunk index {}: {} and {}",
                    id,
                    found[expected - 1].1.display(),
                    file_path.display()
                )));
            }
            if *id > expected {
                return Err(ChunkError::Storage(format!(
                    "missing chunk file {}",
                    Self::chunk_path(dir, expected).display()
                )));
            }
            let file = OpenOptions::new().read(true).write(true).open(file_path)?;
            files.push(file);
        }

        tracing::debug!("Opened {} chunk file(s) in {}", files.len(), dir.display());

        Ok(Self {
            dir: dir.to_path_buf(),
            files,
        })
    }

    /// Materialize `chunk.0` in an existing directory
    pub fn create(dir: &Path) -> Result<()> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(Self::chunk_path(dir, 0))?;
        Ok(())
    }

    /// Fill `buf` with the slot at `addr`
    ///
    /// A missing chunk file or a slot past end-of-file both mean the position
    /// holds nothing, reported as `KeyNotFound(position)`.
    pub fn read_slot(&mut self, position: u64, addr: SlotAddress, buf: &mut [u8]) -> Result<()> {
        let file = self
            .file_mut(addr.chunk)
            .ok_or(ChunkError::KeyNotFound(position))?;

        file.seek(SeekFrom::Start(addr.offset))?;
        match file.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(ChunkError::KeyNotFound(position)),
            Err(e) => Err(ChunkError::Io(e)),
        }
    }

    /// Overwrite the slot at `addr` with `bytes`
    pub fn write_slot(&mut self, position: u64, addr: SlotAddress, bytes: &[u8]) -> Result<()> {
        let file = self
            .file_mut(addr.chunk)
            .ok_or(ChunkError::ChunkUnavailable {
                position,
                chunk: addr.chunk,
            })?;

        file.seek(SeekFrom::Start(addr.offset))?;
        file.write_all(bytes)?;

        tracing::trace!(
            "Wrote position {} to chunk {} at offset {}",
            position,
            addr.chunk,
            addr.offset
        );
        Ok(())
    }

    /// Number of open chunk files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total slots addressable through the open files
    pub fn capacity_slots(&self, chunk_size: u64) -> u64 {
        (self.files.len() as u64).saturating_mul(chunk_size)
    }

    /// Get the chunk directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sync and close every handle, returning the first failure
    pub fn close(self) -> Result<()> {
        let mut first_err = None;
        for file in self.files {
            if let Err(e) = file.sync_all() {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(ChunkError::Io(e)),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Handle for chunk `index`, if that index exists on this target
    fn file_mut(&mut self, index: u64) -> Option<&mut File> {
        let index = usize::try_from(index).ok()?;
        self.files.get_mut(index)
    }

    /// Generate the path of chunk `id` inside `dir`
    fn chunk_path(dir: &Path, id: usize) -> PathBuf {
        dir.join(format!("chunk.{}", id))
    }

    /// Parse the chunk index from a filename
    /// "chunk.42" → Some(42)
    fn parse_chunk_id(path: &Path) -> Option<usize> {
        let name = path.file_name()?.to_str()?;
        let id_str = name.strip_prefix("chunk.")?;
        if id_str.is_empty() || !id_str.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        id_str.parse().ok()
    }
}
