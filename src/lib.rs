//! # chunkkv
//!
//! An embedded, file-backed key-value store with:
//! - Values stored as chains of fixed-size blocks
//! - Blocks spread across rotating `chunk.<N>` files
//! - O(1) positional addressing (no index structure)
//! - Monotonic integer keys that are never reused
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Database                              │
//! │              (append / read / delete / close)                │
//! └──────┬──────────────────┬──────────────────────┬────────────┘
//!        │                  │                      │
//!        ▼                  ▼                      ▼
//! ┌─────────────┐   ┌───────────────┐     ┌─────────────────┐
//! │ Allocation  │   │  ChainIter    │     │     config      │
//! │   Cursor    │   │ (lazy reads)  │     │  (config.json)  │
//! └─────────────┘   └───────┬───────┘     └─────────────────┘
//!                           │
//!          ┌────────────────┼────────────────┐
//!          ▼                ▼                ▼
//!   ┌─────────────┐  ┌─────────────┐  ┌─────────────┐
//!   │ Block Codec │  │ Addressing  │  │  ChunkSet   │
//!   │ (17B + pay) │  │ pos → slot  │  │ chunk.0..N  │
//!   └─────────────┘  └─────────────┘  └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use chunkkv::{Config, Database};
//!
//! # fn main() -> chunkkv::Result<()> {
//! let config = Config::builder().block_size(32).chunk_size(30).build();
//! let mut db = Database::create("./my-db", config)?;
//!
//! let key = db.append(b"hello world")?;
//! assert_eq!(db.read(key)?, b"hello world");
//!
//! db.delete(key)?;
//! assert!(db.read(key).is_err());
//!
//! db.close()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod database;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ChunkError, Result};
pub use config::{Config, CursorSync, Options};
pub use database::Database;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of chunkkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
