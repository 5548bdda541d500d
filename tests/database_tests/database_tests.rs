//! Tests for Database
//!
//! These tests verify:
//! - Create/open/close lifecycle and config persistence
//! - Append/read round-trips across block boundaries
//! - Head rejection for continuation and tombstoned positions
//! - Monotonic, never-reused keys
//! - Chunk capacity limits

use std::fs;
use std::path::PathBuf;

use chunkkv::storage::{BlockKind, END_OF_CHAIN};
use chunkkv::{ChunkError, Config, CursorSync, Database, Options};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_db(block_size: u64, chunk_size: u64) -> (TempDir, PathBuf, Database) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db");
    let config = Config::builder()
        .block_size(block_size)
        .chunk_size(chunk_size)
        .build();
    let db = Database::create(&path, config).unwrap();
    (temp_dir, path, db)
}

fn block_lengths(db: &mut Database, key: u64) -> Vec<u64> {
    db.blocks(key).map(|b| b.unwrap().length).collect()
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_create_lays_out_directory() {
    let (_temp, path, db) = setup_temp_db(32, 30);

    assert!(path.join("chunk.0").is_file());
    assert!(path.join("config.json").is_file());
    assert_eq!(db.chunk_count(), 1);
    assert_eq!(db.next_free_position(), 0);
    assert_eq!(db.dir(), path.as_path());

    db.close().unwrap();
}

#[test]
fn test_create_existing_directory_fails() {
    let (_temp, path, db) = setup_temp_db(32, 30);
    db.close().unwrap();

    let result = Database::create(&path, Config::default());

    match result {
        Err(err @ ChunkError::DirectoryAlreadyUsed(_)) => {
            assert!(err.to_string().contains("directory already used"));
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("create must fail on an existing directory"),
    }
}

#[test]
fn test_create_resets_cursor() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db");
    let mut config = Config::builder().block_size(8).chunk_size(8).build();
    config.next_free_position = 99;

    let db = Database::create(&path, config).unwrap();

    assert_eq!(db.next_free_position(), 0);
}

#[test]
fn test_create_rejects_zero_block_size() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db");

    let result = Database::create(&path, Config::builder().block_size(0).build());

    assert!(matches!(result, Err(ChunkError::Config(_))));
    assert!(!path.exists());
}

#[test]
fn test_create_rejects_overflowing_block_size() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db");
    let config = Config::builder().block_size(u64::MAX).chunk_size(30).build();

    let result = Database::create(&path, config);

    assert!(matches!(result, Err(ChunkError::Config(_))));
    assert!(!path.exists());
}

#[test]
fn test_geometry_matches_config() {
    let (_temp, _path, db) = setup_temp_db(32, 30);

    let geometry = db.geometry();

    assert_eq!(geometry.block_size, 32);
    assert_eq!(geometry.chunk_size, 30);
    assert_eq!(geometry.slot_size(), 49);
    assert_eq!(db.capacity(), 30);
}

#[test]
fn test_open_zero_padded_chunk_name() {
    let (_temp, path, db) = setup_temp_db(4, 2);
    db.close().unwrap();
    fs::write(path.join("chunk.01"), b"").unwrap();

    let mut db = Database::open(&path).unwrap();
    assert_eq!(db.chunk_count(), 2);

    db.append(b"ab").unwrap(); // 0
    db.append(b"cd").unwrap(); // 1
    let key = db.append(b"ef").unwrap(); // 2 lands in chunk.01
    assert_eq!(key, 2);
    assert_eq!(db.read(key).unwrap(), b"ef");
    db.close().unwrap();

    assert_eq!(fs::metadata(path.join("chunk.01")).unwrap().len(), 17 + 4);
    assert!(!path.join("chunk.1").exists());
}

#[test]
fn test_open_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();

    let result = Database::open(temp_dir.path().join("nope"));

    assert!(matches!(result, Err(ChunkError::Io(_))));
}

#[test]
fn test_close_persists_cursor() {
    let (_temp, path, mut db) = setup_temp_db(32, 30);
    db.append(b"one").unwrap();
    db.append(&[0u8; 70]).unwrap(); // 3 blocks
    db.close().unwrap();

    let raw = fs::read_to_string(path.join("config.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["nextFreePosition"], 4);
    assert_eq!(json["blockSize"], 32);
    assert_eq!(json["chunkSize"], 30);

    let db = Database::open(&path).unwrap();
    assert_eq!(db.next_free_position(), 4);
    assert_eq!(db.config().next_free_position, 4);
}

#[test]
fn test_values_survive_reopen() {
    let (_temp, path, mut db) = setup_temp_db(16, 100);
    let long = vec![b'z'; 100];
    let k1 = db.append(b"short").unwrap();
    let k2 = db.append(&long).unwrap();
    db.close().unwrap();

    let mut db = Database::open(&path).unwrap();
    assert_eq!(db.read(k1).unwrap(), b"short");
    assert_eq!(db.read(k2).unwrap(), long);
    db.close().unwrap();
}

#[test]
fn test_unclosed_database_loses_cursor() {
    let (_temp, path, mut db) = setup_temp_db(32, 30);
    db.append(b"lost").unwrap();
    drop(db);

    let db = Database::open(&path).unwrap();
    assert_eq!(db.next_free_position(), 0);
}

#[test]
fn test_every_append_sync_persists_cursor() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db");
    let config = Config::builder().block_size(32).chunk_size(30).build();
    let options = Options::default().cursor_sync(CursorSync::EveryAppend);

    let mut db = Database::create_with(&path, config, options).unwrap();
    db.append(b"kept").unwrap();
    drop(db);

    let db = Database::open(&path).unwrap();
    assert_eq!(db.next_free_position(), 1);
}

// =============================================================================
// Append/Read Tests
// =============================================================================

#[test]
fn test_hello_world_scenario() {
    let (_temp, _path, mut db) = setup_temp_db(32, 30);

    let key = db.append(b"hello world").unwrap();
    assert_eq!(key, 0);

    let blocks: Vec<_> = db.blocks(0).map(|b| b.unwrap()).collect();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind, BlockKind::Head);
    assert_eq!(blocks[0].length, 11);
    assert_eq!(blocks[0].next, END_OF_CHAIN);
    assert_eq!(db.read(0).unwrap(), b"hello world");

    let value = b"a string bigger than the blocksize foo bar lol!";
    assert_eq!(value.len(), 47);
    let key = db.append(value).unwrap();
    assert_eq!(key, 1);
    assert_eq!(block_lengths(&mut db, 1), vec![32, 15]);
    assert_eq!(db.read(1).unwrap(), value);

    assert!(matches!(db.read(2), Err(ChunkError::KeyNotFound(2))));
}

#[test]
fn test_empty_value() {
    let (_temp, _path, mut db) = setup_temp_db(32, 30);

    let key = db.append(b"").unwrap();

    assert_eq!(block_lengths(&mut db, key), vec![0]);
    assert_eq!(db.read(key).unwrap(), Vec::<u8>::new());
    assert_eq!(db.next_free_position(), 1);
}

#[test]
fn test_exact_multiple_of_block_size() {
    let (_temp, _path, mut db) = setup_temp_db(8, 100);

    let key = db.append(&[1u8; 24]).unwrap();
    let blocks: Vec<_> = db.blocks(key).map(|b| b.unwrap()).collect();

    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[2].length, 8);
    assert_eq!(blocks[2].next, END_OF_CHAIN);
    assert_eq!(blocks[0].kind, BlockKind::Head);
    assert!(blocks[1..].iter().all(|b| b.kind == BlockKind::Continuation));
}

#[test]
fn test_one_past_multiple_of_block_size() {
    let (_temp, _path, mut db) = setup_temp_db(8, 100);

    let key = db.append(&[1u8; 25]).unwrap();

    assert_eq!(block_lengths(&mut db, key), vec![8, 8, 8, 1]);
}

#[test]
fn test_round_trip_many_lengths() {
    let (_temp, _path, mut db) = setup_temp_db(8, 1000);

    let mut stored = Vec::new();
    for len in 0..=40usize {
        let value: Vec<u8> = (0..len).map(|i| (i * 7 + len) as u8).collect();
        let key = db.append(&value).unwrap();
        stored.push((key, value));
    }

    for (key, value) in stored {
        assert_eq!(db.read(key).unwrap(), value);
    }
}

#[test]
fn test_chain_positions_are_consecutive() {
    let (_temp, _path, mut db) = setup_temp_db(4, 100);

    let k1 = db.append(b"abcdefghij").unwrap(); // 3 blocks: 0,1,2
    let k2 = db.append(b"xy").unwrap();

    assert_eq!(k1, 0);
    assert_eq!(k2, 3);
    let links: Vec<i64> = db.blocks(k1).map(|b| b.unwrap().next).collect();
    assert_eq!(links, vec![1, 2, END_OF_CHAIN]);
}

// =============================================================================
// Head Rejection Tests
// =============================================================================

#[test]
fn test_read_continuation_is_not_found() {
    let (_temp, _path, mut db) = setup_temp_db(4, 100);

    db.append(b"abcdefghij").unwrap();

    assert!(matches!(db.read(1), Err(ChunkError::KeyNotFound(1))));
    assert!(matches!(db.read(2), Err(ChunkError::KeyNotFound(2))));
}

#[test]
fn test_read_never_allocated_positions() {
    let (_temp, _path, mut db) = setup_temp_db(4, 10);
    db.append(b"abc").unwrap();

    // Past the cursor but inside chunk.0's range
    assert!(db.read(5).unwrap_err().is_not_found());
    // In a chunk that has no file
    assert!(db.read(10).unwrap_err().is_not_found());
    assert!(db.read(u64::MAX).unwrap_err().is_not_found());
}

#[test]
fn test_read_on_fresh_database() {
    let (_temp, _path, mut db) = setup_temp_db(32, 30);

    assert!(matches!(db.read(0), Err(ChunkError::KeyNotFound(0))));
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_then_read() {
    let (_temp, _path, mut db) = setup_temp_db(32, 30);

    let key = db.append(b"doomed").unwrap();
    db.delete(key).unwrap();

    assert!(matches!(db.read(key), Err(ChunkError::KeyNotFound(k)) if k == key));
}

#[test]
fn test_delete_leaves_other_keys_intact() {
    let (_temp, _path, mut db) = setup_temp_db(4, 100);

    let a = db.append(b"first value").unwrap();
    let b = db.append(b"second value").unwrap();
    db.delete(a).unwrap();

    assert!(db.read(a).is_err());
    assert_eq!(db.read(b).unwrap(), b"second value");
}

#[test]
fn test_delete_only_tombstones_head() {
    let (_temp, path, mut db) = setup_temp_db(4, 100);

    let key = db.append(b"abcdefgh").unwrap(); // positions 0 and 1
    db.delete(key).unwrap();
    db.close().unwrap();

    // Continuation slot still holds its bytes
    let raw = fs::read(path.join("chunk.0")).unwrap();
    let slot = 17 + 4;
    assert_eq!(raw[0], 0);
    assert_eq!(raw[slot], 2);
    assert_eq!(&raw[slot + 17..slot + 21], b"efgh");
}

#[test]
fn test_delete_survives_reopen() {
    let (_temp, path, mut db) = setup_temp_db(32, 30);
    let key = db.append(b"gone").unwrap();
    db.delete(key).unwrap();
    db.close().unwrap();

    let mut db = Database::open(&path).unwrap();
    assert!(db.read(key).unwrap_err().is_not_found());
}

#[test]
fn test_delete_in_missing_chunk_is_unavailable() {
    let (_temp, _path, mut db) = setup_temp_db(4, 10);

    let result = db.delete(15);

    assert!(matches!(
        result,
        Err(ChunkError::ChunkUnavailable { position: 15, chunk: 1 })
    ));
}

// =============================================================================
// Allocation Tests
// =============================================================================

#[test]
fn test_keys_never_reused() {
    let (_temp, path, mut db) = setup_temp_db(4, 1000);

    let mut seen = Vec::new();
    for i in 0..20u8 {
        let key = db.append(&vec![i; (i as usize) % 9]).unwrap();
        if i % 3 == 0 {
            db.delete(key).unwrap();
        }
        assert!(seen.iter().all(|&k| k < key));
        seen.push(key);
    }
    db.close().unwrap();

    let mut db = Database::open(&path).unwrap();
    let key = db.append(b"after reopen").unwrap();
    assert!(seen.iter().all(|&k| k < key));
}

#[test]
fn test_append_past_chunk_zero_is_unavailable() {
    let (_temp, path, mut db) = setup_temp_db(4, 3);

    db.append(b"abcd").unwrap(); // 0
    db.append(b"abcd").unwrap(); // 1
    let result = db.append(b"abcdefgh"); // 2, then 3 lands in chunk 1

    assert!(matches!(
        result,
        Err(ChunkError::ChunkUnavailable { position: 3, chunk: 1 })
    ));
    // Positions stay consumed; no chunk file is created on demand
    assert_eq!(db.next_free_position(), 4);
    assert_eq!(db.capacity(), 3);
    assert!(!path.join("chunk.1").exists());
    assert!(db.read(2).is_err());
}
