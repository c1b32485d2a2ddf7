//! # Config
//!
//! Shared constants and core types for the paged key-value store.
//!
//! Every on-disk format in the workspace is derived from the numbers in this
//! crate: the page geometry, the record width, the compaction size ratio,
//! and the deletion sentinel. Keeping them in one dependency-free leaf crate
//! lets `memtable`, `buffer`, `sstable`, and `engine` agree on the layout
//! without depending on each other.

/// A single key-value record: fixed-width 32-bit signed key and value.
pub type KvPair = (i32, i32);

/// Size of one page in bytes. Pages are the unit of I/O and of caching.
pub const PAGE_SIZE: usize = 4096;

/// Size of one serialized KV pair in bytes (two little-endian `i32`s).
pub const KV_PAIR_SIZE: usize = 8;

/// Number of KV pairs that fit in one full page (512).
///
/// This is also the fan-out of the static B-tree: a B-tree page holds up to
/// this many `(key, child)` entries.
pub const PAIRS_PER_PAGE: usize = PAGE_SIZE / KV_PAIR_SIZE;

/// Maximum number of runs a level tolerates before compacting into the next.
pub const SIZE_RATIO: u32 = 2;

/// Value sentinel marking a logical delete.
///
/// `i32::MIN` is excluded from the legal value domain; storing it through
/// the public API deletes the key instead.
pub const TOMBSTONE: i32 = i32::MIN;

/// Seed for the buffer cache's xxHash32 bucket hash.
pub const CACHE_HASH_SEED: u32 = 123;

/// Size of one static B-tree page in bytes: an `i32` entry count followed by
/// a page's worth of `(key, child)` entries.
pub const BTREE_PAGE_SIZE: usize = std::mem::size_of::<i32>() + PAGE_SIZE;

/// Name of the metadata file inside a database directory.
pub const METADATA_FILENAME: &str = "metadata";

/// File-name prefix shared by all sorted runs (`sst-1`, `sst-2`, ...).
pub const SST_FILE_PREFIX: &str = "sst-";

/// Directory-name prefix for LSM levels (`level-1`, `level-2`, ...).
pub const LEVEL_DIR_PREFIX: &str = "level-";

/// Subdirectory holding static B-tree index files.
pub const BTREE_DIR: &str = "btree";

/// File extension of a static B-tree index file (`sst-K.btree`).
pub const BTREE_FILE_EXT: &str = "btree";
