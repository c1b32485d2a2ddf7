//! # Engine - Paged KV Storage Engine
//!
//! The central orchestrator binding the [`memtable`], [`sstable`], and
//! [`buffer`] crates into an ordered key-value store for 32-bit keys and
//! values, with a choice of two on-disk organizations.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                    STORE                      │
//! │                                               │
//! │ write.rs → Memtable insert                    │
//! │              |                                │
//! │              |  (table full?)                 │
//! │              |           yes                  │
//! │              v                                │
//! │           flush() → new sorted run            │
//! │              |                                │
//! │              |  (level at size ratio?)        │
//! │              |           yes (leveled only)   │
//! │              v                                │
//! │           compact() → merged next-level run   │
//! │                                               │
//! │ read.rs → Memtable → runs (freshest first)    │
//! │            (first match wins)                 │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Module responsibilities
//!
//! | Module         | Purpose                                          |
//! |----------------|--------------------------------------------------|
//! | `lib.rs`       | `Store` struct, open/close, accessors, `Debug`, `Drop` |
//! | [`write`]      | `put()`, `remove()`, internal `flush()`          |
//! | [`read`]       | `get()`, `scan()`, `get_via_index()`             |
//! | [`flat`]       | Flat layout manager (`sst-1` .. `sst-N`)         |
//! | [`lsm`]        | Leveled layout manager (`level-L/sst-{1,2}`)     |
//! | [`compaction`] | Size-ratio merge with tombstone GC               |
//! | [`btree`]      | Static B-tree index build + search               |
//! | [`metadata`]   | Persistent run counts for both layouts           |
//!
//! ## Layouts
//!
//! The layout is chosen once at [`Store::open`] and never changes for the
//! lifetime of a database directory:
//!
//! - **Flat**: every memtable flush appends run `sst-(N+1)`; reads walk all
//!   runs newest-to-oldest. Optionally augmented by a static B-tree index
//!   per run.
//! - **Leveled**: flushes land in `level-1`; any level that reaches two
//!   runs is synchronously compacted into the next, so reads touch at most
//!   one run per level.
//!
//! ## Durability
//!
//! Flushes are best-effort and there is no write-ahead log: data in the
//! memtable is lost on a crash, and a crash during compaction can leave a
//! database that needs re-opening. `close` (or dropping the store) flushes
//! the memtable and persists metadata.

mod btree;
mod compaction;
mod error;
mod flat;
mod lsm;
mod metadata;
mod read;
mod write;

pub use config::TOMBSTONE;
pub use error::{Result, StoreError};
pub use flat::FlatStore;
pub use lsm::LeveledStore;

use memtable::Memtable;
use std::path::Path;

/// On-disk organization of a database directory, fixed at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// A single sequence of runs `sst-1` .. `sst-N`, newest last.
    Flat,
    /// LSM levels `level-L/sst-{1,2}` with size-tiered compaction.
    Leveled,
}

pub(crate) enum Backend {
    Flat(FlatStore),
    Leveled(LeveledStore),
}

/// An open key-value store: one memtable in front of one disk manager.
///
/// The store exclusively owns both; each manager exclusively owns its page
/// cache. The store is single-threaded and not reentrant — every operation
/// runs to completion before the next begins.
///
/// Values may use the full `i32` range except [`TOMBSTONE`] (`i32::MIN`),
/// which is reserved to mark deletions.
pub struct Store {
    pub(crate) mem: Memtable,
    pub(crate) backend: Backend,
}

impl Store {
    /// Opens (or creates) the database at `path` with the given layout,
    /// memtable capacity (pairs), and buffer-cache capacity (pages).
    ///
    /// # Errors
    ///
    /// Directory-creation failures and unparsable metadata propagate.
    ///
    /// # Panics
    ///
    /// Panics if `memtable_capacity` is zero (see [`Memtable::new`]).
    pub fn open<P: AsRef<Path>>(
        path: P,
        layout: Layout,
        memtable_capacity: usize,
        buffer_capacity: usize,
    ) -> Result<Self> {
        let backend = match layout {
            Layout::Flat => Backend::Flat(FlatStore::open(path.as_ref(), buffer_capacity)?),
            Layout::Leveled => Backend::Leveled(LeveledStore::open(path.as_ref(), buffer_capacity)?),
        };
        Ok(Self {
            mem: Memtable::new(memtable_capacity),
            backend,
        })
    }

    /// Returns the layout chosen at open time.
    #[must_use]
    pub fn layout(&self) -> Layout {
        match self.backend {
            Backend::Flat(_) => Layout::Flat,
            Backend::Leveled(_) => Layout::Leveled,
        }
    }

    /// Returns the database directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        match &self.backend {
            Backend::Flat(store) => store.path(),
            Backend::Leveled(store) => store.path(),
        }
    }

    /// Returns the number of pairs currently buffered in the memtable.
    #[must_use]
    pub fn memtable_entries(&self) -> usize {
        self.mem.len()
    }

    /// Returns the memtable capacity in pairs.
    #[must_use]
    pub fn memtable_capacity(&self) -> usize {
        self.mem.capacity()
    }

    /// Builds a static B-tree index for every existing run.
    ///
    /// Flat layout only: a leveled store has no per-run static index, and
    /// the call surfaces [`StoreError::IndexMissing`]. Rebuilding after new
    /// flushes refreshes the index files in place.
    pub fn build_static_index(&mut self) -> Result<()> {
        match &mut self.backend {
            Backend::Flat(store) => btree::build_all(store),
            Backend::Leveled(_) => Err(StoreError::IndexMissing),
        }
    }

    /// Flushes the memtable (even when not full) and persists metadata,
    /// consuming the store.
    ///
    /// Succeeds only if both the final flush and the metadata write
    /// succeed.
    pub fn close(mut self) -> Result<()> {
        self.flush()?;
        if let Backend::Leveled(store) = &mut self.backend {
            store.close()?;
        }
        Ok(())
    }

    /// Deletes the database directory and everything in it, consuming the
    /// store.
    pub fn delete_db(mut self) -> Result<()> {
        self.mem.clear();
        match &self.backend {
            Backend::Flat(store) => store.delete_files(),
            Backend::Leveled(store) => store.delete_files(),
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Store");
        s.field("layout", &self.layout())
            .field("path", &self.path())
            .field("memtable_entries", &self.mem.len())
            .field("memtable_capacity", &self.mem.capacity());
        match &self.backend {
            Backend::Flat(store) => {
                s.field("runs", &store.num_runs());
            }
            Backend::Leveled(store) => {
                s.field("levels", store.level_counts());
            }
        }
        s.finish()
    }
}

/// Best-effort flush on drop.
///
/// Errors are ignored because `Drop` cannot propagate them; callers that
/// need the result use [`Store::close`].
impl Drop for Store {
    fn drop(&mut self) {
        if !self.mem.is_empty() {
            let _ = self.flush();
        }
        if let Backend::Leveled(store) = &mut self.backend {
            let _ = store.close();
        }
    }
}

#[cfg(test)]
mod tests;
