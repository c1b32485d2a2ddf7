//! Read path: `get()`, `scan()`, and `get_via_index()`.
//!
//! Point lookups probe the memtable first (freshest data, tombstones
//! included), then the disk manager. Range scans merge the memtable with
//! the disk in one ascending pass; the memtable wins ties and tombstones
//! never reach the caller.

use crate::{btree, Backend, Result, Store, StoreError};
use config::{KvPair, TOMBSTONE};
use std::cmp::Ordering;

impl Store {
    /// Returns the freshest value for `key`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the key is absent everywhere or its
    /// freshest version is a tombstone; I/O and corruption errors
    /// propagate.
    pub fn get(&mut self, key: i32) -> Result<i32> {
        if let Some(value) = self.mem.get(key) {
            return if value == TOMBSTONE {
                Err(StoreError::NotFound)
            } else {
                Ok(value)
            };
        }

        let found = match &mut self.backend {
            Backend::Flat(store) => store.get(key)?,
            Backend::Leveled(store) => store.get(key)?,
        };
        match found {
            Some(TOMBSTONE) | None => Err(StoreError::NotFound),
            Some(value) => Ok(value),
        }
    }

    /// Returns all live pairs with `low <= key <= high` in ascending key
    /// order, freshest version per key.
    ///
    /// Both bounds are inclusive; `low > high` yields an empty result.
    pub fn scan(&mut self, low: i32, high: i32) -> Result<Vec<KvPair>> {
        if low > high {
            return Ok(Vec::new());
        }

        let mem_pairs = self.mem.scan_range(low, high);
        let disk_pairs = match &mut self.backend {
            Backend::Flat(store) => store.scan(low, high)?,
            Backend::Leveled(store) => store.scan(low, high)?,
        };
        Ok(merge_scans(&mem_pairs, &disk_pairs))
    }

    /// As [`get`](Store::get), but the disk search descends the static
    /// B-tree instead of binary-searching whole runs.
    ///
    /// # Errors
    ///
    /// [`StoreError::IndexMissing`] when the index has not been built, or
    /// when the store uses the leveled layout (which carries no static
    /// index). Otherwise as [`get`](Store::get).
    pub fn get_via_index(&mut self, key: i32) -> Result<i32> {
        if let Some(value) = self.mem.get(key) {
            return if value == TOMBSTONE {
                Err(StoreError::NotFound)
            } else {
                Ok(value)
            };
        }

        let found = match &mut self.backend {
            Backend::Flat(store) => btree::lookup(store, key)?,
            Backend::Leveled(_) => return Err(StoreError::IndexMissing),
        };
        match found {
            Some(TOMBSTONE) | None => Err(StoreError::NotFound),
            Some(value) => Ok(value),
        }
    }
}

/// Ascending two-way merge of the memtable and disk scans.
///
/// Both inputs are sorted and duplicate-free; on a shared key the memtable
/// pair wins. Tombstones are filtered from the output here, after they have
/// had their chance to shadow disk versions.
fn merge_scans(mem: &[KvPair], disk: &[KvPair]) -> Vec<KvPair> {
    let mut out = Vec::with_capacity(mem.len() + disk.len());
    let mut i = 0;
    let mut j = 0;

    while i < mem.len() && j < disk.len() {
        let (mem_key, mem_value) = mem[i];
        let (disk_key, disk_value) = disk[j];
        match mem_key.cmp(&disk_key) {
            Ordering::Equal => {
                if mem_value != TOMBSTONE {
                    out.push((mem_key, mem_value));
                }
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                if mem_value != TOMBSTONE {
                    out.push((mem_key, mem_value));
                }
                i += 1;
            }
            Ordering::Greater => {
                if disk_value != TOMBSTONE {
                    out.push((disk_key, disk_value));
                }
                j += 1;
            }
        }
    }

    for &(key, value) in &mem[i..] {
        if value != TOMBSTONE {
            out.push((key, value));
        }
    }
    for &(key, value) in &disk[j..] {
        if value != TOMBSTONE {
            out.push((key, value));
        }
    }
    out
}
