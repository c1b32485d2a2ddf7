//! Leveled storage manager: the LSM directory layout.
//!
//! Each level directory `level-L/` holds at most two runs, `sst-1` (older)
//! and `sst-2` (newer). Smaller levels are fresher, so reads visit levels
//! in increasing order and stop at the first hit. A level that reaches the
//! size ratio is immediately compacted into the next level (see
//! [`compaction`](crate::compaction)), which is why steady-state reads only
//! ever find `sst-1`: the second slot exists only inside the synchronous
//! save-then-compact window.

use crate::error::Result;
use crate::metadata;
use buffer::{BufferPool, PageId};
use config::{KvPair, LEVEL_DIR_PREFIX, SIZE_RATIO, SST_FILE_PREFIX};
use log::debug;
use sstable::{find_key, lower_bound, write_run, RunFile};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Manager for the leveled (LSM) directory layout.
///
/// Owns the database directory, the `level -> run count` map, and the page
/// cache. The map is held in memory and persisted to `metadata` on
/// [`close`](LeveledStore::close).
#[derive(Debug)]
pub struct LeveledStore {
    dir: PathBuf,
    levels: BTreeMap<u32, u32>,
    cache: BufferPool,
}

impl LeveledStore {
    /// Opens (or creates) the database directory at `dir`.
    pub fn open<P: AsRef<Path>>(dir: P, buffer_capacity: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let cache = BufferPool::new(buffer_capacity);

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            metadata::write_level_map(&dir, &BTreeMap::new())?;
            return Ok(Self {
                dir,
                levels: BTreeMap::new(),
                cache,
            });
        }

        let levels = metadata::read_level_map(&dir)?;
        Ok(Self { dir, levels, cache })
    }

    pub(crate) fn level_dir(&self, level: u32) -> PathBuf {
        self.dir.join(format!("{}{}", LEVEL_DIR_PREFIX, level))
    }

    pub(crate) fn run_path(&self, level: u32, slot: u32) -> PathBuf {
        self.level_dir(level)
            .join(format!("{}{}", SST_FILE_PREFIX, slot))
    }

    /// Returns the database directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Returns the run count of `level` (0 for unknown levels).
    #[must_use]
    pub fn run_count(&self, level: u32) -> u32 {
        self.levels.get(&level).copied().unwrap_or(0)
    }

    /// Returns the `level -> run count` map.
    #[must_use]
    pub fn level_counts(&self) -> &BTreeMap<u32, u32> {
        &self.levels
    }

    pub(crate) fn set_run_count(&mut self, level: u32, count: u32) {
        self.levels.insert(level, count);
    }

    /// Levels that currently hold at least one run, in increasing
    /// (freshest-first) order.
    fn populated_levels(&self) -> Vec<u32> {
        self.levels
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(&level, _)| level)
            .collect()
    }

    /// Saves `pairs` into `level`, compacting upward if the level fills.
    ///
    /// Saving zero pairs is a successful no-op. When the save brings the
    /// level to the size ratio, compaction runs synchronously starting
    /// there, and the whole page cache is invalidated afterwards — run
    /// slots get reused, so stale pages must not alias the new files.
    pub fn save(&mut self, pairs: &[KvPair], level: u32) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }

        self.perform_save(pairs, level)?;

        if self.run_count(level) >= SIZE_RATIO {
            self.compact_from(level)?;
            self.cache.clear();
        }
        Ok(())
    }

    /// Writes `pairs` into the next free slot of `level` without triggering
    /// compaction. Shared by `save` and the compactor.
    pub(crate) fn perform_save(&mut self, pairs: &[KvPair], level: u32) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }

        let slot = self.run_count(level) + 1;
        fs::create_dir_all(self.level_dir(level))?;
        write_run(&self.run_path(level, slot), pairs)?;
        *self.levels.entry(level).or_insert(0) += 1;

        debug!(
            "saved run level-{}/sst-{} ({} pairs)",
            level,
            slot,
            pairs.len()
        );
        Ok(())
    }

    /// Reads one page of `level-<level>/sst-<slot>` through the cache.
    pub fn read_page(&mut self, level: u32, slot: u32, page: u32) -> Result<Vec<KvPair>> {
        let id = PageId::leveled(level, slot, page);
        if let Some(pairs) = self.cache.get(id) {
            return Ok(pairs.to_vec());
        }

        let mut run = RunFile::open(&self.run_path(level, slot))?;
        let pairs = run.read_page(page)?;
        if !pairs.is_empty() {
            self.cache.put(id, pairs.clone());
        }
        Ok(pairs)
    }

    /// Looks `key` up level by level, freshest level first.
    ///
    /// Within a level only `sst-1` is consulted — see the module docs — one
    /// page at a time, binary-searching each page. A tombstone value is
    /// returned like any other hit.
    pub fn get(&mut self, key: i32) -> Result<Option<i32>> {
        for level in self.populated_levels() {
            let mut page = 0;
            loop {
                let pairs = self.read_page(level, 1, page)?;
                if pairs.is_empty() {
                    break;
                }
                if let Some(pos) = find_key(&pairs, key) {
                    return Ok(Some(pairs[pos].1));
                }
                page += 1;
            }
        }
        Ok(None)
    }

    /// Returns every pair with `low <= key <= high`, one entry per key,
    /// freshest level first, sorted ascending.
    pub fn scan(&mut self, low: i32, high: i32) -> Result<Vec<KvPair>> {
        let mut visited: HashSet<i32> = HashSet::new();
        let mut out = Vec::new();

        for level in self.populated_levels() {
            let mut page = 0;
            loop {
                let pairs = self.read_page(level, 1, page)?;
                if pairs.is_empty() {
                    break;
                }
                page += 1;

                if pairs[0].0 > high || pairs[pairs.len() - 1].0 < low {
                    continue;
                }

                for &(k, v) in &pairs[lower_bound(&pairs, low)..] {
                    if k > high {
                        break;
                    }
                    if visited.insert(k) {
                        out.push((k, v));
                    }
                }
            }
        }

        out.sort_unstable_by_key(|pair| pair.0);
        Ok(out)
    }

    /// Persists the level map to `metadata`.
    pub fn close(&mut self) -> Result<()> {
        debug!("persisting level map ({} levels)", self.levels.len());
        metadata::write_level_map(&self.dir, &self.levels)
    }

    /// Removes the entire database directory.
    pub fn delete_files(&self) -> Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        Ok(())
    }
}
