//! Flat storage manager: a single sequence of runs `sst-1` .. `sst-N`.
//!
//! Runs are numbered in creation order, so a higher index is fresher. Every
//! read goes page-by-page through the embedded buffer cache; lookups walk
//! runs newest-to-oldest and stop at the first hit.

use crate::error::Result;
use crate::metadata;
use buffer::{BufferPool, PageId};
use config::{KvPair, SST_FILE_PREFIX};
use log::debug;
use sstable::{find_key, lower_bound, write_run, RunFile};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Manager for the flat directory layout.
///
/// Owns the database directory, the persisted run count, and the page
/// cache. Runs are immutable once saved; only [`delete_files`] removes
/// them.
///
/// [`delete_files`]: FlatStore::delete_files
pub struct FlatStore {
    dir: PathBuf,
    num_runs: u32,
    cache: BufferPool,
}

impl FlatStore {
    /// Opens (or creates) the database directory at `dir`.
    ///
    /// A fresh directory is initialized with a zero run count; an existing
    /// one has its `metadata` parsed.
    pub fn open<P: AsRef<Path>>(dir: P, buffer_capacity: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let cache = BufferPool::new(buffer_capacity);

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            metadata::write_run_count(&dir, 0)?;
            return Ok(Self {
                dir,
                num_runs: 0,
                cache,
            });
        }

        let num_runs = metadata::read_run_count(&dir)?;
        Ok(Self {
            dir,
            num_runs,
            cache,
        })
    }

    fn run_path(&self, idx: u32) -> PathBuf {
        self.dir.join(format!("{}{}", SST_FILE_PREFIX, idx))
    }

    /// Returns the database directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Returns the persisted number of runs.
    #[must_use]
    pub fn num_runs(&self) -> u32 {
        self.num_runs
    }

    /// Writes `pairs` as the next run and persists the new run count.
    ///
    /// The caller guarantees ascending, duplicate-free keys (the memtable
    /// drain provides exactly that). Saving zero pairs is a successful
    /// no-op.
    pub fn save(&mut self, pairs: &[KvPair]) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }

        let idx = self.num_runs + 1;
        write_run(&self.run_path(idx), pairs)?;
        self.num_runs = idx;
        metadata::write_run_count(&self.dir, self.num_runs)?;

        debug!("saved run sst-{} ({} pairs)", idx, pairs.len());
        Ok(())
    }

    /// Reads one page of run `idx` through the cache.
    ///
    /// A page number past the end of the run yields an empty vector (and is
    /// never cached).
    pub fn read_page(&mut self, idx: u32, page: u32) -> Result<Vec<KvPair>> {
        let id = PageId::flat(idx, page);
        if let Some(pairs) = self.cache.get(id) {
            return Ok(pairs.to_vec());
        }

        let mut run = RunFile::open(&self.run_path(idx))?;
        let pairs = run.read_page(page)?;
        if !pairs.is_empty() {
            self.cache.put(id, pairs.clone());
        }
        Ok(pairs)
    }

    /// Reads a whole run by iterating its pages through the cache.
    pub fn read_run(&mut self, idx: u32) -> Result<Vec<KvPair>> {
        let mut out = Vec::new();
        let mut page = 0;
        loop {
            let pairs = self.read_page(idx, page)?;
            if pairs.is_empty() {
                return Ok(out);
            }
            out.extend(pairs);
            page += 1;
        }
    }

    /// Looks `key` up across all runs, newest first.
    ///
    /// The first run containing the key wins; a tombstone value is returned
    /// like any other hit, and the façade interprets it.
    pub fn get(&mut self, key: i32) -> Result<Option<i32>> {
        for idx in (1..=self.num_runs).rev() {
            let pairs = self.read_run(idx)?;
            if let Some(pos) = find_key(&pairs, key) {
                return Ok(Some(pairs[pos].1));
            }
        }
        Ok(None)
    }

    /// Returns every pair with `low <= key <= high`, one entry per key,
    /// freshest version first across runs, sorted ascending.
    ///
    /// Runs whose key range does not overlap the bounds are skipped without
    /// a search; within a run the walk starts at the first in-range key.
    pub fn scan(&mut self, low: i32, high: i32) -> Result<Vec<KvPair>> {
        let mut visited: HashSet<i32> = HashSet::new();
        let mut out = Vec::new();

        for idx in (1..=self.num_runs).rev() {
            let pairs = self.read_run(idx)?;
            if pairs.is_empty() {
                continue;
            }
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

        out.sort_unstable_by_key(|pair| pair.0);
        Ok(out)
    }

    /// Removes the entire database directory.
    pub fn delete_files(&self) -> Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        Ok(())
    }
}
