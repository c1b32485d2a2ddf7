//! Compaction: merging a full level into the next one.
//!
//! When a level reaches the size ratio (two runs), its `sst-1` and `sst-2`
//! are merged page-by-page into a single sorted output written to the next
//! level, the inputs are unlinked, and the level's count drops to zero. The
//! merge cascades: if the write fills the next level, that level is merged
//! too, one merge per level, until no level is over the ratio.
//!
//! Tie-break: when both inputs hold the same key, the value from `sst-2`
//! (the fresher slot) wins. Tombstones travel through intermediate levels
//! so they keep shadowing older versions, and are dropped only when the
//! merge targets the deepest populated level — below it there is nothing
//! left to shadow.
//!
//! The output run is written before the inputs are unlinked, with no fsync
//! or staging rename; a crash mid-compaction can leave the output next to
//! the undeleted inputs, and the database must be re-opened.

use crate::error::Result;
use crate::lsm::LeveledStore;
use config::{KvPair, SIZE_RATIO, TOMBSTONE};
use log::debug;
use sstable::RunFile;
use std::fs;
use std::io;

/// Pull-based cursor over one run, loading a page at a time.
struct PageCursor {
    run: RunFile,
    page: u32,
    pairs: Vec<KvPair>,
    pos: usize,
    done: bool,
}

impl PageCursor {
    fn new(run: RunFile) -> Self {
        Self {
            run,
            page: 0,
            pairs: Vec::new(),
            pos: 0,
            done: false,
        }
    }

    fn peek(&mut self) -> io::Result<Option<KvPair>> {
        if self.pos >= self.pairs.len() && !self.done {
            self.pairs = self.run.read_page(self.page)?;
            self.page += 1;
            self.pos = 0;
            if self.pairs.is_empty() {
                self.done = true;
            }
        }
        Ok(self.pairs.get(self.pos).copied())
    }

    fn advance(&mut self) {
        self.pos += 1;
    }
}

impl LeveledStore {
    /// Compacts upward starting at `start`, one merge per level, until no
    /// level holds `SIZE_RATIO` runs.
    pub(crate) fn compact_from(&mut self, start: u32) -> Result<()> {
        let mut level = start;
        while self.run_count(level) >= SIZE_RATIO {
            self.merge_level(level)?;
            level += 1;
        }
        Ok(())
    }

    /// Merges `sst-1` and `sst-2` of `level` into one run at `level + 1`.
    fn merge_level(&mut self, level: u32) -> Result<()> {
        // Tombstones may only be dropped when the merge output becomes the
        // new deepest populated level; if any deeper run exists (including
        // an older run already sitting at level + 1), a dropped tombstone
        // would resurrect the version it was shadowing.
        let deepest = self
            .level_counts()
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(&l, _)| l)
            .max()
            .unwrap_or(level);
        let drop_tombstones = deepest <= level;
        let keep = |pair: KvPair| !(drop_tombstones && pair.1 == TOMBSTONE);

        let path_older = self.run_path(level, 1);
        let path_newer = self.run_path(level, 2);
        let mut older = PageCursor::new(RunFile::open(&path_older)?);
        let mut newer = PageCursor::new(RunFile::open(&path_newer)?);

        let mut merged: Vec<KvPair> = Vec::new();
        loop {
            match (older.peek()?, newer.peek()?) {
                (None, None) => break,
                (Some(a), None) => {
                    if keep(a) {
                        merged.push(a);
                    }
                    older.advance();
                }
                (None, Some(b)) => {
                    if keep(b) {
                        merged.push(b);
                    }
                    newer.advance();
                }
                (Some(a), Some(b)) => {
                    if a.0 == b.0 {
                        // same key in both runs: the fresher slot wins
                        if keep(b) {
                            merged.push(b);
                        }
                        older.advance();
                        newer.advance();
                    } else if a.0 < b.0 {
                        if keep(a) {
                            merged.push(a);
                        }
                        older.advance();
                    } else {
                        if keep(b) {
                            merged.push(b);
                        }
                        newer.advance();
                    }
                }
            }
        }

        debug!(
            "compacting level {} into level {} ({} pairs, tombstones {})",
            level,
            level + 1,
            merged.len(),
            if drop_tombstones { "dropped" } else { "kept" }
        );

        self.perform_save(&merged, level + 1)?;
        fs::remove_file(&path_older)?;
        fs::remove_file(&path_newer)?;
        self.set_run_count(level, 0);
        Ok(())
    }
}
