//! Write path: `put()`, `remove()`, and the internal `flush()`.
//!
//! Every mutation lands in the memtable. A put that finds the table
//! already full drains it in key order to the disk manager, swaps in a
//! fresh table, and retries — so a caller never observes the full
//! condition.

use crate::{Backend, Result, Store};
use config::TOMBSTONE;
use log::debug;
use memtable::Memtable;

impl Store {
    /// Inserts or overwrites a key-value pair.
    ///
    /// `value` must not be [`TOMBSTONE`] (`i32::MIN`) — that bit pattern is
    /// the deletion sentinel, so storing it is indistinguishable from
    /// [`remove`](Store::remove).
    ///
    /// # Errors
    ///
    /// I/O failures from a triggered flush (and, in the leveled layout, a
    /// triggered compaction) propagate; the put is then not applied.
    pub fn put(&mut self, key: i32, value: i32) -> Result<()> {
        loop {
            let full = self.mem.insert(key, value);
            if !full || self.mem.get(key) == Some(value) {
                // absorbed: either the table has room, or this very pair is
                // the one that filled it (it flushes with the next overflow)
                return Ok(());
            }
            self.flush()?;
        }
    }

    /// Deletes a key by writing a tombstone.
    ///
    /// The tombstone shadows any older version on disk until compaction
    /// into the deepest level finally drops it.
    pub fn remove(&mut self, key: i32) -> Result<()> {
        self.put(key, TOMBSTONE)
    }

    /// Drains the memtable to the disk manager and swaps in a fresh one.
    ///
    /// An empty memtable flushes nothing but is still replaced. In the
    /// leveled layout the save lands in level 1 and may cascade into
    /// compaction before this returns.
    pub(crate) fn flush(&mut self) -> Result<()> {
        let pairs = self.mem.scan_all();
        debug!("flushing memtable ({} pairs)", pairs.len());

        match &mut self.backend {
            Backend::Flat(store) => store.save(&pairs)?,
            Backend::Leveled(store) => store.save(&pairs, 1)?,
        }

        self.mem = Memtable::new(self.mem.capacity());
        Ok(())
    }
}
