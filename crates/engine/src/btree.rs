//! Static B-tree index over flat-layout runs.
//!
//! A run's index is built once, after the run exists, and never updated:
//! rewriting the run invalidates the index and the caller rebuilds it. The
//! index accelerates point lookups from a full-run binary search to one
//! page read per tree level plus a single data-page read.
//!
//! ## File layout (`btree/sst-K.btree`)
//!
//! A sequence of fixed-size pages of `4 + PAGE_SIZE` bytes each, root
//! first, then each level left-to-right down to the leaves:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ size (i32 LE) | size × [ key (i32 LE) | child (i32 LE) ]     │
//! │ zero fill up to the page boundary                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Page 0 is the root. An entry's `child` is non-negative in a leaf and
//! names the run page whose maximum key equals the entry's key; in an
//! internal page it is negative and decodes to the B-tree page
//! `-child - 1`, an absolute index within the file.
//!
//! ## Construction
//!
//! Bottom-up: one leaf entry per run page, then one parent entry per child
//! page (key = that child's maximum key), each level packed into pages of
//! up to `PAIRS_PER_PAGE` entries, repeated until a single root page
//! remains. Children are numbered within their level while building and
//! rebased to absolute file positions as the pages are written out.

use crate::error::{Result, StoreError};
use crate::flat::FlatStore;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use config::{BTREE_DIR, BTREE_FILE_EXT, PAIRS_PER_PAGE, SST_FILE_PREFIX};
use log::debug;
use sstable::{find_key, lower_bound};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// One index entry: `(key, child)`, the same shape as a KV pair so the
/// shared binary-search helpers apply to index pages too.
type IndexEntry = (i32, i32);

/// One index page: up to `PAIRS_PER_PAGE` entries.
type IndexPage = Vec<IndexEntry>;

fn btree_dir(db_dir: &Path) -> PathBuf {
    db_dir.join(BTREE_DIR)
}

fn btree_path(db_dir: &Path, idx: u32) -> PathBuf {
    btree_dir(db_dir).join(format!("{}{}.{}", SST_FILE_PREFIX, idx, BTREE_FILE_EXT))
}

/// Groups `entries` into pages of up to `PAIRS_PER_PAGE`. Zero entries
/// still produce one (empty) page so every index file has a root.
fn pack_pages(entries: Vec<IndexEntry>) -> Vec<IndexPage> {
    if entries.is_empty() {
        return vec![Vec::new()];
    }
    entries.chunks(PAIRS_PER_PAGE).map(|c| c.to_vec()).collect()
}

fn is_leaf(entries: &[IndexEntry]) -> bool {
    entries.first().is_some_and(|entry| entry.1 >= 0)
}

/// Builds an index for every run of `store`, creating `btree/` on first
/// use. Rebuilding produces byte-identical files.
///
/// # Errors
///
/// Directory-creation and write failures propagate; a partially written
/// index file is left in place for the caller to rebuild or delete.
pub fn build_all(store: &mut FlatStore) -> Result<()> {
    fs::create_dir_all(btree_dir(store.path()))?;
    for idx in 1..=store.num_runs() {
        build_one(store, idx)?;
    }
    Ok(())
}

fn build_one(store: &mut FlatStore, idx: u32) -> Result<()> {
    let pairs = store.read_run(idx)?;

    // Leaf level: one entry per run page, keyed by the page's maximum key.
    let leaf_entries: Vec<IndexEntry> = pairs
        .chunks(PAIRS_PER_PAGE)
        .enumerate()
        .map(|(page, chunk)| (chunk.last().expect("chunks are non-empty").0, page as i32))
        .collect();

    // Parent levels: one entry per child page until a single root remains.
    // Children are numbered within their own level here; the write below
    // rebases them to absolute file positions.
    let mut levels: Vec<Vec<IndexPage>> = vec![pack_pages(leaf_entries)];
    while levels.last().expect("at least the leaf level").len() > 1 {
        let children = levels.last().expect("at least the leaf level");
        let parent_entries: Vec<IndexEntry> = children
            .iter()
            .enumerate()
            .map(|(child_idx, child)| {
                let max_key = child.last().expect("index pages are non-empty").0;
                (max_key, -(child_idx as i32) - 1)
            })
            .collect();
        levels.push(pack_pages(parent_entries));
    }

    // Root-first, level-major write order.
    let ordered: Vec<&Vec<IndexPage>> = levels.iter().rev().collect();
    let mut level_offsets = Vec::with_capacity(ordered.len());
    let mut total_pages = 0i32;
    for level in &ordered {
        level_offsets.push(total_pages);
        total_pages += level.len() as i32;
    }

    let path = btree_path(store.path(), idx);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)?;
    let mut writer = BufWriter::new(file);

    for (depth, level) in ordered.iter().enumerate() {
        for page in level.iter() {
            let rebased: IndexPage = page
                .iter()
                .map(|&(key, child)| {
                    if child >= 0 {
                        (key, child)
                    } else {
                        let absolute = level_offsets[depth + 1] + (-child - 1);
                        (key, -absolute - 1)
                    }
                })
                .collect();
            writer.write_all(&encode_index_page(&rebased))?;
        }
    }
    writer.flush()?;

    debug!(
        "built index for sst-{}: {} pages over {} levels",
        idx,
        total_pages,
        ordered.len()
    );
    Ok(())
}

fn encode_index_page(entries: &[IndexEntry]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(config::BTREE_PAGE_SIZE);
    // writes into a Vec cannot fail
    buf.write_i32::<LittleEndian>(entries.len() as i32)
        .expect("vec write");
    for &(key, child) in entries {
        buf.write_i32::<LittleEndian>(key).expect("vec write");
        buf.write_i32::<LittleEndian>(child).expect("vec write");
    }
    buf.resize(config::BTREE_PAGE_SIZE, 0);
    buf
}

fn read_index_page(file: &mut File, page: u32) -> Result<IndexPage> {
    let mut buf = vec![0u8; config::BTREE_PAGE_SIZE];
    file.seek(SeekFrom::Start(page as u64 * config::BTREE_PAGE_SIZE as u64))?;
    file.read_exact(&mut buf)?;

    let mut cursor = Cursor::new(&buf);
    let size = cursor.read_i32::<LittleEndian>()?;
    if size < 0 || size as usize > PAIRS_PER_PAGE {
        return Err(StoreError::Corruption(format!(
            "index page {} has entry count {}",
            page, size
        )));
    }

    let mut entries = Vec::with_capacity(size as usize);
    for _ in 0..size {
        let key = cursor.read_i32::<LittleEndian>()?;
        let child = cursor.read_i32::<LittleEndian>()?;
        entries.push((key, child));
    }
    Ok(entries)
}

/// Looks `key` up through the static indexes, newest run first.
///
/// # Errors
///
/// [`StoreError::IndexMissing`] when `btree/` does not exist; corruption
/// and I/O errors propagate. A clean miss is `Ok(None)`.
pub fn lookup(store: &mut FlatStore, key: i32) -> Result<Option<i32>> {
    if !btree_dir(store.path()).exists() {
        return Err(StoreError::IndexMissing);
    }

    for idx in (1..=store.num_runs()).rev() {
        if let Some(value) = lookup_run(store, idx, key)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn lookup_run(store: &mut FlatStore, idx: u32, key: i32) -> Result<Option<i32>> {
    let path = btree_path(store.path(), idx);
    let mut file = File::open(&path)?;

    let mut entries = read_index_page(&mut file, 0)?;
    while !is_leaf(&entries) {
        let Some(&(max_key, _)) = entries.last() else {
            return Ok(None);
        };
        if max_key < key {
            // beyond this run's key range
            return Ok(None);
        }
        let child = entries[lower_bound(&entries, key)].1;
        entries = read_index_page(&mut file, (-child - 1) as u32)?;
    }

    let pos = lower_bound(&entries, key);
    if pos == entries.len() {
        return Ok(None);
    }

    let run_page = entries[pos].1 as u32;
    let pairs = store.read_page(idx, run_page)?;
    Ok(find_key(&pairs, key).map(|i| pairs[i].1))
}
