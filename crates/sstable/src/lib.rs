//! # SSTable - Sorted Runs
//!
//! The shared on-disk run layer for the storage engine: the record codec,
//! the run writer, the page-aligned run reader, and the binary-search
//! helpers used by every component that looks at decoded pages.
//!
//! A run is *write-once, read-many* — created by a memtable flush or by
//! compaction, then never modified (only deleted when compaction or a
//! database drop supersedes it).
//!
//! ## File layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ key (i32 LE) | value (i32 LE)                                │
//! │ ... repeated for each pair, strictly ascending by key ...    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no header, no padding, and no trailer: the file length is
//! always a multiple of 8 and the pair count is `len / 8`. A page is
//! `PAGE_SIZE` bytes (512 pairs); the last page of a run may be short.
//!
//! Both storage managers (flat and leveled) consume this crate rather than
//! carrying their own copies of the page math and search routines.

mod codec;
mod run;
mod search;

pub use codec::{decode_pairs, encode_pairs};
pub use run::{write_run, RunFile};
pub use search::{find_key, lower_bound};

#[cfg(test)]
mod tests;
