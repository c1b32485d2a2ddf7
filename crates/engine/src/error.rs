//! Typed errors surfaced by the storage engine.
//!
//! The one condition that is *not* an error is a full memtable: `insert`
//! reports fullness as a boolean and the store translates it into a flush,
//! so callers never see it.

use thiserror::Error;

/// Errors surfaced by the store and its managers.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Point lookup for an absent key, or for a key whose freshest version
    /// is a tombstone.
    #[error("key not found")]
    NotFound,

    /// A static-index lookup was requested before the index was built, or
    /// against a store layout that carries no index.
    #[error("static index has not been built")]
    IndexMissing,

    /// On-disk state that violates the format: unparsable metadata, an
    /// index page with a negative or oversized entry count.
    #[error("corrupt database: {0}")]
    Corruption(String),

    /// Any underlying filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Engine-wide result alias.
pub type Result<T> = std::result::Result<T, StoreError>;
