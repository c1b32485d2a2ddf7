use crate::{Layout, Result, Store, StoreError};
use std::path::Path;

pub fn open_flat(dir: &Path, memtable_capacity: usize, buffer_capacity: usize) -> Result<Store> {
    Store::open(
        dir.join("db"),
        Layout::Flat,
        memtable_capacity,
        buffer_capacity,
    )
}

pub fn open_leveled(dir: &Path, memtable_capacity: usize, buffer_capacity: usize) -> Result<Store> {
    Store::open(
        dir.join("db"),
        Layout::Leveled,
        memtable_capacity,
        buffer_capacity,
    )
}

pub fn assert_not_found(result: Result<i32>) {
    assert!(
        matches!(result, Err(StoreError::NotFound)),
        "expected NotFound, got {:?}",
        result
    );
}
