use crate::{write_run, RunFile};
use config::{KvPair, KV_PAIR_SIZE, PAGE_SIZE, PAIRS_PER_PAGE};
use std::fs;
use tempfile::tempdir;

fn ascending(n: usize) -> Vec<KvPair> {
    (0..n as i32).map(|k| (k, k * 2)).collect()
}

// -------------------- Writing --------------------

#[test]
fn written_run_has_packed_length() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sst-1");
    write_run(&path, &ascending(10)).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), 10 * KV_PAIR_SIZE as u64);
}

#[test]
fn empty_run_is_an_empty_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sst-1");
    write_run(&path, &[]).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
}

// -------------------- Page math --------------------

#[test]
fn single_short_page() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sst-1");
    write_run(&path, &ascending(10)).unwrap();

    let mut run = RunFile::open(&path).unwrap();
    assert_eq!(run.num_pages(), 1);
    assert_eq!(run.num_pairs(), 10);
    assert_eq!(run.read_page(0).unwrap(), ascending(10));
    assert!(run.read_page(1).unwrap().is_empty());
}

#[test]
fn exact_page_boundary() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sst-1");
    write_run(&path, &ascending(PAIRS_PER_PAGE)).unwrap();

    let mut run = RunFile::open(&path).unwrap();
    assert_eq!(run.len_bytes(), PAGE_SIZE as u64);
    assert_eq!(run.num_pages(), 1);
    assert!(run.read_page(1).unwrap().is_empty());
}

#[test]
fn short_trailing_page() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sst-1");
    let pairs = ascending(PAIRS_PER_PAGE + 3);
    write_run(&path, &pairs).unwrap();

    let mut run = RunFile::open(&path).unwrap();
    assert_eq!(run.num_pages(), 2);
    assert_eq!(run.read_page(0).unwrap().len(), PAIRS_PER_PAGE);
    let tail = run.read_page(1).unwrap();
    assert_eq!(tail.len(), 3);
    assert_eq!(tail, pairs[PAIRS_PER_PAGE..]);
}

#[test]
fn read_all_reassembles_pages() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sst-1");
    let pairs = ascending(3 * PAIRS_PER_PAGE + 17);
    write_run(&path, &pairs).unwrap();

    let mut run = RunFile::open(&path).unwrap();
    assert_eq!(run.num_pages(), 4);
    assert_eq!(run.read_all().unwrap(), pairs);

    let mut stitched = Vec::new();
    for page in 0..run.num_pages() {
        stitched.extend(run.read_page(page).unwrap());
    }
    assert_eq!(stitched, pairs);
}

// -------------------- Corruption --------------------

#[test]
fn open_rejects_misaligned_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sst-1");
    fs::write(&path, [0u8; 13]).unwrap();
    let err = RunFile::open(&path).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}

#[test]
fn open_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let err = RunFile::open(&dir.path().join("sst-9")).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}
