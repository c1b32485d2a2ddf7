//! Metadata files: persistent run counts for both directory layouts.
//!
//! ## File format
//!
//! Both layouts keep a small text file named `metadata` directly inside the
//! database directory.
//!
//! Flat layout — the run count as one decimal integer:
//!
//! ```text
//! 3
//! ```
//!
//! Leveled layout — one `<level> <count>` pair per line:
//!
//! ```text
//! 1 1
//! 2 0
//! 3 1
//! ```
//!
//! Text was chosen over binary so a database directory can be inspected
//! with any editor; the files are a handful of bytes and parsing cost is
//! irrelevant.

use crate::error::{Result, StoreError};
use config::METADATA_FILENAME;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Reads the flat layout's run count.
///
/// # Errors
///
/// `Io` when the file cannot be read, `Corruption` when its contents do not
/// parse as a single non-negative integer.
pub(crate) fn read_run_count(dir: &Path) -> Result<u32> {
    let path = dir.join(METADATA_FILENAME);
    let text = fs::read_to_string(&path)?;
    text.trim().parse::<u32>().map_err(|_| {
        StoreError::Corruption(format!(
            "metadata file {} does not hold a run count: {:?}",
            path.display(),
            text.trim()
        ))
    })
}

/// Persists the flat layout's run count.
pub(crate) fn write_run_count(dir: &Path, count: u32) -> Result<()> {
    fs::write(dir.join(METADATA_FILENAME), count.to_string())?;
    Ok(())
}

/// Reads the leveled layout's `level -> run count` map.
///
/// Tokens are whitespace-separated and consumed in pairs; an odd token
/// count or a non-numeric token is `Corruption`.
pub(crate) fn read_level_map(dir: &Path) -> Result<BTreeMap<u32, u32>> {
    let path = dir.join(METADATA_FILENAME);
    let text = fs::read_to_string(&path)?;

    let mut levels = BTreeMap::new();
    let mut tokens = text.split_whitespace();
    while let Some(level_tok) = tokens.next() {
        let count_tok = tokens.next().ok_or_else(|| {
            StoreError::Corruption(format!(
                "metadata file {} has a level {} with no count",
                path.display(),
                level_tok
            ))
        })?;
        let level = parse_token(&path, level_tok)?;
        let count = parse_token(&path, count_tok)?;
        levels.insert(level, count);
    }
    Ok(levels)
}

/// Persists the leveled layout's `level -> run count` map.
pub(crate) fn write_level_map(dir: &Path, levels: &BTreeMap<u32, u32>) -> Result<()> {
    let mut text = String::new();
    for (level, count) in levels {
        // writing to a String cannot fail
        let _ = writeln!(text, "{} {}", level, count);
    }
    fs::write(dir.join(METADATA_FILENAME), text)?;
    Ok(())
}

fn parse_token(path: &Path, token: &str) -> Result<u32> {
    token.parse::<u32>().map_err(|_| {
        StoreError::Corruption(format!(
            "metadata file {} contains a non-numeric token {:?}",
            path.display(),
            token
        ))
    })
}
