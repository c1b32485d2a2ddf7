//! Run writer and page-aligned run reader.

use config::{KvPair, KV_PAIR_SIZE, PAGE_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::codec::{decode_pairs, encode_pairs};

/// Writes `pairs` to `path` as a new immutable run.
///
/// The caller guarantees the pairs are sorted ascending and unique by key;
/// this function only serializes. Existing files are truncated — run paths
/// are only ever reused after compaction has unlinked the old file.
///
/// # Errors
///
/// Any create/write failure is returned as-is; a partial file may remain.
pub fn write_run(path: &Path, pairs: &[KvPair]) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&encode_pairs(pairs))?;
    writer.flush()?;
    Ok(())
}

/// A read handle over one immutable run file.
///
/// The descriptor lives for the scope of the handle and is closed on drop,
/// so callers open a `RunFile` per operation and let it go out of scope on
/// every exit path.
#[derive(Debug)]
pub struct RunFile {
    file: File,
    len: u64,
}

impl RunFile {
    /// Opens a run and records its length.
    ///
    /// # Errors
    ///
    /// Fails on open/stat errors, or with [`io::ErrorKind::InvalidData`]
    /// when the file length is not a multiple of the record size.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len % KV_PAIR_SIZE as u64 != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("run file {} has length {} not divisible by {}", path.display(), len, KV_PAIR_SIZE),
            ));
        }
        Ok(Self { file, len })
    }

    /// Returns the file length in bytes.
    #[must_use]
    pub fn len_bytes(&self) -> u64 {
        self.len
    }

    /// Returns the total number of pairs in the run.
    #[must_use]
    pub fn num_pairs(&self) -> usize {
        (self.len / KV_PAIR_SIZE as u64) as usize
    }

    /// Returns the number of pages, counting a short trailing page.
    #[must_use]
    pub fn num_pages(&self) -> u32 {
        self.len.div_ceil(PAGE_SIZE as u64) as u32
    }

    /// Reads and decodes one page.
    ///
    /// The page starts at `page * PAGE_SIZE` and spans
    /// `min(PAGE_SIZE, len - offset)` bytes. A page number at or past the
    /// end of the file yields an empty vector, which read loops use as
    /// their stop condition.
    pub fn read_page(&mut self, page: u32) -> io::Result<Vec<KvPair>> {
        let offset = page as u64 * PAGE_SIZE as u64;
        if offset >= self.len {
            return Ok(Vec::new());
        }

        let page_len = PAGE_SIZE.min((self.len - offset) as usize);
        let mut buf = vec![0u8; page_len];
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut buf)?;
        decode_pairs(&buf)
    }

    /// Reads and decodes the whole run.
    pub fn read_all(&mut self) -> io::Result<Vec<KvPair>> {
        let mut buf = Vec::with_capacity(self.len as usize);
        self.file.seek(SeekFrom::Start(0))?;
        self.file.read_to_end(&mut buf)?;
        decode_pairs(&buf)
    }
}
