//! Record codec: packed little-endian `(i32 key, i32 value)` streams.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use config::{KvPair, KV_PAIR_SIZE};
use std::io::{self, Cursor};

/// Serializes pairs into the packed on-disk record stream.
#[must_use]
pub fn encode_pairs(pairs: &[KvPair]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(pairs.len() * KV_PAIR_SIZE);
    for &(key, value) in pairs {
        // writes into a Vec cannot fail
        buf.write_i32::<LittleEndian>(key).expect("vec write");
        buf.write_i32::<LittleEndian>(value).expect("vec write");
    }
    buf
}

/// Decodes a packed record stream back into pairs.
///
/// # Errors
///
/// Returns [`io::ErrorKind::InvalidData`] when the buffer length is not a
/// multiple of the record size — a truncated or foreign file.
pub fn decode_pairs(bytes: &[u8]) -> io::Result<Vec<KvPair>> {
    if bytes.len() % KV_PAIR_SIZE != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "run data length {} is not a multiple of the {}-byte record size",
                bytes.len(),
                KV_PAIR_SIZE
            ),
        ));
    }

    let mut cursor = Cursor::new(bytes);
    let mut pairs = Vec::with_capacity(bytes.len() / KV_PAIR_SIZE);
    for _ in 0..bytes.len() / KV_PAIR_SIZE {
        let key = cursor.read_i32::<LittleEndian>()?;
        let value = cursor.read_i32::<LittleEndian>()?;
        pairs.push((key, value));
    }
    Ok(pairs)
}
