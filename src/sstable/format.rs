//! On-disk framing shared by the segment writer and reader.
//!
//! Data file: records back to back, ascending by key, no header or footer.
//! ```text
//! ┌──────────────┬───────────┬────────────────┬─────────────┐
//! │ key_len (4B) │ key (var) │ value_len (4B) │ value (var) │
//! └──────────────┴───────────┴────────────────┴─────────────┘
//! ```
//! Lengths are little-endian u32.
//!
//! Index file: one text line per data record, same order.
//! ```text
//! <key>:<decimal byte offset of the record in the data file>\n
//! ```

use crate::error::{Error, Result};
use crate::types::Key;

/// Size of each length prefix in a data record.
pub const LEN_PREFIX_SIZE: usize = 4;

/// Total on-disk size of one data record.
pub fn record_size(key: &[u8], value: &[u8]) -> u64 {
    (LEN_PREFIX_SIZE + key.len() + LEN_PREFIX_SIZE + value.len()) as u64
}

/// Encode one data record.
/// Callers check that both lengths fit in a u32.
pub fn encode_record(key: &[u8], value: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(record_size(key, value) as usize);
    buf.extend_from_slice(&(key.len() as u32).to_le_bytes());
    buf.extend_from_slice(key);
    buf.extend_from_slice(&(value.len() as u32).to_le_bytes());
    buf.extend_from_slice(value);
    buf
}

/// Whether a key/value pair can be framed in a segment at all: the key must
/// not contain a newline and both lengths must fit a u32.
pub fn check_entry(key: &[u8], value: &[u8]) -> Result<()> {
    if key.contains(&b'\n') {
        return Err(Error::InvalidEntry(
            "keys containing a newline cannot be indexed".into(),
        ));
    }
    if u32::try_from(key.len()).is_err() {
        return Err(Error::InvalidEntry(format!(
            "key of {} bytes does not fit a u32 length",
            key.len()
        )));
    }
    if u32::try_from(value.len()).is_err() {
        return Err(Error::InvalidEntry(format!(
            "value of {} bytes does not fit a u32 length",
            value.len()
        )));
    }
    Ok(())
}

/// One line of the index file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: Key,
    /// Where this key's record starts in the data file.
    pub offset: u64,
}

impl IndexEntry {
    /// Encode as `key:offset\n`.
    pub fn encode(&self) -> Vec<u8> {
        let offset = self.offset.to_string();
        let mut buf = Vec::with_capacity(self.key.len() + 1 + offset.len() + 1);
        buf.extend_from_slice(&self.key);
        buf.push(b':');
        buf.extend_from_slice(offset.as_bytes());
        buf.push(b'\n');
        buf
    }

    /// Decode a single line, without its trailing newline.
    ///
    /// The offset follows the LAST colon, so keys may contain colons.
    pub fn decode(line: &[u8]) -> Result<Self> {
        let sep = line
            .iter()
            .rposition(|&b| b == b':')
            .ok_or_else(|| Error::Corruption("index line has no ':' separator".into()))?;

        let digits = &line[sep + 1..];
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return Err(Error::Corruption(format!(
                "index offset is not a decimal number: {:?}",
                String::from_utf8_lossy(digits)
            )));
        }
        let offset = std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| Error::Corruption("index offset out of range".into()))?;

        Ok(IndexEntry {
            key: line[..sep].to_vec(),
            offset,
        })
    }
}

/// Parse a whole index file into a table sorted by key.
///
/// Rejects a final line without its newline (a torn write) and keys that
/// are not strictly ascending, since lookups binary-search the result.
pub fn parse_index(data: &[u8]) -> Result<Vec<IndexEntry>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    if data.last() != Some(&b'\n') {
        return Err(Error::Corruption("index file does not end with a newline".into()));
    }

    let mut entries: Vec<IndexEntry> = Vec::new();
    for line in data[..data.len() - 1].split(|&b| b == b'\n') {
        let entry = IndexEntry::decode(line)?;
        if let Some(prev) = entries.last() {
            if prev.key >= entry.key {
                return Err(Error::Corruption(format!(
                    "index keys out of order at offset {}",
                    entry.offset
                )));
            }
        }
        entries.push(entry);
    }
    Ok(entries)
}
