use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{Error, IoContext, Result};
use crate::sstable::format::{parse_index, IndexEntry, LEN_PREFIX_SIZE};
use crate::types::Value;

/// An opened segment. Supports point lookups.
///
/// On open the whole index file is parsed into memory once. Each lookup
/// then:
/// 1. Binary searches the in-memory index → record offset
/// 2. Opens the data file, seeks to the offset
/// 3. Reads the record, checks its key against the one asked for
///
/// The data file is opened per lookup and closed before returning, so an
/// `SSTableReader` holds no file handles.
pub struct SSTableReader {
    data_path: PathBuf,
    index: Vec<IndexEntry>,
}

impl SSTableReader {
    /// Open a segment by loading its index.
    pub fn open(data_path: &Path, index_path: &Path) -> Result<Self> {
        let raw = fs::read(index_path).context("read", index_path)?;
        let index = parse_index(&raw).map_err(|e| match e {
            Error::Corruption(msg) => {
                log::warn!("bad segment index {}: {msg}", index_path.display());
                Error::Corruption(format!("{}: {msg}", index_path.display()))
            }
            other => other,
        })?;

        log::debug!(
            "opened segment {} with {} index entries",
            data_path.display(),
            index.len()
        );
        Ok(SSTableReader {
            data_path: data_path.to_path_buf(),
            index,
        })
    }

    /// Point lookup.
    ///
    /// A key with no index line is `Error::NotFound` and the data file is
    /// never touched. A key that is indexed always has a value, possibly
    /// empty.
    pub fn get(&self, key: &[u8]) -> Result<Value> {
        let offset = self.offset_of(key).ok_or(Error::NotFound)?;
        self.read_record(key, offset)
    }

    /// Whether the index lists `key`. Does not read the data file.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.offset_of(key).is_some()
    }

    /// Indexed keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.index.iter().map(|entry| entry.key.as_slice())
    }

    /// Number of records in the segment.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn offset_of(&self, key: &[u8]) -> Option<u64> {
        self.index
            .binary_search_by(|entry| entry.key.as_slice().cmp(key))
            .ok()
            .map(|idx| self.index[idx].offset)
    }

    fn read_record(&self, key: &[u8], offset: u64) -> Result<Value> {
        let path = self.data_path.as_path();
        let mut file = File::open(path).context("open", path)?;
        file.seek(SeekFrom::Start(offset)).context("seek", path)?;
        let mut reader = BufReader::new(file);

        let key_len = read_len(&mut reader, path)?;
        // A length that can't be the requested key means the offset is wrong;
        // don't allocate whatever it claims.
        if key_len != key.len() {
            let detail = format!("key length {key_len}, expected {}", key.len());
            return Err(self.mismatch(offset, &detail));
        }
        let stored_key = read_exact_vec(&mut reader, key_len, path)?;
        if stored_key != key {
            return Err(self.mismatch(
                offset,
                &format!("found key {:?}", String::from_utf8_lossy(&stored_key)),
            ));
        }

        let value_len = read_len(&mut reader, path)?;
        read_exact_vec(&mut reader, value_len, path)
    }

    fn mismatch(&self, offset: u64, detail: &str) -> Error {
        log::warn!(
            "index/data mismatch in {} at offset {offset}: {detail}",
            self.data_path.display()
        );
        Error::Corruption(format!(
            "{} at offset {offset}: {detail}",
            self.data_path.display()
        ))
    }
}

/// One-shot lookup: open the segment, look up `key`, release everything.
pub fn lookup(data_path: &Path, index_path: &Path, key: &[u8]) -> Result<Value> {
    SSTableReader::open(data_path, index_path)?.get(key)
}

fn read_len<R: Read>(reader: &mut R, path: &Path) -> Result<usize> {
    let mut buf = [0u8; LEN_PREFIX_SIZE];
    reader.read_exact(&mut buf).context("read", path)?;
    Ok(u32::from_le_bytes(buf) as usize)
}

fn read_exact_vec<R: Read>(reader: &mut R, len: usize, path: &Path) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .by_ref()
        .take(len as u64)
        .read_to_end(&mut buf)
        .context("read", path)?;
    if buf.len() != len {
        return Err(Error::io(
            "read",
            path,
            std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("record needs {len} bytes, file has {}", buf.len()),
            ),
        ));
    }
    Ok(buf)
}
