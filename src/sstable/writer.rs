use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, IoContext, Result};
use crate::iterator::StorageIterator;
use crate::options::Options;
use crate::sstable::format::{check_entry, encode_record, record_size, IndexEntry};
use crate::types::Key;

/// What a finished flush produced.
#[derive(Debug, Clone)]
pub struct SegmentMeta {
    pub data_path: PathBuf,
    pub index_path: PathBuf,
    /// Number of records (and index lines) written.
    pub entry_count: u64,
    /// Data file size in bytes.
    pub data_size: u64,
    /// Smallest key in the segment (empty for an empty segment).
    pub min_key: Key,
    /// Largest key in the segment (empty for an empty segment).
    pub max_key: Key,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Finished,
    Failed,
}

/// Writes one segment: a data file of length-prefixed records and a dense
/// text index with one `key:offset` line per record.
///
/// Build process:
/// 1. `create` opens both files, truncating anything already there
/// 2. Entries are added in strictly ascending key order
/// 3. `finish` flushes, optionally fsyncs, and (with `atomic_flush`)
///    renames the `.tmp` staging files onto the real paths
/// 4. `close` releases the handles; after a failure it also removes the
///    staging files so no half-written segment is left behind
///
/// Without `atomic_flush` the real paths are written directly and a failed
/// write leaves a truncated segment on disk.
pub struct SSTableWriter {
    data: BufWriter<File>,
    index: BufWriter<File>,
    data_path: PathBuf,
    index_path: PathBuf,
    /// `.tmp` paths being written when `atomic_flush` is on.
    staging: Option<(PathBuf, PathBuf)>,
    sync: bool,
    state: State,
    /// Data file position where the next record starts.
    offset: u64,
    entry_count: u64,
    min_key: Option<Key>,
    last_key: Option<Key>,
}

impl SSTableWriter {
    /// Create (or truncate) the segment files.
    pub fn create(data_path: &Path, index_path: &Path, options: &Options) -> Result<Self> {
        let staging = options
            .atomic_flush
            .then(|| (staging_path(data_path), staging_path(index_path)));
        let (data_out, index_out) = match &staging {
            Some((d, i)) => (d.as_path(), i.as_path()),
            None => (data_path, index_path),
        };

        let data = File::create(data_out).context("create", data_out)?;
        let index = File::create(index_out).context("create", index_out)?;
        log::debug!("writing segment {}", data_out.display());

        Ok(SSTableWriter {
            data: BufWriter::new(data),
            index: BufWriter::new(index),
            data_path: data_path.to_path_buf(),
            index_path: index_path.to_path_buf(),
            staging,
            sync: options.sync_on_flush,
            state: State::Open,
            offset: 0,
            entry_count: 0,
            min_key: None,
            last_key: None,
        })
    }

    /// Append one entry. Keys MUST arrive in strictly ascending order.
    ///
    /// A key that can't be framed (newline, too long, out of order) is
    /// rejected before anything is written and the writer stays usable.
    /// An I/O failure poisons the writer.
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if self.state != State::Open {
            return Err(Error::Poisoned);
        }
        check_entry(key, value)?;
        self.check_order(key)?;

        let index_line = IndexEntry {
            key: key.to_vec(),
            offset: self.offset,
        }
        .encode();

        let record = encode_record(key, value);
        if let Err(e) = self.append(&record, &index_line) {
            self.state = State::Failed;
            return Err(e);
        }

        self.offset += record_size(key, value);
        self.entry_count += 1;
        if self.min_key.is_none() {
            self.min_key = Some(key.to_vec());
        }
        self.last_key = Some(key.to_vec());
        Ok(())
    }

    fn append(&mut self, record: &[u8], index_line: &[u8]) -> Result<()> {
        self.data.write_all(record).context("write", self.data_out())?;
        self.index
            .write_all(index_line)
            .context("write", self.index_out())
    }

    fn check_order(&self, key: &[u8]) -> Result<()> {
        if let Some(last) = &self.last_key {
            if key <= last.as_slice() {
                return Err(Error::InvalidEntry(format!(
                    "{:?} is not above the previous key {:?}",
                    String::from_utf8_lossy(key),
                    String::from_utf8_lossy(last)
                )));
            }
        }
        Ok(())
    }

    /// Drain `iter` into the segment in a single pass, then finish it.
    pub fn write<I: StorageIterator>(&mut self, mut iter: I) -> Result<SegmentMeta> {
        while iter.is_valid() {
            self.add(iter.key(), iter.value())?;
            iter.next()?;
        }
        self.finish()
    }

    /// Make the segment durable and visible under its real paths.
    pub fn finish(&mut self) -> Result<SegmentMeta> {
        if self.state != State::Open {
            return Err(Error::Poisoned);
        }
        match self.publish() {
            Ok(()) => {
                self.state = State::Finished;
                Ok(SegmentMeta {
                    data_path: self.data_path.clone(),
                    index_path: self.index_path.clone(),
                    entry_count: self.entry_count,
                    data_size: self.offset,
                    min_key: self.min_key.clone().unwrap_or_default(),
                    max_key: self.last_key.clone().unwrap_or_default(),
                })
            }
            Err(e) => {
                self.state = State::Failed;
                Err(e)
            }
        }
    }

    fn publish(&mut self) -> Result<()> {
        let data_out = self.data_out().to_path_buf();
        let index_out = self.index_out().to_path_buf();

        // 1. Rust buffers -> OS page cache
        self.data.flush().context("flush", &data_out)?;
        self.index.flush().context("flush", &index_out)?;

        // 2. OS page cache -> disk
        if self.sync {
            self.data.get_ref().sync_all().context("sync", &data_out)?;
            self.index.get_ref().sync_all().context("sync", &index_out)?;
        }

        // 3. Index goes last so a visible index never points into a missing
        //    data file.
        if self.staging.is_some() {
            fs::rename(&data_out, &self.data_path).context("rename", &data_out)?;
            fs::rename(&index_out, &self.index_path).context("rename", &index_out)?;
        }
        Ok(())
    }

    /// Release both file handles.
    ///
    /// Safe after a successful or a failed write. If the segment was never
    /// published, its staging files are removed; the real paths are left
    /// as they were.
    pub fn close(self) -> Result<()> {
        let leftovers = match (&self.staging, self.state) {
            (Some((d, i)), State::Open | State::Failed) => vec![d.clone(), i.clone()],
            _ => Vec::new(),
        };
        drop(self);

        for path in leftovers {
            match fs::remove_file(&path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => {
                    return Err(Error::io("remove", &path, e));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn data_out(&self) -> &Path {
        self.staging.as_ref().map_or(&self.data_path, |(d, _)| d)
    }

    fn index_out(&self) -> &Path {
        self.staging.as_ref().map_or(&self.index_path, |(_, i)| i)
    }
}

/// Write everything `iter` yields as a segment and close the writer, on
/// success or failure.
pub fn write_segment<I: StorageIterator>(
    iter: I,
    data_path: &Path,
    index_path: &Path,
    options: &Options,
) -> Result<SegmentMeta> {
    let mut writer = SSTableWriter::create(data_path, index_path, options)?;
    match writer.write(iter) {
        Ok(meta) => {
            writer.close()?;
            Ok(meta)
        }
        Err(e) => {
            if let Err(cleanup) = writer.close() {
                log::warn!("cleanup after failed flush of {}: {cleanup}", data_path.display());
            }
            Err(e)
        }
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
