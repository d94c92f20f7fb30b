pub mod skiplist;

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::Result;
use crate::options::Options;
use crate::sstable::format::check_entry;
use crate::sstable::writer::{write_segment, SegmentMeta};
use crate::types::{Key, Value};
use skiplist::{SkipList, SkipListIterator};

/// In-memory sorted buffer for writes. Wraps a SkipList.
///
/// Every write goes here first. When size exceeds the threshold,
/// the memtable is frozen (becomes immutable) and flushed to a segment.
///
/// Deletes remove the entry outright. There is only ever one segment
/// behind a memtable, so nothing older needs shadowing by a tombstone.
pub struct MemTable {
    data: SkipList,
    size_limit: usize,
}

impl MemTable {
    /// Create a new empty memtable with given size limit.
    pub fn new(size_limit: usize) -> Self {
        MemTable {
            data: SkipList::new(),
            size_limit,
        }
    }

    /// Insert or update a key-value pair.
    pub fn put(&mut self, key: Key, value: Value) {
        self.data.insert(key, value);
    }

    /// Look up a key.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.data.get(key)
    }

    /// Remove a key. `Error::NotFound` if it was never there.
    pub fn delete(&mut self, key: &[u8]) -> Result<Value> {
        self.data.delete(key)
    }

    /// Return a sorted iterator over all entries.
    pub fn iter(&self) -> SkipListIterator<'_> {
        self.data.iter()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current memory usage in bytes.
    pub fn size(&self) -> usize {
        self.data.size_bytes()
    }

    /// Check if memtable has reached the flush threshold.
    pub fn is_full(&self) -> bool {
        self.data.size_bytes() >= self.size_limit
    }
}

/// Owns the active memtable and, between a freeze and the end of its flush,
/// one frozen memtable.
///
/// Reads take the shared lock and writes the exclusive one, so any number of
/// readers run alongside a single writer. `freeze` swaps a fresh memtable in
/// under the write lock; the frozen one is behind an `Arc`, so a flush reads
/// it without holding any lock while new writes land in the replacement.
///
/// Flushes are serialized, so each frozen memtable is written by exactly one
/// of them.
pub struct MemTableManager {
    active: RwLock<MemTable>,
    immutable: RwLock<Option<Arc<MemTable>>>,
    flush_lock: Mutex<()>,
    options: Options,
}

impl MemTableManager {
    pub fn new(options: Options) -> Self {
        MemTableManager {
            active: RwLock::new(MemTable::new(options.memtable_size_limit)),
            immutable: RwLock::new(None),
            flush_lock: Mutex::new(()),
            options,
        }
    }

    /// Insert or update a key.
    ///
    /// An entry no segment could hold is refused here with
    /// `Error::InvalidEntry` rather than failing every later flush.
    pub fn put(&self, key: Key, value: Value) -> Result<()> {
        check_entry(&key, &value)?;
        self.active.write().put(key, value);
        Ok(())
    }

    /// Check the active memtable first, then the frozen one.
    pub fn get(&self, key: &[u8]) -> Option<Value> {
        if let Some(v) = self.active.read().get(key) {
            return Some(v.to_vec());
        }
        self.immutable
            .read()
            .as_ref()
            .and_then(|frozen| frozen.get(key).map(<[u8]>::to_vec))
    }

    /// Remove a key from the active memtable.
    ///
    /// A frozen memtable is never modified; a key that only lives there is
    /// `Error::NotFound` here.
    pub fn delete(&self, key: &[u8]) -> Result<Value> {
        self.active.write().delete(key)
    }

    /// Whether the active memtable has reached its size limit.
    pub fn should_flush(&self) -> bool {
        self.active.read().is_full()
    }

    /// Move the active memtable to the frozen slot and start a new one.
    ///
    /// Returns false without doing anything if a frozen memtable is still
    /// waiting to be flushed.
    pub fn freeze(&self) -> bool {
        let mut immutable = self.immutable.write();
        if immutable.is_some() {
            return false;
        }
        *immutable = Some(Arc::new(self.swap_active()));
        true
    }

    // Caller holds the immutable write lock.
    fn swap_active(&self) -> MemTable {
        let fresh = MemTable::new(self.options.memtable_size_limit);
        let old = std::mem::replace(&mut *self.active.write(), fresh);
        log::trace!("froze memtable with {} entries ({} bytes)", old.len(), old.size());
        old
    }

    pub fn has_immutable(&self) -> bool {
        self.immutable.read().is_some()
    }

    /// Drop the frozen memtable once its segment is durable.
    pub fn clear_immutable(&self) {
        *self.immutable.write() = None;
    }

    /// Freeze the active memtable (unless one is already frozen) and write
    /// the frozen one out as a segment.
    ///
    /// The frozen memtable is released only after the segment is written,
    /// so a failed flush leaves its entries readable and a retry possible.
    pub fn flush(&self, data_path: &Path, index_path: &Path) -> Result<SegmentMeta> {
        let _flushing = self.flush_lock.lock();
        let frozen = Arc::clone(
            self.immutable
                .write()
                .get_or_insert_with(|| Arc::new(self.swap_active())),
        );

        log::debug!(
            "flushing {} entries to {}",
            frozen.len(),
            data_path.display()
        );
        let meta = write_segment(frozen.iter(), data_path, index_path, &self.options)?;
        self.release(&frozen);

        log::info!(
            "flushed segment {} ({} entries, {} bytes)",
            data_path.display(),
            meta.entry_count,
            meta.data_size
        );
        Ok(meta)
    }

    // Empties the frozen slot only if it still holds the table just written.
    fn release(&self, flushed: &Arc<MemTable>) {
        let mut immutable = self.immutable.write();
        if immutable.as_ref().is_some_and(|t| Arc::ptr_eq(t, flushed)) {
            *immutable = None;
        }
    }
}
