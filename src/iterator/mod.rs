use crate::error::Result;

/// Cursor over a sorted source of key-value pairs.
///
/// The skip list implements it, and the segment writer drains any
/// implementation in one pass, so a merged view over several memtables can
/// be flushed the same way.
///
/// ```text
/// let mut it = source.iter();
/// while it.is_valid() {
///     use(it.key(), it.value());
///     it.next()?;
/// }
/// ```
pub trait StorageIterator {
    /// Key at the current position; empty once the iterator is exhausted.
    fn key(&self) -> &[u8];

    /// Value at the current position; empty once the iterator is exhausted.
    fn value(&self) -> &[u8];

    /// The "has more" predicate: true while positioned on an entry.
    fn is_valid(&self) -> bool;

    /// Step to the next entry in key order. A no-op when exhausted.
    fn next(&mut self) -> Result<()>;

    /// Position at the first entry with key >= `key`.
    fn seek(&mut self, key: &[u8]) -> Result<()>;
}
