//! Sorted, immutable on-disk segments.
//!
//! A segment is a pair of files written in one pass over a memtable: a data
//! file of length-prefixed records and a dense `key:offset` text index. See
//! [`format`] for the exact layout.

pub mod format;
pub mod reader;
pub mod writer;

pub use reader::{lookup, SSTableReader};
pub use writer::{write_segment, SSTableWriter, SegmentMeta};
