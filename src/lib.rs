//! # LSM storage core
//!
//! The two halves every LSM-tree key-value store starts from:
//!
//! - a **memtable**: an in-memory skip list that buffers writes in key order
//! - **segments** (SSTables): the memtable flushed once, in order, to an
//!   immutable data file plus a dense `key:offset` index, read back by
//!   point lookup without loading the data file
//!
//! ```
//! # fn main() -> lsm_core::Result<()> {
//! use lsm_core::memtable::MemTableManager;
//! use lsm_core::{sstable, Options};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let (data, index) = (dir.path().join("0001.data"), dir.path().join("0001.index"));
//!
//! let memtable = MemTableManager::new(Options::default());
//! memtable.put(b"A".to_vec(), b"1".to_vec())?;
//! memtable.put(b"B".to_vec(), b"2".to_vec())?;
//! memtable.flush(&data, &index)?;
//!
//! assert_eq!(sstable::lookup(&data, &index, b"B")?, b"2");
//! assert!(sstable::lookup(&data, &index, b"C").unwrap_err().is_not_found());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod iterator;
pub mod lexer;
pub mod memtable;
pub mod options;
pub mod sstable;
pub mod types;

pub use error::{Error, Result};
pub use options::Options;
