use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Unified error type for the storage core.
#[derive(Debug)]
pub enum Error {
    /// A file operation failed.
    Io {
        /// What was being done ("open", "read", "rename", ...).
        op: &'static str,
        /// The file it was being done to.
        path: PathBuf,
        source: io::Error,
    },
    /// A segment's index and data file disagree, or the index is malformed.
    Corruption(String),
    /// Key not found.
    NotFound,
    /// The entry cannot be stored in a segment: the key contains a newline
    /// or is not above the previous key, or the key or value is longer than
    /// a u32 length can frame.
    InvalidEntry(String),
    /// A segment writer was used after it finished or after an earlier
    /// write on it failed.
    Poisoned,
}

impl Error {
    pub(crate) fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        Error::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for `Error::NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { op, path, source } => {
                write!(f, "IO error: {op} {}: {source}", path.display())
            }
            Error::Corruption(msg) => write!(f, "Corruption: {msg}"),
            Error::NotFound => write!(f, "Not found"),
            Error::InvalidEntry(msg) => write!(f, "Invalid entry: {msg}"),
            Error::Poisoned => write!(f, "Segment writer can no longer be used"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Attaches the operation and file path to a raw `io::Result`.
pub(crate) trait IoContext<T> {
    fn context(self, op: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn context(self, op: &'static str, path: &Path) -> Result<T> {
        self.map_err(|e| Error::io(op, path, e))
    }
}
