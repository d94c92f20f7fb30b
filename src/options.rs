//! Tuning knobs for the memtable and for segment flushes.

/// Engine configuration.
///
/// ```
/// use lsm_core::Options;
///
/// let opts = Options::default()
///     .memtable_size_limit(64 * 1024)
///     .sync_on_flush(false);
/// assert!(opts.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Approximate key + value bytes the active memtable may hold before
    /// `MemTableManager::should_flush` reports true.
    pub memtable_size_limit: usize,
    /// fsync both segment files before a flush is reported as done.
    pub sync_on_flush: bool,
    /// Write segments to `.tmp` staging paths and rename them into place
    /// only after both files are complete.
    pub atomic_flush: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            memtable_size_limit: 4 * 1024 * 1024,
            sync_on_flush: true,
            atomic_flush: true,
        }
    }
}

impl Options {
    #[must_use]
    pub fn memtable_size_limit(mut self, bytes: usize) -> Self {
        self.memtable_size_limit = bytes;
        self
    }

    #[must_use]
    pub fn sync_on_flush(mut self, enabled: bool) -> Self {
        self.sync_on_flush = enabled;
        self
    }

    #[must_use]
    pub fn atomic_flush(mut self, enabled: bool) -> Self {
        self.atomic_flush = enabled;
        self
    }

    /// Validate all configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.memtable_size_limit == 0 {
            return Err("memtable_size_limit must be > 0".into());
        }
        Ok(())
    }
}
