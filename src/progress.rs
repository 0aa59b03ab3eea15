//! Progress reporting and cancellation for archive operations.
//!
//! Both [`create`](crate::create) and [`extract`](crate::extract) accept an
//! optional [`ProgressReporter`]. The reporter receives per-entry callbacks and
//! is asked [`should_cancel`](ProgressReporter::should_cancel) at every step
//! boundary:
//!
//! - `create`: after identification and before each entry;
//! - `extract`: after identification, after the destination is prepared and
//!   before each entry.
//!
//! # Example
//!
//! ```rust
//! use xarc::progress::{CancelFlag, ProgressReporter};
//!
//! let flag = CancelFlag::new();
//! let reporter = flag.clone();
//! assert!(!reporter.should_cancel());
//! flag.cancel();
//! assert!(reporter.should_cancel());
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{Error, Result};

/// IEC byte unit: 1 KiB = 1024 bytes.
pub const BYTES_KIB: u64 = 1024;
/// IEC byte unit: 1 MiB = 1024 KiB.
pub const BYTES_MIB: u64 = 1024 * BYTES_KIB;
/// IEC byte unit: 1 GiB = 1024 MiB.
pub const BYTES_GIB: u64 = 1024 * BYTES_MIB;

/// Progress reporting trait for archive operations.
///
/// All methods have no-op defaults.
pub trait ProgressReporter: Send {
    /// Called when starting to process a new entry.
    ///
    /// `size` is the entry's uncompressed size when known, otherwise 0.
    fn on_entry_start(&mut self, entry_name: &str, size: u64) {
        let _ = (entry_name, size);
    }

    /// Called when entry processing completes.
    fn on_entry_complete(&mut self, entry_name: &str, success: bool) {
        let _ = (entry_name, success);
    }

    /// Called on any warning during processing, e.g. a skipped entry.
    fn on_warning(&mut self, message: &str) {
        let _ = message;
    }

    /// Checks if cancellation has been requested.
    ///
    /// Default implementation returns `false` (no cancellation).
    fn should_cancel(&self) -> bool {
        false
    }
}

/// A progress reporter that does nothing (null object pattern).
#[derive(Debug, Default, Clone)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// What a [`StatisticsProgress`] was told.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Statistics {
    /// Names of entries that completed successfully, in order.
    pub completed: Vec<String>,
    /// Names of entries that failed.
    pub failed: Vec<String>,
    /// Warnings collected.
    pub warnings: Vec<String>,
}

/// A progress reporter that records what it was told.
///
/// Clones share the same record, so a clone kept by the caller can be read
/// after the operation consumed the other one.
#[derive(Debug, Default, Clone)]
pub struct StatisticsProgress {
    inner: Arc<Mutex<Statistics>>,
}

impl StatisticsProgress {
    /// Creates a new statistics progress reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    pub fn snapshot(&self) -> Statistics {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Statistics> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProgressReporter for StatisticsProgress {
    fn on_entry_complete(&mut self, entry_name: &str, success: bool) {
        let mut stats = self.lock();
        if success {
            stats.completed.push(entry_name.to_string());
        } else {
            stats.failed.push(entry_name.to_string());
        }
    }

    fn on_warning(&mut self, message: &str) {
        self.lock().warnings.push(message.to_string());
    }
}

/// A shareable cancellation flag.
///
/// Clones share the same flag, so one clone can be handed to a signal
/// handler while another is passed to an operation as its reporter.
#[derive(Debug, Default, Clone)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Creates a flag that is not set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl ProgressReporter for CancelFlag {
    fn should_cancel(&self) -> bool {
        self.is_cancelled()
    }
}

/// Cancels after a fixed number of `should_cancel` queries.
#[cfg(test)]
pub(crate) struct CancelAfter {
    pub(crate) remaining: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl ProgressReporter for CancelAfter {
    fn should_cancel(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_err()
    }
}

/// Returns [`Error::Cancelled`] if the reporter asks for cancellation.
pub(crate) fn check_cancel(progress: &dyn ProgressReporter) -> Result<()> {
    if progress.should_cancel() {
        log::info!("cancellation requested");
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// Formats a byte count using IEC units (KiB, MiB, GiB).
pub fn format_bytes_iec(bytes: u64) -> String {
    if bytes >= BYTES_GIB {
        format!("{:.2} GiB", bytes as f64 / BYTES_GIB as f64)
    } else if bytes >= BYTES_MIB {
        format!("{:.2} MiB", bytes as f64 / BYTES_MIB as f64)
    } else if bytes >= BYTES_KIB {
        format!("{:.2} KiB", bytes as f64 / BYTES_KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}
