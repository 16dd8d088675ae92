//! Thread-safe call recorder.
//!
//! Suite definitions require `Send + Sync` closures, so a recorder is shared
//! by cloning: every clone appends to the same log.
//!
//! # Examples
//!
//! ```
//! use nestspec_test_helpers::CallLog;
//!
//! let log = CallLog::new();
//! let hook_log = log.clone();
//! hook_log.record("before outer");
//! log.record("body");
//! assert_eq!(log.entries(), ["before outer", "body"]);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

/// Ordered log of labelled events, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry`.
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    /// Snapshot of every entry in recording order.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Number of times `entry` was recorded.
    #[must_use]
    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|recorded| *recorded == entry).count()
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Returns `true` when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.0.lock().clear();
    }
}
