//! Warning sink shared between a frontend and its field functions.
//!
//! Warnings go to `tracing` and are also recorded, so callers and tests can
//! inspect what was reported without installing a subscriber.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// One recorded warning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Stable topic used for de-duplication, e.g. `"temperature-fallback"`.
    pub topic: String,
    /// Human-readable message.
    pub message: String,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<Diagnostic>,
    seen: HashSet<String>,
}

/// Cloneable handle to a shared warning log.
///
/// Clones share state, so a field function can hold one while the frontend
/// that created it reads the entries back.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    inner: Arc<Mutex<Inner>>,
}

impl Diagnostics {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        // A panic elsewhere cannot leave the log half-written.
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Record a warning unconditionally.
    pub fn warn(&self, topic: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(topic, "{message}");
        self.with(|inner| {
            inner.seen.insert(topic.to_string());
            inner.entries.push(Diagnostic {
                topic: topic.to_string(),
                message,
            });
        });
    }

    /// Record a warning the first time `topic` is seen. Returns whether it
    /// was emitted.
    pub fn warn_once(&self, topic: &str, message: impl Into<String>) -> bool {
        let fresh = self.with(|inner| inner.seen.insert(topic.to_string()));
        if !fresh {
            return false;
        }
        let message = message.into();
        tracing::warn!(topic, "{message}");
        self.with(|inner| {
            inner.entries.push(Diagnostic {
                topic: topic.to_string(),
                message,
            })
        });
        true
    }

    /// Number of recorded warnings with the given topic.
    pub fn count_for(&self, topic: &str) -> usize {
        self.with(|inner| inner.entries.iter().filter(|d| d.topic == topic).count())
    }

    /// Snapshot of all recorded warnings, oldest first.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.with(|inner| inner.entries.clone())
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.with(|inner| inner.entries.is_empty())
    }
}
