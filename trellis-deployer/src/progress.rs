//! Append-only progress log of a deployment session

use chrono::Utc;
use tokio::sync::mpsc;
use trellis_core::domain::deployment::{LogLevel, ProgressEntry};

/// Ordered progress lines, optionally mirrored to a live listener
///
/// Entries are never rewritten or removed. A listener that has gone away is
/// ignored; the log itself stays complete.
#[derive(Debug, Default)]
pub struct ProgressLog {
    entries: Vec<ProgressEntry>,
    listener: Option<mpsc::UnboundedSender<ProgressEntry>>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror every new entry to `listener` as it is appended
    pub fn with_listener(listener: mpsc::UnboundedSender<ProgressEntry>) -> Self {
        Self {
            entries: Vec::new(),
            listener: Some(listener),
        }
    }

    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        let entry = ProgressEntry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        };

        tracing::debug!(level = ?entry.level, message = %entry.message, "progress");

        if self
            .listener
            .as_ref()
            .is_some_and(|listener| listener.send(entry.clone()).is_err())
        {
            self.listener = None;
        }

        self.entries.push(entry);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message);
    }

    pub fn into_entries(self) -> Vec<ProgressEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_keep_append_order() {
        let mut log = ProgressLog::new();
        log.info("one");
        log.success("two");
        log.error("three");

        let entries = log.into_entries();
        let messages: Vec<_> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["one", "two", "three"]);
        assert_eq!(entries[1].level, LogLevel::Success);
        assert!(entries[0].timestamp <= entries[2].timestamp);
    }

    #[test]
    fn test_listener_receives_entries() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut log = ProgressLog::with_listener(tx);
        log.info("hello");
        log.warning("careful");

        assert_eq!(rx.try_recv().unwrap().message, "hello");
        assert_eq!(rx.try_recv().unwrap().level, LogLevel::Warning);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_listener_does_not_lose_entries() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut log = ProgressLog::with_listener(tx);
        drop(rx);

        log.info("still recorded");
        log.info("and this");
        let entries = log.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].message, "and this");
    }
}
