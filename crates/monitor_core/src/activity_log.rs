use std::collections::VecDeque;

use chrono::NaiveTime;

/// Maximum number of entries kept in the activity log.
pub const LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub time: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(at: NaiveTime, message: impl Into<String>) -> Self {
        Self {
            time: at.format("%H:%M:%S").to_string(),
            message: message.into(),
        }
    }
}

/// Append-only, bounded log that collapses consecutive repeats.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry` unless it repeats the last message or is empty.
    ///
    /// Only the immediately preceding entry is compared, so a message may
    /// come back after a different one. Returns whether the entry was kept.
    pub fn append(&mut self, entry: LogEntry) -> bool {
        if entry.message.is_empty() {
            return false;
        }
        if self
            .entries
            .back()
            .is_some_and(|last| last.message == entry.message)
        {
            return false;
        }
        self.entries.push_back(entry);
        while self.entries.len() > LOG_CAPACITY {
            self.entries.pop_front();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Oldest-first copy for rendering.
    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}
