//! Bounded in-memory log of operations performed against the server
//!
//! A ring buffer owned by the manager: once the capacity is reached the
//! oldest entries are dropped, so a long-running session cannot grow
//! without bound.

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::VecDeque;

/// One recorded operation
#[derive(Debug, Clone)]
pub struct Operation {
    pub at: DateTime<Utc>,
    pub kind: String,
    pub detail: String,
}

impl Operation {
    /// Render as a single log line
    pub fn render(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.kind,
            self.detail
        )
    }
}

/// Ring buffer of recent operations
#[derive(Debug)]
pub struct OperationLog {
    entries: VecDeque<Operation>,
    capacity: usize,
}

impl OperationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest once at capacity
    pub fn record(&mut self, kind: &str, detail: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Operation {
            at: Utc::now(),
            kind: kind.to_string(),
            detail: detail.into(),
        });
    }

    /// The last `limit` entries, oldest first
    pub fn recent(&self, limit: usize) -> Vec<Operation> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
