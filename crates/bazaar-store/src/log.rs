//! Log entries and versions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feed length per writer.
pub type Heads = BTreeMap<String, u64>;

/// Total order over writes.
///
/// Compares the Lamport clock first and breaks ties by writer, so
/// concurrent writes to the same key resolve identically on every peer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Lamport clock of the write.
    pub clock: u64,
    /// Writer that appended the entry.
    pub writer: String,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.clock, self.writer)
    }
}

/// A single append to a writer's feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Writer that owns the feed.
    pub writer: String,
    /// Position in the writer's feed, starting at zero.
    pub seq: u64,
    /// Lamport clock at the time of the write.
    pub clock: u64,
    /// Key written.
    pub key: String,
    /// Full value written.
    pub value: serde_json::Value,
}

impl LogEntry {
    /// Returns the version this entry establishes for its key.
    #[must_use]
    pub fn version(&self) -> Version {
        Version {
            clock: self.clock,
            writer: self.writer.clone(),
        }
    }

    /// Returns true if this entry wins over `other` for the same key.
    #[must_use]
    pub fn supersedes(&self, other: &LogEntry) -> bool {
        (self.clock, &self.writer) > (other.clock, &other.writer)
    }
}

/// A value together with the version that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned {
    /// Version of the write.
    pub version: Version,
    /// Value written.
    pub value: serde_json::Value,
}

impl From<&LogEntry> for Versioned {
    fn from(entry: &LogEntry) -> Self {
        Self {
            version: entry.version(),
            value: entry.value.clone(),
        }
    }
}

/// Result of applying a batch of remote entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Entries appended.
    pub applied: usize,
    /// Entries already present.
    pub duplicates: usize,
    /// Entries skipped because an earlier entry of their feed is missing.
    pub gaps: usize,
}

impl ApplyOutcome {
    /// Returns true if entries were skipped for missing predecessors.
    #[must_use]
    pub fn has_gaps(&self) -> bool {
        self.gaps > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(writer: &str, clock: u64) -> LogEntry {
        LogEntry {
            writer: writer.to_string(),
            seq: 0,
            clock,
            key: "k".to_string(),
            value: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_version_orders_by_clock_then_writer() {
        assert!(entry("a", 2).version() > entry("b", 1).version());
        assert!(entry("b", 1).version() > entry("a", 1).version());
    }

    #[test]
    fn test_supersedes_matches_version_order() {
        assert!(entry("a", 2).supersedes(&entry("z", 1)));
        assert!(entry("z", 1).supersedes(&entry("a", 1)));
        assert!(!entry("a", 1).supersedes(&entry("a", 1)));
    }
}
