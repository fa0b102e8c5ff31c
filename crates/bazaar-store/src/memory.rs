//! In-memory replicated log.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::{
    ApplyOutcome, Heads, LogEntry, ReplicatedStore, Result, StoreError, Version, Versioned,
    APPEND_CHANNEL_CAPACITY,
};

/// In-memory multi-writer append-only log.
///
/// Local writes append to this replica's own feed. Entries written by other
/// peers arrive through [`MemoryLog::apply_remote`] and are appended to
/// their writer's feed in sequence order.
#[derive(Debug)]
pub struct MemoryLog {
    /// Writer identity of this replica.
    writer: String,
    state: RwLock<LogState>,
    /// Notifies subscribers of every entry that enters the log.
    appended: broadcast::Sender<LogEntry>,
}

#[derive(Debug, Default)]
struct LogState {
    /// Feeds indexed by writer.
    feeds: HashMap<String, Vec<LogEntry>>,
    /// Winning entry per key.
    latest: BTreeMap<String, LogEntry>,
    /// Highest Lamport clock observed.
    clock: u64,
}

impl LogState {
    fn append(&mut self, entry: LogEntry) {
        self.clock = self.clock.max(entry.clock);

        let wins = self
            .latest
            .get(&entry.key)
            .is_none_or(|current| entry.supersedes(current));
        if wins {
            self.latest.insert(entry.key.clone(), entry.clone());
        }

        self.feeds.entry(entry.writer.clone()).or_default().push(entry);
    }

    fn feed_len(&self, writer: &str) -> u64 {
        self.feeds.get(writer).map_or(0, |feed| feed.len() as u64)
    }

    fn current_version(&self, key: &str) -> Option<Version> {
        self.latest.get(key).map(LogEntry::version)
    }
}

impl MemoryLog {
    /// Creates an empty log whose local writes are attributed to `writer`.
    pub fn new(writer: impl Into<String>) -> Self {
        let (appended, _) = broadcast::channel(APPEND_CHANNEL_CAPACITY);
        Self {
            writer: writer.into(),
            state: RwLock::new(LogState::default()),
            appended,
        }
    }

    /// Returns the local writer identity.
    pub fn writer(&self) -> &str {
        &self.writer
    }

    /// Returns the total number of entries across all feeds.
    pub fn len(&self) -> usize {
        self.state.read().feeds.values().map(Vec::len).sum()
    }

    /// Returns true if no entry has been appended or replicated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the length of every known feed.
    pub fn heads(&self) -> Heads {
        self.state
            .read()
            .feeds
            .iter()
            .map(|(writer, feed)| (writer.clone(), feed.len() as u64))
            .collect()
    }

    /// Returns the entries a replica with `remote` heads has not seen.
    pub fn entries_missing_from(&self, remote: &Heads) -> Vec<LogEntry> {
        let state = self.state.read();
        let mut missing = Vec::new();

        for (writer, feed) in &state.feeds {
            let have = remote.get(writer).copied().unwrap_or(0);
            let from = usize::try_from(have).unwrap_or(usize::MAX);
            if let Some(tail) = feed.get(from..) {
                missing.extend_from_slice(tail);
            }
        }

        missing.sort_by(|a, b| (&a.writer, a.seq).cmp(&(&b.writer, b.seq)));
        missing
    }

    /// Appends entries replicated from other peers.
    ///
    /// Entries are applied in feed order. An entry is only appended when it
    /// directly follows the last known entry of its feed; later entries are
    /// counted as gaps and must be requested again.
    ///
    /// Applied entries are published to subscribers so they can be relayed
    /// to peers that are not connected to the writer.
    pub fn apply_remote(&self, mut entries: Vec<LogEntry>) -> ApplyOutcome {
        entries.sort_by(|a, b| (&a.writer, a.seq).cmp(&(&b.writer, b.seq)));

        let mut outcome = ApplyOutcome::default();
        let mut applied = Vec::new();
        {
            let mut state = self.state.write();

            for entry in entries {
                let len = state.feed_len(&entry.writer);
                if entry.seq < len {
                    outcome.duplicates += 1;
                } else if entry.seq == len {
                    trace!(writer = %entry.writer, seq = entry.seq, key = %entry.key, "Applying remote entry");
                    applied.push(entry.clone());
                    state.append(entry);
                    outcome.applied += 1;
                } else {
                    outcome.gaps += 1;
                }
            }
        }

        for entry in applied {
            let _ = self.appended.send(entry);
        }

        if outcome.applied > 0 || outcome.has_gaps() {
            debug!(
                applied = outcome.applied,
                duplicates = outcome.duplicates,
                gaps = outcome.gaps,
                "Applied remote entries"
            );
        }

        outcome
    }

    /// Subscribes to entries as they enter the log.
    ///
    /// Both local appends and applied remote entries are delivered, in the
    /// order they were appended.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.appended.subscribe()
    }

    /// Returns the current value of `key`.
    pub fn get_latest(&self, key: &str) -> Option<Versioned> {
        self.state.read().latest.get(key).map(Versioned::from)
    }

    /// Appends a local write, optionally conditioned on the current version.
    fn append_local(
        &self,
        key: &str,
        value: serde_json::Value,
        expected: Option<Option<&Version>>,
    ) -> Result<Version> {
        let entry = {
            let mut state = self.state.write();

            if let Some(expected) = expected {
                let found = state.current_version(key);
                if found.as_ref() != expected {
                    return Err(StoreError::Conflict {
                        key: key.to_string(),
                        expected: expected.cloned(),
                        found,
                    });
                }
            }

            let entry = LogEntry {
                writer: self.writer.clone(),
                seq: state.feed_len(&self.writer),
                clock: state.clock + 1,
                key: key.to_string(),
                value,
            };
            state.append(entry.clone());
            entry
        };

        debug!(key = %key, seq = entry.seq, clock = entry.clock, "Appended local entry");
        let version = entry.version();

        // No subscribers is fine: nobody is connected yet.
        let _ = self.appended.send(entry);

        Ok(version)
    }
}

#[async_trait]
impl ReplicatedStore for MemoryLog {
    async fn get(&self, key: &str) -> Result<Option<Versioned>> {
        Ok(self.get_latest(key))
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<Version> {
        self.append_local(key, value, None)
    }

    async fn put_if(
        &self,
        key: &str,
        value: serde_json::Value,
        expected: Option<&Version>,
    ) -> Result<Version> {
        self.append_local(key, value, Some(expected))
    }

    async fn scan(&self) -> Result<Vec<(String, Versioned)>> {
        Ok(self
            .state
            .read()
            .latest
            .iter()
            .map(|(key, entry)| (key.clone(), Versioned::from(entry)))
            .collect())
    }
}
