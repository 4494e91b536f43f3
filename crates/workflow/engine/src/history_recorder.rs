//! History recorders: where the audit trail is written
//!
//! Recording is the only side effect the engine treats as mandatory. A
//! recorder that fails aborts the operation before any state changes.
//! Sequence numbers are assigned here, per instance, starting at 0.

use grc_workflow_types::{HistoryEntry, HistoryError, WorkflowInstanceId};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Append-only sink for history entries
pub trait HistoryRecorder: Send + Sync {
    /// Append an entry. Returns it with its sequence number filled in.
    fn record(&self, entry: HistoryEntry) -> Result<HistoryEntry, HistoryError>;

    /// All entries of one instance, in sequence order
    fn entries_for(&self, instance_id: &WorkflowInstanceId)
        -> Result<Vec<HistoryEntry>, HistoryError>;
}

// ── Memory ───────────────────────────────────────────────────────────

/// In-memory history for tests and embedding
pub struct MemoryHistory {
    entries: RwLock<HashMap<WorkflowInstanceId, Vec<HistoryEntry>>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Total entries across all instances
    pub fn total_entries(&self) -> usize {
        self.entries.read().values().map(Vec::len).sum()
    }

    /// Number of instances with at least one entry
    pub fn instance_count(&self) -> usize {
        self.entries.read().len()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryRecorder for MemoryHistory {
    fn record(&self, mut entry: HistoryEntry) -> Result<HistoryEntry, HistoryError> {
        let mut entries = self.entries.write();
        let trail = entries.entry(entry.instance_id.clone()).or_default();
        entry.sequence = trail.len() as u64;
        trail.push(entry.clone());

        tracing::trace!(
            instance_id = %entry.instance_id,
            action = %entry.action,
            sequence = entry.sequence,
            "History entry recorded"
        );
        Ok(entry)
    }

    fn entries_for(
        &self,
        instance_id: &WorkflowInstanceId,
    ) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self
            .entries
            .read()
            .get(instance_id)
            .cloned()
            .unwrap_or_default())
    }
}

// ── JSON lines file ──────────────────────────────────────────────────

/// Append-only JSON-lines history file, one entry per line
pub struct JsonlHistory {
    path: PathBuf,
    /// Next sequence number per instance
    sequences: Mutex<HashMap<WorkflowInstanceId, u64>>,
}

impl JsonlHistory {
    /// Open a history file, creating it and its directory if needed.
    ///
    /// Existing entries are scanned so sequence numbers carry on where
    /// the previous writer stopped.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        let sequences = if path.exists() {
            Self::load_sequences(&path)?
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            HashMap::new()
        };

        tracing::debug!(
            path = %path.display(),
            instances = sequences.len(),
            "History file opened"
        );

        Ok(Self {
            path,
            sequences: Mutex::new(sequences),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry in the file
    pub fn read_all(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(Self::parse_line(&line)?);
        }
        Ok(entries)
    }

    fn load_sequences(path: &Path) -> Result<HashMap<WorkflowInstanceId, u64>, HistoryError> {
        let reader = BufReader::new(File::open(path)?);
        let mut sequences = HashMap::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = Self::parse_line(&line)?;
            let next = sequences.entry(entry.instance_id).or_insert(0);
            *next = (*next).max(entry.sequence + 1);
        }
        Ok(sequences)
    }

    fn parse_line(line: &str) -> Result<HistoryEntry, HistoryError> {
        serde_json::from_str(line).map_err(|e| HistoryError::Serialization(e.to_string()))
    }
}

impl HistoryRecorder for JsonlHistory {
    fn record(&self, mut entry: HistoryEntry) -> Result<HistoryEntry, HistoryError> {
        // Held across the write so sequence order matches file order
        let mut sequences = self.sequences.lock();
        entry.sequence = sequences.get(&entry.instance_id).copied().unwrap_or(0);

        let mut json =
            serde_json::to_string(&entry).map_err(|e| HistoryError::Serialization(e.to_string()))?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        file.sync_data()?;

        sequences.insert(entry.instance_id.clone(), entry.sequence + 1);

        tracing::trace!(
            instance_id = %entry.instance_id,
            action = %entry.action,
            sequence = entry.sequence,
            "History entry appended"
        );
        Ok(entry)
    }

    fn entries_for(
        &self,
        instance_id: &WorkflowInstanceId,
    ) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut entries: Vec<_> = self
            .read_all()?
            .into_iter()
            .filter(|e| &e.instance_id == instance_id)
            .collect();
        entries.sort_by_key(|e| e.sequence);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grc_workflow_types::{HistoryAction, UserId};

    fn entry(instance: &str, action: HistoryAction) -> HistoryEntry {
        HistoryEntry::new(WorkflowInstanceId::new(instance), action, 1, "detail")
    }

    #[test]
    fn test_memory_history_sequences() {
        let history = MemoryHistory::new();
        let first = history
            .record(entry("a", HistoryAction::WorkflowStarted))
            .unwrap();
        let second = history
            .record(entry("a", HistoryAction::StepApproved).with_actor(Some(UserId::new("u"))))
            .unwrap();
        let other = history
            .record(entry("b", HistoryAction::WorkflowStarted))
            .unwrap();

        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_eq!(other.sequence, 0);
        assert_eq!(history.total_entries(), 3);
        assert_eq!(history.instance_count(), 2);

        let trail = history.entries_for(&WorkflowInstanceId::new("a")).unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[1].action, HistoryAction::StepApproved);
        assert!(history
            .entries_for(&WorkflowInstanceId::new("missing"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_jsonl_history() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history").join("workflow.jsonl");

        let history = JsonlHistory::open(&path).unwrap();
        history
            .record(entry("a", HistoryAction::WorkflowStarted))
            .unwrap();
        history
            .record(entry("b", HistoryAction::WorkflowStarted))
            .unwrap();
        history
            .record(entry("a", HistoryAction::WorkflowCompleted))
            .unwrap();

        assert_eq!(history.read_all().unwrap().len(), 3);
        let trail = history.entries_for(&WorkflowInstanceId::new("a")).unwrap();
        let seqs: Vec<u64> = trail.iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![0, 1]);
    }

    #[test]
    fn test_jsonl_history_resumes_on_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("workflow.jsonl");

        {
            let history = JsonlHistory::open(&path).unwrap();
            history
                .record(entry("a", HistoryAction::WorkflowStarted))
                .unwrap();
            history
                .record(entry("a", HistoryAction::ApprovalDelegated))
                .unwrap();
        }

        let history = JsonlHistory::open(&path).unwrap();
        let next = history
            .record(entry("a", HistoryAction::WorkflowCancelled))
            .unwrap();
        assert_eq!(next.sequence, 2);

        let fresh = history
            .record(entry("z", HistoryAction::WorkflowStarted))
            .unwrap();
        assert_eq!(fresh.sequence, 0);
        assert_eq!(history.read_all().unwrap().len(), 4);
    }

    #[test]
    fn test_jsonl_history_corrupt_line() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("workflow.jsonl");
        std::fs::write(&path, "not json\n").unwrap();

        let result = JsonlHistory::open(&path);
        assert!(matches!(result, Err(HistoryError::Serialization(_))));
    }
}
