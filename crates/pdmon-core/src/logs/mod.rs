use serde::{Deserialize, Serialize};

use crate::contracts::{DetectionResult, SeverityLevels};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionLogEntry {
    pub window_index: u64,
    /// End of the window on the session clock.
    pub timestamp_seconds: f64,
    pub result: DetectionResult,
}

impl DetectionLogEntry {
    pub fn levels(&self) -> SeverityLevels {
        self.result.levels()
    }
}

/// Ordered per-window results of one session.
#[derive(Debug, Default, Clone)]
pub struct DetectionLog {
    entries: Vec<DetectionLogEntry>,
}

impl DetectionLog {
    pub fn push(&mut self, entry: DetectionLogEntry) {
        if let Some(last) = self.entries.last() {
            assert!(
                entry.window_index > last.window_index,
                "Detection log entries must have increasing window indices"
            );
        }
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectionLogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&DetectionLogEntry> {
        self.entries.last()
    }

    /// Element-wise maximum of the levels over every entry.
    pub fn peak_levels(&self) -> SeverityLevels {
        self.entries
            .iter()
            .fold(SeverityLevels::default(), |peak, entry| {
                peak.elementwise_max(entry.levels())
            })
    }

    pub fn into_entries(self) -> Vec<DetectionLogEntry> {
        self.entries
    }
}
