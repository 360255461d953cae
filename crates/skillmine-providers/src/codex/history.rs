use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// One entry of the flat, append-only Codex history log.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HistoryEntry {
    pub session_id: String,
    #[serde(default)]
    pub ts: Option<Value>,
    #[serde(default)]
    pub text: String,
}

/// Session-indexed view of the Codex auxiliary history log.
///
/// Used only to recover prompts missing from the primary transcripts. The
/// index is loaded once and shared read-only across extraction workers.
#[derive(Debug, Default)]
pub struct HistoryIndex {
    entries: HashMap<String, Vec<HistoryEntry>>,
}

impl HistoryIndex {
    /// Load the history log. A missing or unreadable file yields an empty
    /// index; malformed lines are skipped.
    pub fn load(path: &Path) -> Self {
        let Ok(text) = std::fs::read_to_string(path) else {
            return Self::default();
        };

        let mut entries: HashMap<String, Vec<HistoryEntry>> = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Ok(entry) = serde_json::from_str::<HistoryEntry>(line) {
                entries.entry(entry.session_id.clone()).or_default().push(entry);
            }
        }

        Self { entries }
    }

    pub(crate) fn entries_for(&self, session_id: &str) -> &[HistoryEntry] {
        self.entries.get(session_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
