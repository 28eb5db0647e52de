//! In-memory execution history.
//!
//! Every executed source string is recorded here and served back through
//! `history_reply` as `(session, line, source)` triples. The record is
//! session-local; nothing is persisted across kernel restarts.

use std::sync::Mutex;

use serde_json::{json, Value};

/// One executed cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Session id from the request header.
    pub session: String,
    /// Execution counter value at the time the cell ran.
    pub line: u32,
    /// The submitted source.
    pub source: String,
}

/// Append-only record of executed code, shared between the execute and
/// history actions.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one executed cell.
    pub fn append(&self, session: &str, line: u32, source: &str) {
        self.entries.lock().unwrap().push(HistoryEntry {
            session: session.to_string(),
            line,
            source: source.to_string(),
        });
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Renders the record as the `history` array of a `history_reply`:
    /// a list of `[session, line, source]` triples in execution order.
    pub fn as_reply_rows(&self) -> Value {
        let entries = self.entries.lock().unwrap();
        Value::Array(
            entries
                .iter()
                .map(|e| json!([e.session, e.line, e.source]))
                .collect(),
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_starts_empty() {
        let store = HistoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.as_reply_rows(), json!([]));
    }

    #[test]
    fn test_entries_keep_execution_order() {
        let store = HistoryStore::new();
        store.append("abc", 1, "first()");
        store.append("abc", 2, "second()");

        assert_eq!(store.len(), 2);
        assert_eq!(
            store.as_reply_rows(),
            json!([["abc", 1, "first()"], ["abc", 2, "second()"]])
        );
    }
}
