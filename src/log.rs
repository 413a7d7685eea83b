//! Per-execution log of filter dispatches, in the shape of an in-memory
//! command history: append-only, cleared at the start of each run.

use std::time::Duration;

/// One filter dispatch's record, appended during [`crate::exec::Pipeline::execute`].
#[derive(Clone, Debug)]
pub struct LogEntry {
    /// Normalized qualified name of the dispatched filter.
    pub qualified_name: String,
    /// Original script text of the dispatched command.
    pub command_text: String,
    /// Millis on the pipeline's clock when dispatch began.
    pub started_at_millis: u64,
    /// Wall time spent inside the filter call.
    pub elapsed: Duration,
    /// Whether the filter returned `Ok`.
    pub success: bool,
    /// Free-form annotation a filter may attach via its `&mut LogEntry`.
    pub note: Option<String>,
}

impl LogEntry {
    pub(crate) fn new(
        qualified_name: impl Into<String>,
        command_text: impl Into<String>,
        started_at_millis: u64,
    ) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            command_text: command_text.into(),
            started_at_millis,
            elapsed: Duration::default(),
            success: false,
            note: None,
        }
    }

    /// Attach a free-form note to this entry. Filters may call this during
    /// dispatch, before the driver stamps timing and success.
    pub fn annotate(&mut self, note: impl Into<String>) {
        self.note = Some(note.into());
    }
}

/// The ordered record of one pipeline run. Cleared at the start of every
/// `execute` call.
#[derive(Clone, Debug, Default)]
pub struct ExecutionLog {
    entries: Vec<LogEntry>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_clear_round_trip() {
        let mut log = ExecutionLog::new();
        log.push(LogEntry::new("text.upper", "Text.Upper", 0));
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn annotate_sets_note() {
        let mut entry = LogEntry::new("text.upper", "Text.Upper", 0);
        assert!(entry.note.is_none());
        entry.annotate("slow path");
        assert_eq!(entry.note.as_deref(), Some("slow path"));
    }
}
