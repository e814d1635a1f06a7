//! In-place title editing.

use todos_proto::TaskId;

/// The single task currently being renamed, with its draft title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    /// Task under edit.
    pub id: TaskId,
    /// Draft title as typed (untrimmed).
    pub draft: String,
}

/// What submitting a draft amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditDecision {
    /// Trimmed draft equals the stored title: close without a request.
    Unchanged,
    /// Trimmed draft is empty: the task is to be deleted.
    Delete,
    /// Update the task with this trimmed title.
    Rename(String),
}

impl EditSession {
    /// Opens a session on `id` seeded with its current title.
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            draft: title.into(),
        }
    }

    /// Classifies the draft against the stored title.
    #[must_use]
    pub fn decide(&self, stored_title: &str) -> EditDecision {
        let trimmed = self.draft.trim();
        if trimmed == stored_title {
            EditDecision::Unchanged
        } else if trimmed.is_empty() {
            EditDecision::Delete
        } else {
            EditDecision::Rename(trimmed.to_string())
        }
    }
}
