//! Task records as exchanged with the remote task store.
//!
//! The store speaks JSON with camel-cased field names:
//! `{"id": 1, "userId": 1096, "title": "...", "completed": false}`.

use serde::{Deserialize, Serialize};

/// Server-assigned task identifier.
///
/// `0` is reserved for a task that has not been persisted yet; the store
/// never hands it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Identifier carried by the local placeholder while a create is in flight.
    pub const PENDING: Self = Self(0);

    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this is the reserved placeholder id.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner of a task list. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Wraps a raw owner identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted (or pending) to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned identifier, [`TaskId::PENDING`] for the placeholder.
    pub id: TaskId,
    /// Owner of the task.
    pub user_id: UserId,
    /// Trimmed, non-empty title.
    pub title: String,
    /// Completion flag.
    pub completed: bool,
}

impl Task {
    /// Builds the local placeholder shown while a create call is outstanding.
    #[must_use]
    pub fn placeholder(user_id: UserId, title: impl Into<String>) -> Self {
        Self {
            id: TaskId::PENDING,
            user_id,
            title: title.into(),
            completed: false,
        }
    }

    /// The mutable fields of this task, as sent in create and update bodies.
    #[must_use]
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            user_id: self.user_id,
            title: self.title.clone(),
            completed: self.completed,
        }
    }

    /// Returns a copy with the completion flag flipped.
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// Returns a copy with the completion flag set to `completed`.
    #[must_use]
    pub fn with_completed(&self, completed: bool) -> Self {
        Self {
            completed,
            ..self.clone()
        }
    }

    /// Returns a copy carrying `title`.
    #[must_use]
    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }
}

/// Request body for create (`POST /todos`) and update (`PATCH /todos/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    /// Owner of the task.
    pub user_id: UserId,
    /// Task title.
    pub title: String,
    /// Completion flag.
    pub completed: bool,
}

impl TaskFields {
    /// Attaches an id, producing a full task record.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            user_id: self.user_id,
            title: self.title,
            completed: self.completed,
        }
    }
}
