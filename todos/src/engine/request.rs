//! Store requests emitted by the engine and the outcomes fed back to it.

use std::fmt;

use todos_proto::{Task, TaskFields, TaskId, UserId};

use crate::store::StoreError;

/// Groups the independent requests issued by one bulk intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchId(u64);

impl BatchId {
    /// Wraps a raw batch number.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch-{}", self.0)
    }
}

/// Why an update was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOrigin {
    /// Toggle or a direct update call.
    Direct,
    /// Submission of an edit session; success closes the session.
    Edit,
}

/// A call the engine wants made against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRequest {
    /// Fetch the whole collection.
    Load {
        /// Owner whose tasks are listed.
        owner: UserId,
    },
    /// Create a task from the pending placeholder.
    Create {
        /// Body of the create call.
        fields: TaskFields,
    },
    /// Overwrite a task.
    Update {
        /// Full record to send (id, owner, title, completed).
        task: Task,
        /// Why the update was issued.
        origin: UpdateOrigin,
        /// Bulk intent this request belongs to, if any.
        batch: Option<BatchId>,
    },
    /// Delete a task.
    Delete {
        /// Task to delete.
        id: TaskId,
        /// Bulk intent this request belongs to, if any.
        batch: Option<BatchId>,
    },
}

/// The settled result of a [`StoreRequest`].
#[derive(Debug)]
pub enum StoreOutcome {
    /// Result of [`StoreRequest::Load`].
    Loaded(Result<Vec<Task>, StoreError>),
    /// Result of [`StoreRequest::Create`].
    Created(Result<Task, StoreError>),
    /// Result of [`StoreRequest::Update`].
    Updated {
        /// Id the request was addressed to.
        id: TaskId,
        /// Origin copied from the request.
        origin: UpdateOrigin,
        /// Batch copied from the request.
        batch: Option<BatchId>,
        /// Stored record or failure.
        result: Result<Task, StoreError>,
    },
    /// Result of [`StoreRequest::Delete`].
    Deleted {
        /// Id the request was addressed to.
        id: TaskId,
        /// Batch copied from the request.
        batch: Option<BatchId>,
        /// Unit or failure.
        result: Result<(), StoreError>,
    },
}

impl StoreOutcome {
    /// Outcome for a request that never reached the store.
    #[must_use]
    pub fn failed(request: StoreRequest, error: StoreError) -> Self {
        match request {
            StoreRequest::Load { .. } => Self::Loaded(Err(error)),
            StoreRequest::Create { .. } => Self::Created(Err(error)),
            StoreRequest::Update {
                task,
                origin,
                batch,
            } => Self::Updated {
                id: task.id,
                origin,
                batch,
                result: Err(error),
            },
            StoreRequest::Delete { id, batch } => Self::Deleted {
                id,
                batch,
                result: Err(error),
            },
        }
    }
}

/// Side effects an intent or outcome asks the caller to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue a store call.
    Request(StoreRequest),
    /// Move keyboard focus to the new-task input.
    FocusNewTodo,
    /// Move keyboard focus to the title editor.
    FocusEditor,
}

impl Effect {
    /// The request carried by this effect, if any.
    #[must_use]
    pub const fn as_request(&self) -> Option<&StoreRequest> {
        match self {
            Self::Request(req) => Some(req),
            Self::FocusNewTodo | Self::FocusEditor => None,
        }
    }
}
