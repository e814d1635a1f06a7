//! Validated decoding of task store responses.
//!
//! Response bodies are parsed with `serde_json` and then checked against
//! the invariants the client relies on. A body that parses but breaks an
//! invariant is reported as a [`DecodeError`], never silently accepted.

use std::collections::HashSet;

use crate::task::{Task, TaskId};

/// Error type for response decoding.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The body is not valid JSON of the expected shape.
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The store returned the reserved placeholder id.
    #[error("task carries reserved id 0")]
    ReservedId,
    /// A task title is empty after trimming.
    #[error("task {0} has an empty title")]
    EmptyTitle(TaskId),
    /// The same id appears more than once in a list response.
    #[error("duplicate task id {0} in list response")]
    DuplicateId(TaskId),
    /// An update response refers to a different task than requested.
    #[error("expected task {expected}, store returned {found}")]
    IdMismatch {
        /// Id the request was addressed to.
        expected: TaskId,
        /// Id found in the response.
        found: TaskId,
    },
}

/// Checks a single decoded task against the client invariants.
///
/// # Errors
///
/// Returns [`DecodeError::ReservedId`] or [`DecodeError::EmptyTitle`].
pub fn validate_task(task: &Task) -> Result<(), DecodeError> {
    if task.id.is_pending() {
        return Err(DecodeError::ReservedId);
    }
    if task.title.trim().is_empty() {
        return Err(DecodeError::EmptyTitle(task.id));
    }
    Ok(())
}

/// Decodes and validates a single task.
///
/// # Errors
///
/// Returns [`DecodeError`] if the body is malformed or the task is invalid.
pub fn decode_task(bytes: &[u8]) -> Result<Task, DecodeError> {
    let task: Task = serde_json::from_slice(bytes)?;
    validate_task(&task)?;
    Ok(task)
}

/// Decodes a task and checks that it is the one a request was addressed to.
///
/// # Errors
///
/// Returns [`DecodeError::IdMismatch`] if the ids differ, or any error
/// from [`decode_task`].
pub fn decode_task_with_id(bytes: &[u8], expected: TaskId) -> Result<Task, DecodeError> {
    let task = decode_task(bytes)?;
    if task.id != expected {
        return Err(DecodeError::IdMismatch {
            expected,
            found: task.id,
        });
    }
    Ok(task)
}

/// Decodes and validates a list response, preserving server order.
///
/// # Errors
///
/// Returns [`DecodeError`] if the body is malformed, any task is invalid,
/// or an id repeats.
pub fn decode_task_list(bytes: &[u8]) -> Result<Vec<Task>, DecodeError> {
    let tasks: Vec<Task> = serde_json::from_slice(bytes)?;
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        validate_task(task)?;
        if !seen.insert(task.id) {
            return Err(DecodeError::DuplicateId(task.id));
        }
    }
    Ok(tasks)
}
