//! Remote task store abstraction.
//!
//! Defines the [`TaskStore`] trait the reconciliation engine is driven
//! against. Implementations:
//! - [`http::HttpStore`]: the REST backend over HTTP+JSON
//! - [`memory::MemoryStore`]: in-process store with fault injection, used
//!   by tests and the offline demo

pub mod http;
pub mod memory;

use std::fmt;

use todos_proto::{DecodeError, Task, TaskFields, TaskId, UserId};

/// Which kind of store is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// REST backend over HTTP.
    Http,
    /// In-process memory store.
    Memory,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "HTTP"),
            Self::Memory => write!(f, "Memory"),
        }
    }
}

/// The four operations a store supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// `GET /todos?userId=`
    List,
    /// `POST /todos`
    Create,
    /// `PATCH /todos/{id}`
    Update,
    /// `DELETE /todos/{id}`
    Delete,
}

/// Errors that can occur during store operations.
///
/// Decoding failures are kept apart from transport failures so callers can
/// tell a misbehaving backend from an unreachable one.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The store answered with a non-success status code.
    #[error("store returned HTTP {0}")]
    Status(u16),

    /// The response body did not decode into a valid record.
    #[error("invalid response: {0}")]
    Decode(#[from] DecodeError),

    /// The configured base URL cannot carry path segments.
    #[error("unusable base URL: {0}")]
    BaseUrl(String),

    /// The store refused the operation without touching the network.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Async CRUD interface over the remote task collection.
///
/// All four operations may fail; the engine relies on nothing in a failure
/// beyond the fact that it happened.
pub trait TaskStore: Send + Sync {
    /// Fetch every task owned by `owner`, in store order.
    fn list(
        &self,
        owner: UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Task>, StoreError>> + Send;

    /// Create a task and return it with its store-assigned id.
    fn create(
        &self,
        fields: &TaskFields,
    ) -> impl std::future::Future<Output = Result<Task, StoreError>> + Send;

    /// Overwrite owner/title/completed of `task` and return the stored record.
    fn update(
        &self,
        task: &Task,
    ) -> impl std::future::Future<Output = Result<Task, StoreError>> + Send;

    /// Delete the task with the given id.
    fn delete(
        &self,
        id: TaskId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Return the kind of this store.
    fn kind(&self) -> StoreKind;
}
