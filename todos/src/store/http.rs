//! REST task store over HTTP+JSON.
//!
//! Endpoints, relative to the configured base URL:
//!
//! ```text
//! GET    todos?userId={owner}   -> [Task]
//! POST   todos                  -> Task      body: {userId, title, completed}
//! PATCH  todos/{id}             -> Task      body: {userId, title, completed}
//! DELETE todos/{id}             -> (ignored)
//! ```
//!
//! Bodies are read as bytes and decoded through [`todos_proto::codec`], so
//! a malformed or invalid payload surfaces as [`StoreError::Decode`] rather
//! than being trusted.

use reqwest::{Client, Response};
use url::Url;

use todos_proto::codec::{decode_task, decode_task_list, decode_task_with_id};
use todos_proto::{Task, TaskFields, TaskId, UserId};

use super::{StoreError, StoreKind, TaskStore};

/// Task store backed by a REST endpoint.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base: Url,
}

impl HttpStore {
    /// Creates a store rooted at `base` (e.g. `http://localhost:3000/api`).
    ///
    /// No request timeout is configured; calls run until the server answers
    /// or the connection fails.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BaseUrl`] if `base` cannot carry path segments
    /// (e.g. `mailto:`), or [`StoreError::Network`] if the HTTP client
    /// cannot be built.
    pub fn new(base: Url) -> Result<Self, StoreError> {
        if base.cannot_be_a_base() {
            return Err(StoreError::BaseUrl(base.to_string()));
        }
        let client = Client::builder().build()?;
        Ok(Self { client, base })
    }

    /// Returns the base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Builds `{base}/todos` or `{base}/todos/{id}`.
    fn endpoint(&self, id: Option<TaskId>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("todos");
            if let Some(id) = id {
                segments.push(&id.to_string());
            }
        }
        url
    }
}

/// Maps a non-success status to [`StoreError::Status`].
fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(StoreError::Status(status.as_u16()))
    }
}

impl TaskStore for HttpStore {
    async fn list(&self, owner: UserId) -> Result<Vec<Task>, StoreError> {
        let url = self.endpoint(None);
        tracing::debug!(%url, %owner, "listing tasks");
        let response = self
            .client
            .get(url)
            .query(&[("userId", owner.get())])
            .send()
            .await?;
        let body = check_status(response)?.bytes().await?;
        Ok(decode_task_list(&body)?)
    }

    async fn create(&self, fields: &TaskFields) -> Result<Task, StoreError> {
        let url = self.endpoint(None);
        tracing::debug!(%url, title = %fields.title, "creating task");
        let response = self.client.post(url).json(fields).send().await?;
        let body = check_status(response)?.bytes().await?;
        Ok(decode_task(&body)?)
    }

    async fn update(&self, task: &Task) -> Result<Task, StoreError> {
        let url = self.endpoint(Some(task.id));
        tracing::debug!(%url, completed = task.completed, "updating task");
        let response = self.client.patch(url).json(&task.fields()).send().await?;
        let body = check_status(response)?.bytes().await?;
        Ok(decode_task_with_id(&body, task.id)?)
    }

    async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        let url = self.endpoint(Some(id));
        tracing::debug!(%url, "deleting task");
        let response = self.client.delete(url).send().await?;
        check_status(response)?;
        Ok(())
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Http
    }
}
