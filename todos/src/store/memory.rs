//! In-process task store for tests and the offline demo.
//!
//! Behaves like the REST backend (ids assigned on create, 404 for unknown
//! ids) and supports fault injection: failing a whole operation kind, or
//! any operation against a given task id, plus an artificial per-call
//! latency so tests can force completions to interleave.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use parking_lot::Mutex;

use todos_proto::{Task, TaskFields, TaskId, UserId};

use super::{StoreError, StoreKind, StoreOp, TaskStore};

/// Mutable state guarded by a single lock.
#[derive(Debug, Default)]
struct Inner {
    tasks: Vec<Task>,
    next_id: u64,
    failing_ops: HashSet<StoreOp>,
    failing_ids: HashSet<TaskId>,
    latency: HashMap<TaskId, Duration>,
    default_latency: Duration,
    calls: HashMap<StoreOp, usize>,
}

/// Task store held entirely in memory.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store. The first created task gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    /// Creates a store pre-populated with `tasks`.
    ///
    /// New ids continue after the largest seeded id.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id.get()).max().unwrap_or(0) + 1;
        Self {
            inner: Mutex::new(Inner {
                tasks,
                next_id,
                ..Inner::default()
            }),
        }
    }

    /// A handful of tasks for the offline demo.
    #[must_use]
    pub fn demo(owner: UserId) -> Self {
        let seed = [
            ("Sketch the header layout", true),
            ("Wire the store client", true),
            ("Handle failed updates", false),
            ("Write the filter tests", false),
        ];
        let tasks = seed
            .iter()
            .zip(1u64..)
            .map(|((title, completed), id)| Task {
                id: TaskId::new(id),
                user_id: owner,
                title: (*title).to_string(),
                completed: *completed,
            })
            .collect();
        Self::with_tasks(tasks)
    }

    /// Makes every call of kind `op` fail (or succeed again).
    pub fn set_failing(&self, op: StoreOp, failing: bool) {
        let mut inner = self.inner.lock();
        if failing {
            inner.failing_ops.insert(op);
        } else {
            inner.failing_ops.remove(&op);
        }
    }

    /// Makes every update or delete against `id` fail.
    pub fn fail_task(&self, id: TaskId) {
        self.inner.lock().failing_ids.insert(id);
    }

    /// Delays every call by `latency` before it takes effect.
    pub fn set_latency(&self, latency: Duration) {
        self.inner.lock().default_latency = latency;
    }

    /// Delays update and delete calls against `id` by `latency`,
    /// overriding the default latency.
    pub fn set_task_latency(&self, id: TaskId, latency: Duration) {
        self.inner.lock().latency.insert(id, latency);
    }

    /// Number of calls received for `op`, including failed ones.
    #[must_use]
    pub fn calls(&self, op: StoreOp) -> usize {
        self.inner.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Total number of calls received.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.inner.lock().calls.values().sum()
    }

    /// Snapshot of the stored tasks.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        self.inner.lock().tasks.clone()
    }

    /// Records the call and returns the delay to apply before running it.
    fn enter(&self, op: StoreOp, id: Option<TaskId>) -> Duration {
        let mut inner = self.inner.lock();
        *inner.calls.entry(op).or_default() += 1;
        id.and_then(|id| inner.latency.get(&id).copied())
            .unwrap_or(inner.default_latency)
    }

    /// Sleeps for `delay`; zero skips the timer entirely.
    async fn pause(delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn check_faults(inner: &Inner, op: StoreOp, id: Option<TaskId>) -> Result<(), StoreError> {
        if inner.failing_ops.contains(&op) {
            return Err(StoreError::Unavailable(format!("{op:?} disabled")));
        }
        if let Some(id) = id
            && inner.failing_ids.contains(&id)
        {
            return Err(StoreError::Unavailable(format!("task {id} disabled")));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore for MemoryStore {
    async fn list(&self, owner: UserId) -> Result<Vec<Task>, StoreError> {
        Self::pause(self.enter(StoreOp::List, None)).await;
        let inner = self.inner.lock();
        Self::check_faults(&inner, StoreOp::List, None)?;
        Ok(inner
            .tasks
            .iter()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect())
    }

    async fn create(&self, fields: &TaskFields) -> Result<Task, StoreError> {
        Self::pause(self.enter(StoreOp::Create, None)).await;
        let mut inner = self.inner.lock();
        Self::check_faults(&inner, StoreOp::Create, None)?;
        let id = TaskId::new(inner.next_id);
        inner.next_id += 1;
        let task = fields.clone().into_task(id);
        inner.tasks.push(task.clone());
        Ok(task)
    }

    async fn update(&self, task: &Task) -> Result<Task, StoreError> {
        Self::pause(self.enter(StoreOp::Update, Some(task.id))).await;
        let mut inner = self.inner.lock();
        Self::check_faults(&inner, StoreOp::Update, Some(task.id))?;
        let stored = inner
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or(StoreError::Status(404))?;
        *stored = task.clone();
        Ok(stored.clone())
    }

    async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        Self::pause(self.enter(StoreOp::Delete, Some(id))).await;
        let mut inner = self.inner.lock();
        Self::check_faults(&inner, StoreOp::Delete, Some(id))?;
        let before = inner.tasks.len();
        inner.tasks.retain(|t| t.id != id);
        if inner.tasks.len() == before {
            return Err(StoreError::Status(404));
        }
        Ok(())
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }
}
