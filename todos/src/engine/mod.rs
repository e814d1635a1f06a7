//! Task reconciliation engine.
//!
//! [`Engine`] owns the canonical task list and everything that hangs off
//! it: the busy set, the pending-create placeholder, the edit session, the
//! new-task input, the filter mode and the notification banner. It never
//! performs I/O. Intents return [`Effect`]s (store requests, focus moves)
//! for the caller to carry out; settled requests come back as
//! [`StoreOutcome`]s through [`Engine::apply`].
//!
//! The collection only changes when an outcome arrives. Each outcome is
//! applied to the state as it is at that moment, so completions of
//! concurrent requests may land in any order without losing updates.
//!
//! # Overlapping intents
//!
//! An intent that targets an id with a request already in flight is
//! dropped (logged at debug level). At most one request per id is therefore
//! outstanding, and the busy set tracks exactly those ids.

pub mod edit;
pub mod filter;
pub mod notify;
pub mod request;

pub use edit::{EditDecision, EditSession};
pub use filter::{FilterMode, filter};
pub use notify::{NotifyMode, Notifier};
pub use request::{BatchId, Effect, StoreOutcome, StoreRequest, UpdateOrigin};

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;
use todos_proto::{Task, TaskId, UserId};

use crate::store::StoreError;

/// User-facing failures. The display text is what the banner shows.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TodoError {
    /// Initial list fetch failed.
    #[error("Unable to load todos")]
    LoadFailed,
    /// A create was submitted with a blank title.
    #[error("Title should not be empty")]
    EmptyTitle,
    /// The create call failed.
    #[error("Unable to add a todo")]
    CreateFailed,
    /// A delete call failed.
    #[error("Unable to delete a todo")]
    DeleteFailed,
    /// An update call failed.
    #[error("Unable to update a todo")]
    UpdateFailed,
}

/// Client-side state of one to-do session.
#[derive(Debug)]
pub struct Engine {
    owner: UserId,
    tasks: Vec<Task>,
    busy: BTreeSet<TaskId>,
    pending: Option<Task>,
    edit: Option<EditSession>,
    filter: FilterMode,
    input: String,
    input_disabled: bool,
    loading: bool,
    notifier: Notifier,
    /// Outstanding request count per bulk intent.
    batches: HashMap<BatchId, usize>,
    next_batch: u64,
}

impl Engine {
    /// Creates an empty engine for `owner` with the default notifier.
    #[must_use]
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            tasks: Vec::new(),
            busy: BTreeSet::new(),
            pending: None,
            edit: None,
            filter: FilterMode::All,
            input: String::new(),
            input_disabled: false,
            loading: false,
            notifier: Notifier::default(),
            batches: HashMap::new(),
            next_batch: 1,
        }
    }

    /// Replaces the notifier (delay and mode come from configuration).
    #[must_use]
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    // -- snapshot --------------------------------------------------------

    /// Owner all requests are made for.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// The canonical collection, in display order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Ids with a request in flight (the placeholder counts as id 0).
    #[must_use]
    pub const fn busy(&self) -> &BTreeSet<TaskId> {
        &self.busy
    }

    /// Whether `id` has a request in flight.
    #[must_use]
    pub fn is_busy(&self, id: TaskId) -> bool {
        self.busy.contains(&id)
    }

    /// Placeholder for the create currently in flight.
    #[must_use]
    pub const fn pending(&self) -> Option<&Task> {
        self.pending.as_ref()
    }

    /// Active edit session.
    #[must_use]
    pub const fn edit(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Current filter mode.
    #[must_use]
    pub const fn filter(&self) -> FilterMode {
        self.filter
    }

    /// Text of the new-task input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Whether the new-task input is locked by a create in flight.
    #[must_use]
    pub const fn input_disabled(&self) -> bool {
        self.input_disabled
    }

    /// Whether the initial load is still outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Banner state.
    #[must_use]
    pub const fn notification(&self) -> &Notifier {
        &self.notifier
    }

    /// Tasks visible under the current filter.
    #[must_use]
    pub fn visible(&self) -> Vec<&Task> {
        filter(&self.tasks, self.filter)
    }

    /// Looks a task up by id.
    #[must_use]
    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Number of tasks not yet completed.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    /// Whether any task is completed.
    #[must_use]
    pub fn has_completed(&self) -> bool {
        self.tasks.iter().any(|t| t.completed)
    }

    /// Whether every task is completed (vacuously true when empty).
    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.tasks.iter().all(|t| t.completed)
    }

    /// Number of bulk intents with requests still outstanding.
    #[must_use]
    pub fn open_batches(&self) -> usize {
        self.batches.len()
    }

    /// Whether every request of `batch` has settled.
    #[must_use]
    pub fn is_batch_settled(&self, batch: BatchId) -> bool {
        !self.batches.contains_key(&batch)
    }

    // -- intents ---------------------------------------------------------

    /// Fetches the collection. Focus goes to the input whatever the outcome.
    pub fn load(&mut self) -> Vec<Effect> {
        self.loading = true;
        vec![
            Effect::FocusNewTodo,
            Effect::Request(StoreRequest::Load { owner: self.owner }),
        ]
    }

    /// Replaces the new-task input text. Ignored while the input is locked.
    pub fn set_input(&mut self, text: impl Into<String>) {
        if !self.input_disabled {
            self.input = text.into();
        }
    }

    /// Creates a task from the current input text.
    pub fn submit_input(&mut self) -> Vec<Effect> {
        let title = self.input.clone();
        self.create(&title)
    }

    /// Creates a task titled `title` (trimmed).
    ///
    /// A blank title is rejected locally with [`TodoError::EmptyTitle`].
    /// Only one create may be in flight.
    pub fn create(&mut self, title: &str) -> Vec<Effect> {
        let title = title.trim();
        if title.is_empty() {
            self.report(TodoError::EmptyTitle);
            return vec![Effect::FocusNewTodo];
        }
        if self.pending.is_some() {
            tracing::debug!("create ignored: another create is in flight");
            return Vec::new();
        }

        let placeholder = Task::placeholder(self.owner, title);
        let fields = placeholder.fields();
        self.busy.insert(TaskId::PENDING);
        self.pending = Some(placeholder);
        self.input_disabled = true;
        tracing::info!(title, "creating task");
        vec![Effect::Request(StoreRequest::Create { fields })]
    }

    /// Deletes the task with `id`.
    pub fn delete(&mut self, id: TaskId) -> Vec<Effect> {
        self.request_delete(id, None).into_iter().collect()
    }

    /// Sends `task` as the new state of the task with the same id.
    pub fn update(&mut self, task: Task) -> Vec<Effect> {
        self.request_update(task, UpdateOrigin::Direct, None)
            .into_iter()
            .collect()
    }

    /// Flips the completion flag of one task.
    pub fn toggle_one(&mut self, id: TaskId) -> Vec<Effect> {
        let Some(task) = self.find(id) else {
            tracing::debug!(%id, "toggle ignored: unknown task");
            return Vec::new();
        };
        let flipped = task.toggled();
        self.update(flipped)
    }

    /// Completes every open task, or reopens everything if all are done.
    pub fn toggle_all(&mut self) -> Vec<Effect> {
        let target = !self.all_completed();
        let targets: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.completed != target && !self.busy.contains(&t.id))
            .map(|t| t.with_completed(target))
            .collect();

        let batch = self.allocate_batch();
        let effects: Vec<Effect> = targets
            .into_iter()
            .filter_map(|t| self.request_update(t, UpdateOrigin::Direct, Some(batch)))
            .collect();
        self.register_batch(batch, effects.len(), "toggle all");
        effects
    }

    /// Deletes every completed task.
    pub fn clear_completed(&mut self) -> Vec<Effect> {
        let targets: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|t| t.completed && !self.busy.contains(&t.id))
            .map(|t| t.id)
            .collect();

        let batch = self.allocate_batch();
        let effects: Vec<Effect> = targets
            .into_iter()
            .filter_map(|id| self.request_delete(id, Some(batch)))
            .collect();
        self.register_batch(batch, effects.len(), "clear completed");
        effects
    }

    /// Switches the visible subset.
    pub fn set_filter(&mut self, mode: FilterMode) {
        self.filter = mode;
    }

    /// Opens an edit session on `id`, replacing any existing one.
    pub fn start_edit(&mut self, id: TaskId, title: impl Into<String>) -> Vec<Effect> {
        if self.find(id).is_none() {
            tracing::debug!(%id, "edit ignored: unknown task");
            return Vec::new();
        }
        self.edit = Some(EditSession::new(id, title));
        vec![Effect::FocusEditor]
    }

    /// Replaces the draft of the active edit session.
    pub fn change_draft(&mut self, text: impl Into<String>) {
        if let Some(session) = self.edit.as_mut() {
            session.draft = text.into();
        }
    }

    /// Closes the edit session without submitting.
    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Submits the edit session on `id`.
    ///
    /// Unchanged drafts close silently, blank drafts delete the task,
    /// anything else updates the title. The session stays open until the
    /// resulting request succeeds.
    pub fn submit_edit(&mut self, id: TaskId) -> Vec<Effect> {
        let Some(session) = self.edit.as_ref().filter(|s| s.id == id) else {
            tracing::debug!(%id, "submit ignored: no edit session on task");
            return Vec::new();
        };
        let decision = self
            .find(id)
            .map(|task| (session.decide(&task.title), task.clone()));

        match decision {
            None | Some((EditDecision::Unchanged, _)) => {
                self.edit = None;
                Vec::new()
            }
            Some((EditDecision::Delete, _)) => self.delete(id),
            Some((EditDecision::Rename(title), task)) => self
                .request_update(task.with_title(title), UpdateOrigin::Edit, None)
                .into_iter()
                .collect(),
        }
    }

    /// Closes the notification banner.
    pub fn dismiss(&mut self) {
        self.notifier.dismiss();
    }

    /// Fires due timers. Returns `true` if anything changed.
    pub fn tick(&mut self) -> bool {
        self.notifier.tick()
    }

    // -- outcomes --------------------------------------------------------

    /// Applies a settled request to the current state.
    pub fn apply(&mut self, outcome: StoreOutcome) -> Vec<Effect> {
        match outcome {
            StoreOutcome::Loaded(result) => self.on_loaded(result),
            StoreOutcome::Created(result) => self.on_created(result),
            StoreOutcome::Updated {
                id,
                origin,
                batch,
                result,
            } => self.on_updated(id, origin, batch, result),
            StoreOutcome::Deleted { id, batch, result } => self.on_deleted(id, batch, result),
        }
    }

    fn on_loaded(&mut self, result: Result<Vec<Task>, StoreError>) -> Vec<Effect> {
        self.loading = false;
        match result {
            Ok(tasks) => {
                tracing::info!(count = tasks.len(), "tasks loaded");
                self.tasks = tasks;
            }
            Err(e) => self.report_store(TodoError::LoadFailed, &e),
        }
        Vec::new()
    }

    fn on_created(&mut self, result: Result<Task, StoreError>) -> Vec<Effect> {
        self.release(TaskId::PENDING);
        self.pending = None;
        self.input_disabled = false;
        match result {
            Ok(task) => {
                tracing::info!(id = %task.id, "task created");
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                    tracing::warn!(id = %task.id, "store reused an existing id");
                    *slot = task;
                } else {
                    self.tasks.push(task);
                }
                self.input.clear();
            }
            Err(e) => self.report_store(TodoError::CreateFailed, &e),
        }
        vec![Effect::FocusNewTodo]
    }

    fn on_updated(
        &mut self,
        id: TaskId,
        origin: UpdateOrigin,
        batch: Option<BatchId>,
        result: Result<Task, StoreError>,
    ) -> Vec<Effect> {
        self.release(id);
        match result {
            Ok(task) => {
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                    *slot = task;
                } else {
                    tracing::debug!(%id, "updated task is no longer listed");
                }
                if origin == UpdateOrigin::Edit && self.edit.as_ref().is_some_and(|s| s.id == id)
                {
                    self.edit = None;
                }
            }
            Err(e) => self.report_store(TodoError::UpdateFailed, &e),
        }
        self.settle(batch);
        Vec::new()
    }

    fn on_deleted(
        &mut self,
        id: TaskId,
        batch: Option<BatchId>,
        result: Result<(), StoreError>,
    ) -> Vec<Effect> {
        self.release(id);
        let effects = match result {
            Ok(()) => {
                tracing::info!(%id, "task deleted");
                self.tasks.retain(|t| t.id != id);
                if self.edit.as_ref().is_some_and(|s| s.id == id) {
                    self.edit = None;
                }
                vec![Effect::FocusNewTodo]
            }
            Err(e) => {
                self.report_store(TodoError::DeleteFailed, &e);
                Vec::new()
            }
        };
        self.settle(batch);
        effects
    }

    // -- helpers ---------------------------------------------------------

    /// Marks `id` busy if it may receive a request now.
    fn claim(&mut self, id: TaskId) -> bool {
        if id.is_pending() {
            tracing::debug!("ignored: placeholder has no server id yet");
            return false;
        }
        if self.find(id).is_none() {
            tracing::debug!(%id, "ignored: unknown task");
            return false;
        }
        if !self.busy.insert(id) {
            tracing::debug!(%id, "ignored: request already in flight");
            return false;
        }
        true
    }

    fn release(&mut self, id: TaskId) {
        if !self.busy.remove(&id) {
            tracing::debug!(%id, "outcome for an id that was not busy");
        }
    }

    fn request_update(
        &mut self,
        task: Task,
        origin: UpdateOrigin,
        batch: Option<BatchId>,
    ) -> Option<Effect> {
        if !self.claim(task.id) {
            return None;
        }
        Some(Effect::Request(StoreRequest::Update {
            task,
            origin,
            batch,
        }))
    }

    fn request_delete(&mut self, id: TaskId, batch: Option<BatchId>) -> Option<Effect> {
        if !self.claim(id) {
            return None;
        }
        Some(Effect::Request(StoreRequest::Delete { id, batch }))
    }

    const fn allocate_batch(&mut self) -> BatchId {
        let batch = BatchId::new(self.next_batch);
        self.next_batch += 1;
        batch
    }

    fn register_batch(&mut self, batch: BatchId, size: usize, kind: &str) {
        if size > 0 {
            tracing::info!(%batch, size, kind, "bulk intent issued");
            self.batches.insert(batch, size);
        }
    }

    fn settle(&mut self, batch: Option<BatchId>) {
        let Some(batch) = batch else {
            return;
        };
        if let Some(remaining) = self.batches.get_mut(&batch) {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.batches.remove(&batch);
                tracing::info!(%batch, "bulk intent settled");
            }
        }
    }

    fn report(&mut self, err: TodoError) {
        tracing::info!(error = %err, "intent rejected");
        self.notifier.signal(err.to_string());
    }

    fn report_store(&mut self, err: TodoError, source: &StoreError) {
        tracing::warn!(error = %source, "{err}");
        self.notifier.signal(err.to_string());
    }
}
