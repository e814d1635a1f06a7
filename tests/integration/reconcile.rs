//! Integration tests for list reconciliation against a live store.
//!
//! Drives the [`Engine`] through the background dispatcher against a
//! [`MemoryStore`] with injected latency and faults, and checks that:
//! - after every outcome settles, the engine's list equals the store's
//! - concurrent requests completing out of order lose no update
//! - bulk intents may end partially applied, with one message per failure
//! - nothing stays busy once all outcomes are in

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::mpsc;

use todos::dispatch::{self, DispatchCommand};
use todos::engine::{Effect, Engine, FilterMode, StoreOutcome};
use todos::store::memory::MemoryStore;
use todos::store::{StoreOp, TaskStore};
use todos_proto::{Task, TaskId, UserId};

const OWNER: UserId = UserId::new(1096);

fn task(id: u64, title: &str, completed: bool) -> Task {
    Task {
        id: TaskId::new(id),
        user_id: OWNER,
        title: title.to_string(),
        completed,
    }
}

/// Engine wired to a dispatcher over a shared memory store.
struct Harness {
    engine: Engine,
    store: Arc<MemoryStore>,
    cmd_tx: mpsc::Sender<DispatchCommand>,
    out_rx: mpsc::Receiver<StoreOutcome>,
    in_flight: usize,
}

impl Harness {
    /// Builds a harness and runs the initial load to completion.
    async fn loaded(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let (cmd_tx, out_rx) = dispatch::spawn_dispatcher(Arc::clone(&store), 64);
        let mut harness = Self {
            engine: Engine::new(OWNER),
            store,
            cmd_tx,
            out_rx,
            in_flight: 0,
        };
        let effects = harness.engine.load();
        harness.run(effects).await;
        harness
    }

    /// Sends the requests among `effects` without waiting for them.
    async fn send(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            if let Effect::Request(req) = effect {
                self.cmd_tx
                    .send(DispatchCommand::Execute(req))
                    .await
                    .unwrap();
                self.in_flight += 1;
            }
        }
    }

    /// Applies outcomes until nothing is in flight.
    async fn settle(&mut self) {
        while self.in_flight > 0 {
            let outcome = tokio::time::timeout(Duration::from_secs(5), self.out_rx.recv())
                .await
                .expect("timed out waiting for outcome")
                .expect("dispatcher closed");
            self.in_flight -= 1;
            let more = self.engine.apply(outcome);
            self.send(more).await;
        }
    }

    async fn run(&mut self, effects: Vec<Effect>) {
        self.send(effects).await;
        self.settle().await;
    }

    fn assert_in_sync(&self) {
        assert_eq!(self.engine.tasks(), self.store.snapshot().as_slice());
        assert!(self.engine.busy().is_empty(), "busy: {:?}", self.engine.busy());
        assert!(self.engine.pending().is_none());
        assert_eq!(self.engine.open_batches(), 0);
    }
}

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn full_session_stays_in_sync_with_store() {
    let mut h = Harness::loaded(MemoryStore::demo(OWNER)).await;
    assert_eq!(h.engine.tasks().len(), 4);
    h.assert_in_sync();

    h.engine.set_input("Ship it");
    let effects = h.engine.submit_input();
    h.run(effects).await;
    h.assert_in_sync();
    let created = h.engine.tasks().last().unwrap().clone();
    assert_eq!(created.title, "Ship it");
    assert_eq!(h.engine.input(), "");

    let effects = h.engine.toggle_one(created.id);
    h.run(effects).await;
    assert!(h.engine.find(created.id).unwrap().completed);

    let effects = h.engine.start_edit(created.id, created.title.clone());
    assert_eq!(effects, vec![Effect::FocusEditor]);
    h.engine.change_draft("  Ship it today ");
    let effects = h.engine.submit_edit(created.id);
    h.run(effects).await;
    assert_eq!(h.engine.find(created.id).unwrap().title, "Ship it today");
    assert!(h.engine.edit().is_none());
    h.assert_in_sync();

    let effects = h.engine.clear_completed();
    h.run(effects).await;
    assert!(!h.engine.has_completed());
    h.assert_in_sync();
}

#[tokio::test]
async fn toggle_all_twice_round_trips_through_store() {
    let mut h = Harness::loaded(MemoryStore::demo(OWNER)).await;

    let effects = h.engine.toggle_all();
    assert_eq!(effects.len(), 2, "only the two open tasks are sent");
    h.run(effects).await;
    assert!(h.engine.all_completed());
    h.assert_in_sync();

    let effects = h.engine.toggle_all();
    assert_eq!(effects.len(), 4);
    h.run(effects).await;
    assert_eq!(h.engine.active_count(), 4);
    h.assert_in_sync();
}

#[tokio::test]
async fn blank_edit_deletes_through_store() {
    let mut h = Harness::loaded(MemoryStore::demo(OWNER)).await;
    h.engine.start_edit(TaskId::new(2), "Wire the store client");
    h.engine.change_draft("   ");
    let effects = h.engine.submit_edit(TaskId::new(2));
    h.run(effects).await;

    assert!(h.engine.find(TaskId::new(2)).is_none());
    assert_eq!(h.store.calls(StoreOp::Update), 0);
    assert_eq!(h.store.calls(StoreOp::Delete), 1);
    h.assert_in_sync();
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn out_of_order_completions_lose_no_update() {
    let store = MemoryStore::with_tasks(vec![
        task(1, "slow", false),
        task(2, "medium", false),
        task(3, "fast", false),
    ]);
    store.set_task_latency(TaskId::new(1), Duration::from_millis(120));
    store.set_task_latency(TaskId::new(2), Duration::from_millis(60));
    let mut h = Harness::loaded(store).await;

    for id in [1, 2, 3] {
        let effects = h.engine.toggle_one(TaskId::new(id));
        h.send(effects).await;
    }
    assert_eq!(h.engine.busy().len(), 3);
    h.settle().await;

    assert!(h.engine.all_completed());
    h.assert_in_sync();
}

#[tokio::test]
async fn create_and_delete_overlap() {
    let store = MemoryStore::with_tasks(vec![task(1, "old", true)]);
    store.set_task_latency(TaskId::new(1), Duration::from_millis(80));
    let mut h = Harness::loaded(store).await;

    let delete = h.engine.delete(TaskId::new(1));
    h.send(delete).await;
    let create = h.engine.create("new");
    h.send(create).await;
    assert!(h.engine.is_busy(TaskId::PENDING));
    assert!(h.engine.is_busy(TaskId::new(1)));
    h.settle().await;

    assert_eq!(h.engine.tasks().len(), 1);
    assert_eq!(h.engine.tasks()[0].title, "new");
    h.assert_in_sync();
}

#[tokio::test]
async fn outcomes_applied_in_any_order_converge() {
    let tasks: Vec<Task> = (1..=6).map(|i| task(i, "t", i % 2 == 0)).collect();
    let store = MemoryStore::with_tasks(tasks.clone());
    let mut engine = Engine::new(OWNER);
    engine.load();
    engine.apply(StoreOutcome::Loaded(Ok(tasks)));

    let mut requests = Vec::new();
    for id in 1..=6 {
        requests.extend(engine.toggle_one(TaskId::new(id)));
    }
    let outcomes = join_all(
        requests
            .into_iter()
            .filter_map(|e| e.as_request().cloned())
            .map(|req| dispatch::execute(&store, req)),
    )
    .await;

    for outcome in outcomes.into_iter().rev() {
        engine.apply(outcome);
    }
    assert_eq!(engine.tasks(), store.snapshot().as_slice());
    assert!(engine.busy().is_empty());
    assert_eq!(engine.active_count(), 3);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn load_failure_leaves_list_empty_and_signals() {
    let store = MemoryStore::demo(OWNER);
    store.set_failing(StoreOp::List, true);
    let h = Harness::loaded(store).await;

    assert!(h.engine.tasks().is_empty());
    assert!(!h.engine.is_loading());
    assert_eq!(h.engine.notification().message(), "Unable to load todos");
}

#[tokio::test]
async fn create_failure_keeps_draft() {
    let store = MemoryStore::new();
    store.set_failing(StoreOp::Create, true);
    let mut h = Harness::loaded(store).await;

    h.engine.set_input("keep me");
    let effects = h.engine.submit_input();
    h.run(effects).await;

    assert!(h.engine.tasks().is_empty());
    assert_eq!(h.engine.input(), "keep me");
    assert!(!h.engine.input_disabled());
    assert_eq!(h.engine.notification().message(), "Unable to add a todo");
    h.assert_in_sync();
}

#[tokio::test]
async fn toggle_all_partial_failure_matches_store() {
    let store = MemoryStore::with_tasks(vec![
        task(1, "a", false),
        task(2, "b", false),
        task(3, "c", false),
    ]);
    store.fail_task(TaskId::new(2));
    let mut h = Harness::loaded(store).await;

    let effects = h.engine.toggle_all();
    h.run(effects).await;

    let done: Vec<bool> = h.engine.tasks().iter().map(|t| t.completed).collect();
    assert_eq!(done, vec![true, false, true]);
    assert_eq!(h.engine.notification().message(), "Unable to update a todo");
    h.assert_in_sync();
}

#[tokio::test]
async fn clear_completed_partial_failure_matches_store() {
    let store = MemoryStore::with_tasks(vec![
        task(1, "a", true),
        task(2, "b", true),
        task(3, "c", false),
    ]);
    store.fail_task(TaskId::new(1));
    let mut h = Harness::loaded(store).await;

    let effects = h.engine.clear_completed();
    h.run(effects).await;

    let ids: Vec<u64> = h.engine.tasks().iter().map(|t| t.id.get()).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(h.engine.notification().message(), "Unable to delete a todo");
    h.assert_in_sync();
}

#[tokio::test]
async fn failed_rename_keeps_session_and_title() {
    let store = MemoryStore::with_tasks(vec![task(1, "a", false)]);
    store.set_failing(StoreOp::Update, true);
    let mut h = Harness::loaded(store).await;

    h.engine.start_edit(TaskId::new(1), "a");
    h.engine.change_draft("b");
    let effects = h.engine.submit_edit(TaskId::new(1));
    h.run(effects).await;

    assert_eq!(h.engine.edit().map(|s| s.draft.as_str()), Some("b"));
    assert_eq!(h.engine.tasks()[0].title, "a");
    h.assert_in_sync();
}

// =============================================================================
// View
// =============================================================================

#[tokio::test]
async fn filter_does_not_touch_store() {
    let mut h = Harness::loaded(MemoryStore::demo(OWNER)).await;
    let before = h.store.total_calls();
    for mode in FilterMode::ALL {
        h.engine.set_filter(mode);
        assert!(h.engine.visible().iter().all(|t| mode.matches(t)));
    }
    assert_eq!(h.store.total_calls(), before);
    assert_eq!(h.store.kind().to_string(), "Memory");
}

#[tokio::test]
async fn request_for_deleted_task_fails_cleanly() {
    let mut h = Harness::loaded(MemoryStore::with_tasks(vec![task(1, "a", false)])).await;
    // Someone else removes the task behind our back.
    h.store.delete(TaskId::new(1)).await.unwrap();

    let effects = h.engine.toggle_one(TaskId::new(1));
    h.run(effects).await;
    assert_eq!(h.engine.notification().message(), "Unable to update a todo");
    assert!(h.engine.busy().is_empty());
}
