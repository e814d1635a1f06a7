//! Property-based tests for the view filter and outcome reconciliation.
//!
//! 1. Active and Completed partition All, each preserving collection order.
//! 2. Toggling one task changes that task's flag and nothing else.
//! 3. Toggle outcomes applied in any order reach the same final list, with
//!    nothing left busy.

use proptest::prelude::*;
use todos::engine::{Effect, Engine, FilterMode, StoreOutcome, StoreRequest, filter};
use todos_proto::{Task, TaskId, UserId};

const OWNER: UserId = UserId::new(1096);

/// Strategy for a list of tasks with unique, non-zero ids.
fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::btree_map(1u64..1_000, any::<bool>(), 0..24).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(id, completed)| Task {
                id: TaskId::new(id),
                user_id: OWNER,
                title: format!("task {id}"),
                completed,
            })
            .collect()
    })
}

fn loaded(tasks: Vec<Task>) -> Engine {
    let mut engine = Engine::new(OWNER);
    engine.load();
    engine.apply(StoreOutcome::Loaded(Ok(tasks)));
    engine
}

/// Successful store answer for an update request.
fn echo(effect: &Effect) -> Option<StoreOutcome> {
    match effect.as_request()? {
        StoreRequest::Update {
            task,
            origin,
            batch,
        } => Some(StoreOutcome::Updated {
            id: task.id,
            origin: *origin,
            batch: *batch,
            result: Ok(task.clone()),
        }),
        _ => None,
    }
}

proptest! {
    #[test]
    fn active_and_completed_partition_all(tasks in arb_tasks()) {
        let all = filter(&tasks, FilterMode::All);
        let active = filter(&tasks, FilterMode::Active);
        let completed = filter(&tasks, FilterMode::Completed);

        prop_assert_eq!(all.len(), tasks.len());
        prop_assert_eq!(active.len() + completed.len(), all.len());
        prop_assert!(active.iter().all(|t| !t.completed));
        prop_assert!(completed.iter().all(|t| t.completed));

        // Merging both views by position in the collection gives back All.
        let mut merged: Vec<&Task> = active.iter().chain(completed.iter()).copied().collect();
        merged.sort_by_key(|t| tasks.iter().position(|x| x.id == t.id));
        prop_assert_eq!(merged, all);
    }

    #[test]
    fn toggle_one_flips_only_its_target(
        (tasks, pick) in arb_tasks()
            .prop_filter("non-empty", |t| !t.is_empty())
            .prop_flat_map(|t| { let n = t.len(); (Just(t), 0..n) })
    ) {
        let mut engine = loaded(tasks.clone());
        let target = tasks[pick].id;
        let effects = engine.toggle_one(target);
        prop_assert_eq!(effects.len(), 1);
        engine.apply(echo(&effects[0]).unwrap());

        for (before, after) in tasks.iter().zip(engine.tasks()) {
            prop_assert_eq!(before.id, after.id);
            prop_assert_eq!(&before.title, &after.title);
            if before.id == target {
                prop_assert_eq!(after.completed, !before.completed);
            } else {
                prop_assert_eq!(after.completed, before.completed);
            }
        }
        prop_assert!(engine.busy().is_empty());
    }

    #[test]
    fn outcome_order_does_not_matter(
        (tasks, order) in arb_tasks().prop_flat_map(|t| {
            let idx: Vec<usize> = (0..t.len()).collect();
            (Just(t), Just(idx).prop_shuffle())
        })
    ) {
        let mut engine = loaded(tasks.clone());
        let outcomes: Vec<StoreOutcome> = tasks
            .iter()
            .flat_map(|t| engine.toggle_one(t.id))
            .filter_map(|e| echo(&e))
            .collect();
        prop_assert_eq!(engine.busy().len(), tasks.len());

        let mut slots: Vec<Option<StoreOutcome>> = outcomes.into_iter().map(Some).collect();
        for i in order {
            engine.apply(slots[i].take().unwrap());
        }

        let expected: Vec<Task> = tasks.iter().map(Task::toggled).collect();
        prop_assert_eq!(engine.tasks(), expected.as_slice());
        prop_assert!(engine.busy().is_empty());
    }
}
