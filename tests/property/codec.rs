//! Property-based tests for response decoding.
//!
//! 1. Arbitrary bytes never panic the decoders.
//! 2. Any list of valid tasks with distinct ids decodes in order.
//! 3. A list containing a repeated id is always rejected.

use proptest::prelude::*;
use todos_proto::codec::{DecodeError, decode_task, decode_task_list};
use todos_proto::{Task, TaskId, UserId};

/// Strategy for titles that survive trimming.
fn arb_title() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 ,.!?-]{0,60}"
}

/// Strategy for a list of valid tasks with unique, non-zero ids.
fn arb_task_list() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::btree_map(1u64..10_000, (arb_title(), any::<bool>()), 0..20).prop_map(
        |entries| {
            entries
                .into_iter()
                .map(|(id, (title, completed))| Task {
                    id: TaskId::new(id),
                    user_id: UserId::new(1096),
                    title,
                    completed,
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn random_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode_task(&bytes);
        let _ = decode_task_list(&bytes);
    }

    #[test]
    fn valid_lists_decode_in_order(tasks in arb_task_list()) {
        let body = serde_json::to_vec(&tasks).unwrap();
        let decoded = decode_task_list(&body).unwrap();
        prop_assert_eq!(decoded, tasks);
    }

    #[test]
    fn repeated_ids_are_rejected(tasks in arb_task_list().prop_filter("non-empty", |t| !t.is_empty())) {
        let mut tasks = tasks;
        let dup = tasks[0].clone();
        tasks.push(dup.clone());
        let body = serde_json::to_vec(&tasks).unwrap();
        let is_duplicate = matches!(decode_task_list(&body), Err(DecodeError::DuplicateId(id)) if id == dup.id);
        prop_assert!(is_duplicate);
    }
}
