//! Bridges the synchronous TUI loop to the async [`TaskStore`].
//!
//! ```text
//! TUI (main thread)  ←── StoreOutcome ───  tokio background tasks
//!                     ─── DispatchCommand →
//! ```
//!
//! Every [`StoreRequest`] runs in its own task, so independent requests
//! overlap and their outcomes arrive in completion order. The engine is
//! built to apply outcomes in any order.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::engine::{StoreOutcome, StoreRequest};
use crate::store::TaskStore;

/// Commands sent from the TUI main loop to the dispatcher.
#[derive(Debug)]
pub enum DispatchCommand {
    /// Run a store request in the background.
    Execute(StoreRequest),
    /// Stop accepting requests. Requests already running still report.
    Shutdown,
}

/// Default channel capacity for commands and outcomes.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Spawn the dispatcher task and return its channel handles.
///
/// Must be called from within a tokio runtime.
pub fn spawn_dispatcher<S>(
    store: Arc<S>,
    capacity: usize,
) -> (mpsc::Sender<DispatchCommand>, mpsc::Receiver<StoreOutcome>)
where
    S: TaskStore + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<DispatchCommand>(capacity);
    let (out_tx, out_rx) = mpsc::channel::<StoreOutcome>(capacity);

    tokio::spawn(async move {
        command_handler(store, cmd_rx, out_tx).await;
    });

    (cmd_tx, out_rx)
}

/// Background task: fan each request out to its own task.
async fn command_handler<S>(
    store: Arc<S>,
    mut cmd_rx: mpsc::Receiver<DispatchCommand>,
    out_tx: mpsc::Sender<StoreOutcome>,
) where
    S: TaskStore + 'static,
{
    tracing::debug!(store = %store.kind(), "dispatcher started");
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            DispatchCommand::Execute(request) => {
                let store = Arc::clone(&store);
                let out_tx = out_tx.clone();
                tokio::spawn(async move {
                    let outcome = execute(store.as_ref(), request).await;
                    if out_tx.send(outcome).await.is_err() {
                        tracing::debug!("outcome dropped: TUI has gone away");
                    }
                });
            }
            DispatchCommand::Shutdown => {
                tracing::info!("dispatcher shutting down");
                break;
            }
        }
    }
}

/// Run one request against `store` and wrap the result as an outcome.
pub async fn execute<S: TaskStore>(store: &S, request: StoreRequest) -> StoreOutcome {
    match request {
        StoreRequest::Load { owner } => StoreOutcome::Loaded(store.list(owner).await),
        StoreRequest::Create { fields } => StoreOutcome::Created(store.create(&fields).await),
        StoreRequest::Update {
            task,
            origin,
            batch,
        } => StoreOutcome::Updated {
            id: task.id,
            origin,
            batch,
            result: store.update(&task).await,
        },
        StoreRequest::Delete { id, batch } => StoreOutcome::Deleted {
            id,
            batch,
            result: store.delete(id).await,
        },
    }
}
