//! `todos`: terminal to-do client.
//!
//! Launches the TUI against a REST task backend, or against an in-memory
//! store with `--demo`. Configuration via CLI flags, environment variables,
//! or config file (`~/.config/todos/config.toml`).
//!
//! ```bash
//! # Offline demo mode
//! cargo run --bin todos -- --demo
//!
//! # Talk to a backend
//! cargo run --bin todos -- --api-url http://127.0.0.1:3000 --user-id 1096
//!
//! # Or via environment variables
//! TODOS_API_URL=http://127.0.0.1:3000 TODOS_USER_ID=1096 cargo run
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use todos::app::App;
use todos::config::{CliArgs, ClientConfig};
use todos::dispatch::{self, DispatchCommand};
use todos::engine::{Engine, StoreOutcome, StoreRequest};
use todos::store::{StoreError, TaskStore};
use todos::store::http::HttpStore;
use todos::store::memory::MemoryStore;
use todos::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    // Before logging: `exit` would skip the log guard's flush.
    let http = if config.demo {
        None
    } else {
        match HttpStore::new(config.api_url.clone()) {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(2);
            }
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(
        api_url = %config.api_url,
        user_id = %config.user_id,
        demo = config.demo,
        "todos starting"
    );

    match http {
        Some(store) => run(store, &config).await,
        None => run(Arc::new(MemoryStore::demo(config.user_id)), &config).await,
    }
}

/// Set up the terminal, run the app against `store`, restore the terminal.
async fn run<S: TaskStore + 'static>(store: Arc<S>, config: &ClientConfig) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, store, config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("todos exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("todos.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
///
/// Runs on the runtime thread; `event::poll` blocks for at most the
/// configured poll timeout, while store requests progress on the worker
/// threads of the multi-thread runtime.
fn run_app<S: TaskStore + 'static>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    store: Arc<S>,
    config: &ClientConfig,
) -> io::Result<()> {
    let kind = store.kind();
    let engine = Engine::new(config.user_id).with_notifier(config.notifier());
    let mut app = App::new(engine, kind);

    let (cmd_tx, mut out_rx) = dispatch::spawn_dispatcher(store, config.channel_capacity);

    let requests = app.start();
    send_requests(&mut app, &cmd_tx, requests);

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Drain all settled requests (non-blocking).
        drain_outcomes(&mut app, &mut out_rx, &cmd_tx);

        // Step 3: Fire the notification timer.
        app.tick();

        // Step 4: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let requests = app.handle_key_event(key);
            send_requests(&mut app, &cmd_tx, requests);
        }

        if app.should_quit {
            let _ = cmd_tx.try_send(DispatchCommand::Shutdown);
            return Ok(());
        }
    }
}

/// Drain all pending outcomes from the receiver and apply them to the app.
fn drain_outcomes(
    app: &mut App,
    rx: &mut mpsc::Receiver<StoreOutcome>,
    tx: &mpsc::Sender<DispatchCommand>,
) {
    while let Ok(outcome) = rx.try_recv() {
        let requests = app.apply_outcome(outcome);
        send_requests(app, tx, requests);
    }
}

/// Hand requests to the dispatcher.
///
/// A request the dispatcher cannot take is settled on the spot as a
/// failure, so its id does not stay busy.
fn send_requests(app: &mut App, tx: &mpsc::Sender<DispatchCommand>, requests: Vec<StoreRequest>) {
    let mut queue = std::collections::VecDeque::from(requests);
    while let Some(request) = queue.pop_front() {
        let reason = match tx.try_send(DispatchCommand::Execute(request)) {
            Ok(()) => continue,
            Err(mpsc::error::TrySendError::Full(cmd)) => ("dispatcher queue full", cmd),
            Err(mpsc::error::TrySendError::Closed(cmd)) => ("dispatcher gone", cmd),
        };
        let (reason, DispatchCommand::Execute(request)) = reason else {
            continue;
        };
        tracing::error!(?request, reason, "request not dispatched");
        let outcome = StoreOutcome::failed(request, StoreError::Unavailable(reason.to_string()));
        queue.extend(app.apply_outcome(outcome));
    }
}
