//! Application state and event handling.
//!
//! [`App`] wraps the [`Engine`] with the presentation-only state the engine
//! does not care about: which widget has keyboard focus, which row is
//! selected, whether the user asked to quit. Key events and store outcomes
//! go in; store requests for the dispatcher come out.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use todos_proto::Task;

use crate::engine::{Effect, Engine, FilterMode, StoreOutcome, StoreRequest};
use crate::store::StoreKind;

/// Which widget receives key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The new-task input in the header (default).
    NewTodo,
    /// The task list.
    List,
    /// The title editor of the active edit session.
    Editor,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Task state and intents.
    pub engine: Engine,
    /// Which widget is focused.
    pub focus: Focus,
    /// Index of the selected row among the visible tasks.
    pub selected: usize,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Backend the requests go to (status bar).
    pub store: StoreKind,
}

impl App {
    /// Create an application around `engine`.
    #[must_use]
    pub const fn new(engine: Engine, store: StoreKind) -> Self {
        Self {
            engine,
            focus: Focus::NewTodo,
            selected: 0,
            should_quit: false,
            store,
        }
    }

    /// Kick off the initial load.
    pub fn start(&mut self) -> Vec<StoreRequest> {
        let effects = self.engine.load();
        self.perform(effects)
    }

    /// Apply a settled store request.
    pub fn apply_outcome(&mut self, outcome: StoreOutcome) -> Vec<StoreRequest> {
        let effects = self.engine.apply(outcome);
        self.perform(effects)
    }

    /// Fire due timers. Returns `true` if a redraw is needed.
    pub fn tick(&mut self) -> bool {
        self.engine.tick()
    }

    /// The task under the selection cursor.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.engine.visible().get(self.selected).copied()
    }

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Vec<StoreRequest> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Char('c') && ctrl {
            self.should_quit = true;
            return Vec::new();
        }
        if key.code == KeyCode::Char('x') && ctrl {
            self.engine.dismiss();
            return Vec::new();
        }
        // Esc closes an open edit session from any widget.
        if key.code == KeyCode::Esc && self.engine.edit().is_some() {
            self.engine.cancel_edit();
            return self.perform(Vec::new());
        }

        let effects = match self.focus {
            Focus::NewTodo => self.handle_input_key(key),
            Focus::List => self.handle_list_key(key),
            Focus::Editor => self.handle_editor_key(key),
        };
        self.perform(effects)
    }

    /// Handle key event when the new-task input is focused.
    fn handle_input_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.engine.toggle_all()
            }
            KeyCode::Char(c) => {
                let mut text = self.engine.input().to_string();
                text.push(c);
                self.engine.set_input(text);
                Vec::new()
            }
            KeyCode::Backspace => {
                let mut text = self.engine.input().to_string();
                text.pop();
                self.engine.set_input(text);
                Vec::new()
            }
            KeyCode::Enter => self.engine.submit_input(),
            KeyCode::Tab => {
                self.focus = Focus::List;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Handle key event when the task list is focused.
    fn handle_list_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.engine.visible().len() {
                    self.selected += 1;
                }
                Vec::new()
            }
            KeyCode::Char(' ') => self
                .selected_task()
                .map(|t| t.id)
                .map_or_else(Vec::new, |id| self.engine.toggle_one(id)),
            KeyCode::Enter | KeyCode::Char('e') => {
                let Some((id, title)) = self.selected_task().map(|t| (t.id, t.title.clone()))
                else {
                    return Vec::new();
                };
                self.engine.start_edit(id, title)
            }
            KeyCode::Delete | KeyCode::Char('d') => self
                .selected_task()
                .map(|t| t.id)
                .map_or_else(Vec::new, |id| self.engine.delete(id)),
            KeyCode::Char('a') => self.engine.toggle_all(),
            KeyCode::Char('c') => self.engine.clear_completed(),
            KeyCode::Char('1') => self.set_filter(FilterMode::All),
            KeyCode::Char('2') => self.set_filter(FilterMode::Active),
            KeyCode::Char('3') => self.set_filter(FilterMode::Completed),
            KeyCode::Char('f') => self.set_filter(self.engine.filter().next()),
            KeyCode::Char('x') => {
                self.engine.dismiss();
                Vec::new()
            }
            KeyCode::Tab => {
                self.focus = Focus::NewTodo;
                Vec::new()
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Handle key event when the title editor is focused.
    fn handle_editor_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let Some(session) = self.engine.edit() else {
            self.focus = Focus::List;
            return Vec::new();
        };
        let id = session.id;
        let mut draft = session.draft.clone();

        match key.code {
            KeyCode::Char(c) => {
                draft.push(c);
                self.engine.change_draft(draft);
                Vec::new()
            }
            KeyCode::Backspace => {
                draft.pop();
                self.engine.change_draft(draft);
                Vec::new()
            }
            KeyCode::Enter => self.engine.submit_edit(id),
            _ => Vec::new(),
        }
    }

    fn set_filter(&mut self, mode: FilterMode) -> Vec<Effect> {
        self.engine.set_filter(mode);
        self.selected = 0;
        Vec::new()
    }

    /// Carry out focus effects and hand store requests to the caller.
    fn perform(&mut self, effects: Vec<Effect>) -> Vec<StoreRequest> {
        let mut requests = Vec::new();
        for effect in effects {
            match effect {
                Effect::Request(req) => requests.push(req),
                // An open session keeps the editor focused.
                Effect::FocusNewTodo if self.engine.edit().is_some() => {}
                Effect::FocusNewTodo => self.focus = Focus::NewTodo,
                Effect::FocusEditor => self.focus = Focus::Editor,
            }
        }
        self.settle_view();
        requests
    }

    /// Keeps focus and selection consistent with the engine state.
    fn settle_view(&mut self) {
        if self.focus == Focus::Editor && self.engine.edit().is_none() {
            self.focus = Focus::List;
        }
        let visible = self.engine.visible().len();
        if self.selected >= visible {
            self.selected = visible.saturating_sub(1);
        }
    }
}
