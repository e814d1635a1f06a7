//! Task list rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};
use todos_proto::Task;

use super::theme;
use crate::app::{App, Focus};

/// Marker shown on rows with a request in flight.
const BUSY_MARKER: &str = "⋯";

/// Render the visible tasks, the pending placeholder and the editor row.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let engine = &app.engine;
    let focused = matches!(app.focus, Focus::List | Focus::Editor);

    let mut items: Vec<ListItem> = engine
        .visible()
        .into_iter()
        .map(|task| ListItem::new(task_line(app, task)))
        .collect();

    // The placeholder shows regardless of filter, at the bottom.
    if let Some(pending) = engine.pending() {
        items.push(ListItem::new(Line::from(vec![
            Span::styled("[ ] ", theme::busy()),
            Span::styled(pending.title.clone(), theme::busy()),
            Span::styled(format!(" {BUSY_MARKER}"), theme::busy()),
        ])));
    }

    let title = if engine.is_loading() {
        " Tasks (loading…) ".to_string()
    } else {
        format!(" Tasks: {} ", engine.filter().label())
    };
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::HIGHLIGHT)))
        .borders(Borders::ALL)
        .border_style(theme::border(focused));

    let list = List::new(items)
        .block(block)
        .highlight_style(if app.focus == Focus::List {
            theme::selected()
        } else {
            theme::normal()
        });

    let mut state = ListState::default();
    if focused && app.selected_task().is_some() {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn task_line<'a>(app: &'a App, task: &'a Task) -> Line<'a> {
    let engine = &app.engine;
    let checkbox = if task.completed {
        Span::styled("[✓] ", theme::normal().fg(theme::SUCCESS))
    } else {
        Span::styled("[ ] ", theme::normal())
    };

    let editing = engine.edit().filter(|s| s.id == task.id);
    let title = match editing {
        Some(session) => Span::styled(session.draft.as_str(), theme::input_cursor()),
        None if task.completed => Span::styled(task.title.as_str(), theme::completed()),
        None => Span::styled(task.title.as_str(), theme::normal()),
    };

    let mut spans = vec![checkbox, title];
    if editing.is_some() && app.focus == Focus::Editor {
        spans.push(Span::styled("█", theme::input_cursor()));
    }
    if engine.is_busy(task.id) {
        spans.push(Span::styled(format!(" {BUSY_MARKER}"), theme::busy()));
    }
    Line::from(spans)
}
