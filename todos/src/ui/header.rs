//! Header: toggle-all marker and the new-task input.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::{App, Focus};

/// Render the header with the new-task input.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let engine = &app.engine;
    let focused = app.focus == Focus::NewTodo;

    let mut spans = Vec::new();
    // The toggle-all marker only appears once there is something to toggle.
    if !engine.tasks().is_empty() {
        let style = if engine.all_completed() {
            theme::normal().fg(theme::SUCCESS)
        } else {
            theme::dimmed()
        };
        spans.push(Span::styled("❯ ", style));
    }

    if engine.input().is_empty() && !focused {
        spans.push(Span::styled("What needs to be done?", theme::dimmed()));
    } else {
        let style = if engine.input_disabled() {
            theme::dimmed()
        } else {
            theme::normal()
        };
        spans.push(Span::styled(engine.input().to_string(), style));
    }
    if focused && !engine.input_disabled() {
        spans.push(Span::styled("█", theme::input_cursor()));
    }

    let block = Block::default()
        .title(Span::styled(" todos ", theme::panel_title(theme::TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::border(focused));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
