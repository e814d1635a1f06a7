//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, Focus};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = match app.focus {
        Focus::NewTodo => "Enter: add | Tab: list | Ctrl-A: toggle all | Ctrl-X: dismiss | Ctrl-C: quit",
        Focus::List => {
            "↑↓/jk: select | Space: toggle | e: edit | d: delete | a: all | c: clear | 1-3/f: filter | x: dismiss | q: quit"
        }
        Focus::Editor => "Enter: save | Esc: cancel",
    };

    let busy = app.engine.busy().len();
    let (dot_color, activity) = if busy == 0 {
        (theme::SUCCESS, "idle".to_string())
    } else {
        (theme::WARNING, format!("{busy} pending"))
    };

    let status_line = Line::from(vec![
        Span::styled(concat!("todos v", env!("CARGO_PKG_VERSION")), theme::bold()),
        Span::raw(" | "),
        Span::styled("●", theme::normal().fg(dot_color)),
        Span::raw(format!(" {} {activity}", app.store)),
        Span::raw(" | "),
        Span::styled(help_text, theme::dimmed()),
    ]);

    let paragraph = Paragraph::new(status_line).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
