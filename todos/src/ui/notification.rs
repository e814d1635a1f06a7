//! Error notification banner.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::App;

/// Render the banner. The caller only allocates space when it is shown.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let notifier = app.engine.notification();
    let mut spans = vec![
        Span::raw(" ⚠ "),
        Span::raw(notifier.message().to_string()),
    ];
    if notifier.backlog_len() > 0 {
        spans.push(Span::raw(format!(" (+{} more)", notifier.backlog_len())));
    }
    spans.push(Span::raw("  [^x] dismiss"));

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::banner());
    frame.render_widget(paragraph, area);
}
