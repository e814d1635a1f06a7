//! Footer: remaining count, filter selector and clear-completed action.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::App;
use crate::engine::FilterMode;

/// Whether the footer has anything to show.
#[must_use]
pub fn is_visible(app: &App) -> bool {
    !app.engine.tasks().is_empty() || app.engine.pending().is_some()
}

/// Render the footer line.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let engine = &app.engine;
    let left = engine.active_count();
    let noun = if left == 1 { "item" } else { "items" };

    let mut spans = vec![
        Span::styled(format!(" {left} {noun} left"), theme::normal()),
        Span::raw("  "),
    ];
    for (i, mode) in FilterMode::ALL.iter().enumerate() {
        let label = format!("{}:{}", i + 1, mode.label());
        let style = if *mode == engine.filter() {
            theme::highlighted()
        } else {
            theme::dimmed()
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }
    if engine.has_completed() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled("[c] Clear completed", theme::normal()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
