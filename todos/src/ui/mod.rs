//! Terminal UI rendering.

pub mod footer;
pub mod header;
pub mod notification;
pub mod status_bar;
pub mod task_list;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::App;

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let banner_height = u16::from(app.engine.notification().is_shown());
    let footer_height = u16::from(footer::is_visible(app));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Header with input
            Constraint::Length(banner_height), // Notification
            Constraint::Min(3),                // Task list
            Constraint::Length(footer_height), // Counter and filters
            Constraint::Length(1),             // Status bar
        ])
        .split(frame.area());

    header::render(frame, chunks[0], app);
    if banner_height > 0 {
        notification::render(frame, chunks[1], app);
    }
    task_list::render(frame, chunks[2], app);
    if footer_height > 0 {
        footer::render(frame, chunks[3], app);
    }
    status_bar::render(frame, chunks[4], app);
}
