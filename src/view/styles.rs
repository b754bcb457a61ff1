//! Styling for the chat screen.

use crate::model::LineColor;
use crate::session::ConnectionState;
use ratatui::style::{Color, Modifier, Style};

/// Foreground style of a log line.
pub fn line_style(color: LineColor) -> Style {
    Style::default().fg(Color::Indexed(color.index()))
}

/// Border and title style; the title color follows the connection state.
pub fn border_style(state: ConnectionState) -> Style {
    match state {
        ConnectionState::Connected => Style::default().fg(Color::Gray),
        ConnectionState::Connecting | ConnectionState::Reconnecting => {
            Style::default().fg(Color::Yellow)
        }
        ConnectionState::Disconnected => Style::default().fg(Color::Red),
    }
}

/// Title text style.
pub fn title_style(state: ConnectionState) -> Style {
    border_style(state).add_modifier(Modifier::BOLD)
}

/// Separator between log pane and prompt.
pub const SEPARATOR: Style = Style::new().fg(Color::DarkGray);

/// Scrollbar track cells.
pub const TRACK: Style = Style::new().fg(Color::DarkGray);

/// Scrollbar thumb cells.
pub const THUMB: Style = Style::new().fg(Color::Gray);

/// The `> ` prompt marker.
pub const PROMPT: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
