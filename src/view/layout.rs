//! Screen layout: bordered frame, log pane, separator, prompt.

use super::log_pane::LogPane;
use super::{styles, Screen};
use crate::reflow::wrap::display_width;
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Rows taken by the prompt.
pub const PROMPT_HEIGHT: u16 = 2;

/// Prompt marker before the composed text.
pub const PROMPT_MARKER: &str = "> ";

/// Areas of the screen inside the border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenAreas {
    /// Log pane including its scrollbar column.
    pub log: Rect,
    /// One-row separator.
    pub separator: Rect,
    /// Prompt rows.
    pub prompt: Rect,
}

/// Split the terminal `area` into the screen's parts.
pub fn split(area: Rect) -> ScreenAreas {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(PROMPT_HEIGHT),
        ])
        .split(inner);
    ScreenAreas {
        log: chunks[0],
        separator: chunks[1],
        prompt: chunks[2],
    }
}

/// Width and height of the log text for a terminal of `area`.
///
/// The width excludes the scrollbar column; it is the width messages are
/// wrapped to.
pub fn log_text_size(area: Rect) -> (usize, usize) {
    let log = split(area).log;
    (
        usize::from(log.width.saturating_sub(1)),
        usize::from(log.height),
    )
}

/// Draw `screen` into the whole frame.
pub fn render(frame: &mut Frame, screen: &Screen<'_>, show_cursor: bool) {
    let area = frame.area();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(screen.state))
        .title(Span::styled(title(screen), styles::title_style(screen.state)));
    frame.render_widget(block, area);

    let areas = split(area);
    frame.render_widget(LogPane::new(screen.lines, screen.thumb), areas.log);

    let rule = "─".repeat(usize::from(areas.separator.width));
    frame.render_widget(
        Paragraph::new(Span::styled(rule, styles::SEPARATOR)),
        areas.separator,
    );

    let prompt = Line::from(vec![
        Span::styled(PROMPT_MARKER, styles::PROMPT),
        Span::raw(screen.composer.text()),
    ]);
    frame.render_widget(
        Paragraph::new(prompt).wrap(Wrap { trim: false }),
        areas.prompt,
    );

    if show_cursor {
        if let Some(position) = cursor_position(screen, areas.prompt) {
            frame.set_cursor_position(position);
        }
    }
}

/// Title text: channel, topic and connection state.
pub fn title(screen: &Screen<'_>) -> String {
    if screen.topic.is_empty() {
        format!(" #{} [{}] ", screen.channel, screen.state.label())
    } else {
        format!(
            " #{}: {} [{}] ",
            screen.channel,
            screen.topic,
            screen.state.label()
        )
    }
}

/// Terminal cell of the composer cursor, if it falls inside the prompt.
fn cursor_position(screen: &Screen<'_>, prompt: Rect) -> Option<Position> {
    if prompt.width == 0 {
        return None;
    }
    let before: String = screen
        .composer
        .text()
        .chars()
        .take(screen.composer.cursor())
        .collect();
    let offset = display_width(PROMPT_MARKER) + display_width(&before);
    let width = usize::from(prompt.width);
    let row = u16::try_from(offset / width).ok()?;
    let col = u16::try_from(offset % width).ok()?;
    (row < prompt.height).then(|| Position::new(prompt.x + col, prompt.y + row))
}
