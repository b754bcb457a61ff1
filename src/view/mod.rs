//! Terminal rendering and input (impure shell).

pub mod layout;
pub mod log_pane;
pub mod styles;

pub use log_pane::LogPane;

use crate::model::LogLine;
use crate::scheduler::Frontend;
use crate::session::{ChatSession, ConnectionState};
use crate::state::Composer;
use crate::view_state::Thumb;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::debug;

/// Everything one frame shows.
#[derive(Debug, Clone, Copy)]
pub struct Screen<'a> {
    /// Log lines in view, oldest first.
    pub lines: &'a [LogLine],
    /// Scrollbar thumb, when the log overflows.
    pub thumb: Option<Thumb>,
    /// Channel name without `#`.
    pub channel: &'a str,
    /// Channel topic, possibly empty.
    pub topic: &'a str,
    /// Connection state shown in the title.
    pub state: ConnectionState,
    /// The line being composed.
    pub composer: &'a Composer,
}

impl<'a> Screen<'a> {
    /// Snapshot of `session` for drawing.
    pub fn new(session: &'a ChatSession, state: ConnectionState) -> Self {
        let (channel, topic) = match session.channel() {
            Some(info) => (info.name.as_str(), info.topic.as_str()),
            None => (session.channel_name(), ""),
        };
        Self {
            lines: session.visible_lines(),
            thumb: session.thumb(),
            channel,
            topic,
            state,
            composer: session.composer(),
        }
    }
}

enum Input {
    Terminal,
    Queued(VecDeque<KeyEvent>),
}

/// ratatui-backed [`Frontend`].
///
/// Generic over backend so tests can draw into a `TestBackend`.
pub struct TerminalFrontend<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    input: Input,
}

impl TerminalFrontend<CrosstermBackend<Stdout>> {
    /// Take over the terminal: raw mode plus alternate screen.
    ///
    /// Call [`restore_terminal`] on the way out, error or not.
    ///
    /// # Errors
    ///
    /// Terminal setup failures.
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            input: Input::Terminal,
        })
    }
}

impl<B> TerminalFrontend<B>
where
    B: Backend,
{
    /// Frontend over `terminal` reading keys from an internal queue.
    pub fn new_for_test(terminal: Terminal<B>) -> Self {
        Self {
            terminal,
            input: Input::Queued(VecDeque::new()),
        }
    }

    /// Queue a key for [`Frontend::poll_key`]. Ignored for live terminals.
    pub fn push_key(&mut self, key: KeyEvent) {
        if let Input::Queued(keys) = &mut self.input {
            keys.push_back(key);
        }
    }

    /// The underlying terminal, for buffer inspection.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    fn area(&self) -> io::Result<Rect> {
        let size = self.terminal.size()?;
        Ok(Rect::new(0, 0, size.width, size.height))
    }
}

impl<B> Frontend for TerminalFrontend<B>
where
    B: Backend,
{
    fn is_visible(&self) -> bool {
        self.area()
            .map(|area| {
                let (width, height) = layout::log_text_size(area);
                width > 0 && height > 0
            })
            .unwrap_or(false)
    }

    fn log_area(&mut self) -> io::Result<(usize, usize)> {
        Ok(layout::log_text_size(self.area()?))
    }

    fn draw(&mut self, screen: &Screen<'_>) -> io::Result<()> {
        let show_cursor = matches!(self.input, Input::Terminal);
        self.terminal
            .draw(|frame| layout::render(frame, screen, show_cursor))?;
        Ok(())
    }

    fn poll_key(&mut self) -> io::Result<Option<KeyEvent>> {
        match &mut self.input {
            Input::Queued(keys) => Ok(keys.pop_front()),
            Input::Terminal => {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(Some(key)),
                        Event::Resize(width, height) => debug!(width, height, "terminal resized"),
                        _ => {}
                    }
                }
                Ok(None)
            }
        }
    }
}

/// Give the terminal back: leave raw mode and the alternate screen.
///
/// # Errors
///
/// Terminal I/O failures.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
