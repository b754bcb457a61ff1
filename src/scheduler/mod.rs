//! Single-threaded cooperative main loop.
//!
//! Two fixed-rate tickers share one thread: the poll tick hands control to
//! the [`ConnectionSupervisor`], the render tick draws the screen and
//! dispatches at most one key. Neither blocks; the loop sleeps only between
//! ticks, until the earlier of the two deadlines.

use crate::config::KeyBindings;
use crate::model::KeyAction;
use crate::remote::ChatRemote;
use crate::session::{ChatSession, ConnectionSupervisor};
use crate::view::Screen;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Terminal side of the loop.
pub trait Frontend {
    /// Whether there is anywhere to draw.
    fn is_visible(&self) -> bool;

    /// Columns and rows of the log text area.
    ///
    /// # Errors
    ///
    /// Terminal I/O failures.
    fn log_area(&mut self) -> io::Result<(usize, usize)>;

    /// Draw one frame.
    ///
    /// # Errors
    ///
    /// Terminal I/O failures.
    fn draw(&mut self, screen: &Screen<'_>) -> io::Result<()>;

    /// Take one pending key press without waiting.
    ///
    /// # Errors
    ///
    /// Terminal I/O failures.
    fn poll_key(&mut self) -> io::Result<Option<KeyEvent>>;
}

/// Whether the loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep running.
    Continue,
    /// The user asked to quit.
    Quit,
}

/// Fixed-rate timer.
///
/// Ticks that were missed while the loop was busy are skipped rather than
/// fired back to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    period: Duration,
    next_deadline: Instant,
}

impl Ticker {
    /// Ticker whose first tick is due at `start`.
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next_deadline: start,
        }
    }

    /// Tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// When the next tick is due.
    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }

    /// Consume the tick if it is due at `now`.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if now < self.next_deadline {
            return false;
        }
        self.next_deadline += self.period;
        if self.next_deadline <= now {
            self.next_deadline = now + self.period;
        }
        true
    }

    /// Time left until the next tick; zero when overdue.
    pub fn time_until(&self, now: Instant) -> Duration {
        self.next_deadline.saturating_duration_since(now)
    }
}

/// Owns both tickers and the key bindings.
#[derive(Debug, Clone)]
pub struct Scheduler {
    poll: Ticker,
    render: Ticker,
    bindings: KeyBindings,
}

impl Scheduler {
    /// Scheduler whose first poll and render are due at `start`.
    pub fn new(
        poll_interval: Duration,
        render_interval: Duration,
        bindings: KeyBindings,
        start: Instant,
    ) -> Self {
        Self {
            poll: Ticker::new(poll_interval, start),
            render: Ticker::new(render_interval, start),
            bindings,
        }
    }

    /// Run until the user quits.
    ///
    /// # Errors
    ///
    /// Terminal I/O failures from the frontend.
    pub fn run<R, F>(
        &mut self,
        session: &mut ChatSession,
        supervisor: &mut ConnectionSupervisor<R>,
        frontend: &mut F,
    ) -> io::Result<()>
    where
        R: ChatRemote,
        F: Frontend,
    {
        info!(
            poll = ?self.poll.period(),
            render = ?self.render.period(),
            "main loop started"
        );
        loop {
            let now = Instant::now();
            if self.step(now, session, supervisor, frontend)? == Flow::Quit {
                info!("quit requested");
                return Ok(());
            }
            std::thread::sleep(self.time_until_next(Instant::now()));
        }
    }

    /// Run whichever ticks are due at `now`: poll first, then render.
    ///
    /// # Errors
    ///
    /// Terminal I/O failures from the frontend.
    pub fn step<R, F>(
        &mut self,
        now: Instant,
        session: &mut ChatSession,
        supervisor: &mut ConnectionSupervisor<R>,
        frontend: &mut F,
    ) -> io::Result<Flow>
    where
        R: ChatRemote,
        F: Frontend,
    {
        if self.poll.fire_if_due(now) {
            supervisor.poll_tick(session, now);
        }
        if self.render.fire_if_due(now) {
            return self.render_tick(now, session, supervisor, frontend);
        }
        Ok(Flow::Continue)
    }

    /// Time until the earlier of the two deadlines.
    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.poll.time_until(now).min(self.render.time_until(now))
    }

    fn render_tick<R, F>(
        &mut self,
        now: Instant,
        session: &mut ChatSession,
        supervisor: &mut ConnectionSupervisor<R>,
        frontend: &mut F,
    ) -> io::Result<Flow>
    where
        R: ChatRemote,
        F: Frontend,
    {
        if frontend.is_visible() {
            let (width, height) = frontend.log_area()?;
            session.set_log_area(width, height);
            session.on_render_tick();
            frontend.draw(&Screen::new(session, supervisor.state()))?;
        }

        match frontend.poll_key()? {
            Some(key) => Ok(self.dispatch(key, now, session, supervisor)),
            None => Ok(Flow::Continue),
        }
    }

    fn dispatch<R: ChatRemote>(
        &self,
        key: KeyEvent,
        now: Instant,
        session: &mut ChatSession,
        supervisor: &mut ConnectionSupervisor<R>,
    ) -> Flow {
        let Some(action) = self.bindings.get(key) else {
            if let KeyCode::Char(ch) = key.code {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    session.composer_mut().insert(ch);
                }
            }
            return Flow::Continue;
        };

        match action {
            KeyAction::Quit => return Flow::Quit,
            KeyAction::Submit => {
                if let Some(text) = session.composer_mut().submit() {
                    supervisor.send(session, &text, now);
                }
            }
            KeyAction::DeleteBack => session.composer_mut().backspace(),
            KeyAction::CursorLeft => session.composer_mut().cursor_left(),
            KeyAction::CursorRight => session.composer_mut().cursor_right(),
            scroll => {
                session.scroll(scroll);
                debug!(?scroll, topline = session.viewport().topline(), "scrolled");
            }
        }
        Flow::Continue
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
