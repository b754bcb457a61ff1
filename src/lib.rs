//! lack: a terminal chat client.
//!
//! Follows one channel of a chat service in a scrollable, continuously
//! updated log, with a one-line composer for replies.
//!
//! Pure core: [`model`], [`reflow`], [`state`], [`view_state`] and
//! [`session`] never touch the terminal. Impure shell: [`remote`] talks to the
//! service, [`view`] to the terminal, and [`scheduler`] runs the loop that
//! ties them together.

pub mod config;
pub mod logging;
pub mod model;
pub mod reflow;
pub mod remote;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod view;
pub mod view_state;

use config::{KeyBindings, SessionSettings};
use model::AppError;
use remote::FeedRemote;
use scheduler::Scheduler;
use session::{ChatSession, ConnectionSupervisor};
use std::time::Instant;
use tracing::{error, info};
use view::{restore_terminal, TerminalFrontend};

/// Connect, take over the terminal, and run until the user quits.
///
/// The first connection is made before the terminal is touched so that a
/// failure can be reported on a normal screen.
///
/// # Errors
///
/// [`AppError::Connect`] when the first connection fails, or
/// [`AppError::Terminal`] for terminal I/O failures. The terminal is
/// restored before returning either way.
pub fn run(settings: &SessionSettings) -> Result<(), AppError> {
    let mut session = ChatSession::from_settings(settings);
    let remote = FeedRemote::new(settings.feed.clone(), settings.token.clone());
    let mut supervisor = ConnectionSupervisor::new(remote, settings.reconnect_delay);

    info!(feed = %settings.feed.display(), channel = %settings.channel, "connecting");
    if let Err(err) = supervisor.connect(&mut session) {
        error!(error = %err, "initial connect failed");
        return Err(err.into());
    }

    let mut frontend = match TerminalFrontend::new() {
        Ok(frontend) => frontend,
        Err(err) => {
            let _ = restore_terminal();
            return Err(err.into());
        }
    };

    let mut scheduler = Scheduler::new(
        settings.poll_interval,
        settings.render_interval,
        KeyBindings::default(),
        Instant::now(),
    );
    let result = scheduler.run(&mut session, &mut supervisor, &mut frontend);
    let restored = restore_terminal();

    result?;
    restored?;
    Ok(())
}
