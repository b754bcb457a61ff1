//! Connection lifecycle: connect, live polling, and reconnecting.
//!
//! The supervisor owns the [`ChatRemote`] and is the only caller of it.
//! After a mid-session transport loss it keeps retrying on a fixed delay,
//! reloading members and history on every successful reconnect.

use super::ChatSession;
use crate::model::{MemberDirectory, RemoteError, RemoteEvent};
use crate::remote::ChatRemote;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Status line pushed after every successful (re)connect.
pub const CONNECTED_BANNER: &str = "----- Connected -----";

/// Status line pushed when the connection is lost.
pub const RECONNECTING_BANNER: &str = "----- Reconnecting -----";

/// Where the supervisor is in the connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never connected, or the initial connect failed.
    Disconnected,
    /// First connect in progress.
    Connecting,
    /// Live: polling for events.
    Connected,
    /// Lost the connection; retrying on a fixed delay.
    Reconnecting,
}

impl ConnectionState {
    /// Short label for the status bar.
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
        }
    }
}

/// Drives a [`ChatRemote`] on behalf of a [`ChatSession`].
#[derive(Debug)]
pub struct ConnectionSupervisor<R> {
    remote: R,
    state: ConnectionState,
    reconnect_delay: Duration,
    next_attempt: Option<Instant>,
}

impl<R: ChatRemote> ConnectionSupervisor<R> {
    /// Supervisor that retries lost connections every `reconnect_delay`.
    pub fn new(remote: R, reconnect_delay: Duration) -> Self {
        Self {
            remote,
            state: ConnectionState::Disconnected,
            reconnect_delay,
            next_attempt: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The wrapped remote.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Mutable access to the wrapped remote.
    pub fn remote_mut(&mut self) -> &mut R {
        &mut self.remote
    }

    /// When the next reconnect attempt is due, while reconnecting.
    pub fn next_attempt(&self) -> Option<Instant> {
        self.next_attempt
    }

    /// Initial connect.
    ///
    /// # Errors
    ///
    /// Any failure is returned as-is and leaves the supervisor
    /// [`ConnectionState::Disconnected`]; startup treats it as fatal.
    pub fn connect(&mut self, session: &mut ChatSession) -> Result<(), RemoteError> {
        self.state = ConnectionState::Connecting;
        match self.establish(session) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.state = ConnectionState::Disconnected;
                Err(err)
            }
        }
    }

    /// Poll tick: deliver live events, or retry the connection when due.
    pub fn poll_tick(&mut self, session: &mut ChatSession, now: Instant) {
        match self.state {
            ConnectionState::Connected => self.poll_live(session, now),
            ConnectionState::Reconnecting => self.retry_if_due(session, now),
            ConnectionState::Disconnected | ConnectionState::Connecting => {}
        }
    }

    /// Post `text` to the joined channel.
    ///
    /// When not connected the message is not sent and a status line says so.
    /// A transport failure starts reconnecting.
    pub fn send(&mut self, session: &mut ChatSession, text: &str, now: Instant) {
        let channel = match (self.state, session.channel()) {
            (ConnectionState::Connected, Some(channel)) => channel.id.clone(),
            _ => {
                session.push_system_line("Not connected; message not sent");
                return;
            }
        };

        match self.remote.send_message(&channel, text, session.username()) {
            Ok(()) => debug!(channel = %channel, chars = text.chars().count(), "message sent"),
            Err(err) if err.is_transport_loss() => {
                session.push_system_line("Message not sent");
                self.begin_reconnect(session, now, &err);
            }
            Err(err) => {
                warn!(error = %err, "send failed");
                session.push_system_line(&format!("Message not sent: {err}"));
            }
        }
    }

    /// Stop polling. The session keeps its log.
    pub fn disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.next_attempt = None;
    }

    fn establish(&mut self, session: &mut ChatSession) -> Result<(), RemoteError> {
        self.remote.connect()?;
        let members = self.remote.fetch_members()?;
        let channel = self.remote.resolve_channel(session.channel_name())?;
        let history = self.remote.fetch_history(&channel.id)?;

        info!(
            channel = %channel.name,
            id = %channel.id,
            members = members.len(),
            "joined channel"
        );
        session.replace_history(MemberDirectory::from_members(members), channel, history);
        session.push_system_line(CONNECTED_BANNER);
        self.state = ConnectionState::Connected;
        self.next_attempt = None;
        Ok(())
    }

    fn poll_live(&mut self, session: &mut ChatSession, now: Instant) {
        match self.remote.poll_events() {
            Ok(events) => {
                for event in events {
                    self.deliver(session, event);
                }
            }
            Err(err) => self.begin_reconnect(session, now, &err),
        }
    }

    fn deliver(&self, session: &mut ChatSession, remote_event: RemoteEvent) {
        let joined = session.channel().map(|channel| &channel.id);
        if remote_event.channel.is_none() || remote_event.channel.as_ref() != joined {
            debug!(channel = ?remote_event.channel, "ignoring event for another channel");
            return;
        }
        match session.apply_event(&remote_event.event) {
            Ok(applied) => debug!(?applied, ts = %remote_event.event.message_ts(), "event applied"),
            Err(reason) => debug!(%reason, ts = %remote_event.event.message_ts(), "event dropped"),
        }
    }

    fn begin_reconnect(&mut self, session: &mut ChatSession, now: Instant, err: &RemoteError) {
        warn!(error = %err, "connection lost");
        self.state = ConnectionState::Reconnecting;
        self.next_attempt = Some(now);
        session.push_system_line(RECONNECTING_BANNER);
    }

    fn retry_if_due(&mut self, session: &mut ChatSession, now: Instant) {
        if self.next_attempt.is_some_and(|due| now < due) {
            return;
        }
        match self.establish(session) {
            Ok(()) => info!("reconnected"),
            Err(err) => {
                debug!(error = %err, delay = ?self.reconnect_delay, "reconnect failed");
                self.next_attempt = Some(now + self.reconnect_delay);
            }
        }
    }
}
