//! In-memory remote driven by a script of poll results.
//!
//! Used for offline runs and for exercising the supervisor without a feed.

use super::{ChannelInfo, ChatRemote};
use crate::model::{ChannelId, ChatEvent, Member, RemoteError, RemoteEvent, Timestamp};
use std::collections::VecDeque;

/// What one `poll_events` call produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Deliver these events.
    Events(Vec<RemoteEvent>),
    /// Drop the connection; the poll fails with `TransportClosed`.
    Disconnect,
}

/// A message handed to [`ChatRemote::send_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Target channel.
    pub channel: ChannelId,
    /// Message text.
    pub text: String,
    /// Name it was posted under.
    pub username: String,
}

/// Scripted in-memory remote.
#[derive(Debug, Default)]
pub struct ScriptedRemote {
    members: Vec<Member>,
    channels: Vec<ChannelInfo>,
    groups: Vec<ChannelInfo>,
    history: Vec<(ChannelId, ChatEvent)>,
    script: VecDeque<ScriptStep>,
    echoes: Vec<RemoteEvent>,
    sent: Vec<SentMessage>,
    failing_connects: usize,
    reject_auth: bool,
    connected: bool,
    connect_attempts: usize,
    clock: i64,
}

impl ScriptedRemote {
    /// Remote with no members, channels or history.
    pub fn new() -> Self {
        Self {
            clock: 1_000_000_000_000_000,
            ..Self::default()
        }
    }

    /// Add a member.
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Add a public channel.
    pub fn with_channel(mut self, channel: ChannelInfo) -> Self {
        self.channels.push(channel);
        self
    }

    /// Add a private group.
    pub fn with_group(mut self, group: ChannelInfo) -> Self {
        self.groups.push(group);
        self
    }

    /// Add a past event to `channel`'s history.
    pub fn with_history(mut self, channel: ChannelId, event: ChatEvent) -> Self {
        self.history.push((channel, event));
        self
    }

    /// Reject every connect with `AuthRejected`.
    pub fn rejecting_auth(mut self) -> Self {
        self.reject_auth = true;
        self
    }

    /// Queue a poll result.
    pub fn push_step(&mut self, step: ScriptStep) {
        self.script.push_back(step);
    }

    /// Queue a batch of events for one poll.
    pub fn push_events(&mut self, events: Vec<RemoteEvent>) {
        self.push_step(ScriptStep::Events(events));
    }

    /// Queue a connection drop.
    pub fn push_disconnect(&mut self) {
        self.push_step(ScriptStep::Disconnect);
    }

    /// Make the next `count` connect attempts fail with `TransportClosed`.
    pub fn fail_next_connects(&mut self, count: usize) {
        self.failing_connects = count;
    }

    /// Add a past event after construction (shows up on the next connect).
    pub fn add_history(&mut self, channel: ChannelId, event: ChatEvent) {
        self.history.push((channel, event));
    }

    /// Messages sent so far.
    pub fn sent(&self) -> &[SentMessage] {
        &self.sent
    }

    /// Number of connect calls, successful or not.
    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts
    }

    /// Whether the last connect succeeded and no disconnect has happened since.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn ensure_connected(&self) -> Result<(), RemoteError> {
        if self.connected {
            Ok(())
        } else {
            Err(RemoteError::TransportClosed)
        }
    }
}

impl ChatRemote for ScriptedRemote {
    fn connect(&mut self) -> Result<(), RemoteError> {
        self.connect_attempts += 1;
        if self.reject_auth {
            return Err(RemoteError::AuthRejected);
        }
        if self.failing_connects > 0 {
            self.failing_connects -= 1;
            return Err(RemoteError::TransportClosed);
        }
        self.connected = true;
        Ok(())
    }

    fn fetch_members(&mut self) -> Result<Vec<Member>, RemoteError> {
        self.ensure_connected()?;
        Ok(self.members.clone())
    }

    fn resolve_channel(&mut self, name: &str) -> Result<ChannelInfo, RemoteError> {
        self.ensure_connected()?;
        self.channels
            .iter()
            .chain(&self.groups)
            .find(|info| info.name == name)
            .cloned()
            .ok_or_else(|| RemoteError::ChannelNotFound(name.to_string()))
    }

    fn fetch_history(&mut self, channel: &ChannelId) -> Result<Vec<ChatEvent>, RemoteError> {
        self.ensure_connected()?;
        Ok(self
            .history
            .iter()
            .filter(|(id, _)| id == channel)
            .map(|(_, event)| event.clone())
            .collect())
    }

    fn poll_events(&mut self) -> Result<Vec<RemoteEvent>, RemoteError> {
        self.ensure_connected()?;
        let mut events = std::mem::take(&mut self.echoes);
        match self.script.pop_front() {
            Some(ScriptStep::Events(batch)) => events.extend(batch),
            Some(ScriptStep::Disconnect) => {
                self.connected = false;
                return Err(RemoteError::TransportClosed);
            }
            None => {}
        }
        Ok(events)
    }

    fn send_message(
        &mut self,
        channel: &ChannelId,
        text: &str,
        username: &str,
    ) -> Result<(), RemoteError> {
        self.ensure_connected()?;
        self.clock += 1;
        self.sent.push(SentMessage {
            channel: channel.clone(),
            text: text.to_string(),
            username: username.to_string(),
        });
        self.echoes.push(RemoteEvent {
            channel: Some(channel.clone()),
            event: ChatEvent::SelfAuthored {
                ts: Timestamp::from_micros(self.clock),
                username: username.to_string(),
                text: text.to_string(),
            },
        });
        Ok(())
    }
}
