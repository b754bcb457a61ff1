//! The remote chat service, seen from the client.
//!
//! [`ChatRemote`] is the seam between the session and whatever delivers
//! messages. [`FeedRemote`] talks to a JSONL journal file;
//! [`ScriptedRemote`] is an in-memory stand-in.

pub mod feed;
pub mod scripted;
pub mod wire;

pub use feed::FeedRemote;
pub use scripted::ScriptedRemote;

use crate::model::{ChannelId, ChatEvent, Member, RemoteError, RemoteEvent};

/// A channel or private group the client can join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Service-side id.
    pub id: ChannelId,
    /// Name without the leading `#`.
    pub name: String,
    /// Current topic, possibly empty.
    pub topic: String,
}

/// Operations the session needs from the chat service.
///
/// All calls are expected to return promptly; `poll_events` in particular
/// must not block waiting for new events.
pub trait ChatRemote {
    /// Open (or reopen) the connection.
    ///
    /// # Errors
    ///
    /// [`RemoteError::AuthRejected`] for a bad token, or a transport error.
    fn connect(&mut self) -> Result<(), RemoteError>;

    /// Every member of the workspace, in service order.
    ///
    /// # Errors
    ///
    /// Transport errors.
    fn fetch_members(&mut self) -> Result<Vec<Member>, RemoteError>;

    /// Find a conversation by name, trying public channels before private
    /// groups.
    ///
    /// # Errors
    ///
    /// [`RemoteError::ChannelNotFound`] when neither matches.
    fn resolve_channel(&mut self, name: &str) -> Result<ChannelInfo, RemoteError>;

    /// Past events of `channel`, oldest first.
    ///
    /// # Errors
    ///
    /// Transport errors.
    fn fetch_history(&mut self, channel: &ChannelId) -> Result<Vec<ChatEvent>, RemoteError>;

    /// Events that arrived since the last call, in arrival order.
    ///
    /// # Errors
    ///
    /// [`RemoteError::TransportClosed`] when the connection is gone.
    fn poll_events(&mut self) -> Result<Vec<RemoteEvent>, RemoteError>;

    /// Post `text` to `channel` under `username`.
    ///
    /// # Errors
    ///
    /// Transport errors.
    fn send_message(
        &mut self,
        channel: &ChannelId,
        text: &str,
        username: &str,
    ) -> Result<(), RemoteError>;
}
