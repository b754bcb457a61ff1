//! Chat events delivered by the remote collaborator.

use super::identifiers::{ChannelId, MemberId};
use super::ordering_key::Timestamp;

/// One change to the channel's message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A new message from a channel member.
    Create {
        /// Message timestamp, also its identity.
        ts: Timestamp,
        /// Author member id.
        author: MemberId,
        /// Raw message text (HTML-escaped, may contain mention tokens).
        text: String,
    },
    /// A member changed the text of an earlier message.
    Edit {
        /// Timestamp of the message being edited.
        target_ts: Timestamp,
        /// Author member id.
        author: MemberId,
        /// Replacement text.
        text: String,
    },
    /// An earlier message was removed.
    Delete {
        /// Timestamp of the message being removed.
        target_ts: Timestamp,
    },
    /// A message posted by this client, echoed back by the service.
    SelfAuthored {
        /// Message timestamp.
        ts: Timestamp,
        /// Display name the message was posted under.
        username: String,
        /// Raw message text.
        text: String,
    },
}

impl ChatEvent {
    /// Timestamp of the logical message this event creates or targets.
    pub fn message_ts(&self) -> Timestamp {
        match self {
            ChatEvent::Create { ts, .. } | ChatEvent::SelfAuthored { ts, .. } => *ts,
            ChatEvent::Edit { target_ts, .. } | ChatEvent::Delete { target_ts } => *target_ts,
        }
    }
}

/// An event together with the channel it was posted to, as read live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEvent {
    /// Channel the event belongs to; `None` when the service omitted it.
    pub channel: Option<ChannelId>,
    /// The event itself.
    pub event: ChatEvent,
}
