//! Decoding of JSON feed records.
//!
//! Message records follow the shape of the chat service's real-time
//! messages:
//!
//! | Record | Event |
//! |---|---|
//! | `{"type":"message","user","text","ts"}` | `Create` |
//! | `{"type":"message","message":{"user","text","ts"}}` | `Edit` |
//! | `{"type":"message","deleted_ts"}` | `Delete` |
//! | `{"type":"message","username","text","ts"}` (no `user`) | `SelfAuthored` |
//!
//! Directory records describe the workspace: `auth`, `member`, `channel`
//! and `group`. Any other `type` is ignored.

use super::ChannelInfo;
use crate::model::{
    ChannelId, ChatEvent, InvalidTimestamp, Member, MemberId, RemoteEvent, Timestamp,
};
use serde::Deserialize;
use thiserror::Error;

/// Why a record could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not a JSON object of the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The line is not UTF-8 text.
    #[error("not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A field the record type needs is absent or empty.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present but its value is not acceptable.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A `ts`-like field is not `<secs>.<micros>`.
    #[error(transparent)]
    Timestamp(#[from] InvalidTimestamp),
}

/// Whether a conversation is public or private.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Public channel.
    Channel,
    /// Private group.
    Group,
}

/// One decoded feed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedRecord {
    /// Token the feed expects clients to present.
    Auth {
        /// Expected token.
        token: String,
    },
    /// A workspace member.
    Member(Member),
    /// A channel or private group.
    Channel(ChannelKind, ChannelInfo),
    /// A change to some channel's log.
    Message(RemoteEvent),
    /// A record type this client does not use.
    Ignored,
}

#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(rename = "type")]
    kind: Option<String>,
    channel: Option<String>,
    user: Option<String>,
    username: Option<String>,
    text: Option<String>,
    ts: Option<String>,
    deleted_ts: Option<String>,
    message: Option<RawEdited>,
    token: Option<String>,
    id: Option<String>,
    name: Option<String>,
    topic: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEdited {
    user: Option<String>,
    text: Option<String>,
    ts: Option<String>,
}

impl DecodeError {
    /// Whether the line could not be read as a record at all, as opposed to
    /// a well-formed record that lacks something.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, DecodeError::Json(_) | DecodeError::Utf8(_))
    }
}

/// Decode one raw line of the feed, without its line terminator.
///
/// # Errors
///
/// Fails on bytes that are not UTF-8, and otherwise as [`decode_record`].
pub fn decode_line(line: &[u8]) -> Result<FeedRecord, DecodeError> {
    decode_record(std::str::from_utf8(line)?)
}

/// Decode one line of the feed.
///
/// # Errors
///
/// Fails on invalid JSON and on known record types missing required fields.
pub fn decode_record(line: &str) -> Result<FeedRecord, DecodeError> {
    let raw: RawRecord = serde_json::from_str(line)?;
    match raw.kind.as_deref() {
        Some("message") => decode_message(raw).map(FeedRecord::Message),
        Some("auth") => Ok(FeedRecord::Auth {
            token: required(raw.token, "token")?,
        }),
        Some("member") => {
            let id = member_id(raw.id, "id")?;
            Ok(FeedRecord::Member(Member::new(id, required(raw.name, "name")?)))
        }
        Some(kind @ ("channel" | "group")) => {
            let info = ChannelInfo {
                id: channel_id(raw.id)?,
                name: required(raw.name, "name")?,
                topic: raw.topic.unwrap_or_default(),
            };
            let kind = if kind == "channel" {
                ChannelKind::Channel
            } else {
                ChannelKind::Group
            };
            Ok(FeedRecord::Channel(kind, info))
        }
        _ => Ok(FeedRecord::Ignored),
    }
}

fn decode_message(raw: RawRecord) -> Result<RemoteEvent, DecodeError> {
    let channel = raw.channel.and_then(|c| ChannelId::new(c).ok());

    let event = if let Some(edited) = raw.message {
        ChatEvent::Edit {
            target_ts: timestamp(edited.ts, "message.ts")?,
            author: member_id(edited.user, "message.user")?,
            text: required(edited.text, "message.text")?,
        }
    } else if let Some(deleted) = raw.deleted_ts {
        ChatEvent::Delete {
            target_ts: deleted.parse()?,
        }
    } else if raw.user.is_some() {
        ChatEvent::Create {
            ts: timestamp(raw.ts, "ts")?,
            author: member_id(raw.user, "user")?,
            text: required(raw.text, "text")?,
        }
    } else {
        ChatEvent::SelfAuthored {
            ts: timestamp(raw.ts, "ts")?,
            username: required(raw.username, "username")?,
            text: required(raw.text, "text")?,
        }
    };

    Ok(RemoteEvent { channel, event })
}

/// Encode a message posted by this client, as the service would echo it.
pub fn encode_self_message(
    channel: &ChannelId,
    ts: Timestamp,
    username: &str,
    text: &str,
) -> String {
    serde_json::json!({
        "type": "message",
        "channel": channel.as_str(),
        "username": username,
        "text": text,
        "ts": ts.to_string(),
    })
    .to_string()
}

fn required(value: Option<String>, field: &'static str) -> Result<String, DecodeError> {
    value.ok_or(DecodeError::MissingField(field))
}

fn timestamp(value: Option<String>, field: &'static str) -> Result<Timestamp, DecodeError> {
    Ok(required(value, field)?.parse()?)
}

fn invalid(field: &'static str, err: impl std::fmt::Display) -> DecodeError {
    DecodeError::InvalidField {
        field,
        reason: err.to_string(),
    }
}

fn member_id(value: Option<String>, field: &'static str) -> Result<MemberId, DecodeError> {
    MemberId::new(required(value, field)?).map_err(|err| invalid(field, err))
}

fn channel_id(value: Option<String>) -> Result<ChannelId, DecodeError> {
    ChannelId::new(required(value, "id")?).map_err(|err| invalid("id", err))
}
