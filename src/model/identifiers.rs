//! Identifier newtypes with smart constructors.
//!
//! All identifiers validate non-empty strings at construction time.

use std::fmt;

/// Remote id of a channel member (e.g. `"U024BE7LH"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(String);

impl MemberId {
    /// Smart constructor: validates a non-empty id.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidMemberId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidMemberId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote id of a channel or private group (e.g. `"C024BE91L"`, `"G0KX7ZP4A"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    /// Smart constructor: validates a non-empty id.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidChannelId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidChannelId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ===== Error Types =====

/// Rejected member id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMemberId {
    /// The id was the empty string.
    #[error("Member ID cannot be empty")]
    Empty,
}

/// Rejected channel id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidChannelId {
    /// The id was the empty string.
    #[error("Channel ID cannot be empty")]
    Empty,
}
