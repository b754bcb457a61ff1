//! Error types for the lack application.
//!
//! This module defines a hierarchical error taxonomy using `thiserror` for structured error
//! handling. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level application error, always fatal
//!   - [`ConfigError`] - Missing or malformed configuration
//!   - [`LoggingError`] - Log file could not be set up
//!   - [`RemoteError`] - The first connection to the chat service failed
//!   - `std::io::Error` - Terminal/TUI rendering failures
//! - [`StoreError`] - Log store misuse (a programming error, never user-visible)
//! - [`DropReason`] - Why an incoming event was discarded before reaching the log
//!
//! # Error Recovery Strategy
//!
//! Incomplete events (unknown author, unresolvable mention) are **non-fatal**: they are
//! dropped at reflow and recorded at `debug` level only. A transport closure after the
//! session is up is recovered by the connection supervisor, which keeps retrying on a
//! fixed delay. Only startup failures and terminal I/O errors reach [`AppError`].

use super::identifiers::MemberId;
use super::ordering_key::OrderingKey;
pub use crate::config::ConfigError;
pub use crate::logging::LoggingError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error encompassing all fatal failure modes.
///
/// Returned from startup and from the main loop. `main` restores the terminal, prints
/// the error to stderr and exits with a non-zero status.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or is incomplete.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    /// The first connection attempt to the chat service failed.
    ///
    /// Later connection losses never surface here: they are handled by reconnecting.
    #[error("Could not connect to chat service: {0}")]
    Connect(#[from] RemoteError),

    /// Terminal or TUI rendering error.
    ///
    /// Without a working terminal the client cannot function. The terminal is restored
    /// before the error is reported.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Failures reported by the remote chat collaborator.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The transport went away (socket closed, feed removed or truncated).
    ///
    /// **Recovery**: during a session the supervisor switches to reconnecting and retries
    /// on a fixed delay. On the very first connect it is fatal.
    #[error("Connection to chat service closed")]
    TransportClosed,

    /// The service refused the configured access token.
    #[error("Access token rejected")]
    AuthRejected,

    /// No channel or private group has the configured name.
    #[error("No channel or group named {0:?}")]
    ChannelNotFound(String),

    /// The feed could not be opened.
    #[error("Feed not found: {path}")]
    FeedNotFound {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// A record could not be decoded.
    #[error("Malformed record at line {line}: {reason}")]
    Malformed {
        /// 1-based line number in the feed.
        line: usize,
        /// Decoder message.
        reason: String,
    },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    /// Whether reconnecting may clear this error.
    pub fn is_transport_loss(&self) -> bool {
        matches!(
            self,
            RemoteError::TransportClosed | RemoteError::FeedNotFound { .. } | RemoteError::Io(_)
        )
    }
}

/// Misuse of the log store.
///
/// Keys come from `OrderingKey::first`/`next`, so a duplicate means a caller bug. Callers
/// treat this as an assertion failure rather than a recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A line with this key is already stored.
    #[error("Duplicate log key {0}")]
    DuplicateKey(OrderingKey),
}

/// Why an event was discarded instead of being rendered.
///
/// Partial rendering is never shown: if any reference in an event cannot be resolved the
/// whole event is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropReason {
    /// The author is not in the member directory.
    #[error("unknown author {0}")]
    UnknownAuthor(MemberId),

    /// A `<@ID>` mention names an id that is not in the member directory.
    #[error("unresolvable mention of {0}")]
    UnknownMention(String),
}
