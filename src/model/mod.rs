//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod event;
pub mod identifiers;
pub mod key_action;
pub mod log_line;
pub mod member;
pub mod ordering_key;

// Re-export for convenience
pub use error::{AppError, DropReason, RemoteError, StoreError};
pub use event::{ChatEvent, RemoteEvent};
pub use identifiers::{ChannelId, InvalidChannelId, InvalidMemberId, MemberId};
pub use key_action::KeyAction;
pub use log_line::{LineColor, LogLine};
pub use member::{Member, MemberDirectory, MemberProfile};
pub use ordering_key::{InvalidTimestamp, OrderingKey, Timestamp};
