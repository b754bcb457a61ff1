//! Mutable client state (pure core).
//!
//! The log store and the composer. Neither touches the terminal or the
//! network; the session and scheduler drive them.

pub mod composer;
pub mod log_store;

pub use composer::Composer;
pub use log_store::LogStore;
