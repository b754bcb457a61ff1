//! Chat session state: the log and everything needed to grow and show it.
//!
//! [`ChatSession`] owns the [`LogStore`] and is its only writer. Events
//! enter through [`ChatSession::apply_event`]; the render tick reads the
//! visible slice and the scrollbar thumb.

pub mod supervisor;

pub use supervisor::{ConnectionState, ConnectionSupervisor};

use crate::config::SessionSettings;
use crate::model::{ChatEvent, DropReason, KeyAction, LogLine, MemberDirectory, Timestamp};
use crate::reflow::LineReflow;
use crate::remote::ChannelInfo;
use crate::state::{Composer, LogStore};
use crate::view_state::{thumb, Thumb, Viewport};
use tracing::{debug, error, info};

/// Wrap width used until the terminal reports its size.
pub const DEFAULT_WIDTH: usize = 80;

/// What [`ChatSession::apply_event`] did to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A new message was added as this many physical lines.
    Inserted(usize),
    /// An edited message now occupies this many physical lines.
    Replaced(usize),
    /// This many physical lines of a deleted message were removed.
    Removed(usize),
    /// The message was already in the log; nothing changed.
    Redelivered,
    /// The edit or delete targets a message the log does not hold.
    TargetMissing,
}

/// Everything one channel session owns.
#[derive(Debug)]
pub struct ChatSession {
    store: LogStore,
    directory: MemberDirectory,
    reflow: LineReflow,
    viewport: Viewport,
    composer: Composer,
    channel_name: String,
    channel: Option<ChannelInfo>,
    username: String,
}

impl ChatSession {
    /// Session for `channel_name`, posting as `username`.
    pub fn new(
        channel_name: impl Into<String>,
        username: impl Into<String>,
        reflow: LineReflow,
    ) -> Self {
        Self {
            store: LogStore::new(),
            directory: MemberDirectory::new(),
            reflow,
            viewport: Viewport::new(0),
            composer: Composer::default(),
            channel_name: channel_name.into(),
            channel: None,
            username: username.into(),
        }
    }

    /// Session configured from validated settings.
    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self::new(
            settings.channel.clone(),
            settings.username.clone(),
            LineReflow::new(DEFAULT_WIDTH, settings.timezone),
        )
    }

    /// Apply one event to the log.
    ///
    /// A `Create` or `SelfAuthored` for a message already present is a
    /// redelivery and is ignored. An `Edit` rewrites every physical line of
    /// its target; a `Delete` removes them all.
    ///
    /// # Errors
    ///
    /// Returns the [`DropReason`] when the event cannot be rendered; the log
    /// is unchanged.
    pub fn apply_event(&mut self, event: &ChatEvent) -> Result<Applied, DropReason> {
        match event {
            ChatEvent::Delete { target_ts } => {
                let removed = self.store.delete_message(*target_ts);
                Ok(if removed == 0 {
                    Applied::TargetMissing
                } else {
                    Applied::Removed(removed)
                })
            }
            ChatEvent::Edit { target_ts, .. } => {
                if !self.store.has_message(*target_ts) {
                    return Ok(Applied::TargetMissing);
                }
                let lines = self.reflow.reflow(event, &self.directory)?;
                let count = lines.len();
                if self.store.replace_message(*target_ts, lines) {
                    Ok(Applied::Replaced(count))
                } else {
                    Ok(Applied::TargetMissing)
                }
            }
            ChatEvent::Create { .. } | ChatEvent::SelfAuthored { .. } => {
                let ts = event.message_ts();
                if self.store.has_message(ts) {
                    debug!(%ts, "ignoring redelivered message");
                    return Ok(Applied::Redelivered);
                }
                let lines = self.reflow.reflow(event, &self.directory)?;
                let count = lines.len();
                for line in lines {
                    self.insert_line(line);
                }
                Ok(Applied::Inserted(count))
            }
        }
    }

    /// Start over from `history` after a (re)connect.
    ///
    /// Installs the fresh directory and channel, clears the log, then
    /// applies `history` oldest first through [`Self::apply_event`].
    pub fn replace_history(
        &mut self,
        directory: MemberDirectory,
        channel: ChannelInfo,
        history: Vec<ChatEvent>,
    ) {
        self.directory = directory;
        self.channel = Some(channel);
        self.store.clear();

        let mut dropped = 0usize;
        for event in &history {
            if let Err(reason) = self.apply_event(event) {
                dropped += 1;
                debug!(%reason, ts = %event.message_ts(), "dropped history event");
            }
        }

        info!(
            events = history.len(),
            dropped,
            lines = self.store.len(),
            members = self.directory.len(),
            "history loaded"
        );
    }

    /// Append a status line stamped with the current time.
    pub fn push_system_line(&mut self, text: &str) {
        self.push_system_line_at(Timestamp::now(), text);
    }

    /// Append a status line at `now`, after any message with that timestamp.
    pub fn push_system_line_at(&mut self, now: Timestamp, text: &str) {
        let key = self.store.fresh_key(now);
        for line in self.reflow.system(key, text) {
            self.insert_line(line);
        }
    }

    /// Record the size of the log text area.
    ///
    /// `width` applies to lines rendered from now on; stored lines keep
    /// their wrapping.
    pub fn set_log_area(&mut self, width: usize, height: usize) {
        if width != self.reflow.width() {
            debug!(width, "reflow width changed");
            self.reflow.set_width(width);
        }
        if height != self.viewport.height() {
            self.viewport.set_height(height);
        }
    }

    /// Render-tick hook: tail-follow when the log changed length.
    pub fn on_render_tick(&mut self) {
        self.viewport.on_tick(self.store.len());
    }

    /// Lines currently in view.
    pub fn visible_lines(&self) -> &[LogLine] {
        let range = self.viewport.visible_range(self.store.len());
        self.store.range(range.start, range.end)
    }

    /// Scrollbar thumb for the current view, if any.
    pub fn thumb(&self) -> Option<Thumb> {
        thumb(
            self.store.len(),
            self.viewport.height(),
            self.viewport.topline(),
        )
    }

    /// Apply a scrolling action. Returns `false` for non-scroll actions.
    pub fn scroll(&mut self, action: KeyAction) -> bool {
        let len = self.store.len();
        match action {
            KeyAction::ScrollUp => self.viewport.scroll_up(),
            KeyAction::ScrollDown => self.viewport.scroll_down(len),
            KeyAction::PageUp => self.viewport.page_up(),
            KeyAction::PageDown => self.viewport.page_down(len),
            KeyAction::ScrollToTop => self.viewport.scroll_to_top(),
            KeyAction::ScrollToBottom => self.viewport.scroll_to_bottom(len),
            _ => return false,
        }
        true
    }

    /// The log.
    pub fn store(&self) -> &LogStore {
        &self.store
    }

    /// Current member directory.
    pub fn directory(&self) -> &MemberDirectory {
        &self.directory
    }

    /// Scroll position.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Reflow settings.
    pub fn reflow(&self) -> &LineReflow {
        &self.reflow
    }

    /// Line being composed.
    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Mutable access to the line being composed.
    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    /// Configured channel name.
    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// The joined channel, once connected.
    pub fn channel(&self) -> Option<&ChannelInfo> {
        self.channel.as_ref()
    }

    /// Name outgoing messages are posted under.
    pub fn username(&self) -> &str {
        &self.username
    }

    fn insert_line(&mut self, line: LogLine) {
        let result = self.store.insert(line);
        debug_assert!(result.is_ok(), "log key collision: {result:?}");
        if let Err(err) = result {
            error!(%err, "log store rejected a line");
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
