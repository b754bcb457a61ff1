//! Scroll position of the log pane.

use super::visible_range::VisibleRange;

/// Which contiguous slice of the log is on screen.
///
/// Mutated by user scrolling and by the render tick's tail-follow check,
/// never by ingestion.
///
/// # Tail-follow
/// When the log length changes between render ticks and the log no longer
/// fits, the view jumps to the newest lines. A user who scrolled up keeps
/// their position for as long as the log stays the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    topline: usize,
    height: usize,
    last_length: usize,
}

impl Viewport {
    /// Viewport showing `height` lines, starting at the top.
    pub fn new(height: usize) -> Self {
        Self {
            topline: 0,
            height,
            last_length: 0,
        }
    }

    /// Position of the first visible line.
    pub fn topline(&self) -> usize {
        self.topline
    }

    /// Number of lines the viewport shows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Log length seen at the previous render tick.
    pub fn last_length(&self) -> usize {
        self.last_length
    }

    /// Change the viewport height (terminal resize).
    ///
    /// Keeps the bottom of the log pinned when the view was already there.
    pub fn set_height(&mut self, height: usize) {
        let was_at_bottom = self.topline >= self.max_topline(self.last_length);
        self.height = height;
        if was_at_bottom {
            self.topline = self.max_topline(self.last_length);
        } else {
            self.topline = self.topline.min(self.max_topline(self.last_length));
        }
    }

    /// Move up one line, stopping at the top.
    pub fn scroll_up(&mut self) {
        self.topline = self.topline.saturating_sub(1);
    }

    /// Move down one line, stopping when the last line is at the bottom.
    pub fn scroll_down(&mut self, store_length: usize) {
        self.topline = (self.topline + 1).min(self.max_topline(store_length));
    }

    /// Move up one viewport height.
    pub fn page_up(&mut self) {
        self.topline = self.topline.saturating_sub(self.height.max(1));
    }

    /// Move down one viewport height.
    pub fn page_down(&mut self, store_length: usize) {
        self.topline = (self.topline + self.height.max(1)).min(self.max_topline(store_length));
    }

    /// Jump to the oldest line.
    pub fn scroll_to_top(&mut self) {
        self.topline = 0;
    }

    /// Jump so the newest line is at the bottom.
    pub fn scroll_to_bottom(&mut self, store_length: usize) {
        self.topline = self.max_topline(store_length);
    }

    /// Render-tick hook: follow the tail when the log length changed.
    ///
    /// A log that shrank below the current position is clamped so the view
    /// never points past the end.
    pub fn on_tick(&mut self, store_length: usize) {
        if store_length != self.last_length && store_length > self.height {
            self.topline = store_length - self.height;
        }
        self.topline = self.topline.min(self.max_topline(store_length));
        self.last_length = store_length;
    }

    /// Lines to draw: `[topline, min(topline + height, store_length))`.
    pub fn visible_range(&self, store_length: usize) -> VisibleRange {
        let end = (self.topline + self.height).min(store_length);
        VisibleRange::new(self.topline.min(end), end)
    }

    fn max_topline(&self, store_length: usize) -> usize {
        store_length.saturating_sub(self.height)
    }
}
