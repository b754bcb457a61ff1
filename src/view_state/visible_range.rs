//! Visible range calculation result

use std::ops::Range;

/// Positions of the log lines visible in the viewport.
///
/// Half-open `[start, end)` over the store's sorted order.
///
/// # Invariants
/// - `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibleRange {
    /// Position of the first visible line (inclusive).
    pub start: usize,
    /// Position one past the last visible line (exclusive).
    pub end: usize,
}

impl VisibleRange {
    /// Create new visible range.
    ///
    /// # Panics
    /// In debug builds, panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "start {start} > end {end}");
        Self { start, end }
    }

    /// Number of visible lines.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if range is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if a specific position is visible.
    pub fn contains(&self, position: usize) -> bool {
        (self.start..self.end).contains(&position)
    }

    /// As a standard range.
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}
