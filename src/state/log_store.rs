//! Ordered store of display-ready log lines.
//!
//! Lines are kept in a vector sorted by [`OrderingKey`]. Chat traffic is
//! overwhelmingly appended at the tail, so inserts are amortized O(1) in
//! practice, and the render path gets positional slices without walking a
//! tree.

use crate::model::{LogLine, OrderingKey, StoreError, Timestamp};
use std::ops::Range;

#[cfg(test)]
#[path = "log_store_tests.rs"]
mod tests;

/// Ordered associative container of `OrderingKey -> LogLine`.
///
/// # Invariants
/// - Lines are strictly increasing by key (no two share a key).
/// - Positional indices refer to this sorted order.
#[derive(Debug, Clone, Default)]
pub struct LogStore {
    lines: Vec<LogLine>,
}

impl LogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a line under its own key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] if a line with that key is already present;
    /// the store is left unchanged.
    pub fn insert(&mut self, line: LogLine) -> Result<(), StoreError> {
        // Fast path: appending after the newest line.
        if self.lines.last().map_or(true, |last| last.key < line.key) {
            self.lines.push(line);
            return Ok(());
        }

        match self.position(line.key) {
            Ok(_) => Err(StoreError::DuplicateKey(line.key)),
            Err(index) => {
                self.lines.insert(index, line);
                Ok(())
            }
        }
    }

    /// Replace the line stored at `key`, keeping the key.
    ///
    /// Returns `false` (and changes nothing) when no line has that key.
    pub fn edit(&mut self, key: OrderingKey, line: LogLine) -> bool {
        match self.position(key) {
            Ok(index) => {
                let slot = &mut self.lines[index];
                slot.color = line.color;
                slot.text = line.text;
                true
            }
            Err(_) => false,
        }
    }

    /// Remove the line stored at `key`.
    ///
    /// Returns `false` when no line has that key.
    pub fn delete(&mut self, key: OrderingKey) -> bool {
        match self.position(key) {
            Ok(index) => {
                self.lines.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    /// Lines at sorted positions `[from, to)`, clipped to the store bounds.
    pub fn range(&self, from: usize, to: usize) -> &[LogLine] {
        let end = to.min(self.lines.len());
        let start = from.min(end);
        &self.lines[start..end]
    }

    /// Number of stored lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the store holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Whether a line with `key` is stored.
    pub fn contains(&self, key: OrderingKey) -> bool {
        self.position(key).is_ok()
    }

    /// The line stored at `key`.
    pub fn get(&self, key: OrderingKey) -> Option<&LogLine> {
        self.position(key).ok().map(|index| &self.lines[index])
    }

    /// All lines in order.
    pub fn iter(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    /// Whether any physical line of the message at `primary` is stored.
    pub fn has_message(&self, primary: Timestamp) -> bool {
        !self.message_span(primary).is_empty()
    }

    /// Remove every physical line of the message at `primary`.
    ///
    /// Returns the number of lines removed.
    pub fn delete_message(&mut self, primary: Timestamp) -> usize {
        let span = self.message_span(primary);
        let removed = span.len();
        self.lines.drain(span);
        removed
    }

    /// Replace every physical line of the message at `primary` with `lines`.
    ///
    /// The message must already be present (its first line is stored);
    /// otherwise nothing changes and `false` is returned. All replacement
    /// lines must share `primary`.
    pub fn replace_message(&mut self, primary: Timestamp, lines: Vec<LogLine>) -> bool {
        if !self.contains(OrderingKey::first(primary)) {
            return false;
        }
        debug_assert!(lines.iter().all(|line| line.key.primary() == primary));

        let span = self.message_span(primary);
        let _ = self.lines.splice(span, lines);
        true
    }

    /// Next free status-line key at `ts`.
    ///
    /// Status lines live in their own sequence range, so they never collide
    /// with a remote message at the same timestamp. Several status lines at
    /// one instant follow each other.
    pub fn fresh_key(&self, ts: Timestamp) -> OrderingKey {
        let end = self.lines.partition_point(|line| line.key.primary() <= ts);
        match end.checked_sub(1).map(|index| self.lines[index].key) {
            Some(last) if last.primary() == ts && last.is_system() => last.next(),
            _ => OrderingKey::system(ts),
        }
    }

    fn position(&self, key: OrderingKey) -> Result<usize, usize> {
        self.lines.binary_search_by(|line| line.key.cmp(&key))
    }

    /// Positions of the message lines at `primary`, excluding status lines.
    fn message_span(&self, primary: Timestamp) -> Range<usize> {
        let first = OrderingKey::first(primary);
        let system = OrderingKey::system(primary);
        let start = self.lines.partition_point(|line| line.key < first);
        let end = self.lines.partition_point(|line| line.key < system);
        start..end
    }
}
