//! Display-ready log rows.

use super::ordering_key::OrderingKey;

/// Terminal palette index used to color a log line.
///
/// Member colors cycle through [`LineColor::MEMBER_PALETTE`]. Two indices are
/// reserved: [`LineColor::SYSTEM`] for connection notices and errors, and
/// [`LineColor::SELF_AUTHORED`] for messages posted by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineColor(u8);

impl LineColor {
    /// Reserved for system lines (connection state, errors).
    pub const SYSTEM: LineColor = LineColor(6);

    /// Reserved for messages posted by this client.
    pub const SELF_AUTHORED: LineColor = LineColor(14);

    /// Colors handed out to channel members, in assignment order.
    pub const MEMBER_PALETTE: [LineColor; 12] = [
        LineColor(1),
        LineColor(2),
        LineColor(3),
        LineColor(4),
        LineColor(5),
        LineColor(7),
        LineColor(8),
        LineColor(9),
        LineColor(10),
        LineColor(11),
        LineColor(12),
        LineColor(13),
    ];

    /// Palette color for the member at `index` in directory order.
    pub fn for_member(index: usize) -> Self {
        Self::MEMBER_PALETTE[index % Self::MEMBER_PALETTE.len()]
    }

    /// Raw palette index.
    pub fn index(self) -> u8 {
        self.0
    }
}

/// A single pre-wrapped, display-ready row of the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Position of this row in the log.
    pub key: OrderingKey,
    /// Foreground color.
    pub color: LineColor,
    /// Row text, already wrapped to the log width.
    pub text: String,
}

impl LogLine {
    /// Create a new log line.
    pub fn new(key: OrderingKey, color: LineColor, text: impl Into<String>) -> Self {
        Self {
            key,
            color,
            text: text.into(),
        }
    }
}
