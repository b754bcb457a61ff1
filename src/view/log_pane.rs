//! Log pane widget: visible lines plus a one-column scrollbar.

use super::styles;
use crate::model::LogLine;
use crate::reflow::wrap::truncate_to_width;
use crate::view_state::Thumb;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Scrollbar track glyph.
pub const TRACK_SYMBOL: &str = "│";

/// Scrollbar thumb glyph.
pub const THUMB_SYMBOL: &str = "█";

/// Renders the visible slice of the log.
///
/// The rightmost column of the area holds the scrollbar; the text area is
/// everything to its left. Lines are truncated, never wrapped again here.
#[derive(Debug, Clone, Copy)]
pub struct LogPane<'a> {
    lines: &'a [LogLine],
    thumb: Option<Thumb>,
}

impl<'a> LogPane<'a> {
    /// Widget for `lines` (already sliced to the viewport) and `thumb`.
    pub fn new(lines: &'a [LogLine], thumb: Option<Thumb>) -> Self {
        Self { lines, thumb }
    }
}

impl Widget for LogPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let text_width = usize::from(area.width - 1);

        for (row, line) in self.lines.iter().take(usize::from(area.height)).enumerate() {
            let y = area.y + row as u16;
            let text = truncate_to_width(&line.text, text_width);
            buf.set_stringn(area.x, y, text, text_width, styles::line_style(line.color));
        }

        let Some(thumb) = self.thumb else {
            return;
        };
        let x = area.right() - 1;
        for row in 0..area.height {
            let slot = usize::from(row) + 1;
            let (symbol, style) = if slot >= thumb.position && slot < thumb.position + thumb.length {
                (THUMB_SYMBOL, styles::THUMB)
            } else {
                (TRACK_SYMBOL, styles::TRACK)
            };
            buf[(x, area.y + row)].set_symbol(symbol).set_style(style);
        }
    }
}
