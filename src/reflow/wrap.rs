//! Greedy word wrap measured in terminal columns.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wrap one paragraph to `width` columns.
///
/// Continuation lines start with `subsequent_indent`, which is dropped when
/// it would leave no room for text. Whitespace is dropped at line ends and at
/// the start of continuation lines; leading whitespace of the paragraph itself
/// is kept when it fits. Words longer than a line are split. A paragraph of
/// only whitespace yields no lines.
///
/// Every line fits in `width` columns unless a single character is wider
/// than the room left after the indent.
pub fn wrap(text: &str, width: usize, subsequent_indent: &str) -> Vec<String> {
    let width = width.max(1);
    let indent = if subsequent_indent.width() >= width {
        ""
    } else {
        subsequent_indent
    };

    let mut out = LineBuilder::new(width, indent);
    for chunk in chunks(text) {
        match chunk {
            Chunk::Space(run) => out.push_space(run),
            Chunk::Word(word) => out.push_word(word),
        }
    }
    out.finish()
}

/// Width of `text` in terminal columns.
pub fn display_width(text: &str) -> usize {
    text.width()
}

/// Longest prefix of `text` that fits in `width` columns.
pub fn truncate_to_width(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (index, c) in text.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            return &text[..index];
        }
        used += w;
    }
    text
}

enum Chunk<'a> {
    Space(&'a str),
    Word(&'a str),
}

fn chunks(text: &str) -> impl Iterator<Item = Chunk<'_>> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let is_space = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() != is_space)
            .map_or(rest.len(), |(i, _)| i);
        let (chunk, tail) = rest.split_at(end);
        rest = tail;
        Some(if is_space {
            Chunk::Space(chunk)
        } else {
            Chunk::Word(chunk)
        })
    })
}

struct LineBuilder<'a> {
    width: usize,
    indent: &'a str,
    lines: Vec<String>,
    current: String,
    used: usize,
}

impl<'a> LineBuilder<'a> {
    fn new(width: usize, indent: &'a str) -> Self {
        Self {
            width,
            indent,
            lines: Vec::new(),
            current: String::new(),
            used: 0,
        }
    }

    fn first_line(&self) -> bool {
        self.lines.is_empty()
    }

    fn room(&self) -> usize {
        let indent = if self.first_line() {
            0
        } else {
            self.indent.width()
        };
        self.width - indent
    }

    fn push_space(&mut self, run: &str) {
        if self.used == 0 {
            // Paragraph indentation survives only on the first line.
            if !self.first_line() || !self.current.is_empty() {
                return;
            }
            let cols = run.chars().count();
            if cols < self.room() {
                self.current.extend(std::iter::repeat(' ').take(cols));
                self.used = cols;
            }
            return;
        }

        let cols = run.chars().count();
        if self.used + cols <= self.room() {
            self.current.extend(std::iter::repeat(' ').take(cols));
            self.used += cols;
        } else {
            self.flush();
        }
    }

    fn push_word(&mut self, word: &str) {
        let cols = word.width();
        if self.used + cols <= self.room() {
            self.append(word, cols);
            return;
        }

        // Too long for even a fresh continuation line: split it here.
        if cols > self.continuation_room() {
            self.split_long_word(word);
            return;
        }

        self.flush();
        self.append(word, cols);
    }

    fn continuation_room(&self) -> usize {
        self.width - self.indent.width()
    }

    fn split_long_word(&mut self, word: &str) {
        let mut rest = word;
        while !rest.is_empty() {
            let space = self.room().saturating_sub(self.used);
            let mut piece = truncate_to_width(rest, space);
            if piece.is_empty() {
                if self.used > 0 {
                    self.flush();
                    continue;
                }
                // A character wider than the whole line goes on a line of its own.
                let end = rest.chars().next().map_or(rest.len(), char::len_utf8);
                piece = &rest[..end];
            }
            self.append(piece, piece.width());
            rest = &rest[piece.len()..];
            if !rest.is_empty() {
                self.flush();
            }
        }
    }

    fn append(&mut self, text: &str, cols: usize) {
        self.current.push_str(text);
        self.used += cols;
    }

    fn flush(&mut self) {
        let content = self.current.trim_end();
        if !content.trim_start().is_empty() {
            let indent = if self.first_line() { "" } else { self.indent };
            self.lines.push(format!("{indent}{content}"));
        }
        self.current.clear();
        self.used = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.lines
    }
}
