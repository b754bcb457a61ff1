//! Turning chat events into display-ready log lines.
//!
//! One logical message becomes one or more physical [`LogLine`]s: the author
//! and every mention are resolved against the [`MemberDirectory`], HTML
//! references are decoded, a `"<Weekday> <hh:mm><am|pm> <author>: "` prefix
//! is added, and each newline-separated paragraph is word-wrapped with a
//! hanging indent the width of the prefix.
//!
//! Keys are `first(ts)`, `next(first(ts))`, ... in display order, so every
//! physical line of a message shares its timestamp and edits land on the
//! same keys.

pub mod entities;
pub mod wrap;

use crate::config::TimeZoneSetting;
use crate::model::{
    ChatEvent, DropReason, LineColor, LogLine, MemberDirectory, MemberId, MemberProfile,
    OrderingKey,
};
use regex::Regex;
use std::sync::LazyLock;

/// `<@U123>` or `<@U123|label>`. The id is anything a member id may be,
/// up to the label bar or the closing bracket.
static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<@([^>|]+)(?:\|[^>]*)?>").expect("mention pattern is valid")
});

/// Appended to the text of edited messages.
pub const EDITED_SUFFIX: &str = " (edited)";

/// Reflow settings: wrap width and display timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineReflow {
    width: usize,
    timezone: TimeZoneSetting,
}

impl LineReflow {
    /// Reflow to `width` columns with timestamps shown in `timezone`.
    pub fn new(width: usize, timezone: TimeZoneSetting) -> Self {
        Self { width, timezone }
    }

    /// Current wrap width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Change the wrap width. Lines already stored are not rewrapped.
    pub fn set_width(&mut self, width: usize) {
        self.width = width;
    }

    /// Display timezone.
    pub fn timezone(&self) -> TimeZoneSetting {
        self.timezone
    }

    /// Render `event` as physical lines.
    ///
    /// `Delete` yields no lines; the caller removes the target message.
    ///
    /// # Errors
    ///
    /// The whole event is dropped when its author or any mentioned member is
    /// missing from `directory`.
    pub fn reflow(
        &self,
        event: &ChatEvent,
        directory: &MemberDirectory,
    ) -> Result<Vec<LogLine>, DropReason> {
        match event {
            ChatEvent::Create { ts, author, text } => {
                let profile = lookup_author(directory, author)?;
                let text = resolve_text(text, directory)?;
                Ok(self.render(
                    OrderingKey::first(*ts),
                    Some(profile.display_name.as_str()),
                    profile.color,
                    &text,
                ))
            }
            ChatEvent::Edit {
                target_ts,
                author,
                text,
            } => {
                let profile = lookup_author(directory, author)?;
                let mut text = resolve_text(text, directory)?;
                text.push_str(EDITED_SUFFIX);
                Ok(self.render(
                    OrderingKey::first(*target_ts),
                    Some(profile.display_name.as_str()),
                    profile.color,
                    &text,
                ))
            }
            ChatEvent::SelfAuthored { ts, username, text } => {
                let text = resolve_text(text, directory)?;
                Ok(self.render(
                    OrderingKey::first(*ts),
                    Some(username.as_str()),
                    LineColor::SELF_AUTHORED,
                    &text,
                ))
            }
            ChatEvent::Delete { .. } => Ok(Vec::new()),
        }
    }

    /// Render a client-generated status line (no author, system color)
    /// whose first physical line takes `first`.
    ///
    /// The text is used verbatim: no reference decoding or mention lookup.
    pub fn system(&self, first: OrderingKey, text: &str) -> Vec<LogLine> {
        self.render(first, None, LineColor::SYSTEM, text)
    }

    fn render(
        &self,
        first: OrderingKey,
        author: Option<&str>,
        color: LineColor,
        text: &str,
    ) -> Vec<LogLine> {
        let date = self.timezone.format_prefix(first.primary());
        let prefix = match author {
            Some(name) => format!("{date} {name}: "),
            None => format!("{date} "),
        };
        let pad = " ".repeat(wrap::display_width(&prefix));

        let mut lines: Vec<LogLine> = Vec::new();
        for (index, paragraph) in text.split('\n').enumerate() {
            let paragraph = paragraph.trim_end_matches('\r');
            let lead = if index == 0 { &prefix } else { &pad };
            for row in wrap::wrap(&format!("{lead}{paragraph}"), self.width, &pad) {
                let key = lines
                    .last()
                    .map_or(first, |prev| prev.key.next());
                lines.push(LogLine::new(key, color, row));
            }
        }
        lines
    }
}

fn lookup_author<'d>(
    directory: &'d MemberDirectory,
    author: &MemberId,
) -> Result<&'d MemberProfile, DropReason> {
    directory
        .get(author)
        .ok_or_else(|| DropReason::UnknownAuthor(author.clone()))
}

/// Decode references, then replace every mention with `@name`.
fn resolve_text(raw: &str, directory: &MemberDirectory) -> Result<String, DropReason> {
    let text = entities::unescape(raw);
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in MENTION.captures_iter(&text) {
        let whole = caps.get_match();
        let id = &caps[1];
        let profile = directory
            .get_raw(id)
            .ok_or_else(|| DropReason::UnknownMention(id.to_string()))?;
        out.push_str(&text[last..whole.start()]);
        out.push('@');
        out.push_str(&profile.display_name);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Member, Timestamp};

    fn ts(raw: &str) -> Timestamp {
        raw.parse().unwrap()
    }

    fn member(id: &str, name: &str) -> Member {
        Member::new(MemberId::new(id).unwrap(), name)
    }

    fn directory() -> MemberDirectory {
        MemberDirectory::from_members([member("U1", "ada"), member("U2", "grace")])
    }

    fn reflow(width: usize) -> LineReflow {
        LineReflow::new(width, TimeZoneSetting::Utc)
    }

    fn create(author: &str, text: &str) -> ChatEvent {
        ChatEvent::Create {
            ts: ts("1712345678.000200"),
            author: MemberId::new(author).unwrap(),
            text: text.to_string(),
        }
    }

    fn texts(lines: &[LogLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn single_line_message_has_full_prefix() {
        let lines = reflow(80).reflow(&create("U1", "hello"), &directory()).unwrap();
        assert_eq!(texts(&lines), vec!["Fri 07:34pm ada: hello"]);
        assert_eq!(lines[0].key, OrderingKey::first(ts("1712345678.000200")));
        assert_eq!(lines[0].color, LineColor::for_member(0));
    }

    #[test]
    fn wrapped_message_uses_hanging_indent_and_sequential_keys() {
        let lines = reflow(30)
            .reflow(&create("U2", "one two three four five six"), &directory())
            .unwrap();

        assert_eq!(
            texts(&lines),
            vec![
                "Fri 07:34pm grace: one two",
                "                   three four",
                "                   five six",
            ]
        );
        for (seq, line) in lines.iter().enumerate() {
            assert_eq!(line.key.sequence(), seq as u32);
            assert_eq!(line.key.primary(), ts("1712345678.000200"));
        }
    }

    #[test]
    fn paragraphs_after_the_first_are_indented() {
        let lines = reflow(80)
            .reflow(&create("U1", "first\nsecond\r\n\nthird"), &directory())
            .unwrap();
        assert_eq!(
            texts(&lines),
            vec![
                "Fri 07:34pm ada: first",
                "                 second",
                "                 third",
            ]
        );
    }

    #[test]
    fn unknown_author_drops_event() {
        let result = reflow(80).reflow(&create("U9", "hi"), &directory());
        assert_eq!(
            result,
            Err(DropReason::UnknownAuthor(MemberId::new("U9").unwrap()))
        );
    }

    #[test]
    fn mentions_resolve_to_display_names() {
        let lines = reflow(80)
            .reflow(&create("U1", "<@U2> and <@U1|ada> look"), &directory())
            .unwrap();
        assert_eq!(texts(&lines), vec!["Fri 07:34pm ada: @grace and @ada look"]);
    }

    #[test]
    fn unknown_mention_drops_whole_event() {
        let result = reflow(80).reflow(&create("U1", "hi <@U2> and <@U77>"), &directory());
        assert_eq!(result, Err(DropReason::UnknownMention("U77".to_string())));
    }

    #[test]
    fn mention_of_lowercase_id_resolves() {
        let dir = MemberDirectory::from_members([member("U1", "ada"), member("bot-7", "ci")]);
        let lines = reflow(80)
            .reflow(&create("U1", "ping <@bot-7|ci>"), &dir)
            .unwrap();
        assert_eq!(texts(&lines), vec!["Fri 07:34pm ada: ping @ci"]);
    }

    #[test]
    fn unknown_mention_of_any_shape_drops_whole_event() {
        let result = reflow(80).reflow(&create("U1", "hey <@u1>"), &directory());
        assert_eq!(result, Err(DropReason::UnknownMention("u1".to_string())));
    }

    #[test]
    fn html_references_are_decoded() {
        let lines = reflow(80)
            .reflow(&create("U1", "1 &lt; 2 &amp;&amp; 3 &gt; 2"), &directory())
            .unwrap();
        assert_eq!(texts(&lines), vec!["Fri 07:34pm ada: 1 < 2 && 3 > 2"]);
    }

    #[test]
    fn edit_targets_original_key_and_marks_text() {
        let event = ChatEvent::Edit {
            target_ts: ts("1712345000.000001"),
            author: MemberId::new("U2").unwrap(),
            text: "fixed".to_string(),
        };
        let lines = reflow(80).reflow(&event, &directory()).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].key, OrderingKey::first(ts("1712345000.000001")));
        assert!(lines[0].text.ends_with("grace: fixed (edited)"));
    }

    #[test]
    fn self_authored_uses_reserved_color_and_given_name() {
        let event = ChatEvent::SelfAuthored {
            ts: ts("1712345678.000200"),
            username: "me".to_string(),
            text: "sent".to_string(),
        };
        let lines = reflow(80).reflow(&event, &directory()).unwrap();
        assert_eq!(texts(&lines), vec!["Fri 07:34pm me: sent"]);
        assert_eq!(lines[0].color, LineColor::SELF_AUTHORED);
    }

    #[test]
    fn self_authored_does_not_need_a_directory_entry() {
        let event = ChatEvent::SelfAuthored {
            ts: ts("1712345678.000200"),
            username: "stranger".to_string(),
            text: "hi".to_string(),
        };
        assert!(reflow(80).reflow(&event, &MemberDirectory::new()).is_ok());
    }

    #[test]
    fn delete_yields_no_lines() {
        let event = ChatEvent::Delete {
            target_ts: ts("1712345678.000200"),
        };
        assert_eq!(reflow(80).reflow(&event, &directory()), Ok(Vec::new()));
    }

    #[test]
    fn system_line_has_no_author_and_system_color() {
        let key = OrderingKey::system(ts("1712345678.000200"));
        let lines = reflow(80).system(key, "----- Connected -----");
        assert_eq!(texts(&lines), vec!["Fri 07:34pm ----- Connected -----"]);
        assert_eq!(lines[0].color, LineColor::SYSTEM);
        assert_eq!(lines[0].key, key);
    }

    #[test]
    fn narrow_width_still_fits_every_line() {
        let lines = reflow(8)
            .reflow(&create("U2", "supercalifragilistic words"), &directory())
            .unwrap();
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| wrap::display_width(&l.text) <= 8));
    }
}
