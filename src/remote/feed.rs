//! A JSONL journal file acting as the chat service.
//!
//! On connect the whole file is read: `auth`, `member`, `channel` and
//! `group` records build the directory, message records become history.
//! Afterwards the file is tailed; every complete line appended since the
//! last poll is a live event. Sending appends a record, which comes back
//! through the tail like any other message.
//!
//! A line that cannot be read as a record fails the first connect. Once a
//! session has been established it is skipped with a warning instead, both
//! while tailing and when a reconnect reads the journal again, so one bad
//! line never keeps the client from coming back.

use super::wire::{self, ChannelKind, DecodeError, FeedRecord};
use super::{ChannelInfo, ChatRemote};
use crate::model::{ChannelId, ChatEvent, Member, RemoteError, RemoteEvent, Timestamp};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Chat service backed by a JSONL journal.
#[derive(Debug)]
pub struct FeedRemote {
    path: PathBuf,
    token: Option<String>,
    connection: Option<FeedConnection>,
    last_sent: Option<Timestamp>,
    established: bool,
}

#[derive(Debug)]
struct FeedConnection {
    tail: FeedTail,
    members: Vec<Member>,
    channels: Vec<(ChannelKind, ChannelInfo)>,
    history: Vec<RemoteEvent>,
}

impl FeedRemote {
    /// Remote reading `path`, presenting `token` if the feed asks for one.
    pub fn new(path: impl Into<PathBuf>, token: Option<String>) -> Self {
        Self {
            path: path.into(),
            token,
            connection: None,
            last_sent: None,
            established: false,
        }
    }

    /// Path of the journal.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connection(&self) -> Result<&FeedConnection, RemoteError> {
        self.connection.as_ref().ok_or(RemoteError::TransportClosed)
    }
}

impl ChatRemote for FeedRemote {
    fn connect(&mut self) -> Result<(), RemoteError> {
        self.connection = None;
        let mut tail = FeedTail::open(&self.path)?;

        let mut expected_token = None;
        let mut members = Vec::new();
        let mut channels = Vec::new();
        let mut history = Vec::new();

        for (line_no, line) in tail.read_new_lines()? {
            if is_blank(&line) {
                continue;
            }
            match wire::decode_line(&line) {
                Ok(FeedRecord::Auth { token }) => expected_token = Some(token),
                Ok(FeedRecord::Member(member)) => members.push(member),
                Ok(FeedRecord::Channel(kind, info)) => channels.push((kind, info)),
                Ok(FeedRecord::Message(event)) => history.push(event),
                Ok(FeedRecord::Ignored) => {}
                Err(err) if err.is_unreadable() && !self.established => {
                    return Err(RemoteError::Malformed {
                        line: line_no,
                        reason: err.to_string(),
                    });
                }
                Err(err) => skip_record(line_no, &err),
            }
        }

        if let Some(expected) = expected_token {
            if self.token.as_deref() != Some(expected.as_str()) {
                return Err(RemoteError::AuthRejected);
            }
        }

        info!(
            path = %self.path.display(),
            members = members.len(),
            channels = channels.len(),
            history = history.len(),
            "connected to feed"
        );

        self.connection = Some(FeedConnection {
            tail,
            members,
            channels,
            history,
        });
        self.established = true;
        Ok(())
    }

    fn fetch_members(&mut self) -> Result<Vec<Member>, RemoteError> {
        Ok(self.connection()?.members.clone())
    }

    fn resolve_channel(&mut self, name: &str) -> Result<ChannelInfo, RemoteError> {
        let connection = self.connection()?;
        [ChannelKind::Channel, ChannelKind::Group]
            .into_iter()
            .find_map(|wanted| {
                connection
                    .channels
                    .iter()
                    .find(|(kind, info)| *kind == wanted && info.name == name)
            })
            .map(|(_, info)| info.clone())
            .ok_or_else(|| RemoteError::ChannelNotFound(name.to_string()))
    }

    fn fetch_history(&mut self, channel: &ChannelId) -> Result<Vec<ChatEvent>, RemoteError> {
        Ok(self
            .connection()?
            .history
            .iter()
            .filter(|event| event.channel.as_ref() == Some(channel))
            .map(|event| event.event.clone())
            .collect())
    }

    fn poll_events(&mut self) -> Result<Vec<RemoteEvent>, RemoteError> {
        let connection = self.connection.as_mut().ok_or(RemoteError::TransportClosed)?;

        let lines = match connection.tail.read_new_lines() {
            Ok(lines) => lines,
            Err(err) => {
                self.connection = None;
                return Err(err);
            }
        };

        let mut events = Vec::new();
        for (line_no, line) in lines {
            if is_blank(&line) {
                continue;
            }
            match wire::decode_line(&line) {
                Ok(FeedRecord::Message(event)) => events.push(event),
                Ok(FeedRecord::Member(member)) => {
                    debug!(id = %member.id, "new member; directory refreshes on reconnect");
                }
                Ok(_) => {}
                Err(err) => skip_record(line_no, &err),
            }
        }
        Ok(events)
    }

    fn send_message(
        &mut self,
        channel: &ChannelId,
        text: &str,
        username: &str,
    ) -> Result<(), RemoteError> {
        self.connection()?;

        // Two sends in the same microsecond would share a message key.
        let mut ts = Timestamp::now();
        if let Some(last) = self.last_sent {
            if ts <= last {
                ts = last.next_micro();
            }
        }

        let record = wire::encode_self_message(channel, ts, username, text);
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => RemoteError::TransportClosed,
                _ => RemoteError::Io(err),
            })?;
        writeln!(file, "{record}")?;

        self.last_sent = Some(ts);
        debug!(channel = %channel, %ts, "message appended to feed");
        Ok(())
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

/// Unreadable lines are worth a warning; incomplete records only a debug line.
fn skip_record(line_no: usize, err: &DecodeError) {
    if err.is_unreadable() {
        warn!(line = line_no, %err, "skipping malformed feed record");
    } else {
        debug!(line = line_no, %err, "skipping incomplete feed record");
    }
}

/// Incremental reader over the journal.
///
/// Only complete lines are consumed; a partially written final line is left
/// for the next read.
#[derive(Debug)]
struct FeedTail {
    path: PathBuf,
    position: u64,
    line_no: usize,
    reader: BufReader<File>,
}

impl FeedTail {
    fn open(path: &Path) -> Result<Self, RemoteError> {
        let file = File::open(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => RemoteError::FeedNotFound {
                path: path.to_path_buf(),
            },
            _ => RemoteError::Io(err),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            position: 0,
            line_no: 0,
            reader: BufReader::new(file),
        })
    }

    /// Complete lines appended since the last read, with 1-based line numbers
    /// and without their terminators.
    ///
    /// Lines are raw bytes; decoding is the caller's business. A removed or
    /// truncated journal is reported as a closed transport.
    fn read_new_lines(&mut self) -> Result<Vec<(usize, Vec<u8>)>, RemoteError> {
        if !self.path.exists() {
            return Err(RemoteError::TransportClosed);
        }
        let len = self.reader.get_ref().metadata()?.len();
        if len < self.position {
            return Err(RemoteError::TransportClosed);
        }

        self.reader.seek(SeekFrom::Start(self.position))?;

        let mut lines = Vec::new();
        loop {
            let mut buffer = Vec::new();
            let bytes_read = self.reader.read_until(b'\n', &mut buffer)?;
            if bytes_read == 0 || buffer.last() != Some(&b'\n') {
                break;
            }
            self.position += bytes_read as u64;
            self.line_no += 1;
            buffer.pop();
            if buffer.last() == Some(&b'\r') {
                buffer.pop();
            }
            lines.push((self.line_no, buffer));
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DIRECTORY: &str = concat!(
        r#"{"type":"member","id":"U1","name":"ada"}"#,
        "\n",
        r#"{"type":"member","id":"U2","name":"grace"}"#,
        "\n",
        r#"{"type":"group","id":"G1","name":"general","topic":"private twin"}"#,
        "\n",
        r#"{"type":"channel","id":"C1","name":"general","topic":"welcome"}"#,
        "\n",
        r#"{"type":"channel","id":"C2","name":"random","topic":""}"#,
        "\n",
    );

    fn feed_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lack_feed_{name}.jsonl"));
        fs::write(&path, contents).unwrap();
        path
    }

    fn append(path: &Path, text: &str) {
        append_bytes(path, text.as_bytes());
    }

    fn append_bytes(path: &Path, bytes: &[u8]) {
        let mut file = OpenOptions::new().append(true).open(path).unwrap();
        file.write_all(bytes).unwrap();
    }

    /// A message record whose text holds a Latin-1 `é`, which is not UTF-8.
    const LATIN1_LINE: &[u8] =
        b"{\"type\":\"message\",\"channel\":\"C1\",\"user\":\"U1\",\"text\":\"caf\xe9\",\"ts\":\"5.0\"}\n";

    const LATER: &str =
        "{\"type\":\"message\",\"channel\":\"C1\",\"user\":\"U1\",\"text\":\"later\",\"ts\":\"6.0\"}\n";

    fn texts(events: &[RemoteEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|event| match &event.event {
                ChatEvent::Create { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn c1() -> ChannelId {
        ChannelId::new("C1").unwrap()
    }

    #[test]
    fn connect_fails_for_missing_file() {
        let mut remote = FeedRemote::new("/nonexistent/lack/feed.jsonl", None);
        assert!(matches!(
            remote.connect(),
            Err(RemoteError::FeedNotFound { .. })
        ));
    }

    #[test]
    fn calls_before_connect_report_closed_transport() {
        let mut remote = FeedRemote::new("/nonexistent/lack/feed.jsonl", None);
        assert!(matches!(remote.poll_events(), Err(RemoteError::TransportClosed)));
        assert!(matches!(remote.fetch_members(), Err(RemoteError::TransportClosed)));
    }

    #[test]
    fn connect_reads_directory_and_history() {
        let contents = format!(
            "{DIRECTORY}{}\n{}\n",
            r#"{"type":"message","channel":"C1","user":"U1","text":"hi","ts":"100.000001"}"#,
            r#"{"type":"message","channel":"C2","user":"U2","text":"elsewhere","ts":"101.0"}"#,
        );
        let path = feed_file("directory", &contents);
        let mut remote = FeedRemote::new(&path, None);

        remote.connect().unwrap();

        let members = remote.fetch_members().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].name, "grace");

        let channel = remote.resolve_channel("general").unwrap();
        assert_eq!(channel.id, c1(), "public channel wins over group");
        assert_eq!(channel.topic, "welcome");

        let history = remote.fetch_history(&c1()).unwrap();
        assert_eq!(history.len(), 1, "history is per channel");

        assert!(matches!(
            remote.resolve_channel("nope"),
            Err(RemoteError::ChannelNotFound(name)) if name == "nope"
        ));

        fs::remove_file(path).ok();
    }

    #[test]
    fn auth_record_requires_matching_token() {
        let contents = format!("{}\n{DIRECTORY}", r#"{"type":"auth","token":"s3cret"}"#);
        let path = feed_file("auth", &contents);

        let mut wrong = FeedRemote::new(&path, Some("guess".to_string()));
        assert!(matches!(wrong.connect(), Err(RemoteError::AuthRejected)));

        let mut missing = FeedRemote::new(&path, None);
        assert!(matches!(missing.connect(), Err(RemoteError::AuthRejected)));

        let mut right = FeedRemote::new(&path, Some("s3cret".to_string()));
        assert!(right.connect().is_ok());

        fs::remove_file(path).ok();
    }

    #[test]
    fn corrupt_journal_fails_connect_with_line_number() {
        let contents = format!("{DIRECTORY}this is not json\n");
        let path = feed_file("corrupt", &contents);
        let mut remote = FeedRemote::new(&path, None);

        assert!(matches!(
            remote.connect(),
            Err(RemoteError::Malformed { line: 6, .. })
        ));

        fs::remove_file(path).ok();
    }

    #[test]
    fn poll_returns_only_complete_appended_lines() {
        let path = feed_file("tail", DIRECTORY);
        let mut remote = FeedRemote::new(&path, None);
        remote.connect().unwrap();

        assert!(remote.poll_events().unwrap().is_empty());

        append(
            &path,
            r#"{"type":"message","channel":"C1","user":"U1","text":"one","ts":"200.0"}"#,
        );
        assert!(
            remote.poll_events().unwrap().is_empty(),
            "unterminated line is held back"
        );

        append(&path, "\n{\"type\":\"message\",\"channel\":\"C1\",\"deleted_ts\":\"200.0\"}\n");
        let events = remote.poll_events().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].event, ChatEvent::Create { .. }));
        assert!(matches!(events[1].event, ChatEvent::Delete { .. }));

        fs::remove_file(path).ok();
    }

    #[test]
    fn malformed_live_records_are_skipped() {
        let path = feed_file("skip", DIRECTORY);
        let mut remote = FeedRemote::new(&path, None);
        remote.connect().unwrap();

        append(
            &path,
            "garbage\n{\"type\":\"message\",\"channel\":\"C1\",\"user\":\"U1\",\"ts\":\"1.0\"}\n\
             {\"type\":\"message\",\"channel\":\"C1\",\"user\":\"U1\",\"text\":\"ok\",\"ts\":\"2.0\"}\n",
        );
        let events = remote.poll_events().unwrap();
        assert_eq!(events.len(), 1);

        fs::remove_file(path).ok();
    }

    #[test]
    fn non_utf8_live_line_is_skipped_and_tailing_continues() {
        let path = feed_file("latin1_live", DIRECTORY);
        let mut remote = FeedRemote::new(&path, None);
        remote.connect().unwrap();

        append_bytes(&path, LATIN1_LINE);
        append(&path, LATER);

        let events = remote.poll_events().expect("bad bytes are not a lost connection");
        assert_eq!(texts(&events), vec!["later"]);
        assert!(remote.poll_events().unwrap().is_empty(), "line is consumed once");

        append(
            &path,
            "{\"type\":\"message\",\"channel\":\"C1\",\"user\":\"U1\",\"text\":\"after\",\"ts\":\"7.0\"}\n",
        );
        assert_eq!(texts(&remote.poll_events().unwrap()), vec!["after"]);

        fs::remove_file(path).ok();
    }

    #[test]
    fn non_utf8_line_fails_the_first_connect_with_its_line_number() {
        let path = feed_file("latin1_first", DIRECTORY);
        append_bytes(&path, LATIN1_LINE);
        let mut remote = FeedRemote::new(&path, None);

        assert!(matches!(
            remote.connect(),
            Err(RemoteError::Malformed { line: 6, .. })
        ));

        fs::remove_file(path).ok();
    }

    #[test]
    fn reconnect_skips_lines_that_were_skipped_while_tailing() {
        let path = feed_file("latin1_reconnect", DIRECTORY);
        let mut remote = FeedRemote::new(&path, None);
        remote.connect().unwrap();

        append_bytes(&path, LATIN1_LINE);
        append(&path, "not json either\n");
        append(&path, LATER);
        assert_eq!(texts(&remote.poll_events().unwrap()), vec!["later"]);

        remote.connect().expect("reconnect tolerates lines it skipped before");

        let history = remote.fetch_history(&c1()).unwrap();
        assert_eq!(history.len(), 1);
        assert!(matches!(
            &history[0],
            ChatEvent::Create { text, .. } if text == "later"
        ));
        assert!(remote.poll_events().unwrap().is_empty());

        fs::remove_file(path).ok();
    }

    #[test]
    fn crlf_terminators_are_stripped() {
        let path = feed_file("crlf", DIRECTORY);
        let mut remote = FeedRemote::new(&path, None);
        remote.connect().unwrap();

        append(&path, &LATER.replace('\n', "\r\n"));

        assert_eq!(texts(&remote.poll_events().unwrap()), vec!["later"]);

        fs::remove_file(path).ok();
    }

    #[test]
    fn truncated_journal_closes_transport() {
        let path = feed_file("truncate", DIRECTORY);
        let mut remote = FeedRemote::new(&path, None);
        remote.connect().unwrap();

        fs::write(&path, "").unwrap();

        assert!(matches!(remote.poll_events(), Err(RemoteError::TransportClosed)));
        assert!(
            matches!(remote.poll_events(), Err(RemoteError::TransportClosed)),
            "stays closed until reconnect"
        );

        fs::remove_file(path).ok();
    }

    #[test]
    fn removed_journal_closes_transport() {
        let path = feed_file("removed", DIRECTORY);
        let mut remote = FeedRemote::new(&path, None);
        remote.connect().unwrap();

        fs::remove_file(&path).unwrap();

        assert!(matches!(remote.poll_events(), Err(RemoteError::TransportClosed)));
        assert!(matches!(remote.connect(), Err(RemoteError::FeedNotFound { .. })));
    }

    #[test]
    fn sent_message_echoes_through_the_tail() {
        let path = feed_file("send", DIRECTORY);
        let mut remote = FeedRemote::new(&path, None);
        remote.connect().unwrap();

        remote.send_message(&c1(), "hello <team>", "me").unwrap();
        remote.send_message(&c1(), "again", "me").unwrap();

        let events = remote.poll_events().unwrap();
        assert_eq!(events.len(), 2);
        let (first_ts, second_ts) = match (&events[0].event, &events[1].event) {
            (
                ChatEvent::SelfAuthored { ts: a, text, username },
                ChatEvent::SelfAuthored { ts: b, .. },
            ) => {
                assert_eq!(text, "hello <team>");
                assert_eq!(username, "me");
                (*a, *b)
            }
            other => panic!("expected two self-authored events, got {other:?}"),
        };
        assert!(first_ts < second_ts);
        assert_eq!(events[0].channel, Some(c1()));

        fs::remove_file(path).ok();
    }
}
