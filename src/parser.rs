// src/parser.rs

//! Incremental `git log --numstat --summary` parser
//!
//! Lines are pushed one at a time; a commit is emitted as soon as the next
//! `commit <sha>` line (or the end of the stream) proves it is finished.
//! Commits missing any required field are dropped, never reported as errors.

use crate::line_buffer::LineBuffer;
use crate::model::{ChangeStatus, CommitRecord, FileChange, Progress, Timestamp};
use chrono::DateTime;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Receives progress notifications from the parser
pub type ProgressCallback = Box<dyn FnMut(&Progress) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Before the first `commit` line
    AwaitingCommit,
    /// Reading `Author:`/`Date:` and other header lines
    InCommitHeader,
    InMessage,
    /// Reading numstat and summary lines
    InNumstat,
    /// Commit cutoff reached; further input is ignored
    Done,
}

/// The commit currently being assembled
#[derive(Debug, Default)]
struct PartialCommit {
    sha: Option<String>,
    author_name: Option<String>,
    author_email: Option<String>,
    timestamp: Option<Timestamp>,
    message_lines: Option<Vec<String>>,
    file_changes: Vec<FileChange>,
}

impl PartialCommit {
    fn into_record(self) -> Option<CommitRecord> {
        Some(CommitRecord {
            sha: self.sha?,
            author_name: self.author_name?,
            author_email: self.author_email?,
            timestamp: self.timestamp?,
            message: self.message_lines?.join("\n").trim().to_string(),
            file_changes: self.file_changes,
        })
    }

    fn change_mut(&mut self, path: &str) -> &mut FileChange {
        let index = match self.file_changes.iter().position(|c| c.path == path) {
            Some(index) => index,
            None => {
                self.file_changes.push(FileChange {
                    path: path.to_string(),
                    old_path: None,
                    additions: Some(0),
                    deletions: Some(0),
                    status: ChangeStatus::Modified,
                });
                self.file_changes.len() - 1
            }
        };
        &mut self.file_changes[index]
    }
}

pub struct CommitStreamParser {
    state: ParserState,
    partial: Option<PartialCommit>,
    emitted: usize,
    dropped: usize,
    max_commits: Option<usize>,
    progress_interval: usize,
    on_progress: Option<ProgressCallback>,
    finished: bool,
}

impl CommitStreamParser {
    pub fn new(max_commits: Option<usize>, progress_interval: usize) -> Self {
        let state = if max_commits == Some(0) {
            ParserState::Done
        } else {
            ParserState::AwaitingCommit
        };
        Self {
            state,
            partial: None,
            emitted: 0,
            dropped: 0,
            max_commits,
            progress_interval: progress_interval.max(1),
            on_progress: None,
            finished: false,
        }
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Number of commits emitted so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Number of incomplete commits discarded so far
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// True once the cutoff is reached; the caller should stop the producer
    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    /// Feeds one line; returns the previous commit when this line closes it
    pub fn push_line(&mut self, line: &str) -> Option<CommitRecord> {
        if self.state == ParserState::Done {
            return None;
        }

        if let Some(rest) = line.strip_prefix("commit ") {
            let finished = self.take_partial();
            self.partial = Some(PartialCommit {
                sha: rest.split_whitespace().next().map(str::to_string),
                ..PartialCommit::default()
            });
            self.state = ParserState::InCommitHeader;
            return finished.and_then(|record| self.emit(record));
        }

        match self.state {
            ParserState::AwaitingCommit | ParserState::Done => {
                trace!("Ignoring line outside a commit: {line:?}");
            }
            ParserState::InCommitHeader => self.header_line(line),
            ParserState::InMessage => self.message_line(line),
            ParserState::InNumstat => self.numstat_line(line),
        }
        None
    }

    /// Ends the stream, emitting the pending commit if it is complete
    pub fn finish(&mut self) -> Option<CommitRecord> {
        if self.finished {
            return None;
        }
        let record = self.take_partial().and_then(|record| self.emit(record));
        if self.state != ParserState::Done {
            self.state = ParserState::AwaitingCommit;
        }
        if !self.finished {
            self.finished = true;
            self.notify(true);
        }
        record
    }

    fn take_partial(&mut self) -> Option<CommitRecord> {
        let partial = self.partial.take()?;
        let sha = partial.sha.clone();
        let record = partial.into_record();
        if record.is_none() {
            self.dropped += 1;
            debug!("Dropping incomplete commit {}", sha.as_deref().unwrap_or("<no sha>"));
        }
        record
    }

    fn emit(&mut self, record: CommitRecord) -> Option<CommitRecord> {
        self.emitted += 1;
        if self.max_commits.is_some_and(|max| self.emitted >= max) {
            debug!("Commit limit reached after {} commits", self.emitted);
            self.state = ParserState::Done;
            self.partial = None;
            self.finished = true;
            self.notify(true);
        } else if self.emitted % self.progress_interval == 0 {
            self.notify(false);
        }
        Some(record)
    }

    fn notify(&mut self, complete: bool) {
        let Some(callback) = self.on_progress.as_mut() else {
            return;
        };
        let percentage = self
            .max_commits
            .map(|total| (self.emitted as f64 / total as f64 * 100.0).min(100.0));
        callback(&Progress {
            processed: self.emitted,
            total: self.max_commits,
            percentage,
            complete,
        });
    }

    fn header_line(&mut self, line: &str) {
        let Some(partial) = self.partial.as_mut() else {
            return;
        };

        if let Some(rest) = line.strip_prefix("Author:") {
            match parse_author(rest) {
                Some((name, email)) => {
                    partial.author_name = Some(name);
                    partial.author_email = Some(email);
                }
                None => debug!("Unparsable author line: {line:?}"),
            }
        } else if let Some(rest) = line.strip_prefix("Date:") {
            match parse_date(rest.trim()) {
                Some(timestamp) => partial.timestamp = Some(timestamp),
                None => debug!("Unparsable date line: {line:?}"),
            }
        } else if line.trim().is_empty() {
            partial.message_lines = Some(Vec::new());
            self.state = ParserState::InMessage;
        } else if line.starts_with("    ") {
            // Message without the usual blank separator
            partial.message_lines = Some(Vec::new());
            self.state = ParserState::InMessage;
            self.message_line(line);
        }
        // Merge:, Commit:, AuthorDate: and friends carry nothing we need
    }

    fn message_line(&mut self, line: &str) {
        if let Some(text) = line.strip_prefix("    ") {
            if let Some(lines) = self.partial.as_mut().and_then(|p| p.message_lines.as_mut()) {
                lines.push(text.to_string());
            }
        } else if line.trim().is_empty() {
            if let Some(lines) = self.partial.as_mut().and_then(|p| p.message_lines.as_mut()) {
                lines.push(String::new());
            }
        } else if parse_numstat(line).is_some() || is_summary_line(line) {
            self.state = ParserState::InNumstat;
            self.numstat_line(line);
        } else {
            trace!("Ignoring unindented message line: {line:?}");
        }
    }

    fn numstat_line(&mut self, line: &str) {
        let Some(partial) = self.partial.as_mut() else {
            return;
        };
        if line.trim().is_empty() {
            return;
        }
        if let Some(change) = parse_numstat(line) {
            partial.file_changes.push(change);
        } else if !apply_summary_line(partial, line) {
            trace!("Ignoring unrecognized numstat line: {line:?}");
        }
    }
}

fn author_regex() -> &'static Regex {
    static AUTHOR: OnceLock<Regex> = OnceLock::new();
    AUTHOR.get_or_init(|| {
        Regex::new(r"^(?P<name>.*?)\s*<(?P<email>[^<>]*)>\s*$").expect("author regex is valid")
    })
}

/// Splits `Name <email>`; both parts must be non-empty
fn parse_author(raw: &str) -> Option<(String, String)> {
    let caps = author_regex().captures(raw.trim())?;
    let name = caps.name("name")?.as_str().trim();
    let email = caps.name("email")?.as_str().trim();
    if name.is_empty() || email.is_empty() {
        return None;
    }
    Some((name.to_string(), email.to_string()))
}

/// Accepts `--date=rfc2822`, ISO 8601 and git's default date format
pub fn parse_date(raw: &str) -> Option<Timestamp> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .or_else(|_| DateTime::parse_from_str(raw, "%a %b %e %H:%M:%S %Y %z"))
        .ok()
}

fn parse_count(field: &str) -> Option<Option<u64>> {
    if field == "-" {
        return Some(None);
    }
    field.parse::<u64>().ok().map(Some)
}

/// Parses `<additions>\t<deletions>\t<path>`
fn parse_numstat(line: &str) -> Option<FileChange> {
    let mut fields = line.splitn(3, '\t');
    let additions = parse_count(fields.next()?)?;
    let deletions = parse_count(fields.next()?)?;
    let raw_path = fields.next()?;
    if raw_path.is_empty() {
        return None;
    }

    let (path, old_path, status) = match split_rename(raw_path) {
        Some((old, new)) => {
            (unquote_path(&new), Some(unquote_path(&old)), ChangeStatus::Renamed)
        }
        None => (unquote_path(raw_path), None, ChangeStatus::Modified),
    };
    Some(FileChange { path, old_path, additions, deletions, status })
}

/// Decodes a C-quoted path (`"caf\303\251.rs"`); unquoted paths pass through
///
/// Git still quotes paths holding control characters, quotes or backslashes
/// when `core.quotepath` is off, and saved logs may come from either setting.
fn unquote_path(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) else {
        return raw.to_string();
    };

    let src = inner.as_bytes();
    let mut bytes = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        if src[i] != b'\\' {
            bytes.push(src[i]);
            i += 1;
            continue;
        }
        match src.get(i + 1) {
            Some(b'0'..=b'7') => {
                let digits = src[i + 1..]
                    .iter()
                    .take(3)
                    .take_while(|&&b| (b'0'..=b'7').contains(&b))
                    .count();
                let value = src[i + 1..i + 1 + digits]
                    .iter()
                    .fold(0u32, |acc, &b| acc * 8 + u32::from(b - b'0'));
                bytes.push(value as u8);
                i += 1 + digits;
            }
            Some(&escaped) => {
                bytes.push(match escaped {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'r' => b'\r',
                    b'a' => 0x07,
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    b'v' => 0x0b,
                    other => other,
                });
                i += 2;
            }
            None => {
                bytes.push(b'\\');
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Resolves `old => new` and `dir/{old => new}/file` into full paths
fn split_rename(raw: &str) -> Option<(String, String)> {
    if let (Some(open), Some(close)) = (raw.find('{'), raw.rfind('}')) {
        if open < close {
            let (old_inner, new_inner) = raw[open + 1..close].split_once(" => ")?;
            let prefix = &raw[..open];
            let suffix = &raw[close + 1..];
            let join = |inner: &str| {
                let joined = format!("{prefix}{inner}{suffix}");
                joined.replace("//", "/").trim_start_matches('/').to_string()
            };
            return Some((join(old_inner), join(new_inner)));
        }
    }
    let (old, new) = raw.split_once(" => ")?;
    Some((old.to_string(), new.to_string()))
}

const SUMMARY_PREFIXES: [&str; 5] =
    [" create mode ", " delete mode ", " rename ", " copy ", " mode change "];

fn is_summary_line(line: &str) -> bool {
    SUMMARY_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

/// Applies a `--summary` line to the commit's changes; false if unrecognized
fn apply_summary_line(partial: &mut PartialCommit, line: &str) -> bool {
    if let Some(rest) = line.strip_prefix(" create mode ") {
        if let Some((_, path)) = rest.split_once(' ') {
            partial.change_mut(&unquote_path(path)).status = ChangeStatus::Added;
        }
        true
    } else if let Some(rest) = line.strip_prefix(" delete mode ") {
        if let Some((_, path)) = rest.split_once(' ') {
            partial.change_mut(&unquote_path(path)).status = ChangeStatus::Deleted;
        }
        true
    } else if let Some(rest) = line.strip_prefix(" rename ") {
        // " rename a => b (87%)"
        let spec = match rest.rfind(" (") {
            Some(pos) if rest.ends_with("%)") => &rest[..pos],
            _ => rest,
        };
        if let Some((old, new)) = split_rename(spec) {
            let change = partial.change_mut(&unquote_path(&new));
            change.status = ChangeStatus::Renamed;
            change.old_path = Some(unquote_path(&old));
        }
        true
    } else {
        is_summary_line(line)
    }
}

/// Parses a complete log text in one go
pub fn parse_log(text: &str, max_commits: Option<usize>) -> Vec<CommitRecord> {
    let mut buffer = LineBuffer::new();
    let mut parser = CommitStreamParser::new(max_commits, usize::MAX);
    let mut commits = Vec::new();

    let mut lines = buffer.feed(text.as_bytes());
    lines.extend(buffer.flush());
    for line in &lines {
        commits.extend(parser.push_line(line));
        if parser.is_done() {
            return commits;
        }
    }
    commits.extend(parser.finish());
    commits
}
