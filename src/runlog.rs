//! Bounded run log, flushed to a wiki page at teardown.
//!
//! Log entries are wiki list lines starting with [`LOG_PREFIX`], which keeps
//! them distinguishable from any other content on the log page. The page is
//! kept newest-first: each flush puts an end-of-run marker and this run's
//! entries (newest first) above what the page already holds, then trims the
//! oldest log lines from the bottom until at most `max_lines` remain.

use std::collections::VecDeque;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info};
use wiki_api::Transport;

use crate::error::WikiError;
use crate::options::{ConflictMode, NewPageMode, WriteOptions};
use crate::page::EditRequest;
use crate::session::Session;

/// Leading character of every log line.
pub const LOG_PREFIX: char = '#';

/// Result of a run-log flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The log page was written.
    Logged,
    /// Nothing was buffered; no request was made.
    Empty,
}

/// Buffer of this run's log lines, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLog {
    entries: VecDeque<String>,
    max_entries: usize,
}

impl RunLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
        }
    }

    /// A log opened with the run header naming the bot and library version.
    pub fn with_header(bot_name: Option<&str>, max_entries: usize) -> Self {
        let mut log = Self::new(max_entries);
        let who = match bot_name {
            Some(name) => format!("{LOG_PREFIX} Run of {name} using"),
            None => format!("{LOG_PREFIX} Unnamed bot using"),
        };
        log.push(format!("{who} wikibot {}", crate::VERSION));
        log.push(format!("{LOG_PREFIX}:: Start: {}", utc_stamp()));
        log
    }

    /// Record `line`, timestamped unless it already carries the log prefix.
    pub fn append(&mut self, line: &str) {
        let entry = normalize_entry(line, &utc_stamp());
        self.push(entry);
    }

    fn push(&mut self, entry: String) {
        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest-first text block: `end_marker`, then entries newest to oldest.
    pub fn render_block(&self, end_marker: &str) -> String {
        let mut lines = Vec::with_capacity(self.entries.len() + 1);
        lines.push(end_marker);
        lines.extend(self.entries.iter().rev().map(String::as_str));
        lines.join("\n")
    }
}

/// One log line for `line`: single-line, and prefixed with a timestamp
/// unless the caller already supplied the log prefix.
pub fn normalize_entry(line: &str, stamp: &str) -> String {
    let flat = line
        .lines()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if flat.starts_with(LOG_PREFIX) {
        flat
    } else {
        format!("{LOG_PREFIX}:: {stamp} {flat}")
    }
}

pub fn is_log_line(line: &str) -> bool {
    line.starts_with(LOG_PREFIX)
}

pub fn count_log_lines(text: &str) -> usize {
    text.lines().filter(|line| is_log_line(line)).count()
}

/// Drop the bottom-most log lines of `text` until at most `max_lines` remain.
///
/// Only whole log lines are removed; every other line is kept in place with
/// its original line ending.
pub fn rotate(text: &str, max_lines: usize) -> String {
    let mut lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut count = lines.iter().filter(|line| is_log_line(line)).count();

    while count > max_lines {
        let Some(oldest) = lines.iter().rposition(|line| is_log_line(line)) else {
            break;
        };
        lines.remove(oldest);
        count -= 1;
    }

    let mut rotated = lines.concat();
    if !text.ends_with('\n') {
        // The unterminated last line was dropped; don't leave its
        // predecessor's terminator dangling.
        if rotated.ends_with('\n') {
            rotated.pop();
            if rotated.ends_with('\r') {
                rotated.pop();
            }
        }
    }
    rotated
}

fn utc_stamp() -> String {
    let now = OffsetDateTime::now_utc();
    let now = now.replace_nanosecond(0).unwrap_or(now);
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

impl<T: Transport> Session<T> {
    /// Write this run's log ahead of the current content of `log_title`,
    /// keeping at most `max_lines` log lines. The write is minor and does not
    /// check for conflicts; a missing log page is created.
    ///
    /// The buffer is cleared once the page has been saved.
    pub fn flush_run_log(
        &mut self,
        log_title: &str,
        max_lines: usize,
    ) -> Result<FlushOutcome, WikiError> {
        if self.run_log.is_empty() {
            return Ok(FlushOutcome::Empty);
        }

        let existing = match self.get_page(log_title, true, None, None) {
            Ok(text) => text,
            Err(WikiError::PageNotFound { .. }) => {
                debug!(log_title, "log page does not exist yet");
                String::new()
            }
            Err(error) => return Err(error),
        };

        let block = self
            .run_log
            .render_block(&format!("{LOG_PREFIX}:: End: {}", utc_stamp()));
        let combined = if existing.trim().is_empty() {
            block
        } else {
            format!("{block}\n{existing}")
        };
        let text = rotate(&combined, max_lines);

        let summary = match self.config.bot_name.as_deref() {
            Some(name) => format!("Log of {name} run"),
            None => "Log of bot run".to_owned(),
        };
        let request = EditRequest::new(log_title, text)
            .with_summary(summary)
            .with_options(WriteOptions {
                minor: true,
                conflict: ConflictMode::Overwrite,
                new_page: NewPageMode::DontCare,
                ..WriteOptions::default()
            });
        self.submit_edit(request)?;

        info!(log_title, lines = self.run_log.len(), "run logged");
        self.run_log.reset();
        Ok(FlushOutcome::Logged)
    }
}

#[cfg(test)]
mod tests {
    use super::{count_log_lines, normalize_entry, rotate, RunLog, LOG_PREFIX};
    use pretty_assertions::assert_eq;

    #[test]
    fn untagged_lines_are_prefixed_and_timestamped() {
        assert_eq!(
            normalize_entry("Sandbox reset", "2012-10-13T12:00:00Z"),
            "#:: 2012-10-13T12:00:00Z Sandbox reset"
        );
    }

    #[test]
    fn tagged_lines_are_kept_verbatim() {
        assert_eq!(
            normalize_entry("#:: Testing and Development run", "ignored"),
            "#:: Testing and Development run"
        );
    }

    #[test]
    fn multi_line_notes_collapse_to_one_line() {
        let entry = normalize_entry("first\r\nsecond\n\nthird", "T");
        assert_eq!(entry, "#:: T first second third");
        assert_eq!(count_log_lines(&entry), 1);
    }

    #[test]
    fn buffer_evicts_oldest_first() {
        let mut log = RunLog::new(3);
        for n in 1..=5 {
            log.append(&format!("{LOG_PREFIX} entry {n}"));
        }

        let kept: Vec<&str> = log.entries().collect();
        assert_eq!(kept, vec!["# entry 3", "# entry 4", "# entry 5"]);
    }

    #[test]
    fn header_names_the_bot() {
        let log = RunLog::with_header(Some("NewsieBot"), 10);
        let lines: Vec<&str> = log.entries().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("# Run of NewsieBot using wikibot "));
        assert!(lines[1].starts_with("#:: Start: "));
    }

    #[test]
    fn header_without_name_is_unnamed() {
        let log = RunLog::with_header(None, 10);
        let first = log.entries().next().expect("header line");
        assert!(first.starts_with("# Unnamed bot using"));
    }

    #[test]
    fn render_block_is_newest_first() {
        let mut log = RunLog::new(10);
        log.append("# one");
        log.append("# two");

        assert_eq!(log.render_block("#:: End"), "#:: End\n# two\n# one");
    }

    #[test]
    fn rotate_keeps_most_recent_log_lines_and_all_other_content() {
        let text = "# five\n# four\n# three\n# two\n# one\n\n== Notes ==\nKeep me.";

        assert_eq!(
            rotate(text, 3),
            "# five\n# four\n# three\n\n== Notes ==\nKeep me."
        );
    }

    #[test]
    fn rotate_skips_non_log_lines_between_entries() {
        let text = "# new\nplain note\n# old";
        assert_eq!(rotate(text, 1), "# new\nplain note");
    }

    #[test]
    fn rotate_preserves_line_endings_of_surrounding_text() {
        let text = "# new\r\n# old\r\n== Notes ==\r\nKeep me.\r\n";
        assert_eq!(rotate(text, 1), "# new\r\n== Notes ==\r\nKeep me.\r\n");

        let text = "# new\n# old\n\nfooter\n";
        assert_eq!(rotate(text, 1), "# new\n\nfooter\n");
    }

    #[test]
    fn rotate_within_bound_is_identity() {
        let text = "# a\n# b\ntrailer";
        assert_eq!(rotate(text, 5), text);
    }
}
