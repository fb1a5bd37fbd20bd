use std::fmt;
use std::str::FromStr;

use crate::error::WikiError;

/// How a write treats revisions saved between our read and our write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictMode {
    /// Submit the base timestamp so the server rejects conflicting writes.
    #[default]
    Respect,
    /// Omit the base timestamp and overwrite unconditionally.
    Overwrite,
}

/// Whether the target page must, must not, or may already exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewPageMode {
    /// Update an existing page previously read in this session (`nocreate`).
    #[default]
    MustNotCreate,
    /// Create the page; fail if it exists (`createonly`).
    MustCreate,
    /// Create or replace, whichever applies.
    DontCare,
}

impl NewPageMode {
    /// True when the write is marked new-page and skips the untracked-page guard.
    pub fn is_new_page(self) -> bool {
        !matches!(self, Self::MustNotCreate)
    }
}

/// Per-write options. Every write consumes these and leaves the session's
/// defaults at [`WriteOptions::default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub bot: bool,
    pub minor: bool,
    pub conflict: ConflictMode,
    pub new_page: NewPageMode,
    /// Revision timestamp to use as the conflict basis instead of the cached
    /// snapshot. Already validated as RFC 3339.
    pub base_timestamp: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            bot: true,
            minor: false,
            conflict: ConflictMode::Respect,
            new_page: NewPageMode::MustNotCreate,
            base_timestamp: None,
        }
    }
}

/// Target section of a read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Append a new section headed by the edit summary.
    New,
    /// Section by index; `0` is the lead before the first heading.
    Index(u32),
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("new"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl FromStr for Section {
    type Err = WikiError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("new") {
            return Ok(Self::New);
        }
        trimmed
            .parse::<u32>()
            .map(Self::Index)
            .map_err(|_| WikiError::InvalidSection {
                value: value.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConflictMode, NewPageMode, Section, WriteOptions};

    #[test]
    fn baseline_is_bot_not_minor_respecting_conflicts() {
        let options = WriteOptions::default();
        assert!(options.bot);
        assert!(!options.minor);
        assert_eq!(options.conflict, ConflictMode::Respect);
        assert_eq!(options.new_page, NewPageMode::MustNotCreate);
        assert!(options.base_timestamp.is_none());
    }

    #[test]
    fn section_parses_new_and_numbers() {
        assert_eq!("new".parse::<Section>().ok(), Some(Section::New));
        assert_eq!(" 2 ".parse::<Section>().ok(), Some(Section::Index(2)));
        assert!("two".parse::<Section>().is_err());
        assert!("-1".parse::<Section>().is_err());
    }

    #[test]
    fn only_must_not_create_is_guarded() {
        assert!(!NewPageMode::MustNotCreate.is_new_page());
        assert!(NewPageMode::MustCreate.is_new_page());
        assert!(NewPageMode::DontCare.is_new_page());
    }
}
