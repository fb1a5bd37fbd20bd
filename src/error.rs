use std::fmt;

use thiserror::Error;
use wiki_api::ApiError;

/// Propagation class of a failed operation.
///
/// Ordered from most to least severe. Success is represented by `Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The step cannot be retried as-is; no local recovery.
    Fatal,
    /// The API refused the request; retry after corrective action.
    Error,
    /// Locally detected, recoverable condition the caller should branch on.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warning => "warning",
        })
    }
}

#[derive(Debug, Error)]
pub enum WikiError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("login failed; no result returned")]
    NoLoginResult,

    #[error("login failed; no credentials supplied")]
    MissingCredentials,

    #[error("login failed; returned: {result}")]
    LoginRejected { result: String },

    #[error("edit token requested without an authenticated session")]
    NotAuthenticated,

    #[error("unknown error fetching wiki page '{title}'")]
    PageNotFound { title: String },

    #[error("cannot update page '{title}': not previously retrieved")]
    UntrackedPage { title: String },

    #[error("no edit token has been obtained in this session")]
    MissingEditToken,

    #[error("edit of '{title}' returned: {result}")]
    EditRejected { title: String, result: String },

    #[error("list '{list}' returned no items")]
    EmptyList { list: String },

    #[error("requested TOC for nonexistent page '{title}'")]
    TocForMissingPage { title: String },

    #[error("invalid timestamp '{value}'; expected RFC 3339")]
    InvalidTimestamp { value: String },

    #[error("invalid section '{value}'; expected a section number or 'new'")]
    InvalidSection { value: String },

    #[error("media not found: '{title}'")]
    MediaNotFound { title: String },

    #[error("unable to establish media uploader for '{title}'")]
    UploaderUnknown { title: String },

    #[error("upload of '{file_name}' returned: {result}")]
    UploadRejected { file_name: String, result: String },
}

impl WikiError {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Api(error) if error.is_transport() => Severity::Fatal,
            Self::NoLoginResult | Self::MissingCredentials => Severity::Fatal,
            Self::Api(_)
            | Self::LoginRejected { .. }
            | Self::NotAuthenticated
            | Self::EditRejected { .. }
            | Self::MediaNotFound { .. }
            | Self::UploaderUnknown { .. }
            | Self::UploadRejected { .. } => Severity::Error,
            Self::PageNotFound { .. }
            | Self::UntrackedPage { .. }
            | Self::MissingEditToken
            | Self::EmptyList { .. }
            | Self::TocForMissingPage { .. }
            | Self::InvalidTimestamp { .. }
            | Self::InvalidSection { .. } => Severity::Warning,
        }
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }

    /// Server-supplied error code, for API-reported failures.
    #[must_use]
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api(error) => error.api_code(),
            _ => None,
        }
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::Api(ApiError::UnexpectedShape(message.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Severity, WikiError};
    use wiki_api::ApiError;

    #[test]
    fn api_error_object_is_error_class() {
        let error = WikiError::from(ApiError::Api {
            code: "editconflict".to_owned(),
            info: "Edit conflict detected".to_owned(),
        });
        assert_eq!(error.severity(), Severity::Error);
        assert_eq!(error.api_code(), Some("editconflict"));
    }

    #[test]
    fn transport_failure_is_fatal() {
        let error = WikiError::from(ApiError::Transport("connection reset".to_owned()));
        assert!(error.is_fatal());
        assert_eq!(error.api_code(), None);
    }

    #[test]
    fn local_inconsistencies_are_warnings() {
        for error in [
            WikiError::UntrackedPage {
                title: "A".to_owned(),
            },
            WikiError::EmptyList {
                list: "allpages".to_owned(),
            },
            WikiError::TocForMissingPage {
                title: "A".to_owned(),
            },
            WikiError::PageNotFound {
                title: "A".to_owned(),
            },
        ] {
            assert!(error.is_warning(), "{error} should be a warning");
        }
    }

    #[test]
    fn severities_order_from_fatal_to_warning() {
        assert!(Severity::Fatal < Severity::Error);
        assert!(Severity::Error < Severity::Warning);
    }
}
