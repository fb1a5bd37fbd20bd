//! Stateful client for a MediaWiki-style page API.
//!
//! Invariant: one session, one cached page snapshot, one edit token. A
//! [`Session`] is used by exactly one logical sequence of operations at a
//! time; run one session per worker.
//!
//! # Public API Overview
//! - Log in and out with [`Session::authenticate`], [`Session::reauthenticate`]
//!   and [`Session::deauthenticate`].
//! - Read pages and sections with revision metadata via [`Session::get_page`];
//!   write them with conflict detection via [`Session::write_page`].
//! - Walk continuation-paginated lists with [`Session::fetch_list`].
//! - Fetch page outlines with [`Session::get_toc`].
//! - Accumulate a bounded run log and publish it with
//!   [`Session::flush_run_log`].
//! - Locate, attribute and copy media files through [`MediaExt`].
//!
//! Every operation returns `Result<_, WikiError>`; [`WikiError::severity`]
//! tells fatal, error and warning outcomes apart.

pub mod config;
pub mod error;
pub mod list;
pub mod logging;
pub mod media;
pub mod options;
pub mod page;
pub mod runlog;
pub mod session;
pub mod toc;

pub use config::WikiConfig;
pub use error::{Severity, WikiError};
pub use list::ListQuery;
pub use media::{MediaCopy, MediaExt, UploadResult};
pub use options::{ConflictMode, NewPageMode, Section, WriteOptions};
pub use page::{EditRequest, EditResult, PageSnapshot};
pub use runlog::{FlushOutcome, RunLog, LOG_PREFIX};
pub use session::{Credentials, LoginResult, Session};
pub use toc::TocEntry;

/// Re-exported transport layer.
pub use wiki_api;

/// Library version, as written into run-log headers.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
