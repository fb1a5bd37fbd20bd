//! Transport-only primitives for a MediaWiki-style `api.php` endpoint.
//!
//! This crate owns endpoint/query construction, the HTTP transport seam, and
//! response decoding. It contains no session, login, or edit-token state; that
//! lives in the `wikibot` crate, which drives every request through the
//! [`Transport`] trait defined here.
//!
//! All responses are negotiated as `format=json`. A decoded body carrying a
//! top-level `error` object is always surfaced as [`ApiError::Api`], whatever
//! the HTTP status was.

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod headers;
pub mod query;
pub mod url;

pub use client::{HttpTransport, Transport};
pub use config::ApiConfig;
pub use decode::{decode_response, ApiErrorObject};
pub use error::ApiError;
pub use query::{Action, FormBody, Query};
pub use crate::url::normalize_api_endpoint;
