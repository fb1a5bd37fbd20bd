//! Page reads with revision metadata, and conflict-aware writes.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use wiki_api::{Action, FormBody, Query, Transport};

use crate::error::WikiError;
use crate::options::{ConflictMode, NewPageMode, Section, WriteOptions};
use crate::session::Session;

const EDIT_SUCCESS: &str = "Success";

/// The last successfully read page. A session caches exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    /// Title as normalized by the server.
    pub title: String,
    pub revision_id: u64,
    /// Timestamp of the revision read; the default conflict basis.
    pub timestamp: String,
    /// Edit token issued with this read, if one was requested.
    pub edit_token: Option<String>,
    /// Server time at which the token was issued.
    pub token_timestamp: Option<String>,
    requested_title: String,
}

impl PageSnapshot {
    /// True when `title` names this page, as requested or as normalized.
    pub fn matches(&self, title: &str) -> bool {
        self.title == title || self.requested_title == title
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RevisionPage {
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) revisions: Vec<Revision>,
    pub(crate) edittoken: Option<String>,
    pub(crate) starttimestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Revision {
    pub(crate) revid: u64,
    pub(crate) timestamp: String,
    #[serde(rename = "*", alias = "content", default)]
    pub(crate) content: String,
}

/// A single write: what to save and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub title: String,
    pub content: String,
    /// Edit summary; also the heading of a new section.
    pub summary: Option<String>,
    pub section: Option<Section>,
    pub options: WriteOptions,
}

impl EditRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            summary: None,
            section: None,
            options: WriteOptions::default(),
        }
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn with_section(mut self, section: Section) -> Self {
        self.section = Some(section);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    fn form(&self, basis: Option<&ConflictBasis>, token: &str) -> FormBody {
        let mut form = FormBody::new();
        put(&mut form, "title", &self.title);
        put(&mut form, "text", &self.content);
        put(&mut form, "token", token);
        if let Some(summary) = &self.summary {
            put(&mut form, "summary", summary);
        }

        if self.options.bot {
            put(&mut form, "bot", "1");
        }
        put(
            &mut form,
            if self.options.minor { "minor" } else { "notminor" },
            "1",
        );

        match self.options.conflict {
            ConflictMode::Respect => {
                if let Some(basis) = basis {
                    put(&mut form, "basetimestamp", &basis.base);
                    if let Some(start) = &basis.start {
                        put(&mut form, "starttimestamp", start);
                    }
                }
            }
            ConflictMode::Overwrite => put(&mut form, "recreate", "1"),
        }

        match self.options.new_page {
            NewPageMode::MustNotCreate => put(&mut form, "nocreate", "1"),
            NewPageMode::MustCreate => put(&mut form, "createonly", "1"),
            NewPageMode::DontCare => {}
        }

        match self.section {
            Some(Section::New) => {
                put(&mut form, "section", "new");
                if let Some(summary) = &self.summary {
                    put(&mut form, "sectiontitle", summary);
                }
            }
            Some(Section::Index(index)) => put(&mut form, "section", &index.to_string()),
            None => {}
        }

        form
    }
}

fn put(form: &mut FormBody, key: &str, value: &str) {
    form.insert(key.to_owned(), value.to_owned());
}

/// Timestamps a write submits so the server can detect intervening edits.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConflictBasis {
    base: String,
    start: Option<String>,
}

/// The `edit` object of a successful `action=edit` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditResult {
    pub result: String,
    pub title: Option<String>,
    #[serde(rename = "pageid")]
    pub page_id: Option<u64>,
    #[serde(rename = "oldrevid")]
    pub old_revision_id: Option<u64>,
    #[serde(rename = "newrevid")]
    pub new_revision_id: Option<u64>,
    #[serde(rename = "newtimestamp")]
    pub new_timestamp: Option<String>,
    #[serde(default)]
    nochange: Option<Value>,
}

impl EditResult {
    /// The submitted text matched the current revision; nothing was saved.
    pub fn no_change(&self) -> bool {
        self.nochange.is_some()
    }
}

impl<T: Transport> Session<T> {
    /// Fetch the latest (or `revision_id`) wikitext of `title`, optionally
    /// restricted to `section`, and cache its revision metadata.
    ///
    /// With `want_token`, an edit token and its issue time are requested too;
    /// that requires an authenticated session. A missing page is reported as
    /// [`WikiError::PageNotFound`], a warning.
    pub fn get_page(
        &mut self,
        title: &str,
        want_token: bool,
        revision_id: Option<u64>,
        section: Option<u32>,
    ) -> Result<String, WikiError> {
        if want_token && !self.authenticated {
            return Err(WikiError::NotAuthenticated);
        }
        match section {
            Some(section) => debug!(title, section, "fetching section"),
            None => debug!(title, "fetching page"),
        }

        let RevisionPage {
            title: server_title,
            revisions,
            edittoken,
            starttimestamp,
        } = self.fetch_revision(title, want_token, revision_id, section)?;

        // Edit tokens are session-wide; keep one even when the page is missing.
        if want_token {
            if let Some(token) = &edittoken {
                self.edit_token = Some(token.clone());
            }
        }

        let Some(revision) = revisions.into_iter().next() else {
            return Err(WikiError::PageNotFound {
                title: title.to_owned(),
            });
        };

        self.snapshot = Some(PageSnapshot {
            title: server_title,
            revision_id: revision.revid,
            timestamp: revision.timestamp,
            edit_token: if want_token { edittoken } else { None },
            token_timestamp: if want_token { starttimestamp } else { None },
            requested_title: title.to_owned(),
        });
        Ok(revision.content)
    }

    /// [`Session::get_page`] restricted to one section.
    pub fn get_section(
        &mut self,
        title: &str,
        section: u32,
        want_token: bool,
        revision_id: Option<u64>,
    ) -> Result<String, WikiError> {
        self.get_page(title, want_token, revision_id, Some(section))
    }

    /// Read revision data without touching the cached snapshot or token.
    pub(crate) fn fetch_revision(
        &self,
        title: &str,
        want_token: bool,
        revision_id: Option<u64>,
        section: Option<u32>,
    ) -> Result<RevisionPage, WikiError> {
        let mut query = Query::new(Action::Query);
        if want_token {
            query.set("prop", "revisions|info");
            query.set("intoken", "edit");
        } else {
            query.set("prop", "revisions");
        }
        query.set("titles", title);
        query.set("rvlimit", 1);
        query.set("rvprop", "content|timestamp|ids");
        if let Some(revision_id) = revision_id {
            query.set("rvstartid", revision_id);
        }
        if let Some(section) = section {
            query.set("rvsection", section);
        }

        let response = self.raw_query(&query, None)?;
        let Some(page) = first_page(&response) else {
            return Err(WikiError::PageNotFound {
                title: title.to_owned(),
            });
        };
        RevisionPage::deserialize(page)
            .map_err(|error| WikiError::shape(format!("revision page: {error}")))
    }

    /// Write `content` to `title` using the session's current write defaults,
    /// which are reset to baseline whatever the outcome.
    ///
    /// `summary` doubles as the heading when `section` is [`Section::New`].
    pub fn write_page(
        &mut self,
        title: &str,
        content: &str,
        summary: Option<&str>,
        section: Option<Section>,
    ) -> Result<EditResult, WikiError> {
        let mut request =
            EditRequest::new(title, content).with_options(self.write_defaults.clone());
        request.summary = summary.map(str::to_owned);
        request.section = section;
        self.submit_edit(request)
    }

    /// [`Session::write_page`] with the section first, for section edits.
    pub fn write_section(
        &mut self,
        title: &str,
        content: &str,
        section: Section,
        summary: Option<&str>,
    ) -> Result<EditResult, WikiError> {
        self.write_page(title, content, summary, Some(section))
    }

    /// Submit a fully specified edit. Session write defaults are reset first.
    ///
    /// Conflict basis: the request's explicit base timestamp when set;
    /// otherwise the cached snapshot, which must be of the same page unless
    /// the request is marked new-page. Untracked pages and a missing edit
    /// token are warnings and issue no request.
    pub fn submit_edit(&mut self, request: EditRequest) -> Result<EditResult, WikiError> {
        self.write_defaults = WriteOptions::default();
        info!(title = %request.title, section = ?request.section, "writing page");

        let basis = self.conflict_basis(&request)?;
        let token = self
            .edit_token
            .clone()
            .ok_or(WikiError::MissingEditToken)?;
        let form = request.form(basis.as_ref(), &token);

        let response = self.raw_query(&Query::new(Action::Edit), Some(&form))?;
        let edit = response
            .get("edit")
            .ok_or_else(|| WikiError::shape("edit response without an 'edit' object"))?;
        let result = EditResult::deserialize(edit)
            .map_err(|error| WikiError::shape(format!("edit result: {error}")))?;
        if result.result != EDIT_SUCCESS {
            return Err(WikiError::EditRejected {
                title: request.title,
                result: result.result,
            });
        }

        self.record_write(&request.title, &result);
        Ok(result)
    }

    fn conflict_basis(&self, request: &EditRequest) -> Result<Option<ConflictBasis>, WikiError> {
        if let Some(base) = &request.options.base_timestamp {
            return Ok(Some(ConflictBasis {
                base: base.clone(),
                start: None,
            }));
        }

        match self
            .snapshot
            .as_ref()
            .filter(|snapshot| snapshot.matches(&request.title))
        {
            Some(snapshot) => Ok(Some(ConflictBasis {
                base: snapshot.timestamp.clone(),
                start: snapshot.token_timestamp.clone(),
            })),
            None if request.options.new_page.is_new_page() => Ok(None),
            None => Err(WikiError::UntrackedPage {
                title: request.title.clone(),
            }),
        }
    }

    /// Move the cached snapshot onto the revision we just saved.
    fn record_write(&mut self, title: &str, result: &EditResult) {
        let Some(snapshot) = self.snapshot.as_mut().filter(|snapshot| snapshot.matches(title))
        else {
            return;
        };
        if let (Some(revision_id), Some(timestamp)) =
            (result.new_revision_id, result.new_timestamp.as_ref())
        {
            snapshot.revision_id = revision_id;
            snapshot.timestamp = timestamp.clone();
        }
    }
}

/// First page of a `query.pages` collection, object- or array-shaped.
pub(crate) fn first_page(response: &Value) -> Option<&Value> {
    collection_values(response.get("query").and_then(|query| query.get("pages")))
        .into_iter()
        .next()
}

/// Members of a JSON collection in server order: object values or array items.
pub(crate) fn collection_values(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Object(map)) => map.values().collect(),
        Some(Value::Array(items)) => items.iter().collect(),
        _ => Vec::new(),
    }
}
