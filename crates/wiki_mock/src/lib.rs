//! Deterministic in-memory wiki behind the `wiki_api` [`Transport`] seam.
//!
//! Speaks enough of the legacy `api.php` JSON dialect for session-level
//! tests: account login (optionally with a `NeedToken` round-trip), revisioned
//! pages, edits with conflict detection, section outlines, paginated lists and
//! media files. Every request is journaled so tests can assert what went over
//! the wire. Nothing here touches the network.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use serde_json::{json, Map, Value};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use url::Url;
use wiki_api::{ApiError, FormBody, Transport};

/// Endpoint every [`MockWiki`] claims to serve.
pub const MOCK_ENDPOINT: &str = "https://wiki.test/w/api.php";

/// Edit token issued to logged-in users.
pub const MOCK_EDIT_TOKEN: &str = "d41d8cd98f00b204e9800998ecf8427e+\\";

/// Base URL uploaded files are served from.
pub const MOCK_UPLOAD_BASE: &str = "https://upload.wiki.test/images";

/// Form field carrying the list continuation offset.
pub const CONTINUE_PARAM: &str = "offset";

const ANONYMOUS_EDIT_TOKEN: &str = "+\\";
const SEED_USER: &str = "MediaWiki default";
// 2012-10-13T00:00:00Z. The clock advances one minute per saved revision.
const CLOCK_EPOCH: i64 = 1_350_086_400;

type Params = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One request as the mock received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    /// Query-string and form parameters merged; form values win.
    pub params: BTreeMap<String, String>,
}

impl RecordedRequest {
    pub fn action(&self) -> Option<&str> {
        self.param("action")
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRevision {
    pub revid: u64,
    pub timestamp: String,
    pub user: String,
    pub content: String,
}

#[derive(Debug)]
struct MockPage {
    page_id: u64,
    /// Oldest first.
    revisions: Vec<MockRevision>,
    prop_lists: BTreeMap<String, Vec<Value>>,
}

impl MockPage {
    fn new(page_id: u64) -> Self {
        Self {
            page_id,
            revisions: Vec::new(),
            prop_lists: BTreeMap::new(),
        }
    }

    fn latest(&self) -> Option<&MockRevision> {
        self.revisions.last()
    }
}

#[derive(Debug, Clone)]
struct MockFile {
    url: String,
    user: String,
}

#[derive(Debug)]
enum Failure {
    Transport(String),
    Body(String),
}

#[derive(Debug, Default)]
struct WikiState {
    accounts: BTreeMap<String, String>,
    require_login_token: bool,
    login_token: Option<String>,
    login_attempts: u64,
    user: Option<String>,
    pages: BTreeMap<String, MockPage>,
    files: BTreeMap<String, MockFile>,
    lists: BTreeMap<String, Vec<Vec<Value>>>,
    minutes: i64,
    last_revid: u64,
    last_page_id: u64,
    failures: VecDeque<Failure>,
    journal: Vec<RecordedRequest>,
}

/// Deterministic single-client wiki used by `wikibot` tests.
///
/// Login state lives in the mock rather than in cookies: whoever logged in
/// last is the user every later request acts as.
#[derive(Debug, Default)]
pub struct MockWiki {
    state: Mutex<WikiState>,
}

impl MockWiki {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_account(mut self, user: &str, password: &str) -> Self {
        self.state_mut()
            .accounts
            .insert(user.to_owned(), password.to_owned());
        self
    }

    /// Answer the first login round with `NeedToken` and demand the issued
    /// token on the second.
    #[must_use]
    pub fn requiring_login_token(mut self) -> Self {
        self.state_mut().require_login_token = true;
        self
    }

    #[must_use]
    pub fn with_page(mut self, title: &str, content: &str) -> Self {
        self.state_mut()
            .push_revision(&normalize(title), SEED_USER, content.to_owned());
        self
    }

    /// Attach a `prop=<prop>` list to `title`, served unpaginated.
    #[must_use]
    pub fn with_page_list(mut self, title: &str, prop: &str, items: Vec<Value>) -> Self {
        let state = self.state_mut();
        let page = state.page_entry(&normalize(title));
        page.prop_lists.insert(prop.to_owned(), items);
        self
    }

    #[must_use]
    pub fn with_file(mut self, file_title: &str, url: &str, user: &str) -> Self {
        self.state_mut().files.insert(
            normalize(file_title),
            MockFile {
                url: url.to_owned(),
                user: user.to_owned(),
            },
        );
        self
    }

    /// Register `list=<name>`, served one batch per request.
    #[must_use]
    pub fn with_list(mut self, name: &str, batches: Vec<Vec<Value>>) -> Self {
        self.state_mut().lists.insert(name.to_owned(), batches);
        self
    }

    /// Save a revision as another user, behind the client's back.
    pub fn foreign_edit(&self, title: &str, user: &str, content: &str) -> MockRevision {
        let (_, _, revision) =
            lock(&self.state).push_revision(&normalize(title), user, content.to_owned());
        revision
    }

    pub fn advance_clock(&self, minutes: i64) {
        lock(&self.state).minutes += minutes;
    }

    /// Fail the next request below the API layer.
    pub fn fail_next_transport(&self, message: &str) {
        lock(&self.state)
            .failures
            .push_back(Failure::Transport(message.to_owned()));
    }

    /// Answer the next request with `body` verbatim.
    pub fn fail_next_with_body(&self, body: &str) {
        lock(&self.state)
            .failures
            .push_back(Failure::Body(body.to_owned()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).journal.clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.state).journal.len()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.state).journal.last().cloned()
    }

    pub fn clear_requests(&self) {
        lock(&self.state).journal.clear();
    }

    pub fn page_text(&self, title: &str) -> Option<String> {
        lock(&self.state)
            .pages
            .get(&normalize(title))
            .and_then(MockPage::latest)
            .map(|revision| revision.content.clone())
    }

    pub fn revisions(&self, title: &str) -> Vec<MockRevision> {
        lock(&self.state)
            .pages
            .get(&normalize(title))
            .map(|page| page.revisions.clone())
            .unwrap_or_default()
    }

    pub fn file_url(&self, file_title: &str) -> Option<String> {
        lock(&self.state)
            .files
            .get(&normalize(file_title))
            .map(|file| file.url.clone())
    }

    pub fn logged_in_user(&self) -> Option<String> {
        lock(&self.state).user.clone()
    }

    /// Current mock server time.
    pub fn now(&self) -> String {
        lock(&self.state).now()
    }

    fn state_mut(&mut self) -> &mut WikiState {
        match self.state.get_mut() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn handle(&self, method: Method, url: &str, form: Option<&FormBody>) -> Result<String, ApiError> {
        let parsed = Url::parse(url)
            .map_err(|error| ApiError::Transport(format!("invalid URL {url}: {error}")))?;
        let mut params: Params = parsed
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        if let Some(form) = form {
            params.extend(form.iter().map(|(key, value)| (key.clone(), value.clone())));
        }

        let mut state = lock(&self.state);
        state.journal.push(RecordedRequest {
            method,
            params: params.clone(),
        });
        match state.failures.pop_front() {
            Some(Failure::Transport(message)) => return Err(ApiError::Transport(message)),
            Some(Failure::Body(body)) => return Ok(body),
            None => {}
        }

        let action = param(&params, "action").unwrap_or_default().to_owned();
        let response = match action.as_str() {
            "edit" | "upload" | "login" if method == Method::Get => api_error(
                "mustbeposted",
                format!("The {action} module requires a POST request"),
            ),
            "login" => state.login(&params),
            "logout" => {
                state.user = None;
                json!({})
            }
            "query" => state.query(&params),
            "edit" => state.edit(&params),
            "parse" => state.parse(&params),
            "upload" => state.upload(&params),
            other => api_error(
                "unknown_action",
                format!("Unrecognized value for parameter 'action': {other}"),
            ),
        };
        Ok(response.to_string())
    }
}

impl Transport for MockWiki {
    fn endpoint(&self) -> &str {
        MOCK_ENDPOINT
    }

    fn get(&self, url: &str) -> Result<String, ApiError> {
        self.handle(Method::Get, url, None)
    }

    fn post(&self, url: &str, form: &FormBody) -> Result<String, ApiError> {
        self.handle(Method::Post, url, Some(form))
    }
}

impl WikiState {
    fn now(&self) -> String {
        let at = OffsetDateTime::UNIX_EPOCH + Duration::seconds(CLOCK_EPOCH + self.minutes * 60);
        at.format(&Rfc3339).unwrap_or_default()
    }

    fn page_entry(&mut self, title: &str) -> &mut MockPage {
        let next_page_id = self.last_page_id + 1;
        let page = self
            .pages
            .entry(title.to_owned())
            .or_insert_with(|| MockPage::new(next_page_id));
        if page.page_id == next_page_id {
            self.last_page_id = next_page_id;
        }
        page
    }

    /// Save `content` as a new revision; returns the page id, the previous
    /// revision id and the new revision.
    fn push_revision(
        &mut self,
        title: &str,
        user: &str,
        content: String,
    ) -> (u64, Option<u64>, MockRevision) {
        self.minutes += 1;
        self.last_revid += 1;
        let revision = MockRevision {
            revid: self.last_revid,
            timestamp: self.now(),
            user: user.to_owned(),
            content,
        };

        let page = self.page_entry(title);
        let previous = page.latest().map(|latest| latest.revid);
        page.revisions.push(revision.clone());
        (page.page_id, previous, revision)
    }

    fn edit_token(&self) -> &'static str {
        if self.user.is_some() {
            MOCK_EDIT_TOKEN
        } else {
            ANONYMOUS_EDIT_TOKEN
        }
    }

    /// The acting user, when the request carries their edit token.
    fn authorized(&self, params: &Params) -> Option<String> {
        let user = self.user.clone()?;
        (param(params, "token") == Some(MOCK_EDIT_TOKEN)).then_some(user)
    }

    fn login(&mut self, params: &Params) -> Value {
        let name = param(params, "lgname").unwrap_or_default().to_owned();
        let password = param(params, "lgpassword").unwrap_or_default();

        if self.require_login_token {
            let expected = self.login_token.clone();
            match (param(params, "lgtoken"), expected.as_deref()) {
                (None, _) => {
                    self.login_attempts += 1;
                    let token = format!("{:032x}", self.login_attempts);
                    self.login_token = Some(token.clone());
                    return json!({"login": {"result": "NeedToken", "token": token}});
                }
                (Some(sent), Some(expected)) if sent == expected => self.login_token = None,
                (Some(_), _) => return json!({"login": {"result": "WrongToken"}}),
            }
        }

        let result = if name.is_empty() {
            "NoName"
        } else {
            match self.accounts.get(&name).map(String::as_str) {
                None => "NotExists",
                Some(_) if password.is_empty() => "EmptyPass",
                Some(expected) if expected != password => "WrongPass",
                Some(_) => "Success",
            }
        };
        if result != "Success" {
            return json!({"login": {"result": result}});
        }

        let user_id = self
            .accounts
            .keys()
            .position(|account| *account == name)
            .map_or(0, |index| index + 1);
        self.user = Some(name.clone());
        json!({"login": {
            "result": "Success",
            "lguserid": user_id,
            "lgusername": name,
        }})
    }

    fn query(&self, params: &Params) -> Value {
        if let Some(list) = param(params, "list") {
            return self.list(list, params);
        }

        let titles: Vec<String> = param(params, "titles")
            .map(|titles| titles.split('|').map(normalize).collect())
            .unwrap_or_default();
        let props: Vec<&str> = param(params, "prop")
            .map(|props| props.split('|').collect())
            .unwrap_or_default();
        let want_token = param(params, "intoken") == Some("edit");

        let mut pages = Map::new();
        let mut missing_ids = 0i64;
        for title in &titles {
            let page = self.pages.get(title);
            let existing = page.filter(|page| !page.revisions.is_empty());

            let mut entry = Map::new();
            entry.insert("ns".to_owned(), json!(0));
            entry.insert("title".to_owned(), json!(title));
            let key = match existing {
                Some(page) => {
                    entry.insert("pageid".to_owned(), json!(page.page_id));
                    page.page_id.to_string()
                }
                None => {
                    entry.insert("missing".to_owned(), json!(""));
                    missing_ids -= 1;
                    missing_ids.to_string()
                }
            };

            for prop in &props {
                match *prop {
                    "revisions" => {
                        if let Some(page) = existing {
                            match revision_json(page, params) {
                                Ok(revision) => {
                                    entry.insert("revisions".to_owned(), json!([revision]));
                                }
                                Err(error) => return error,
                            }
                        }
                    }
                    "info" => {
                        if let Some(latest) = existing.and_then(MockPage::latest) {
                            entry.insert("lastrevid".to_owned(), json!(latest.revid));
                            entry.insert("touched".to_owned(), json!(latest.timestamp));
                        }
                        if want_token {
                            entry.insert("edittoken".to_owned(), json!(self.edit_token()));
                            entry.insert("starttimestamp".to_owned(), json!(self.now()));
                        }
                    }
                    "imageinfo" => {
                        if let Some(file) = self.files.get(title) {
                            entry.insert("imagerepository".to_owned(), json!("local"));
                            entry.insert(
                                "imageinfo".to_owned(),
                                json!([image_info(file, params)]),
                            );
                        }
                    }
                    other => {
                        if let Some(items) = page.and_then(|page| page.prop_lists.get(other)) {
                            entry.insert(other.to_owned(), json!(items));
                        }
                    }
                }
            }
            pages.insert(key, Value::Object(entry));
        }

        json!({"query": {"pages": pages}})
    }

    fn list(&self, name: &str, params: &Params) -> Value {
        let Some(batches) = self.lists.get(name) else {
            return api_error(
                "unknown_list",
                format!("Unrecognized value for parameter 'list': {name}"),
            );
        };
        let offset = param(params, CONTINUE_PARAM)
            .and_then(|offset| offset.parse::<usize>().ok())
            .unwrap_or(0);
        let batch = batches.get(offset).cloned().unwrap_or_default();

        let mut query = Map::new();
        query.insert(name.to_owned(), Value::Array(batch));
        let mut response = Map::new();
        if offset + 1 < batches.len() {
            let mut marker = Map::new();
            marker.insert(CONTINUE_PARAM.to_owned(), json!((offset + 1).to_string()));
            let mut carrier = Map::new();
            carrier.insert(name.to_owned(), Value::Object(marker));
            response.insert("query-continue".to_owned(), Value::Object(carrier));
        }
        response.insert("query".to_owned(), Value::Object(query));
        Value::Object(response)
    }

    fn edit(&mut self, params: &Params) -> Value {
        let Some(user) = self.authorized(params) else {
            return bad_token();
        };
        let title = normalize(param(params, "title").unwrap_or_default());
        if title.is_empty() {
            return api_error("missingparam", "The title parameter must be set");
        }
        let text = param(params, "text").unwrap_or_default();

        let page = self.pages.get(&title);
        let existing = page.and_then(MockPage::latest).cloned();
        if existing.is_none() && params.contains_key("nocreate") {
            return api_error("missingtitle", "The page you specified doesn't exist");
        }
        if existing.is_some() && params.contains_key("createonly") {
            return api_error(
                "articleexists",
                "The article you tried to create has been created already",
            );
        }
        if let (Some(base), Some(page)) = (param(params, "basetimestamp"), page) {
            let conflicting = page
                .revisions
                .iter()
                .any(|revision| revision.timestamp.as_str() > base && revision.user != user);
            if conflicting {
                return api_error("editconflict", "Edit conflict detected");
            }
        }

        let current = existing
            .as_ref()
            .map(|revision| revision.content.as_str())
            .unwrap_or_default();
        let content = match param(params, "section") {
            None => text.to_owned(),
            Some("new") => {
                let heading = param(params, "sectiontitle")
                    .or_else(|| param(params, "summary"))
                    .unwrap_or_default();
                append_section(current, heading, text)
            }
            Some(index) => match index
                .parse::<usize>()
                .ok()
                .and_then(|index| replace_section(current, index, text))
            {
                Some(content) => content,
                None => {
                    return api_error("nosuchsection", format!("There is no section {index}."))
                }
            },
        };

        let mut edit = Map::new();
        edit.insert("result".to_owned(), json!("Success"));
        if let Some(latest) = existing.as_ref().filter(|latest| latest.content == content) {
            let page_id = page.map_or(0, |page| page.page_id);
            edit.insert("pageid".to_owned(), json!(page_id));
            edit.insert("title".to_owned(), json!(title));
            edit.insert("nochange".to_owned(), json!(""));
            edit.insert("lastrevid".to_owned(), json!(latest.revid));
            return json!({ "edit": edit });
        }

        let (page_id, previous, revision) = self.push_revision(&title, &user, content);
        edit.insert("pageid".to_owned(), json!(page_id));
        edit.insert("title".to_owned(), json!(title));
        if previous.is_none() {
            edit.insert("new".to_owned(), json!(""));
        }
        edit.insert("oldrevid".to_owned(), json!(previous.unwrap_or(0)));
        edit.insert("newrevid".to_owned(), json!(revision.revid));
        edit.insert("newtimestamp".to_owned(), json!(revision.timestamp));
        json!({ "edit": edit })
    }

    fn parse(&self, params: &Params) -> Value {
        let (title, content) = if let Some(oldid) = param(params, "oldid") {
            let found = oldid.parse::<u64>().ok().and_then(|revid| {
                self.pages.iter().find_map(|(title, page)| {
                    page.revisions
                        .iter()
                        .find(|revision| revision.revid == revid)
                        .map(|revision| (title.clone(), revision.content.clone()))
                })
            });
            match found {
                Some(found) => found,
                None => {
                    return api_error(
                        "nosuchrevid",
                        format!("There is no revision with ID {oldid}"),
                    )
                }
            }
        } else {
            let title = normalize(param(params, "page").unwrap_or_default());
            match self.pages.get(&title).and_then(MockPage::latest) {
                Some(latest) => {
                    let content = latest.content.clone();
                    (title, content)
                }
                None => return api_error("missingtitle", "The page you specified doesn't exist"),
            }
        };

        json!({"parse": {
            "title": title,
            "sections": outline(&content, &title),
        }})
    }

    fn upload(&mut self, params: &Params) -> Value {
        let Some(user) = self.authorized(params) else {
            return bad_token();
        };
        let Some(file_name) = param(params, "filename")
            .map(normalize)
            .filter(|name| !name.is_empty())
        else {
            return api_error("missingparam", "The filename parameter must be set");
        };
        if param(params, "url").is_none() {
            return api_error("missingparam", "The url parameter must be set");
        }

        let title = format!("File:{file_name}");
        if self.files.contains_key(&title) && !params.contains_key("ignorewarnings") {
            return json!({"upload": {
                "result": "Warning",
                "warnings": {"exists": file_name},
            }});
        }

        let url = format!("{MOCK_UPLOAD_BASE}/{}", file_name.replace(' ', "_"));
        self.files.insert(
            title.clone(),
            MockFile {
                url: url.clone(),
                user: user.clone(),
            },
        );
        if !self.pages.contains_key(&title) {
            let text = param(params, "text")
                .or_else(|| param(params, "comment"))
                .unwrap_or_default()
                .to_owned();
            self.push_revision(&title, &user, text);
        }

        json!({"upload": {
            "result": "Success",
            "filename": file_name,
            "imageinfo": {"url": url, "user": user},
        }})
    }
}

fn revision_json(page: &MockPage, params: &Params) -> Result<Value, Value> {
    let revision = match param(params, "rvstartid") {
        Some(start) => {
            let start = start.parse::<u64>().unwrap_or(0);
            page.revisions
                .iter()
                .rev()
                .find(|revision| revision.revid <= start)
        }
        None => page.latest(),
    }
    .ok_or_else(|| api_error("nosuchrevid", "There is no revision with that ID"))?;

    let content = match param(params, "rvsection") {
        Some(section) => section
            .parse::<usize>()
            .ok()
            .and_then(|index| section_span(&revision.content, index))
            .map(|(start, end)| revision.content[start..end].trim_end().to_owned())
            .ok_or_else(|| {
                api_error(
                    "rvnosuchsection",
                    format!("There is no section {section} in r{}", revision.revid),
                )
            })?,
        None => revision.content.clone(),
    };

    Ok(json!({
        "revid": revision.revid,
        "user": revision.user,
        "timestamp": revision.timestamp,
        "*": content,
    }))
}

fn image_info(file: &MockFile, params: &Params) -> Value {
    let props = param(params, "iiprop").unwrap_or("timestamp|user");
    let mut info = Map::new();
    for prop in props.split('|') {
        match prop {
            "url" => {
                info.insert("url".to_owned(), json!(file.url));
            }
            "user" => {
                info.insert("user".to_owned(), json!(file.user));
            }
            _ => {}
        }
    }
    Value::Object(info)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Heading {
    offset: usize,
    level: usize,
    text: String,
}

fn headings(content: &str) -> Vec<Heading> {
    let mut found = Vec::new();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if let Some((level, text)) = heading(line.trim_end()) {
            found.push(Heading {
                offset,
                level,
                text,
            });
        }
        offset += line.len();
    }
    found
}

fn heading(line: &str) -> Option<(usize, String)> {
    let leading = line.chars().take_while(|c| *c == '=').count();
    let trailing = line.chars().rev().take_while(|c| *c == '=').count();
    let level = leading.min(trailing).min(6);
    if level == 0 || line.len() <= level * 2 {
        return None;
    }
    let text = line[level..line.len() - level].trim();
    (!text.is_empty()).then(|| (level, text.to_owned()))
}

/// Byte range of section `index`; 0 is the lead, and a section runs until the
/// next heading at the same or a shallower level.
fn section_span(content: &str, index: usize) -> Option<(usize, usize)> {
    let headings = headings(content);
    if index == 0 {
        let end = headings.first().map_or(content.len(), |first| first.offset);
        return Some((0, end));
    }
    let heading = headings.get(index - 1)?;
    let end = headings[index..]
        .iter()
        .find(|next| next.level <= heading.level)
        .map_or(content.len(), |next| next.offset);
    Some((heading.offset, end))
}

fn replace_section(content: &str, index: usize, text: &str) -> Option<String> {
    let (start, end) = section_span(content, index)?;
    let rest = &content[end..];
    let mut updated = String::with_capacity(content.len() + text.len());
    updated.push_str(&content[..start]);
    updated.push_str(text.trim_end());
    if !rest.is_empty() {
        updated.push_str("\n\n");
        updated.push_str(rest);
    }
    Some(updated)
}

fn append_section(content: &str, heading: &str, text: &str) -> String {
    let mut updated = content.trim_end().to_owned();
    if !updated.is_empty() {
        updated.push_str("\n\n");
    }
    if !heading.is_empty() {
        updated.push_str(&format!("== {heading} ==\n\n"));
    }
    updated.push_str(text.trim_end());
    updated
}

/// Parse-API section list for `content`.
fn outline(content: &str, title: &str) -> Vec<Value> {
    let mut open_levels: Vec<usize> = Vec::new();
    let mut counters: Vec<u32> = Vec::new();
    let mut sections = Vec::new();

    for (index, heading) in headings(content).into_iter().enumerate() {
        while open_levels.last().is_some_and(|level| *level >= heading.level) {
            open_levels.pop();
        }
        open_levels.push(heading.level);
        let depth = open_levels.len();
        counters.truncate(depth);
        counters.resize(depth, 0);
        counters[depth - 1] += 1;
        let number = counters
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".");

        sections.push(json!({
            "toclevel": depth,
            "level": heading.level.to_string(),
            "line": heading.text,
            "number": number,
            "index": (index + 1).to_string(),
            "fromtitle": title,
            "byteoffset": heading.offset,
            "anchor": heading.text.replace(' ', "_"),
        }));
    }
    sections
}

fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str)
}

fn normalize(title: &str) -> String {
    title.trim().replace('_', " ")
}

fn api_error(code: &str, info: impl Into<String>) -> Value {
    json!({"error": {"code": code, "info": info.into()}})
}

fn bad_token() -> Value {
    api_error("badtoken", "Invalid token")
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
