use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use wiki_api::{decode_response, Action, FormBody, HttpTransport, Query, Transport};

use crate::config::WikiConfig;
use crate::error::WikiError;
use crate::options::{ConflictMode, NewPageMode, WriteOptions};
use crate::page::PageSnapshot;
use crate::runlog::RunLog;

const LOGIN_SUCCESS: &str = "Success";
const LOGIN_NEED_TOKEN: &str = "NeedToken";

/// Wiki account credentials, replayed on re-authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    secret: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            secret: secret.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    fn form(&self) -> FormBody {
        let mut form = FormBody::new();
        form.insert("lgname".to_owned(), self.user.clone());
        form.insert("lgpassword".to_owned(), self.secret.clone());
        form
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// The `login` object of an `action=login` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginResult {
    pub result: Option<String>,
    pub token: Option<String>,
    #[serde(rename = "lgusername")]
    pub user: Option<String>,
    #[serde(rename = "lguserid")]
    pub user_id: Option<u64>,
}

/// A stateful client for one wiki account.
///
/// A session owns a single cached [`PageSnapshot`] and a single edit token, so
/// one value must serve one logical sequence of operations at a time. Use one
/// session per worker rather than sharing.
pub struct Session<T: Transport = HttpTransport> {
    pub(crate) transport: T,
    pub(crate) config: WikiConfig,
    credentials: Option<Credentials>,
    pub(crate) authenticated: bool,
    pub(crate) edit_token: Option<String>,
    pub(crate) snapshot: Option<PageSnapshot>,
    pub(crate) write_defaults: WriteOptions,
    pub(crate) run_log: RunLog,
}

impl<T: Transport> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.transport.endpoint())
            .field("user", &self.user())
            .field("authenticated", &self.authenticated)
            .field("snapshot", &self.snapshot)
            .field("write_defaults", &self.write_defaults)
            .finish_non_exhaustive()
    }
}

impl Session<HttpTransport> {
    /// Build a session over the HTTP transport described by `config.api`.
    pub fn connect(config: WikiConfig) -> Result<Self, WikiError> {
        let transport = HttpTransport::new(config.api.clone())?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> Session<T> {
    pub fn with_transport(config: WikiConfig, transport: T) -> Self {
        let run_log = RunLog::with_header(config.bot_name.as_deref(), config.log_max_lines);
        Self {
            transport,
            config,
            credentials: None,
            authenticated: false,
            edit_token: None,
            snapshot: None,
            write_defaults: WriteOptions::default(),
            run_log,
        }
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Account name of the last successful login.
    pub fn user(&self) -> Option<&str> {
        self.credentials.as_ref().map(Credentials::user)
    }

    pub fn edit_token(&self) -> Option<&str> {
        self.edit_token.as_deref()
    }

    pub fn snapshot(&self) -> Option<&PageSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn write_options(&self) -> &WriteOptions {
        &self.write_defaults
    }

    pub fn set_bot_edit(&mut self, bot: bool) {
        self.write_defaults.bot = bot;
    }

    pub fn set_minor(&mut self, minor: bool) {
        self.write_defaults.minor = minor;
    }

    pub fn set_conflict_mode(&mut self, mode: ConflictMode) {
        self.write_defaults.conflict = mode;
    }

    pub fn set_new_page_mode(&mut self, mode: NewPageMode) {
        self.write_defaults.new_page = mode;
    }

    /// Use `timestamp` as the conflict basis of the next write, e.g. when the
    /// page being written is not the one most recently read.
    pub fn set_base_timestamp(&mut self, timestamp: &str) -> Result<(), WikiError> {
        let trimmed = timestamp.trim();
        OffsetDateTime::parse(trimmed, &Rfc3339).map_err(|_| WikiError::InvalidTimestamp {
            value: timestamp.to_owned(),
        })?;
        self.write_defaults.base_timestamp = Some(trimmed.to_owned());
        Ok(())
    }

    pub fn run_log(&self) -> &RunLog {
        &self.run_log
    }

    /// Append a note to this run's log.
    pub fn log(&mut self, line: &str) {
        self.run_log.append(line);
    }

    /// Discard every buffered log line, including the run header.
    pub fn reset_log(&mut self) {
        self.run_log.reset();
    }

    /// Log in with `user`/`secret`, following a `NeedToken` round-trip when
    /// the server asks for one. Credentials are cached on success.
    pub fn authenticate(&mut self, user: &str, secret: &str) -> Result<LoginResult, WikiError> {
        self.login_with(Credentials::new(user, secret))
    }

    /// Replay the cached credentials. Fails without contacting the server when
    /// no login has ever succeeded.
    pub fn reauthenticate(&mut self) -> Result<LoginResult, WikiError> {
        let credentials = self
            .credentials
            .clone()
            .ok_or(WikiError::MissingCredentials)?;
        self.login_with(credentials)
    }

    fn login_with(&mut self, credentials: Credentials) -> Result<LoginResult, WikiError> {
        info!(user = credentials.user(), "logging in");
        self.authenticated = false;
        self.edit_token = None;

        let mut form = credentials.form();
        let first = self.login_round(&form)?;
        let outcome = match first.result.as_deref() {
            Some(LOGIN_NEED_TOKEN) => {
                let token = first.token.ok_or(WikiError::NoLoginResult)?;
                debug!("login requires a second round-trip with a login token");
                form.insert("lgtoken".to_owned(), token);
                self.login_round(&form)?
            }
            Some(_) => first,
            None => return Err(WikiError::NoLoginResult),
        };

        match outcome.result.as_deref() {
            Some(LOGIN_SUCCESS) => {
                self.authenticated = true;
                self.credentials = Some(credentials);
                Ok(outcome)
            }
            Some(other) => {
                warn!(result = other, "login rejected");
                Err(WikiError::LoginRejected {
                    result: other.to_owned(),
                })
            }
            None => Err(WikiError::NoLoginResult),
        }
    }

    fn login_round(&self, form: &FormBody) -> Result<LoginResult, WikiError> {
        let response = self.raw_query(&Query::new(Action::Login), Some(form))?;
        match response.get("login") {
            Some(login) => LoginResult::deserialize(login)
                .map_err(|error| WikiError::shape(format!("login result: {error}"))),
            None => Ok(LoginResult::default()),
        }
    }

    /// Flush the run log to the configured log page, then log out.
    ///
    /// Best-effort: failures are traced and swallowed.
    pub fn deauthenticate(&mut self) {
        if let Some(log_page) = self.config.log_page.clone() {
            let max_lines = self.config.log_max_lines;
            if let Err(error) = self.flush_run_log(&log_page, max_lines) {
                warn!(%error, log_page, "failed to flush run log");
            }
        }

        info!("logging out");
        if let Err(error) = self.raw_query(&Query::new(Action::Logout), None) {
            warn!(%error, "logout failed");
        }
        self.authenticated = false;
        self.edit_token = None;
    }

    /// Send `query` to the API: GET without a body, POST with one.
    ///
    /// Transport failures and malformed bodies are fatal; an embedded API
    /// error object is returned as an error-class failure.
    pub fn raw_query(&self, query: &Query, body: Option<&FormBody>) -> Result<Value, WikiError> {
        let url = format!("{}{}", self.transport.endpoint(), query.to_query_string());
        let method = if body.is_some() { "POST" } else { "GET" };
        if self.config.verbose {
            info!(action = %query.action(), method, "API request");
        } else {
            debug!(action = %query.action(), method, url, "API request");
        }

        let raw = match body {
            Some(form) => self.transport.post(&url, form)?,
            None => self.transport.get(&url)?,
        };
        Ok(decode_response(&raw)?)
    }
}
