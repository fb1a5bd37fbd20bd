//! Session configuration, injected at construction.

use std::env;
use std::time::Duration;

use wiki_api::ApiConfig;

/// Default cap on retained run-log lines.
pub const DEFAULT_LOG_MAX_LINES: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiConfig {
    pub api: ApiConfig,
    /// Display name used in the run-log header and edit summaries.
    pub bot_name: Option<String>,
    /// Page the run log is flushed to at teardown, if any.
    pub log_page: Option<String>,
    /// Maximum log-prefixed lines kept in the buffer and on the log page.
    pub log_max_lines: usize,
    /// Raise per-request tracing from `debug` to `info`.
    pub verbose: bool,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            bot_name: None,
            log_page: None,
            log_max_lines: DEFAULT_LOG_MAX_LINES,
            verbose: false,
        }
    }
}

impl WikiConfig {
    pub fn new(api: ApiConfig) -> Self {
        Self {
            api,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let mut api = ApiConfig::default();
        if let Some(url) = env_string_opt("WIKIBOT_URL") {
            api.base_url = url;
        }
        if let Some(path) = env_string_opt("WIKIBOT_API_PATH") {
            api.api_path = path;
        }
        if let Some(user) = env_string_opt("WIKIBOT_HTTP_USER") {
            let password = env_string_opt("WIKIBOT_HTTP_PASS").unwrap_or_default();
            api.http_auth = Some((user, password));
        }
        if let Some(secs) = env_parse::<u64>("WIKIBOT_TIMEOUT_SECS") {
            api.timeout = Duration::from_secs(secs);
        }

        Self {
            api,
            bot_name: env_string_opt("WIKIBOT_NAME"),
            log_page: env_string_opt("WIKIBOT_LOG_PAGE"),
            log_max_lines: env_parse("WIKIBOT_LOG_MAX_LINES").unwrap_or(DEFAULT_LOG_MAX_LINES),
            verbose: env_flag("WIKIBOT_VERBOSE"),
        }
    }

    pub fn with_bot_name(mut self, name: impl Into<String>) -> Self {
        self.bot_name = Some(name.into());
        self
    }

    pub fn with_log_page(mut self, title: impl Into<String>, max_lines: usize) -> Self {
        self.log_page = Some(title.into());
        self.log_max_lines = max_lines;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string_opt(key).and_then(|value| value.trim().parse().ok())
}
