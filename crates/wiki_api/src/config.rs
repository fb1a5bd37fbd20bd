use std::time::Duration;

use crate::url::{DEFAULT_API_PATH, DEFAULT_WIKI_URL};

/// Default whole-request timeout.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(60);
/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum redirects followed by the HTTP transport.
pub const MAX_REDIRECTS: usize = 10;

/// Transport configuration for wiki API requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the wiki, e.g. `https://test.wikipedia.org`.
    pub base_url: String,
    /// Path of `api.php` below the base URL.
    pub api_path: String,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// HTTP basic-auth pair for wikis behind a password-protected front end.
    /// This is unrelated to the wiki account used by `action=login`.
    pub http_auth: Option<(String, String)>,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WIKI_URL.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            user_agent: None,
            http_auth: None,
            timeout: DEFAULT_RESPONSE_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_api_path(mut self, api_path: impl Into<String>) -> Self {
        self.api_path = api_path.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_http_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.http_auth = Some((user.into(), password.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Fully-qualified `api.php` URL for this configuration.
    pub fn endpoint(&self) -> String {
        crate::url::normalize_api_endpoint(&self.base_url, &self.api_path)
    }
}
