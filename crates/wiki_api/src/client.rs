use std::fmt;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use tracing::debug;

use crate::config::{ApiConfig, MAX_REDIRECTS};
use crate::decode::decode_response;
use crate::error::ApiError;
use crate::headers::build_headers;
use crate::query::FormBody;

/// Blocking request capability the session layer calls into.
///
/// Implementations own cookie persistence: cookies set by one response must
/// be replayed on every later request made through the same value.
pub trait Transport {
    /// Fully-qualified `api.php` URL that query strings are appended to.
    fn endpoint(&self) -> &str;

    /// Issue a GET and return the raw body.
    fn get(&self, url: &str) -> Result<String, ApiError>;

    /// Issue a form-encoded POST and return the raw body.
    fn post(&self, url: &str, form: &FormBody) -> Result<String, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }

    fn get(&self, url: &str) -> Result<String, ApiError> {
        (**self).get(url)
    }

    fn post(&self, url: &str, form: &FormBody) -> Result<String, ApiError> {
        (**self).post(url, form)
    }
}

/// `reqwest` blocking transport with an in-memory cookie jar.
pub struct HttpTransport {
    http: Client,
    config: ApiConfig,
    endpoint: String,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .cookie_store(true)
            .default_headers(header_map(&config)?)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(ApiError::Client)?;
        let endpoint = config.endpoint();
        Ok(Self {
            http,
            config,
            endpoint,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

impl Transport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn get(&self, url: &str) -> Result<String, ApiError> {
        debug!(url, "GET");
        let response = self.http.get(url).send()?;
        read_body(response)
    }

    fn post(&self, url: &str, form: &FormBody) -> Result<String, ApiError> {
        debug!(url, fields = form.len(), "POST");
        let response = self.http.post(url).form(form).send()?;
        read_body(response)
    }
}

fn read_body(response: reqwest::blocking::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        // An API error object outranks the HTTP status.
        if let Err(error @ ApiError::Api { .. }) = decode_response(&body) {
            return Err(error);
        }
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body
        };
        return Err(ApiError::Status { status, message });
    }
    Ok(body)
}

fn header_map(config: &ApiConfig) -> Result<HeaderMap, ApiError> {
    let mut out = HeaderMap::new();
    for (key, value) in build_headers(config) {
        out.insert(
            HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| ApiError::Transport(format!("invalid header key: {key}")))?,
            HeaderValue::from_str(&value)
                .map_err(|_| ApiError::Transport(format!("invalid header value for {key}")))?,
        );
    }
    Ok(out)
}
