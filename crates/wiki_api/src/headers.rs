use std::collections::BTreeMap;

use base64::{engine::general_purpose, Engine as _};

use crate::config::ApiConfig;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for wiki API requests.
pub fn build_headers(config: &ApiConfig) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    headers.insert(HEADER_ACCEPT.to_owned(), "application/json".to_owned());

    let ua = match config.user_agent.as_deref() {
        Some(explicit) if !explicit.trim().is_empty() => explicit.trim().to_owned(),
        _ => default_user_agent(),
    };
    headers.insert(HEADER_USER_AGENT.to_owned(), ua);

    if let Some((user, password)) = &config.http_auth {
        headers.insert(
            HEADER_AUTHORIZATION.to_owned(),
            basic_auth_value(user, password),
        );
    }

    headers
}

/// `Authorization` value for HTTP basic auth.
pub fn basic_auth_value(user: &str, password: &str) -> String {
    let encoded = general_purpose::STANDARD.encode(format!("{user}:{password}"));
    format!("Basic {encoded}")
}

fn default_user_agent() -> String {
    format!("wiki_api/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::{basic_auth_value, build_headers, HEADER_AUTHORIZATION, HEADER_USER_AGENT};
    use crate::config::ApiConfig;

    #[test]
    fn basic_auth_matches_rfc7617_example() {
        assert_eq!(
            basic_auth_value("Aladdin", "open sesame"),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
    }

    #[test]
    fn blank_user_agent_falls_back_to_crate_default() {
        let config = ApiConfig::default().with_user_agent("   ");
        let headers = build_headers(&config);
        assert!(headers[HEADER_USER_AGENT].starts_with("wiki_api/"));
        assert!(!headers.contains_key(HEADER_AUTHORIZATION));
    }
}
