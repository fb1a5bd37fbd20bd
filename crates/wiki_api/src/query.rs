use std::collections::BTreeMap;
use std::fmt;

use url::form_urlencoded;

/// Flat key/value POST body.
pub type FormBody = BTreeMap<String, String>;

/// Response serialization requested from the API for every call.
pub const RESPONSE_FORMAT: &str = "json";

/// The `action=` module a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Query,
    Edit,
    Parse,
    Login,
    Logout,
    Upload,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Edit => "edit",
            Self::Parse => "parse",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Upload => "upload",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action-style query string: `?action=<a>&format=json&k=v...`.
///
/// Parameters keep insertion order; setting an existing key replaces its value
/// in place so the rendered string stays stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    action: Action,
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            params: Vec::new(),
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.params.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Render as a URL query string including the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::from("?"));
        serializer.append_pair("action", self.action.as_str());
        serializer.append_pair("format", RESPONSE_FORMAT);
        for (key, value) in &self.params {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}
