//! Continuation-driven pagination over `action=query` lists.

use serde_json::Value;
use tracing::debug;
use wiki_api::{Action, FormBody, Query, Transport};

use crate::error::WikiError;
use crate::page::collection_values;
use crate::session::Session;

/// A paginated query and where to find its results and continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub query: Query,
    /// Field holding the result list.
    pub result_key: String,
    /// Key of the `query-continue` entry carrying the continuation marker.
    pub continuation_key: String,
    /// When set, results sit one level deeper: in each container of this
    /// collection, under `result_key`.
    pub nested_under: Option<String>,
}

impl ListQuery {
    pub fn new(
        query: Query,
        result_key: impl Into<String>,
        continuation_key: impl Into<String>,
    ) -> Self {
        Self {
            query,
            result_key: result_key.into(),
            continuation_key: continuation_key.into(),
            nested_under: None,
        }
    }

    /// `list=<name>` query whose results and continuation share the name.
    pub fn list(name: &str) -> Self {
        Self::new(Query::new(Action::Query).param("list", name), name, name)
    }

    /// `prop=<name>` over `titles`, collected from every returned page.
    pub fn prop(name: &str, titles: &[&str]) -> Self {
        let query = Query::new(Action::Query)
            .param("prop", name)
            .param("titles", titles.join("|"));
        Self::new(query, name, name).nested_under("pages")
    }

    #[must_use]
    pub fn nested_under(mut self, key: impl Into<String>) -> Self {
        self.nested_under = Some(key.into());
        self
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.set(key, value);
        self
    }

    /// Items of one decoded response, in server order.
    fn collect_page<'a>(&self, response: &'a Value) -> Vec<&'a Value> {
        let root = response.get("query").unwrap_or(response);
        match &self.nested_under {
            Some(container_key) => collection_values(root.get(container_key))
                .into_iter()
                .flat_map(|container| collection_values(container.get(&self.result_key)))
                .collect(),
            None => collection_values(root.get(&self.result_key)),
        }
    }

    /// Continuation marker of one decoded response, if more results remain.
    fn continuation(&self, response: &Value) -> Option<FormBody> {
        let marker = response
            .get("query-continue")
            .and_then(|carrier| carrier.get(&self.continuation_key))
            .or_else(|| response.get("continue"))?;
        let fields = marker.as_object()?;
        Some(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), scalar_to_string(value)))
                .collect(),
        )
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl<T: Transport> Session<T> {
    /// Issue `list` repeatedly, merging the latest continuation marker into
    /// the next request, until no marker remains.
    ///
    /// Items are returned flat and in order without deduplication. An empty
    /// result is [`WikiError::EmptyList`], a warning.
    pub fn fetch_list(&mut self, list: &ListQuery) -> Result<Vec<Value>, WikiError> {
        let mut items = Vec::new();
        let mut body: Option<FormBody> = None;
        let mut requests = 0usize;

        loop {
            let response = self.raw_query(&list.query, body.as_ref())?;
            requests += 1;
            items.extend(list.collect_page(&response).into_iter().cloned());

            // Each marker replaces the last; stale keys must not be resent.
            match list.continuation(&response) {
                Some(marker) => body = Some(marker),
                None => break,
            }
        }

        debug!(
            list = %list.result_key,
            requests,
            items = items.len(),
            "list exhausted"
        );
        if items.is_empty() {
            return Err(WikiError::EmptyList {
                list: list.result_key.clone(),
            });
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::ListQuery;
    use serde_json::json;

    #[test]
    fn flat_results_are_read_from_the_query_object() {
        let list = ListQuery::list("allpages");
        let response = json!({
            "query": {"allpages": [{"title": "A"}, {"title": "B"}]}
        });

        let titles: Vec<&str> = list
            .collect_page(&response)
            .into_iter()
            .filter_map(|item| item["title"].as_str())
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn nested_results_concatenate_in_container_order() {
        let list = ListQuery::prop("categories", &["P1", "P2"]);
        let response = json!({
            "query": {"pages": {
                "20": {"title": "P2", "categories": [{"title": "Category:X"}]},
                "10": {"title": "P1", "categories": [{"title": "Category:Y"}, {"title": "Category:Z"}]}
            }}
        });

        let titles: Vec<&str> = list
            .collect_page(&response)
            .into_iter()
            .filter_map(|item| item["title"].as_str())
            .collect();
        assert_eq!(titles, vec!["Category:X", "Category:Y", "Category:Z"]);
    }

    #[test]
    fn continuation_prefers_keyed_query_continue() {
        let list = ListQuery::list("allpages");
        let response = json!({
            "query-continue": {"allpages": {"apfrom": "Foo", "aplimit": 2}},
            "query": {"allpages": []}
        });

        let marker = list.continuation(&response).expect("marker present");
        assert_eq!(marker.get("apfrom").map(String::as_str), Some("Foo"));
        assert_eq!(marker.get("aplimit").map(String::as_str), Some("2"));
    }

    #[test]
    fn continuation_falls_back_to_generic_continue() {
        let list = ListQuery::list("allpages");
        let response = json!({
            "continue": {"apcontinue": "Bar", "continue": "-||"},
            "query": {"allpages": []}
        });

        let marker = list.continuation(&response).expect("marker present");
        assert_eq!(marker.get("apcontinue").map(String::as_str), Some("Bar"));
        assert_eq!(marker.get("continue").map(String::as_str), Some("-||"));
    }

    #[test]
    fn no_marker_ends_pagination() {
        let list = ListQuery::list("allpages");
        assert!(list.continuation(&json!({"query": {"allpages": []}})).is_none());
    }
}
