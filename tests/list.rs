mod fixture;

use fixture::{session, wiki};
use serde_json::json;
use wiki_mock::{Method, CONTINUE_PARAM};
use wikibot::{ListQuery, Severity, WikiError};

fn titles(items: &[serde_json::Value]) -> Vec<&str> {
    items
        .iter()
        .filter_map(|item| item["title"].as_str())
        .collect()
}

#[test]
fn three_pages_accumulate_in_order() {
    let wiki = wiki().with_list(
        "allpages",
        vec![
            vec![json!({"title": "A"}), json!({"title": "B"})],
            vec![json!({"title": "C"}), json!({"title": "D"})],
            vec![json!({"title": "E"})],
        ],
    );
    let mut session = session(&wiki);

    let items = session
        .fetch_list(&ListQuery::list("allpages"))
        .expect("list has items");
    assert_eq!(titles(&items), vec!["A", "B", "C", "D", "E"]);

    let requests = wiki.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].method, Method::Get);
    assert!(requests[0].param(CONTINUE_PARAM).is_none());
    assert_eq!(requests[1].method, Method::Post);
    assert_eq!(requests[1].param(CONTINUE_PARAM), Some("1"));
    assert_eq!(requests[2].param(CONTINUE_PARAM), Some("2"));
    assert!(requests
        .iter()
        .all(|request| request.param("list") == Some("allpages")));
}

#[test]
fn extra_parameters_ride_along_on_every_request() {
    let wiki = wiki().with_list(
        "categorymembers",
        vec![vec![json!({"title": "A"})], vec![json!({"title": "B"})]],
    );
    let mut session = session(&wiki);

    let list = ListQuery::list("categorymembers")
        .param("cmtitle", "Category:Published")
        .param("cmlimit", 500);
    let items = session.fetch_list(&list).expect("list has items");
    assert_eq!(items.len(), 2);
    assert!(wiki
        .requests()
        .iter()
        .all(|request| request.param("cmtitle") == Some("Category:Published")
            && request.param("cmlimit") == Some("500")));
}

#[test]
fn empty_list_is_a_warning() {
    let wiki = wiki().with_list("allpages", vec![Vec::new()]);
    let mut session = session(&wiki);

    let error = session
        .fetch_list(&ListQuery::list("allpages"))
        .expect_err("nothing to return");
    assert!(matches!(&error, WikiError::EmptyList { list } if list == "allpages"));
    assert_eq!(error.severity(), Severity::Warning);
}

#[test]
fn unknown_list_is_an_api_error_not_an_empty_list() {
    let wiki = wiki();
    let mut session = session(&wiki);

    let error = session
        .fetch_list(&ListQuery::list("nosuchlist"))
        .expect_err("server rejects the module");
    assert_eq!(error.api_code(), Some("unknown_list"));
    assert_eq!(error.severity(), Severity::Error);
}

#[test]
fn nested_lists_concatenate_per_page() {
    let wiki = wiki()
        .with_page("P1", "one")
        .with_page("P2", "two")
        .with_page_list(
            "P1",
            "categories",
            vec![json!({"title": "Category:X"}), json!({"title": "Category:Y"})],
        )
        .with_page_list("P2", "categories", vec![json!({"title": "Category:Z"})]);
    let mut session = session(&wiki);

    let items = session
        .fetch_list(&ListQuery::prop("categories", &["P1", "P2"]))
        .expect("both pages have categories");
    assert_eq!(
        titles(&items),
        vec!["Category:X", "Category:Y", "Category:Z"]
    );
    assert_eq!(wiki.request_count(), 1);
}

#[test]
fn transport_failure_mid_list_is_fatal() {
    let wiki = wiki().with_list(
        "allpages",
        vec![vec![json!({"title": "A"})], vec![json!({"title": "B"})]],
    );
    let mut session = session(&wiki);
    wiki.fail_next_with_body(r#"{"query-continue":{"allpages":{"offset":"1"}},"query":{"allpages":[{"title":"A"}]}}"#);
    wiki.fail_next_transport("timed out");

    let error = session
        .fetch_list(&ListQuery::list("allpages"))
        .expect_err("second page never arrives");
    assert!(error.is_fatal());
}

#[test]
fn each_request_carries_only_the_latest_continuation_marker() {
    let wiki = wiki();
    let mut session = session(&wiki);
    wiki.fail_next_with_body(
        r#"{"continue":{"rvcontinue":"r1","continue":"||"},"query":{"allpages":[{"title":"A"}]}}"#,
    );
    wiki.fail_next_with_body(
        r#"{"continue":{"apcontinue":"B","continue":"-||"},"query":{"allpages":[{"title":"B"}]}}"#,
    );
    wiki.fail_next_with_body(r#"{"query":{"allpages":[{"title":"C"}]}}"#);

    let items = session
        .fetch_list(&ListQuery::list("allpages"))
        .expect("three scripted pages");
    assert_eq!(titles(&items), vec!["A", "B", "C"]);

    let requests = wiki.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].param("rvcontinue"), Some("r1"));
    assert_eq!(requests[1].param("continue"), Some("||"));
    assert_eq!(requests[2].param("apcontinue"), Some("B"));
    assert_eq!(requests[2].param("continue"), Some("-||"));
    assert!(requests[2].param("rvcontinue").is_none());
}
