mod fixture;

use fixture::{session, wiki};
use pretty_assertions::assert_eq;
use wikibot::{Severity, TocEntry, WikiError};

const ARTICLE: &str = "Intro\n== History ==\nOld days.\n=== Early years ===\nVery old.\n== Today ==\nNow.\n";

#[test]
fn outline_starts_with_the_page_itself() {
    let wiki = wiki().with_page("Article", ARTICLE);
    let session = session(&wiki);

    let toc = session.get_toc("Article", None).expect("page has sections");
    assert_eq!(toc.len(), 4);
    assert_eq!(toc[0], TocEntry::root("Article"));

    let outline: Vec<(u32, &str, &str)> = toc[1..]
        .iter()
        .map(|entry| (entry.toclevel, entry.number.as_str(), entry.line.as_str()))
        .collect();
    assert_eq!(
        outline,
        vec![
            (1, "1", "History"),
            (2, "1.1", "Early years"),
            (1, "2", "Today"),
        ]
    );
    assert_eq!(toc[1].fromtitle.as_deref(), Some("Article"));
    assert_eq!(toc[2].level, "3");
}

#[test]
fn page_without_headings_has_only_the_root_entry() {
    let wiki = wiki().with_page("Stub", "Just a sentence.");
    let session = session(&wiki);

    let toc = session.get_toc("Stub", None).expect("page exists");
    assert_eq!(toc, vec![TocEntry::root("Stub")]);
    // Empty outline triggers a probe read.
    assert_eq!(wiki.request_count(), 2);
}

#[test]
fn missing_page_is_a_warning() {
    let wiki = wiki();
    let session = session(&wiki);

    let error = session
        .get_toc("Nowhere", None)
        .expect_err("page does not exist");
    assert!(matches!(&error, WikiError::TocForMissingPage { title } if title == "Nowhere"));
    assert_eq!(error.severity(), Severity::Warning);
}

#[test]
fn revision_outline_uses_oldid() {
    let wiki = wiki().with_page("Article", ARTICLE);
    let first = wiki.revisions("Article")[0].revid;
    wiki.foreign_edit("Article", "Editor", "No more sections.");
    let session = session(&wiki);

    let toc = session
        .get_toc("Article", Some(first))
        .expect("old revision has sections");
    assert_eq!(toc.len(), 4);

    let request = wiki.requests().remove(0);
    assert_eq!(request.action(), Some("parse"));
    assert_eq!(request.param("oldid"), Some(first.to_string().as_str()));
    assert!(request.param("page").is_none());
}
