#![allow(dead_code)]

use wiki_mock::{MockWiki, MOCK_ENDPOINT};
use wikibot::wiki_api::ApiConfig;
use wikibot::{Session, WikiConfig};

pub const BOT_USER: &str = "NewsieBot";
pub const BOT_PASS: &str = "hunter2";

pub fn config() -> WikiConfig {
    WikiConfig::new(ApiConfig::new(MOCK_ENDPOINT)).with_bot_name(BOT_USER)
}

pub fn wiki() -> MockWiki {
    MockWiki::new().with_account(BOT_USER, BOT_PASS)
}

pub fn session(wiki: &MockWiki) -> Session<&MockWiki> {
    Session::with_transport(config(), wiki)
}

/// An authenticated session; the login round-trips are cleared from the
/// wiki's request journal.
pub fn logged_in(wiki: &MockWiki) -> Session<&MockWiki> {
    logged_in_with(wiki, config())
}

pub fn logged_in_with(wiki: &MockWiki, config: WikiConfig) -> Session<&MockWiki> {
    let mut session = Session::with_transport(config, wiki);
    session
        .authenticate(BOT_USER, BOT_PASS)
        .expect("fixture account should log in");
    wiki.clear_requests();
    session
}
