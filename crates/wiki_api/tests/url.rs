use pretty_assertions::assert_eq;
use wiki_api::normalize_api_endpoint;

#[test]
fn url_normalization_joins_base_and_api_path() {
    assert_eq!(
        normalize_api_endpoint("https://en.wikinews.org", "/w/api.php"),
        "https://en.wikinews.org/w/api.php"
    );
}

#[test]
fn url_normalization_collapses_duplicate_slashes() {
    assert_eq!(
        normalize_api_endpoint("https://en.wikinews.org/", "w/api.php"),
        "https://en.wikinews.org/w/api.php"
    );
}

#[test]
fn url_normalization_keeps_explicit_api_php_base() {
    assert_eq!(
        normalize_api_endpoint("https://wiki.example.org/mw/api.php", "/w/api.php"),
        "https://wiki.example.org/mw/api.php"
    );
}

#[test]
fn url_normalization_falls_back_to_defaults_on_blank_input() {
    assert_eq!(
        normalize_api_endpoint("  ", ""),
        "https://test.wikipedia.org/w/api.php"
    );
}
