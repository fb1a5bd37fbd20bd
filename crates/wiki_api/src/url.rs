/// Default wiki used when no base URL is configured. A test wiki is the safe
/// choice should a caller forget to point the bot elsewhere.
pub const DEFAULT_WIKI_URL: &str = "https://test.wikipedia.org";
/// Default location of `api.php` on a stock MediaWiki install.
pub const DEFAULT_API_PATH: &str = "/w/api.php";

/// Join a wiki base URL and an API path into the `api.php` endpoint.
///
/// Normalization rules:
/// 1) blank inputs fall back to the defaults
/// 2) a base URL that already ends in `api.php` is used as-is
/// 3) exactly one `/` separates base and path
pub fn normalize_api_endpoint(base_url: &str, api_path: &str) -> String {
    let base = if base_url.trim().is_empty() {
        DEFAULT_WIKI_URL
    } else {
        base_url.trim()
    };
    let base = base.trim_end_matches('/');
    if base.ends_with("api.php") {
        return base.to_string();
    }

    let path = if api_path.trim().is_empty() {
        DEFAULT_API_PATH
    } else {
        api_path.trim()
    };
    format!("{base}/{}", path.trim_start_matches('/'))
}
