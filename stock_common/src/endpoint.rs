//! Quote API constants and helpers.

/// Base URL of the Finnhub REST API.
pub const FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";
/// Path of the single-symbol quote resource.
pub const QUOTE_PATH: &str = "quote";
/// Environment variable holding the API token.
pub const API_KEY_ENV: &str = "FINNHUB_API_KEY";
/// Seconds between scheduled refresh cycles.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;
/// Upper bound in seconds for a single symbol fetch.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Join `base_url` and the quote path, tolerating a trailing slash.
pub fn quote_url(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), QUOTE_PATH)
}
