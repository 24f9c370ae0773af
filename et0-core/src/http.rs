use reqwest::Client;
use std::time::Duration;

pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Both api.weather.gov and Nominatim reject anonymous clients.
pub const DEFAULT_USER_AGENT: &str =
    concat!("et0-calculator/", env!("CARGO_PKG_VERSION"), " (https://github.com/et0-calculator)");

/// HTTP client with the identifying User-Agent and the request timeout.
pub fn build_client(user_agent: &str) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(user_agent)
        .build()
}

pub fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
