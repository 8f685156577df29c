//! Helpers shared by the reqwest-backed adapters.

use std::time::Duration;

use reqwest::Client;

const USER_AGENT: &str = concat!("buddy-backend/", env!("CARGO_PKG_VERSION"));
const PREVIEW_CHAR_LIMIT: usize = 160;

/// Build a client with a whole-request timeout and our user agent.
pub(crate) fn client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// Whitespace-compacted, truncated body text for error messages.
pub(crate) fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    match compact.char_indices().nth(PREVIEW_CHAR_LIMIT) {
        Some((cut, _)) => format!("{}...", &compact[..cut]),
        None => compact,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn preview_compacts_whitespace() {
        assert_eq!(body_preview(b"  upstream \n  down "), "upstream down");
    }

    #[rstest]
    fn preview_truncates_long_bodies() {
        let body = "x".repeat(PREVIEW_CHAR_LIMIT + 40);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), PREVIEW_CHAR_LIMIT + 3);
        assert!(preview.ends_with("..."));
    }
}
