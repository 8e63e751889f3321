//! Link-shortener client for the play URL in the summary reply.
//!
//! Calls `POST {base}/api` with `{"url": <long>}`; the service answers
//! `{"status": 200, "key": "/abc"}` where `key` is the short path.
//! Purely cosmetic: any failure returns `None` and the caller keeps the
//! long URL.

use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct ShortenResponse {
    status: Option<u16>,
    key: Option<String>,
}

/// Shortens `long_url` through the service at `base_url`.
///
/// Returns the full short link, or `None` silently on any error; the
/// reply pipeline must not fail because the shortener is down.
pub async fn shorten_url(base_url: &str, long_url: &str) -> Option<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(8))
        .build()
        .ok()?;

    let base = base_url.trim_end_matches('/');
    let api_url = format!("{}/api", base);

    let response = client
        .post(&api_url)
        .json(&serde_json::json!({ "url": long_url }))
        .send()
        .await
        .ok()?;

    if !response.status().is_success() {
        log::debug!("Shortener returned status {} for {}", response.status(), long_url);
        return None;
    }

    let data: ShortenResponse = response.json().await.ok()?;
    if data.status != Some(200) {
        log::debug!("Shortener rejected URL, status field: {:?}", data.status);
        return None;
    }

    let key = data.key?;
    Some(format!("{}{}", base, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_shorten_url_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .and(body_json(serde_json::json!({ "url": "https://cdn.example.com/v.mp4" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": 200,
                "key": "/x9k"
            })))
            .mount(&server)
            .await;

        let short = shorten_url(&server.uri(), "https://cdn.example.com/v.mp4").await;
        assert_eq!(short, Some(format!("{}/x9k", server.uri())));
    }

    #[tokio::test]
    async fn test_shorten_url_rejected_status_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": 500
            })))
            .mount(&server)
            .await;

        assert_eq!(shorten_url(&server.uri(), "https://cdn.example.com/v.mp4").await, None);
    }

    #[tokio::test]
    async fn test_shorten_url_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        assert_eq!(shorten_url(&server.uri(), "https://cdn.example.com/v.mp4").await, None);
    }

    #[tokio::test]
    async fn test_shorten_url_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        assert_eq!(shorten_url(&server.uri(), "https://cdn.example.com/v.mp4").await, None);
    }
}
