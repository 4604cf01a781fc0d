//! Shared HTTP plumbing for the external services

use anyhow::{Context, Result};
use reqwest::Response;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::OutfitAiError;

const USER_AGENT: &str = concat!("OutfitAI/", env!("CARGO_PKG_VERSION"));

/// HTTP client with a request timeout and exponential backoff on transient failures
pub fn build_client(timeout_seconds: u32, max_retries: u32) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(USER_AGENT)
        .build()
        .with_context(|| "Failed to create HTTP client")?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Map a transport failure to an API error without the request URL,
/// whose query string may carry an API key
pub fn request_failed(service: &str, err: reqwest_middleware::Error) -> OutfitAiError {
    let detail = match err {
        reqwest_middleware::Error::Reqwest(e) => e.without_url().to_string(),
        reqwest_middleware::Error::Middleware(e) => redact_api_key(&format!("{e:#}")),
    };
    OutfitAiError::api(format!("{service} request failed: {detail}"))
}

/// Mask the value of any `appid=` query parameter
fn redact_api_key(text: &str) -> String {
    let mut parts = text.split("appid=");
    let mut redacted = parts.next().unwrap_or_default().to_string();
    for rest in parts {
        redacted.push_str("appid=***");
        let end = rest
            .find(|c: char| c == '&' || c == ')' || c.is_whitespace())
            .unwrap_or(rest.len());
        redacted.push_str(&rest[end..]);
    }
    redacted
}

/// Turn non-success statuses into typed errors
pub async fn ensure_success(service: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    tracing::warn!(service, %status, "Request rejected");

    let err = match status.as_u16() {
        401 | 403 => OutfitAiError::authentication(service),
        429 => OutfitAiError::rate_limited(service),
        _ => OutfitAiError::api(format!("{service} error {status}: {error_text}")),
    };
    Err(err.into())
}

/// Read the body and parse it as JSON
pub async fn parse_json<T: DeserializeOwned>(service: &str, response: Response) -> Result<T> {
    let body = response
        .text()
        .await
        .map_err(|e| {
            OutfitAiError::api(format!(
                "Failed to read {service} response: {}",
                e.without_url()
            ))
        })?;

    serde_json::from_str(&body).map_err(|e| {
        OutfitAiError::api(format!("Failed to parse {service} response: {e}")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_api_key_masks_query_value() {
        let text = "error sending request for url (http://host/weather?q=Baku&appid=abc123&units=metric)";
        let redacted = redact_api_key(text);

        assert!(!redacted.contains("abc123"));
        assert!(redacted.contains("q=Baku&appid=***&units=metric)"));
    }

    #[test]
    fn test_redact_api_key_at_end_of_text() {
        assert_eq!(redact_api_key("url?appid=abc123"), "url?appid=***");
        assert_eq!(redact_api_key("no key here"), "no key here");
    }
}
