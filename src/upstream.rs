//! Client for the extraction API.
//!
//! One HTTP GET per request, bounded timeout, no retries. Every failure mode
//! (transport error, non-2xx status, unparseable body) collapses into
//! [`ExtractionResult::Failure`]; nothing is thrown past this boundary.

use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// Bounded timeout for one extraction call.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(20);

/// Outcome of one extraction call, consumed exactly once by a platform
/// adapter.
#[derive(Clone, Debug)]
pub enum ExtractionResult {
    /// 2xx response with a JSON body, parsed verbatim.
    Success(Value),
    /// Anything else, normalized to a user-presentable message.
    Failure(String),
}

/// HTTP client for `GET {base}/{platform}?url=...`.
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Builds a client with the bounded upstream timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Issues the extraction request for `source_url` against the platform
    /// endpoint, with any extra query parameters (e.g. a requested format).
    pub async fn extract(
        &self,
        platform_key: &str,
        source_url: &str,
        extra: &[(String, String)],
    ) -> ExtractionResult {
        let endpoint = format!("{}/{platform_key}", self.base_url);
        let mut query: Vec<(&str, &str)> = vec![("url", source_url)];
        for (k, v) in extra {
            query.push((k.as_str(), v.as_str()));
        }

        let response = match self.http.get(&endpoint).query(&query).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(platform_key, error = %e, "upstream request failed");
                return ExtractionResult::Failure(format!("request failed: {e}"));
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                warn!(platform_key, error = %e, "failed to read upstream body");
                return ExtractionResult::Failure(format!("request failed: {e}"));
            }
        };

        if status.is_success() {
            match serde_json::from_slice::<Value>(&body) {
                Ok(payload) => ExtractionResult::Success(payload),
                Err(e) => {
                    warn!(platform_key, error = %e, "upstream returned non-JSON body");
                    ExtractionResult::Failure(format!("request failed: invalid response: {e}"))
                }
            }
        } else {
            warn!(platform_key, %status, "upstream returned error status");
            ExtractionResult::Failure(error_message_for(status, &body))
        }
    }
}

/// Extracts a structured error message from an HTTP error body, falling back
/// to the bare status code when the body is not parseable JSON.
fn error_message_for(status: reqwest::StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        if let Some(message) = value.get("error").and_then(Value::as_str) {
            if !message.is_empty() {
                return message.to_string();
            }
        }
    }
    format!("request failed: HTTP {status}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn error_body_with_structured_message() {
        let body = br#"{"success": false, "error": "private post"}"#;
        assert_eq!(
            error_message_for(StatusCode::FORBIDDEN, body),
            "private post"
        );
    }

    #[test]
    fn error_body_without_message_falls_back_to_status() {
        let msg = error_message_for(StatusCode::BAD_GATEWAY, b"<html>oops</html>");
        assert!(msg.starts_with("request failed: HTTP 502"));
    }

    #[test]
    fn error_body_with_empty_message_falls_back_to_status() {
        let msg = error_message_for(StatusCode::NOT_FOUND, br#"{"error": ""}"#);
        assert!(msg.contains("404"));
    }
}
