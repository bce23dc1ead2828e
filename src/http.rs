use crate::config;
use anyhow::{Context, Result};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::{header, Client, StatusCode};
use std::fmt;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;
use tracing::{debug, warn};

/// Non-retryable HTTP status, kept with its body so callers can inspect
/// provider-specific "not found" payloads.
#[derive(Debug)]
pub struct StatusError {
    pub status: StatusCode,
    pub body: String,
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let preview: String = self.body.chars().take(200).collect();
        write!(f, "Client error {}: {}", self.status, preview)
    }
}

impl std::error::Error for StatusError {}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
pub fn build_client() -> Result<Client> {
    let mut headers = header::HeaderMap::new();

    let lang = config::ACCEPT_LANGUAGES
        .choose(&mut thread_rng())
        .copied()
        .unwrap_or("en-US,en;q=0.9");
    headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_str(lang)?);
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));

    Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .user_agent(config::USER_AGENT)
        .timeout(config::HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

fn is_retryable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<StatusError>().is_none()
}

/// GET `url` with retries and return the body once it looks like JSON.
///
/// Transport failures, 429, 5xx and non-JSON bodies are retried with
/// exponential backoff. Any other non-success status fails at once with a
/// [`StatusError`].
pub async fn fetch_json(
    client: &Client,
    url: &str,
    extra_headers: &[(&str, &str)],
) -> Result<String> {
    let backoff = ExponentialBackoff::from_millis(config::RETRY_BASE_DELAY_MS)
        .factor(config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(config::RETRY_MAX_DELAY_SECS))
        .take(config::RETRY_MAX_ATTEMPTS);

    RetryIf::spawn(
        backoff,
        || async {
            let mut request = client.get(url);
            for (name, value) in extra_headers {
                request = request.header(*name, *value);
            }

            let res = request.send().await.context("Request send failed")?;
            let status = res.status();
            debug!(url, status = status.as_u16(), "HTTP response");

            if status.is_success() {
                let text = res.text().await.context("Failed to read body")?;

                if !looks_like_json(&text) {
                    let preview: String = text.chars().take(200).collect();
                    warn!(url, %preview, "Non-JSON response");
                    anyhow::bail!("Non-JSON response: {}", preview);
                }

                Ok(text)
            } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                warn!(url, status = status.as_u16(), "Retryable error");
                anyhow::bail!("Retryable error: {}", status)
            } else {
                let body = res.text().await.unwrap_or_default();
                warn!(url, status = status.as_u16(), "Client error");
                Err(StatusError { status, body }.into())
            }
        },
        is_retryable,
    )
    .await
}

pub fn looks_like_json(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_json() {
        assert!(looks_like_json("  {\"a\":1}"));
        assert!(looks_like_json("[]"));
        assert!(!looks_like_json("<html>Access Denied</html>"));
        assert!(!looks_like_json(""));
    }

    #[test]
    fn test_status_error_is_not_retried() {
        let err: anyhow::Error = StatusError {
            status: StatusCode::NOT_FOUND,
            body: "{}".to_string(),
        }
        .into();
        assert!(!is_retryable(&err));
        assert!(is_retryable(&anyhow::anyhow!("Retryable error: 503")));
    }
}
