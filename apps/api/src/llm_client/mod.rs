/// LLM client: the single point of entry for all outbound model calls in Postcraft.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// All LLM interactions MUST go through a `ChatModel` from this module.
///
/// Providers: OpenAI chat completions (primary) and Google Gemini (fallback).
/// Model names are hardcoded per provider to prevent drift.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

pub mod gemini;
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Sampling temperature shared by both providers.
pub const TEMPERATURE: f32 = 0.8;
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse provider response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("{provider} API key is not configured")]
    NotConfigured { provider: &'static str },
}

/// A text-completion backend. `ContentGenerator` holds two of these and
/// falls back from the first to the second.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider label persisted with each post ("openai" | "google").
    fn provider(&self) -> &'static str;

    /// Sends one user prompt with a system instruction and returns the raw text reply.
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError>;
}

/// Both providers wrap failures in `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

pub(crate) fn http_client() -> Result<Client, LlmError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?)
}

/// Sends a request built by `build`, retrying on 429, 5xx and transport errors
/// with exponential backoff. Any other non-2xx status fails immediately.
pub(crate) async fn send_with_retry<F>(provider: &str, build: F) -> Result<Response, LlmError>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // Exponential backoff: 1s, 2s
            let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
            warn!(
                "{provider} call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match build().send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(LlmError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("{provider} API returned {}: {}", status, body);
            last_error = Some(LlmError::Api {
                status: status.as_u16(),
                message: extract_error_message(body),
            });
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: extract_error_message(body),
            });
        }

        return Ok(response);
    }

    Err(retries_exhausted(last_error))
}

/// A 429 on the final attempt is reported as `RateLimited`; any other last
/// failure is returned unchanged.
fn retries_exhausted(last_error: Option<LlmError>) -> LlmError {
    match last_error {
        Some(LlmError::Api { status: 429, .. }) | None => LlmError::RateLimited {
            retries: MAX_RETRIES,
        },
        Some(e) => e,
    }
}

/// Reads a 2xx body and decodes it; malformed JSON is a `Parse` error.
pub(crate) async fn read_json<T>(response: Response) -> Result<T, LlmError>
where
    T: serde::de::DeserializeOwned,
{
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Pulls the provider's error message out of an error body, or returns the body as-is.
fn extract_error_message(body: String) -> String {
    serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
