//! services/api/src/adapters/study_llm.rs
//!
//! This module contains the adapter for the study-generation LLM.
//! It implements the `TextGenerationService` port from the `core` crate,
//! wrapping the model call in the retry policy for transient failures.

use std::future::Future;
use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use sermon_study_core::ports::{GenerationParams, PortError, PortResult, TextGenerationService};
use tokio::time::sleep;
use tracing::warn;

/// Total attempt budget per generation call.
const MAX_ATTEMPTS: u32 = 3;
/// First backoff delay; doubles after each retriable failure (800, 1600).
const INITIAL_BACKOFF: Duration = Duration::from_millis(800);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextGenerationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiStudyAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    /// Cumulative deadline for one call, sleeps between retries included.
    deadline: Duration,
}

impl OpenAiStudyAdapter {
    /// Creates a new `OpenAiStudyAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, deadline: Duration) -> Self {
        Self {
            client,
            model,
            deadline,
        }
    }

    fn build_request(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> PortResult<CreateChatCompletionRequest> {
        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(messages)
            .max_tokens(params.max_output_tokens)
            .temperature(params.temperature)
            .n(1);

        // Ask for the model's native schema-constrained output when the
        // caller supplied a schema hint. The extractor still bracket-scans
        // the returned text as the compatibility path.
        if let Some(schema) = &params.schema {
            builder.response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    name: schema.name.clone(),
                    description: None,
                    schema: Some(schema.schema.clone()),
                    strict: Some(false),
                },
            });
        }

        builder.build().map_err(|e| PortError::Unexpected(e.to_string()))
    }

    /// A single attempt against the chat completions endpoint.
    async fn attempt(&self, request: CreateChatCompletionRequest) -> PortResult<String> {
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(upstream_error)?;

        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(PortError::Unexpected(
                    "Generation LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Generation LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}

//=========================================================================================
// `TextGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextGenerationService for OpenAiStudyAdapter {
    /// Sends a prompt to the model, retrying transient failures, and
    /// returns the raw response text.
    async fn generate_text(&self, prompt: &str, params: &GenerationParams) -> PortResult<String> {
        let request = self.build_request(prompt, params)?;

        tokio::time::timeout(
            self.deadline,
            call_with_retry(|| self.attempt(request.clone())),
        )
        .await
        .map_err(|_| PortError::Upstream {
            status: None,
            message: format!(
                "generation did not complete within {} seconds",
                self.deadline.as_secs()
            ),
        })?
    }
}

//=========================================================================================
// Retry Policy
//=========================================================================================

/// Runs `call` up to [`MAX_ATTEMPTS`] times.
///
/// Only failures classified as retriable (status 429 or 503) are retried;
/// the delay starts at [`INITIAL_BACKOFF`] and doubles after each failed
/// attempt. Non-retriable failures and exhaustion surface the last error
/// immediately.
async fn call_with_retry<F, Fut>(mut call: F) -> PortResult<String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PortResult<String>>,
{
    let mut delay = INITIAL_BACKOFF;
    let mut attempt = 1u32;
    loop {
        match call().await {
            Ok(text) => return Ok(text),
            Err(err) if attempt < MAX_ATTEMPTS && err.is_retriable() => {
                warn!(
                    attempt,
                    status = err.upstream_status(),
                    delay_ms = delay.as_millis() as u64,
                    "transient generation failure, retrying"
                );
                sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

//=========================================================================================
// Error Classification
//=========================================================================================

/// Converts a provider error into `PortError::Upstream`, classifying the
/// HTTP-equivalent status in priority order: the transport error's own
/// status, a numeric code in the provider's error body, then a `[NNN]`
/// pattern embedded in the message.
fn upstream_error(err: OpenAIError) -> PortError {
    let status = match &err {
        OpenAIError::Reqwest(e) => e.status().map(|s| s.as_u16()),
        OpenAIError::ApiError(api) => {
            let code = api.code.as_ref().map(|c| serde_json::Value::String(c.clone()));
            status_from_code(code.as_ref())
        }
        _ => None,
    }
    .or_else(|| status_from_message(&err.to_string()));

    PortError::Upstream {
        status,
        message: err.to_string(),
    }
}

fn status_from_code(code: Option<&serde_json::Value>) -> Option<u16> {
    match code? {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Scans an error message for an embedded `[NNN]` status pattern.
fn status_from_message(message: &str) -> Option<u16> {
    let pattern = Regex::new(r"\[(\d{3})\]").unwrap();
    pattern
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn upstream(status: Option<u16>) -> PortError {
        PortError::Upstream {
            status,
            message: "simulated upstream failure".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_attempts_are_retried_with_doubling_backoff() {
        let attempts = AtomicU32::new(0);
        let started = Instant::now();

        let result = call_with_retry(|| {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(upstream(Some(429)))
                } else {
                    Ok("generated text".to_string())
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "generated text");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // Two waits: 800ms then 1600ms.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(2400));
        assert!(elapsed < Duration::from_millis(2600));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retriable_status_fails_immediately() {
        let attempts = AtomicU32::new(0);
        let started = Instant::now();

        let result = call_with_retry(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(upstream(Some(400))) }
        })
        .await;

        assert!(matches!(
            result,
            Err(PortError::Upstream {
                status: Some(400),
                ..
            })
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_attempts_surface_the_last_error() {
        let attempts = AtomicU32::new(0);

        let result = call_with_retry(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(upstream(Some(503))) }
        })
        .await;

        assert!(matches!(
            result,
            Err(PortError::Upstream {
                status: Some(503),
                ..
            })
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unclassifiable_errors_are_not_retried() {
        let attempts = AtomicU32::new(0);

        let result = call_with_retry(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(upstream(None)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn status_is_extracted_from_bracketed_message_pattern() {
        assert_eq!(
            status_from_message("upstream call failed [503] service unavailable"),
            Some(503)
        );
        assert_eq!(status_from_message("no status in here"), None);
    }

    #[test]
    fn status_is_extracted_from_numeric_or_string_code() {
        assert_eq!(
            status_from_code(Some(&serde_json::json!(429))),
            Some(429)
        );
        assert_eq!(
            status_from_code(Some(&serde_json::json!("503"))),
            Some(503)
        );
        assert_eq!(
            status_from_code(Some(&serde_json::json!("rate_limit_exceeded"))),
            None
        );
        assert_eq!(status_from_code(None), None);
    }
}
