//! crates/sermon_study_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like model providers
//! or video platforms.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{DailyStudy, Transcript, VideoMetadata};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// `Upstream` carries the classified HTTP-equivalent status of a provider
/// failure when one could be recovered, so the HTTP boundary can mirror it.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Upstream generation failure (status {status:?}): {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },
    #[error("Model output could not be parsed: {0}")]
    MalformedOutput(String),
    #[error("Generation produced no study entries")]
    EmptyResult,
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// The HTTP-equivalent status classified for this failure, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether this failure is eligible for automatic retry: rate limiting
    /// (429) or temporary unavailability (503).
    pub fn is_retriable(&self) -> bool {
        matches!(self.upstream_status(), Some(429) | Some(503))
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Generation Parameters
//=========================================================================================

/// Parameters for a single text-generation call.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Optional structured-output hint. When present, adapters that support
    /// native schema-constrained output should request it; bracket-scan
    /// extraction remains the compatibility path on the returned text.
    pub schema: Option<OutputSchema>,
}

/// A JSON schema the model is asked to conform to.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    pub name: String,
    pub schema: Value,
}

impl GenerationParams {
    pub fn new(max_output_tokens: u32, temperature: f32) -> Self {
        Self {
            max_output_tokens,
            temperature,
            schema: None,
        }
    }

    pub fn with_schema(mut self, name: &str, schema: Value) -> Self {
        self.schema = Some(OutputSchema {
            name: name.to_string(),
            schema,
        });
        self
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Sends a prompt to the generation model and returns the raw response
    /// text. Implementations own the retry policy for transient failures.
    async fn generate_text(&self, prompt: &str, params: &GenerationParams) -> PortResult<String>;
}

#[async_trait]
pub trait VideoMetadataService: Send + Sync {
    /// Returns best-effort title/author/thumbnail/duration for a video.
    /// A duration of 0 signals "unknown".
    async fn fetch_metadata(&self, video_id: &str) -> PortResult<VideoMetadata>;

    /// Fetches the caption transcript for a video, when one exists.
    async fn fetch_transcript(&self, video_id: &str) -> PortResult<Transcript>;
}

/// Pluggable authentication capability. The current deployment uses a
/// no-op implementation; the main flow never hardwires a bypass.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Validates the caller's credential, returning an opaque subject
    /// identifier when one is established.
    async fn authenticate(&self, token: Option<&str>) -> PortResult<Option<String>>;
}

/// Format of a study export artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Text,
    Markdown,
}

/// A downloadable artifact produced from one finished study day.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait StudyExportService: Send + Sync {
    /// Renders one finished study day to a downloadable artifact.
    async fn export_study(
        &self,
        study: &DailyStudy,
        format: ExportFormat,
    ) -> PortResult<ExportArtifact>;
}
