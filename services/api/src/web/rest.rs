//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::pipeline::{self, StudyRequest};
use crate::web::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use sermon_study_core::{
    domain::{DailyStudy, TranscriptItem},
    ports::{ExportFormat, GenerationParams, PortError},
    validate,
};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate_handler,
        transcript_handler,
        create_study_handler,
        export_handler,
    ),
    components(
        schemas(
            GenerateRequest,
            GeneratePayload,
            GenerateResponse,
            ErrorBody,
            TranscriptRequest,
            TranscriptResponse,
            StudyRequest,
            ExportRequest,
        )
    ),
    tags(
        (name = "Sermon Study API", description = "API endpoints for generating 5-day Bible study guides from sermon videos.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The envelope for the raw generation proxy endpoint.
#[derive(Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// Action discriminator; only "generate" is supported.
    pub action: String,
    pub payload: GeneratePayload,
}

#[derive(Deserialize, ToSchema)]
pub struct GeneratePayload {
    /// The full prompt text to send to the model.
    pub contents: String,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.7
}

/// The success payload of the generation proxy.
#[derive(Serialize, ToSchema)]
pub struct GenerateResponse {
    pub success: bool,
    pub text: String,
}

/// The error body shared by the generation endpoints. `status` mirrors the
/// classified upstream status when one exists, 500 otherwise.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

#[derive(Deserialize, ToSchema)]
pub struct TranscriptRequest {
    /// A full video link; either this or `video_id` must be present.
    pub video_url: Option<String>,
    pub video_id: Option<String>,
}

/// Transcript lookups always answer HTTP 200; failures are reported
/// in-band through `ok` and `error`.
#[derive(Serialize, ToSchema)]
pub struct TranscriptResponse {
    pub ok: bool,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub items: Option<Vec<TranscriptItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ExportRequest {
    pub day: u8,
    pub title: String,
    #[serde(default)]
    pub passage: String,
    pub content: String,
    #[serde(default)]
    pub display_date: String,
    #[schema(value_type = String)]
    pub format: ExportFormat,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Proxy a raw prompt to the generation model.
///
/// Accepts an action discriminator and a payload of generation parameters
/// plus the prompt contents. The retry policy for transient upstream
/// failures is applied inside the generation adapter.
#[utoipa::path(
    post,
    path = "/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generation succeeded", body = GenerateResponse),
        (status = 400, description = "Unknown action", body = ErrorBody),
        (status = 429, description = "Upstream rate limit, retries exhausted", body = ErrorBody),
        (status = 500, description = "Generation failed", body = ErrorBody)
    )
)]
pub async fn generate_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, Json<ErrorBody>)> {
    if request.action != "generate" {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: format!("unsupported action '{}'", request.action),
                status: StatusCode::BAD_REQUEST.as_u16(),
            }),
        ));
    }

    let params = GenerationParams::new(
        request.payload.max_output_tokens,
        request.payload.temperature,
    );
    match app_state
        .generator
        .generate_text(&request.payload.contents, &params)
        .await
    {
        Ok(text) => Ok(Json(GenerateResponse {
            success: true,
            text,
        })),
        Err(e) => {
            error!("Generation proxy call failed: {:?}", e);
            Err(port_error_response(&e))
        }
    }
}

/// Fetch the caption transcript and metadata text for a video.
///
/// Always responds with HTTP 200; lookup failures are reported in the body.
#[utoipa::path(
    post,
    path = "/transcript",
    request_body = TranscriptRequest,
    responses(
        (status = 200, description = "Lookup result, success or in-band failure", body = TranscriptResponse)
    )
)]
pub async fn transcript_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<TranscriptRequest>,
) -> Json<TranscriptResponse> {
    let video_id = request.video_id.or_else(|| {
        request
            .video_url
            .as_deref()
            .and_then(validate::extract_video_id)
    });

    let Some(video_id) = video_id else {
        return Json(transcript_failure("request carried no recognizable video id"));
    };

    match app_state.video.fetch_transcript(&video_id).await {
        Ok(transcript) => Json(TranscriptResponse {
            ok: true,
            text: transcript.text,
            items: Some(transcript.items),
            error: None,
        }),
        Err(e) => Json(transcript_failure(&e.to_string())),
    }
}

/// Generate a complete 5-day study plan for a sermon video.
#[utoipa::path(
    post,
    path = "/studies",
    request_body = StudyRequest,
    responses(
        (status = 201, description = "Plan generated"),
        (status = 400, description = "Invalid link or duration", body = ErrorBody),
        (status = 500, description = "Generation failed", body = ErrorBody)
    )
)]
pub async fn create_study_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<StudyRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let mut request = request;

    // Best-effort title lookup when the caller sent none; a failed lookup
    // is not fatal, the prompt just carries less context.
    if request.title.trim().is_empty() {
        if let Some(video_id) = validate::extract_video_id(&request.video_url) {
            match app_state.video.fetch_metadata(&video_id).await {
                Ok(metadata) => request.title = metadata.title,
                Err(e) => warn!("Metadata lookup failed: {:?}", e),
            }
        }
    }

    match pipeline::generate_study_plan(app_state.generator.as_ref(), &request).await {
        Ok(plan) => Ok((StatusCode::CREATED, Json(plan))),
        Err(e) => {
            error!("Study generation failed: {:?}", e);
            Err(port_error_response(&e))
        }
    }
}

/// Download one finished study day as a plain-text or markdown file.
#[utoipa::path(
    post,
    path = "/export",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "The rendered artifact as an attachment"),
        (status = 500, description = "Export failed", body = ErrorBody)
    )
)]
pub async fn export_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let study = DailyStudy {
        day: request.day,
        title: request.title,
        passage: request.passage,
        content: request.content,
        display_date: request.display_date,
    };

    match app_state.export.export_study(&study, request.format).await {
        Ok(artifact) => Ok((
            [
                (header::CONTENT_TYPE, artifact.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", artifact.filename),
                ),
            ],
            artifact.bytes,
        )),
        Err(e) => {
            error!("Study export failed: {:?}", e);
            Err(port_error_response(&e))
        }
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Maps a port failure to the `{error, status}` body. Upstream statuses are
/// mirrored when classifiable; everything unclassifiable is a 500. The
/// message stays generic so half-parsed model output never reaches users.
fn port_error_response(err: &PortError) -> (StatusCode, Json<ErrorBody>) {
    let (status, message) = match err {
        PortError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        PortError::Upstream { status, .. } => (
            status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "The study generator is unavailable right now. Please try again shortly."
                .to_string(),
        ),
        PortError::MalformedOutput(_) | PortError::EmptyResult => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "No studies were generated for this sermon. Please try again.".to_string(),
        ),
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "An unexpected error occurred. Please try again.".to_string(),
        ),
    };
    (
        status,
        Json(ErrorBody {
            error: message,
            status: status.as_u16(),
        }),
    )
}

fn transcript_failure(message: &str) -> TranscriptResponse {
    TranscriptResponse {
        ok: false,
        text: String::new(),
        items: None,
        error: Some(message.to_string()),
    }
}
