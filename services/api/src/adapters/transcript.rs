//! services/api/src/adapters/transcript.rs
//!
//! This module contains the adapter for fetching video metadata and caption
//! transcripts. It implements the `VideoMetadataService` port from the
//! `core` crate.
//!
//! Metadata comes from the oEmbed endpoint, which carries no duration, so
//! the reported duration is always 0 ("unknown"); callers that do know the
//! duration validate it themselves. Captions come from the timedtext
//! endpoint in `json3` format.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use sermon_study_core::{
    domain::{Transcript, TranscriptItem, VideoMetadata},
    ports::{PortError, PortResult, VideoMetadataService},
};
use tracing::info;

const OEMBED_URL: &str = "https://www.youtube.com/oembed";
const TIMEDTEXT_URL: &str = "https://www.youtube.com/api/timedtext";

#[derive(Debug, Deserialize)]
struct OembedResponse {
    title: String,
    author_name: String,
    thumbnail_url: String,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `VideoMetadataService` against YouTube's
/// public oEmbed and timedtext endpoints.
#[derive(Clone)]
pub struct YoutubeVideoAdapter {
    http: reqwest::Client,
}

impl YoutubeVideoAdapter {
    /// Creates a new `YoutubeVideoAdapter`.
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl VideoMetadataService for YoutubeVideoAdapter {
    async fn fetch_metadata(&self, video_id: &str) -> PortResult<VideoMetadata> {
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        let response = self
            .http
            .get(OEMBED_URL)
            .query(&[("url", watch_url.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PortError::NotFound(format!("video {video_id}")));
        }
        let oembed: OembedResponse = response
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(VideoMetadata {
            title: oembed.title,
            author: oembed.author_name,
            thumbnail_url: oembed.thumbnail_url,
            // oEmbed does not report a duration.
            duration_minutes: 0,
        })
    }

    async fn fetch_transcript(&self, video_id: &str) -> PortResult<Transcript> {
        let body = self
            .http
            .get(TIMEDTEXT_URL)
            .query(&[("v", video_id), ("lang", "en"), ("fmt", "json3")])
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .text()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // The endpoint answers an empty body when the video has no captions.
        if body.trim().is_empty() {
            return Err(PortError::NotFound(format!(
                "no captions available for video {video_id}"
            )));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| PortError::Unexpected(format!("timedtext response: {e}")))?;
        let transcript = transcript_from_json3(&value);

        if transcript.text.is_empty() {
            return Err(PortError::NotFound(format!(
                "no captions available for video {video_id}"
            )));
        }

        info!(
            video_id,
            items = transcript.items.len(),
            chars = transcript.text.len(),
            "fetched transcript"
        );
        Ok(transcript)
    }
}

/// Flattens a timedtext `json3` document into a transcript: one item per
/// caption event, with the joined text alongside.
fn transcript_from_json3(value: &Value) -> Transcript {
    let mut items = Vec::new();

    for event in value
        .get("events")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        let text: String = event
            .get("segs")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|seg| seg.get("utf8").and_then(Value::as_str))
            .collect();
        let text = text.trim().to_string();
        if text.is_empty() {
            continue;
        }

        let start_seconds = event
            .get("tStartMs")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
            / 1000.0;
        items.push(TranscriptItem {
            text,
            start_seconds,
        });
    }

    let text = items
        .iter()
        .map(|item| item.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Transcript { text, items }
}
