//! crates/sermon_study_core/src/validate.rs
//!
//! Input-side validation for sermon links. Rejections here happen before
//! any generation call is attempted.

use crate::ports::{PortError, PortResult};

/// Reported durations above this are rejected as likely mis-specified
/// sermon links.
pub const MAX_DURATION_MINUTES: u32 = 180;

const VIDEO_ID_LEN: usize = 11;

/// Extracts the 11-character video identifier from a YouTube link.
///
/// Recognized shapes: `watch?v=<id>`, `youtu.be/<id>`, and `embed/<id>`.
pub fn extract_video_id(url: &str) -> Option<String> {
    for marker in ["watch?v=", "youtu.be/", "embed/"] {
        if let Some(pos) = url.find(marker) {
            let candidate: String = url[pos + marker.len()..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                .collect();
            if candidate.len() == VIDEO_ID_LEN {
                return Some(candidate);
            }
        }
    }
    None
}

/// Validates a sermon link and its reported duration, returning the video
/// id. A duration of 0 means "unknown" and is accepted.
pub fn validate_video_link(url: &str, duration_minutes: u32) -> PortResult<String> {
    let video_id = extract_video_id(url).ok_or_else(|| {
        PortError::Validation(format!(
            "'{url}' does not look like a YouTube video link"
        ))
    })?;

    if duration_minutes > MAX_DURATION_MINUTES {
        return Err(PortError::Validation(format!(
            "video runs {duration_minutes} minutes, which is longer than the \
             {MAX_DURATION_MINUTES}-minute limit for sermon links"
        )));
    }

    Ok(video_id)
}
