//! crates/sermon_study_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or provider format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the generated plan will be used. Shapes the tone of the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageMode {
    Personal,
    SmallGroup,
    Family,
    Youth,
}

impl UsageMode {
    /// Human-readable label used inside prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Personal => "personal devotional study",
            Self::SmallGroup => "small group discussion",
            Self::Family => "family study time",
            Self::Youth => "youth group study",
        }
    }
}

/// User-selected configuration for one generation request.
/// Constructed by the caller and passed through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub usage_mode: UsageMode,
    /// Calendar date the plan starts on; display dates stay empty without it.
    pub start_date: Option<NaiveDate>,
    /// Free-form session length label, e.g. "15-20 minutes".
    pub session_length: String,
    pub deeper_analysis: bool,
    pub memory_verses: bool,
    pub action_steps: bool,
}

/// Result of the thematic analysis step, produced once per source video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentAnalysis {
    /// Theme strings, non-empty and order-preserving.
    pub themes: Vec<String>,
    /// Scripture references mentioned in or relevant to the sermon.
    pub scriptures: Vec<String>,
}

/// One day of the assembled plan. Never mutated after creation; the
/// collection of five is replaced wholesale on each generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStudy {
    pub day: u8,
    pub title: String,
    pub passage: String,
    /// Free-form study body (text/markdown).
    pub content: String,
    /// Long-form calendar date ("January 5, 2025"), or empty when the
    /// request carried no start date.
    pub display_date: String,
}

/// A complete generated study plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPlan {
    pub id: Uuid,
    pub video_id: String,
    pub analysis: ContentAnalysis,
    pub days: Vec<DailyStudy>,
    pub created_at: DateTime<Utc>,
}

/// One entry as the model returned it, before assembly. Every field is
/// optional; the assembler applies defaults per field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStudyEntry {
    pub day: Option<u8>,
    pub title: Option<String>,
    pub passage: Option<String>,
    pub content: Option<String>,
}

/// Best-effort metadata for a source video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub author: String,
    pub thumbnail_url: String,
    /// Duration in minutes; 0 signals "unknown".
    pub duration_minutes: u32,
}

/// A fetched transcript: the joined text plus optional timed items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub items: Vec<TranscriptItem>,
}

/// One timed caption line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptItem {
    pub text: String,
    pub start_seconds: f64,
}
