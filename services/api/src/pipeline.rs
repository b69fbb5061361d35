//! services/api/src/pipeline.rs
//!
//! The generation pipeline: a pure async function from one request to one
//! `StudyPlan` (or one error). Handlers invoke it and own no generation
//! state themselves, so a failed run can never leave a partial plan behind.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sermon_study_core::{
    domain::{GenerationOptions, StudyPlan},
    extract::{parse_content_analysis, parse_study_entries},
    plan::assemble_plan,
    ports::{GenerationParams, PortError, PortResult, TextGenerationService},
    prompt, validate,
};
use std::time::Instant;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

/// Every plan is exactly this many days.
pub const PLAN_DAYS: usize = 5;

/// One full generation request, as assembled by the caller.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StudyRequest {
    /// The sermon link as the user supplied it.
    pub video_url: String,
    /// Reported duration in minutes; 0 means "unknown".
    #[serde(default)]
    pub duration_minutes: u32,
    pub title: String,
    /// Transcript text or description, whatever the caller has.
    pub source_text: String,
    #[schema(value_type = Object)]
    pub options: GenerationOptions,
}

/// Runs the whole pipeline: validate, analyze, generate, extract, assemble.
pub async fn generate_study_plan(
    generator: &dyn TextGenerationService,
    request: &StudyRequest,
) -> PortResult<StudyPlan> {
    // Input-side validation happens before any generation call.
    let video_id = validate::validate_video_link(&request.video_url, request.duration_minutes)?;

    let analysis_start = Instant::now();
    let analysis_params = GenerationParams::new(1024, 0.3)
        .with_schema("content_analysis", analysis_schema());
    let analysis_prompt = prompt::analysis_prompt(&request.title, &request.source_text);
    let analysis_text = generator
        .generate_text(&analysis_prompt, &analysis_params)
        .await?;
    let analysis = parse_content_analysis(&analysis_text)?;
    info!(
        video_id,
        themes = analysis.themes.len(),
        "⏱️ analysis step took: {:?}",
        analysis_start.elapsed()
    );

    let study_start = Instant::now();
    let study_params =
        GenerationParams::new(4096, 0.7).with_schema("study_plan", study_schema());
    let study_prompt = prompt::study_prompt(
        &request.title,
        &request.source_text,
        &analysis,
        &request.options,
    );
    let study_text = generator.generate_text(&study_prompt, &study_params).await?;
    let entries = parse_study_entries(&study_text)?;
    info!(
        video_id,
        entries = entries.len(),
        "⏱️ study step took: {:?}",
        study_start.elapsed()
    );

    let days = assemble_plan(entries, request.options.start_date);
    if days.is_empty() {
        return Err(PortError::EmptyResult);
    }
    if days.len() != PLAN_DAYS {
        return Err(PortError::MalformedOutput(format!(
            "expected {PLAN_DAYS} study days, model returned {}",
            days.len()
        )));
    }

    Ok(StudyPlan {
        id: Uuid::new_v4(),
        video_id,
        analysis,
        days,
        created_at: Utc::now(),
    })
}

fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "themes": {"type": "array", "items": {"type": "string"}},
            "scriptures": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["themes", "scriptures"],
        "additionalProperties": false
    })
}

fn study_schema() -> Value {
    json!({
        "type": "array",
        "minItems": PLAN_DAYS,
        "maxItems": PLAN_DAYS,
        "items": {
            "type": "object",
            "properties": {
                "day": {"type": "integer", "minimum": 1, "maximum": PLAN_DAYS},
                "title": {"type": "string"},
                "passage": {"type": "string"},
                "content": {"type": "string"}
            },
            "required": ["day", "title", "passage", "content"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sermon_study_core::domain::UsageMode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// A generator that replays scripted responses in order.
    struct ScriptedGenerator {
        responses: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn new(responses: &[&str]) -> Self {
            let mut scripted: Vec<String> = responses.iter().map(|s| s.to_string()).collect();
            scripted.reverse();
            Self {
                responses: Mutex::new(scripted),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerationService for ScriptedGenerator {
        async fn generate_text(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> PortResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| PortError::Unexpected("no scripted response left".to_string()))
        }
    }

    fn request(duration_minutes: u32) -> StudyRequest {
        StudyRequest {
            video_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            duration_minutes,
            title: "Amazing Grace".to_string(),
            source_text: "A sermon about grace.".to_string(),
            options: GenerationOptions {
                usage_mode: UsageMode::SmallGroup,
                start_date: None,
                session_length: "20 minutes".to_string(),
                deeper_analysis: false,
                memory_verses: false,
                action_steps: false,
            },
        }
    }

    const ANALYSIS: &str = r#"{"themes":["Grace"],"scriptures":["Ephesians 2:8"]}"#;

    fn study_array(count: usize) -> String {
        let entries: Vec<String> = (1..=count)
            .map(|d| {
                format!(
                    r#"{{"day":{d},"title":"Day {d} title","passage":"John {d}:1","content":"Body {d}"}}"#
                )
            })
            .collect();
        format!("Here is your plan: [{}] Enjoy!", entries.join(","))
    }

    #[tokio::test]
    async fn full_pipeline_produces_a_five_day_plan() {
        let generator = ScriptedGenerator::new(&[ANALYSIS, &study_array(5)]);
        let plan = generate_study_plan(&generator, &request(45)).await.unwrap();

        assert_eq!(plan.video_id, "dQw4w9WgXcQ");
        assert_eq!(plan.analysis.themes, vec!["Grace"]);
        assert_eq!(plan.days.len(), 5);
        assert_eq!(plan.days[0].title, "Day 1 title");
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn overlong_videos_are_rejected_before_any_generation_call() {
        let generator = ScriptedGenerator::new(&[ANALYSIS, &study_array(5)]);
        let err = generate_study_plan(&generator, &request(181))
            .await
            .unwrap_err();

        assert!(matches!(err, PortError::Validation(_)));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn wrong_entry_count_is_malformed_output() {
        let generator = ScriptedGenerator::new(&[ANALYSIS, &study_array(3)]);
        let err = generate_study_plan(&generator, &request(45))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn zero_entries_is_an_empty_result() {
        let generator = ScriptedGenerator::new(&[ANALYSIS, "[]"]);
        let err = generate_study_plan(&generator, &request(45))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::EmptyResult));
    }

    #[tokio::test]
    async fn upstream_failures_propagate_unchanged() {
        let generator = ScriptedGenerator::new(&[]);
        let err = generate_study_plan(&generator, &request(45))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Unexpected(_)));
    }
}
