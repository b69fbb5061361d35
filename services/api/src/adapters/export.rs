//! services/api/src/adapters/export.rs
//!
//! This module contains the adapter that renders one finished study day
//! into a downloadable artifact. It implements the `StudyExportService`
//! port from the `core` crate. Plain text and markdown only; richer
//! document formats are a client concern.

use async_trait::async_trait;
use sermon_study_core::{
    domain::DailyStudy,
    ports::{ExportArtifact, ExportFormat, PortResult, StudyExportService},
};

/// An adapter that implements `StudyExportService` with simple text formats.
#[derive(Clone, Default)]
pub struct TextExportAdapter;

impl TextExportAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StudyExportService for TextExportAdapter {
    async fn export_study(
        &self,
        study: &DailyStudy,
        format: ExportFormat,
    ) -> PortResult<ExportArtifact> {
        let (body, content_type, extension) = match format {
            ExportFormat::Text => (render_text(study), "text/plain; charset=utf-8", "txt"),
            ExportFormat::Markdown => (render_markdown(study), "text/markdown; charset=utf-8", "md"),
        };

        Ok(ExportArtifact {
            filename: format!("day-{}-{}.{extension}", study.day, filename_slug(&study.title)),
            content_type,
            bytes: body.into_bytes(),
        })
    }
}

fn render_text(study: &DailyStudy) -> String {
    let mut out = format!("Day {}: {}\n", study.day, study.title);
    if !study.display_date.is_empty() {
        out.push_str(&study.display_date);
        out.push('\n');
    }
    out.push_str(&format!("Passage: {}\n\n", study.passage));
    out.push_str(&study.content);
    out.push('\n');
    out
}

fn render_markdown(study: &DailyStudy) -> String {
    let mut out = format!("# Day {}: {}\n\n", study.day, study.title);
    if !study.display_date.is_empty() {
        out.push_str(&format!("*{}*\n\n", study.display_date));
    }
    out.push_str(&format!("**Passage:** {}\n\n", study.passage));
    out.push_str(&study.content);
    out.push('\n');
    out
}

/// Lowercases the title and keeps only alphanumerics and hyphens so the
/// result is safe in a Content-Disposition filename.
fn filename_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut prev_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_hyphen = false;
        } else if !prev_hyphen && !slug.is_empty() {
            slug.push('-');
            prev_hyphen = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "study".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_study() -> DailyStudy {
        DailyStudy {
            day: 3,
            title: "Mid-week Reflection".to_string(),
            passage: "Psalm 46:10".to_string(),
            content: "Be still.".to_string(),
            display_date: "January 3, 2025".to_string(),
        }
    }

    #[tokio::test]
    async fn text_export_names_the_file_from_day_and_title() {
        let artifact = TextExportAdapter::new()
            .export_study(&sample_study(), ExportFormat::Text)
            .await
            .unwrap();
        assert_eq!(artifact.filename, "day-3-mid-week-reflection.txt");
        assert_eq!(artifact.content_type, "text/plain; charset=utf-8");
        let body = String::from_utf8(artifact.bytes).unwrap();
        assert!(body.contains("Day 3: Mid-week Reflection"));
        assert!(body.contains("Passage: Psalm 46:10"));
    }

    #[tokio::test]
    async fn markdown_export_uses_markdown_structure() {
        let artifact = TextExportAdapter::new()
            .export_study(&sample_study(), ExportFormat::Markdown)
            .await
            .unwrap();
        assert_eq!(artifact.filename, "day-3-mid-week-reflection.md");
        let body = String::from_utf8(artifact.bytes).unwrap();
        assert!(body.starts_with("# Day 3: Mid-week Reflection"));
        assert!(body.contains("**Passage:** Psalm 46:10"));
    }

    #[test]
    fn slug_handles_awkward_titles() {
        assert_eq!(filename_slug("Grace & Peace!"), "grace-peace");
        assert_eq!(filename_slug("***"), "study");
    }
}
