//! crates/sermon_study_core/src/plan.rs
//!
//! Normalizes raw extracted model entries into the `DailyStudy` collection.
//!
//! Assembly never fails on a malformed individual entry: each field falls
//! back to a fixed placeholder. Overall-shape failures belong to the
//! extractor, and the entry-count contract is enforced by the pipeline.

use chrono::{Days, NaiveDate};

use crate::domain::{DailyStudy, RawStudyEntry};

const DEFAULT_PASSAGE: &str = "Scripture Reference";
const DEFAULT_CONTENT: &str = "Study content";

/// Maps extracted entries onto the daily schedule.
///
/// The day number comes from the entry's own `day` field when present,
/// otherwise from the 1-based position. With a start date, entry `i`
/// displays `start + i` days in long form ("January 5, 2025"); without
/// one, every display date is empty.
pub fn assemble_plan(entries: Vec<RawStudyEntry>, start_date: Option<NaiveDate>) -> Vec<DailyStudy> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let day = entry.day.unwrap_or((i + 1) as u8);
            DailyStudy {
                day,
                title: non_blank(entry.title).unwrap_or_else(|| format!("Day {day}")),
                passage: non_blank(entry.passage).unwrap_or_else(|| DEFAULT_PASSAGE.to_string()),
                content: non_blank(entry.content).unwrap_or_else(|| DEFAULT_CONTENT.to_string()),
                display_date: start_date
                    .and_then(|start| start.checked_add_days(Days::new(i as u64)))
                    .map(format_display_date)
                    .unwrap_or_default(),
            }
        })
        .collect()
}

/// Formats a date in long calendar form, e.g. "January 5, 2025".
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(day: Option<u8>, title: Option<&str>) -> RawStudyEntry {
        RawStudyEntry {
            day,
            title: title.map(str::to_string),
            passage: Some("John 1:1".to_string()),
            content: Some("Read and reflect.".to_string()),
        }
    }

    #[test]
    fn missing_title_defaults_to_day_placeholder() {
        let entries = vec![
            entry(Some(1), Some("Foundation")),
            entry(Some(2), Some("Context")),
            entry(Some(3), None),
            entry(Some(4), Some("Connection")),
            entry(Some(5), Some("Application")),
        ];
        let plan = assemble_plan(entries, None);
        assert_eq!(plan[2].title, "Day 3");
    }

    #[test]
    fn blank_fields_fall_back_like_missing_ones() {
        let entries = vec![RawStudyEntry {
            day: None,
            title: Some("   ".to_string()),
            passage: Some(String::new()),
            content: None,
        }];
        let plan = assemble_plan(entries, None);
        assert_eq!(plan[0].title, "Day 1");
        assert_eq!(plan[0].passage, DEFAULT_PASSAGE);
        assert_eq!(plan[0].content, DEFAULT_CONTENT);
    }

    #[test]
    fn day_comes_from_entry_or_position() {
        let entries = vec![entry(Some(4), Some("A")), entry(None, Some("B"))];
        let plan = assemble_plan(entries, None);
        assert_eq!(plan[0].day, 4);
        assert_eq!(plan[1].day, 2);
    }

    #[test]
    fn display_dates_advance_from_start_date() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let entries = (1..=5).map(|d| entry(Some(d), Some("T"))).collect();
        let plan = assemble_plan(entries, Some(start));
        let dates: Vec<&str> = plan.iter().map(|d| d.display_date.as_str()).collect();
        assert_eq!(
            dates,
            vec![
                "January 1, 2025",
                "January 2, 2025",
                "January 3, 2025",
                "January 4, 2025",
                "January 5, 2025",
            ]
        );
    }

    #[test]
    fn no_start_date_leaves_display_dates_empty() {
        let plan = assemble_plan(vec![entry(Some(1), Some("T"))], None);
        assert_eq!(plan[0].display_date, "");
    }
}
