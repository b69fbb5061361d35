//! crates/sermon_study_core/src/prompt.rs
//!
//! Deterministic prompt construction for the two generation steps:
//! thematic analysis of the sermon, and the 5-day study plan itself.
//! Pure functions of their inputs; identical inputs yield byte-identical
//! prompt strings.

use crate::domain::{ContentAnalysis, GenerationOptions};

const ANALYSIS_PERSONA: &str = "You are a biblical content analyst. You read sermon material and \
identify its central themes and the scripture passages it draws on.";

const STUDY_PERSONA: &str = "You are an experienced Bible study author who writes warm, \
scripturally grounded study guides for everyday readers.";

/// The fixed structural progression every plan follows, regardless of topic.
/// Gives the model a stable schema to fill.
const DAY_PROGRESSION: &str = "\
Structure the five days as a fixed progression:
Day 1: Foundation. Introduce the central theme and the key passage.
Day 2: Context. Explore the biblical and historical context of the passage.
Day 3: Mid-week reflection. Slow down and reflect on what the theme asks of the reader.
Day 4: Deeper connection. Connect the theme to the wider arc of scripture.
Day 5: Personal application. Bring the theme into the reader's daily life.";

const ANALYSIS_FORMAT_DIRECTIVE: &str = "\
Respond with a single JSON object with exactly two fields: \
\"themes\" (an array of short theme strings, most prominent first) and \
\"scriptures\" (an array of scripture reference strings such as \"John 3:16\"). \
Do not include any text outside the JSON object.";

const STUDY_FORMAT_DIRECTIVE: &str = "\
Respond with a JSON array of exactly 5 objects, one per day. Each object must have \
the fields \"day\" (a number from 1 to 5), \"title\" (a short string), \"passage\" \
(a scripture reference string), and \"content\" (the full study text for that day). \
Do not include any text outside the JSON array.";

/// Builds the prompt for the thematic-analysis step.
///
/// `source_text` is whatever the caller has for the sermon: a transcript
/// when one was fetched, otherwise the video description.
pub fn analysis_prompt(title: &str, source_text: &str) -> String {
    format!(
        "{ANALYSIS_PERSONA}\n\n\
         Sermon title: {title}\n\n\
         Sermon material:\n{source_text}\n\n\
         Identify the main themes of this sermon and the scripture passages it \
         references or clearly builds on.\n\n\
         {ANALYSIS_FORMAT_DIRECTIVE}"
    )
}

/// Builds the prompt for the 5-day study plan step.
///
/// Includes the fixed persona, the supplied fields, one instruction line per
/// enabled option toggle, the fixed day progression, and the output-format
/// directive.
pub fn study_prompt(
    title: &str,
    summary: &str,
    analysis: &ContentAnalysis,
    options: &GenerationOptions,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(STUDY_PERSONA);
    prompt.push_str("\n\n");
    prompt.push_str(&format!("Sermon title: {title}\n"));
    prompt.push_str(&format!("Sermon summary: {summary}\n"));
    prompt.push_str(&format!("Key themes: {}\n", analysis.themes.join(", ")));
    prompt.push_str(&format!(
        "Scripture references: {}\n",
        analysis.scriptures.join(", ")
    ));
    prompt.push_str(&format!(
        "Intended use: {}\n",
        options.usage_mode.label()
    ));
    prompt.push_str(&format!(
        "Session length: {} per day\n",
        options.session_length
    ));
    prompt.push_str("\nWrite a 5-day Bible study guide based on this sermon.\n\n");
    prompt.push_str(DAY_PROGRESSION);
    prompt.push('\n');

    if options.deeper_analysis {
        prompt.push_str(
            "\nEach day, include a short deeper-analysis section with original \
             language insights or cross-references.\n",
        );
    }
    if options.memory_verses {
        prompt.push_str("\nEach day, include one memory verse, quoted in full.\n");
    }
    if options.action_steps {
        prompt.push_str("\nEnd each day with two or three concrete action steps.\n");
    }

    prompt.push('\n');
    prompt.push_str(STUDY_FORMAT_DIRECTIVE);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UsageMode;

    fn sample_options() -> GenerationOptions {
        GenerationOptions {
            usage_mode: UsageMode::Personal,
            start_date: None,
            session_length: "15-20 minutes".to_string(),
            deeper_analysis: false,
            memory_verses: false,
            action_steps: false,
        }
    }

    fn sample_analysis() -> ContentAnalysis {
        ContentAnalysis {
            themes: vec!["Grace".to_string(), "Forgiveness".to_string()],
            scriptures: vec!["Ephesians 2:8-9".to_string()],
        }
    }

    #[test]
    fn study_prompt_is_deterministic() {
        let options = sample_options();
        let analysis = sample_analysis();
        let a = study_prompt("Amazing Grace", "A sermon on grace.", &analysis, &options);
        let b = study_prompt("Amazing Grace", "A sermon on grace.", &analysis, &options);
        assert_eq!(a, b);
    }

    #[test]
    fn toggles_gate_their_instruction_lines() {
        let analysis = sample_analysis();
        let mut options = sample_options();

        let without = study_prompt("T", "S", &analysis, &options);
        assert!(!without.contains("memory verse"));
        assert!(!without.contains("action steps"));
        assert!(!without.contains("deeper-analysis"));

        options.deeper_analysis = true;
        options.memory_verses = true;
        options.action_steps = true;
        let with = study_prompt("T", "S", &analysis, &options);
        assert!(with.contains("memory verse"));
        assert!(with.contains("action steps"));
        assert!(with.contains("deeper-analysis"));
    }

    #[test]
    fn study_prompt_describes_fixed_progression_and_format() {
        let prompt = study_prompt("T", "S", &sample_analysis(), &sample_options());
        assert!(prompt.contains("Day 1: Foundation"));
        assert!(prompt.contains("Day 5: Personal application"));
        assert!(prompt.contains("JSON array of exactly 5 objects"));
    }

    #[test]
    fn analysis_prompt_carries_title_and_directive() {
        let prompt = analysis_prompt("The Prodigal Son", "transcript text");
        assert!(prompt.contains("The Prodigal Son"));
        assert!(prompt.contains("\"themes\""));
        assert!(prompt.contains("JSON object"));
    }
}
