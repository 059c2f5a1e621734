use anyhow::Result;
use console::style;

use crate::cli::OutputFormat;
use crate::extract::{BatchSummary, ExtractionPlan, FileTest};
use crate::utils::format_duration;

/// Print the subtitle streams of a file and the names they get
pub fn print_plan(plan: &ExtractionPlan, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(plan)?),
        OutputFormat::Text => println!("{}", format_plan(plan)),
    }
    Ok(())
}

/// Print the file test results
pub fn print_tests(tests: &[FileTest], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(tests)?),
        OutputFormat::Text => {
            for test in tests {
                println!("{}", format_test(test));
            }
        }
    }
    Ok(())
}

/// Print the outcome of a batch extraction
pub fn print_summary(summary: &BatchSummary, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
        OutputFormat::Text => println!("{}", format_summary(summary)),
    }
    Ok(())
}

pub fn format_plan(plan: &ExtractionPlan) -> String {
    let mut lines = vec![format!("{}", style(plan.input.display()).bold())];

    if plan.outputs.is_empty() {
        lines.push("  no text subtitle streams".to_string());
    }

    for output in &plan.outputs {
        let subtitle = &output.subtitle;
        let mut line = format!(
            "  #{} {} [{}] -> {}",
            subtitle.stream_index,
            subtitle.codec_name,
            subtitle.language.as_deref().unwrap_or("und"),
            output.path.display()
        );
        if let Some(title) = &subtitle.title {
            line.push_str(&format!(" (\"{}\")", title));
        }
        if output.exists {
            line.push_str(" [exists]");
        }
        lines.push(line);
    }

    lines.join("\n")
}

pub fn format_test(test: &FileTest) -> String {
    let verdict = if !test.is_video {
        style("skip").dim().to_string()
    } else if test.needs_processing() {
        style("extract").green().to_string()
    } else {
        style("none").yellow().to_string()
    };

    let detail = if test.is_video {
        format!("{} text subtitle stream(s)", test.text_streams)
    } else {
        "not a video file".to_string()
    };

    format!("{:<8} {} ({})", verdict, test.input.display(), detail)
}

pub fn format_summary(summary: &BatchSummary) -> String {
    let mut lines = Vec::new();

    for result in &summary.results {
        let verb = if result.dry_run { "would write" } else { "wrote" };
        for path in &result.written {
            lines.push(format!("  {} {}", verb, path.display()));
        }
        for path in &result.skipped_existing {
            lines.push(format!("  kept {}", path.display()));
        }
        if !result.dry_run && !result.written.is_empty() {
            lines.push(format!(
                "  {} done in {}",
                result.input.display(),
                format_duration(result.elapsed_secs)
            ));
        }
    }

    for failure in &summary.failures {
        lines.push(format!(
            "  {} {}: {}",
            style("failed").red(),
            failure.input.display(),
            failure.error
        ));
    }

    lines.push(format!(
        "{} file(s) processed, {} subtitle file(s), {} failure(s)",
        summary.results.len(),
        summary.files_written(),
        summary.failures.len()
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractionResult, FailedInput, PlannedOutput};
    use crate::mapper::SubtitlePlan;
    use std::path::PathBuf;

    fn plain(text: String) -> String {
        console::strip_ansi_codes(&text).into_owned()
    }

    #[test]
    fn test_format_plan() {
        let plan = ExtractionPlan {
            input: PathBuf::from("Movie.mkv"),
            duration: None,
            outputs: vec![PlannedOutput {
                subtitle: SubtitlePlan {
                    stream_id: 0,
                    stream_index: 2,
                    codec_name: "subrip".to_string(),
                    language: Some("eng".to_string()),
                    title: Some("SDH".to_string()),
                    tag: ".en.sdh".to_string(),
                },
                path: PathBuf::from("Movie.en.sdh.srt"),
                exists: true,
            }],
        };

        let text = plain(format_plan(&plan));
        assert_eq!(text, "Movie.mkv\n  #2 subrip [eng] -> Movie.en.sdh.srt (\"SDH\") [exists]");

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["outputs"][0]["tag"], ".en.sdh");
        assert_eq!(json["outputs"][0]["stream_id"], 0);
    }

    #[test]
    fn test_format_test() {
        let test = FileTest {
            input: PathBuf::from("a.mkv"),
            is_video: true,
            text_streams: 2,
        };
        assert!(plain(format_test(&test)).starts_with("extract"));

        let test = FileTest {
            input: PathBuf::from("a.txt"),
            is_video: false,
            text_streams: 0,
        };
        assert!(plain(format_test(&test)).ends_with("(not a video file)"));
    }

    #[test]
    fn test_format_summary() {
        let summary = BatchSummary {
            results: vec![ExtractionResult {
                input: PathBuf::from("a.mkv"),
                written: vec![PathBuf::from("a.en.srt")],
                skipped_existing: vec![],
                dry_run: true,
                elapsed_secs: 0.0,
                completed_at: chrono::Utc::now(),
            }],
            failures: vec![FailedInput {
                input: PathBuf::from("b.mkv"),
                error: "boom".to_string(),
            }],
        };

        let text = plain(format_summary(&summary));
        assert!(text.contains("would write a.en.srt"));
        assert!(text.contains("failed b.mkv: boom"));
        assert!(text.ends_with("1 file(s) processed, 1 subtitle file(s), 1 failure(s)"));
    }
}
