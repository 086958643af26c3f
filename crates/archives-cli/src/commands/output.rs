//! Shared output formatting for lint results.
//!
//! Issues go to stdout. The trailing summary goes to stderr when something
//! was found and to stdout when the archives are complete.

use anyhow::Result;
use archives::{Failure, FailureKind, Issue, LintStats, OutputConfig, RunSummary};
use serde::Serialize;

/// Prints `summary` according to `settings`.
pub fn print(summary: &RunSummary, settings: &OutputConfig) -> Result<()> {
    match settings.format.issue_format() {
        None => print_json(summary)?,
        Some(format) => {
            for issue in summary.issues() {
                println!("{}", issue.render(format));
            }
            if !settings.quiet {
                let lines = summary_lines(summary.issue_count(), &summary.failures);
                if summary.is_clean() {
                    lines.iter().for_each(|line| println!("{line}"));
                } else {
                    lines.iter().for_each(|line| eprintln!("{line}"));
                }
            }
        }
    }
    if settings.stats {
        eprintln!("{}", stats_line(&summary.stats));
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    issues: Vec<&'a Issue>,
    failures: &'a [Failure],
    stats: &'a LintStats,
}

fn print_json(summary: &RunSummary) -> Result<()> {
    let report = JsonReport {
        issues: summary.issues().collect(),
        failures: &summary.failures,
        stats: &summary.stats,
    };
    let json = serde_json::to_string_pretty(&report)?;
    println!("{json}");
    Ok(())
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn summary_lines(issues: usize, failures: &[Failure]) -> Vec<String> {
    if issues == 0 && failures.is_empty() {
        return vec![
            "Incredible! It appears that your archives are complete!".to_string(),
            "0 issues found".to_string(),
        ];
    }
    let mut lines = vec![
        String::new(),
        "Impossible! Perhaps your archives are incomplete?".to_string(),
        format!("{issues} issue{} found", plural(issues)),
    ];
    let count = |kind: FailureKind| failures.iter().filter(|f| f.kind == kind).count();
    let unparsable = count(FailureKind::Parse);
    if unparsable > 0 {
        lines.push(format!("{unparsable} file{} failed to parse", plural(unparsable)));
    }
    let unreadable = count(FailureKind::Io);
    if unreadable > 0 {
        lines.push(format!("{unreadable} file{} could not be read", plural(unreadable)));
    }
    lines
}

fn stats_line(stats: &LintStats) -> String {
    format!(
        "visited {} modules, {} classes, {} functions ({} suppressed)",
        stats.modules,
        stats.classes,
        stats.functions,
        stats.suppressed()
    )
}
