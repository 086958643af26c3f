//! Multi-file runs.
//!
//! Files are parsed and linted in parallel, one task per file. Each file
//! yields its own report and counters; the summary merges them and sorts
//! everything by path, so output never depends on scheduling.

use std::path::{Path, PathBuf};

use archives_core::{
    lint, ArchivesError, Config, Issue, LintStats, Module, ParsePolicy, Result, RuleSet,
};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::parse_file;

/// A file that could not be turned into a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// File that failed.
    pub path: PathBuf,
    /// Human-readable reason, including the position for parse errors.
    pub message: String,
    /// Whether the file was unreadable or not valid Python.
    pub kind: FailureKind,
}

/// Why a file produced no module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Not valid Python.
    Parse,
    /// Missing or unreadable.
    Io,
}

/// Issues found in one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// The linted file.
    pub path: PathBuf,
    /// Issues in walk order.
    pub issues: Vec<Issue>,
    /// Visit counters for this file.
    pub stats: LintStats,
}

/// Modules parsed by [`Runner::parse`].
#[derive(Debug, Default)]
pub struct ParsedFiles {
    /// Successfully parsed modules, sorted by path.
    pub modules: Vec<Module>,
    /// Files that failed and were not ignored, sorted by path.
    pub failures: Vec<Failure>,
}

/// Outcome of [`Runner::run`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// One report per linted file, sorted by path.
    pub reports: Vec<FileReport>,
    /// Counters merged over all files.
    pub stats: LintStats,
    /// Files that could not be linted.
    pub failures: Vec<Failure>,
}

impl RunSummary {
    /// All issues, ordered by file and then walk order.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.reports.iter().flat_map(|report| report.issues.iter())
    }

    /// Total number of issues.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.reports.iter().map(|report| report.issues.len()).sum()
    }

    /// Number of files that were linted.
    #[must_use]
    pub fn files_checked(&self) -> usize {
        self.reports.len()
    }

    /// Returns true if no issue was found and every file was linted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.reports.iter().all(|r| r.issues.is_empty())
    }
}

/// Lints sets of files with a fixed rule selection and parse policy.
#[derive(Debug, Clone)]
pub struct Runner {
    rules: RuleSet,
    policy: ParsePolicy,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

impl Runner {
    /// Creates a runner with `rules` and the default parse policy.
    #[must_use]
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            policy: ParsePolicy::default(),
        }
    }

    /// Creates a runner from the rule and analyzer settings in `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rule_set()).parse_policy(config.analyzer.parse_errors)
    }

    /// Sets how files that fail to parse are handled.
    #[must_use]
    pub fn parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The active rules.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Parses `files` in parallel.
    ///
    /// # Errors
    ///
    /// Under [`ParsePolicy::Fail`], returns the first failure in path order.
    pub fn parse(&self, files: &[PathBuf]) -> Result<ParsedFiles> {
        let mut outcomes: Vec<(&Path, Result<Module>)> = files
            .par_iter()
            .map(|path| (path.as_path(), parse_file(path)))
            .collect();
        outcomes.sort_by(|a, b| a.0.cmp(b.0));

        let mut parsed = ParsedFiles::default();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(module) => parsed.modules.push(module),
                Err(e) => {
                    if let Some(failure) = self.handle_failure(path, e)? {
                        parsed.failures.push(failure);
                    }
                }
            }
        }
        Ok(parsed)
    }

    /// Parses and lints `files`.
    ///
    /// # Errors
    ///
    /// Under [`ParsePolicy::Fail`], returns the first failure in path order.
    pub fn run(&self, files: &[PathBuf]) -> Result<RunSummary> {
        info!("Found {} files to analyze", files.len());
        let ParsedFiles { modules, failures } = self.parse(files)?;

        let reports: Vec<FileReport> = modules
            .par_iter()
            .map(|module| {
                let report = lint(module, Some(&self.rules));
                FileReport {
                    path: module.path().to_path_buf(),
                    issues: report.issues,
                    stats: report.stats,
                }
            })
            .collect();

        let mut stats = LintStats::default();
        for report in &reports {
            stats.merge(&report.stats);
        }

        let summary = RunSummary {
            reports,
            stats,
            failures,
        };
        info!(
            "Analysis complete: {} issues in {} files ({} failed)",
            summary.issue_count(),
            summary.files_checked(),
            summary.failures.len()
        );
        Ok(summary)
    }

    /// Applies the parse policy. IO failures are never ignored.
    fn handle_failure(&self, path: &Path, error: ArchivesError) -> Result<Option<Failure>> {
        if self.policy == ParsePolicy::Fail {
            return Err(error);
        }
        if error.is_parse_error() && self.policy == ParsePolicy::Ignore {
            debug!("Ignoring unparsable file {}: {}", path.display(), error);
            return Ok(None);
        }
        let kind = if error.is_parse_error() {
            warn!("Failed to parse {}: {}", path.display(), error);
            FailureKind::Parse
        } else {
            warn!("Failed to read {}: {}", path.display(), error);
            FailureKind::Io
        };
        Ok(Some(Failure {
            path: path.to_path_buf(),
            message: error.to_string(),
            kind,
        }))
    }
}
