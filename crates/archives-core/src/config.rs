//! Configuration types for archives.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

use crate::issue::IssueFormat;
use crate::rules::{self, Rule, RuleSet};

/// Default include filter: Python sources and stubs.
pub const DEFAULT_INCLUDE: &str = r"\.pyi?$";

/// Default exclude filter: VCS, virtualenv and build directories.
pub const DEFAULT_EXCLUDE: &str =
    r"/(\.eggs|\.git|\.hg|\.mypy_cache|\.nox|\.tox|\.venv|env|_build|buck-out|build|dist)/";

/// Top-level configuration, usually read from `archives.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// File discovery and parsing.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Rule codes or names to disable.
    #[serde(default)]
    pub disable: Vec<String>,

    /// Per-rule configurations keyed by code or name.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled, by code or name.
    #[must_use]
    pub fn is_rule_enabled(&self, rule: &str) -> bool {
        let Some(rule) = rules::find(rule) else {
            return false;
        };
        let named = |entry: &String| entry == rule.code() || entry == rule.name();
        if self.disable.iter().any(named) {
            return false;
        }
        self.rules
            .iter()
            .filter(|(key, _)| named(*key))
            .all(|(_, c)| c.enabled.unwrap_or(true))
    }

    /// The active rule selection.
    ///
    /// Unknown codes are logged and otherwise ignored.
    #[must_use]
    pub fn rule_set(&self) -> RuleSet {
        let configured = self.disable.iter().chain(self.rules.keys());
        for entry in configured {
            if rules::find(entry).is_none() {
                warn!("Unknown rule in configuration: {}", entry);
            }
        }
        let disabled = rules::catalog()
            .map(Rule::code)
            .filter(|code| !self.is_rule_enabled(code));
        RuleSet::default().without(disabled)
    }
}

/// File discovery and parse settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Regex a path must match to be linted.
    #[serde(default = "default_include")]
    pub include: String,

    /// Regex excluding matching paths. Directories are matched with a
    /// trailing `/`.
    #[serde(default = "default_exclude")]
    pub exclude: String,

    /// Additional glob patterns to exclude, e.g. `"**/migrations/**"`.
    #[serde(default)]
    pub extend_exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// What to do with files that fail to parse.
    #[serde(default)]
    pub parse_errors: ParsePolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: default_exclude(),
            extend_exclude: Vec::new(),
            respect_gitignore: true,
            parse_errors: ParsePolicy::default(),
        }
    }
}

fn default_include() -> String {
    DEFAULT_INCLUDE.to_string()
}

fn default_exclude() -> String {
    DEFAULT_EXCLUDE.to_string()
}

fn default_true() -> bool {
    true
}

/// Handling of files whose source does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Log the failure, keep going, and fail the run at the end.
    #[default]
    Report,
    /// Skip the file as if it had no issues.
    Ignore,
    /// Abort the run on the first failure.
    Fail,
}

/// Output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format for issues.
    #[serde(default)]
    pub format: OutputFormat,

    /// Suppress the summary line.
    #[serde(default)]
    pub quiet: bool,

    /// Print visit counters after the summary.
    #[serde(default)]
    pub stats: bool,
}

/// Output format for a lint run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One flake8-style line per issue.
    #[default]
    Flake8,
    /// One pylint-style line per issue.
    Pylint,
    /// A single JSON document.
    Json,
}

impl OutputFormat {
    /// Line layout for text formats, `None` for JSON.
    #[must_use]
    pub fn issue_format(self) -> Option<IssueFormat> {
        match self {
            Self::Flake8 => Some(IssueFormat::Flake8),
            Self::Pylint => Some(IssueFormat::Pylint),
            Self::Json => None,
        }
    }
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert_eq!(config.analyzer.include, DEFAULT_INCLUDE);
        assert_eq!(config.analyzer.parse_errors, ParsePolicy::Report);
        assert_eq!(config.output.format, OutputFormat::Flake8);
        assert!(config.rules.is_empty());
        assert_eq!(config.rule_set().len(), 15);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
disable = ["F106", "untyped-arg"]

[analyzer]
exclude = '/(build|dist)/'
extend_exclude = ["**/migrations/**"]
parse_errors = "ignore"

[output]
format = "pylint"
stats = true

[rules.M102]
enabled = false
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.exclude, "/(build|dist)/");
        assert_eq!(config.analyzer.include, DEFAULT_INCLUDE);
        assert_eq!(config.analyzer.extend_exclude, ["**/migrations/**"]);
        assert_eq!(config.analyzer.parse_errors, ParsePolicy::Ignore);
        assert_eq!(config.output.format, OutputFormat::Pylint);
        assert!(config.output.stats);

        assert!(!config.is_rule_enabled("F106"));
        assert!(!config.is_rule_enabled("A102"));
        assert!(!config.is_rule_enabled("module-author"));
        assert!(config.is_rule_enabled("F100"));
        assert!(!config.is_rule_enabled("X000"));
        assert_eq!(config.rule_set().len(), 12);
    }

    #[test]
    fn rule_set_follows_is_rule_enabled() {
        let toml = r#"
disable = ["class-desc"]

[rules.F106]
enabled = false

[rules.F100]
enabled = true
"#;
        let config = Config::parse(toml).unwrap();
        let active = config.rule_set();
        for rule in rules::catalog() {
            assert_eq!(active.contains(rule), config.is_rule_enabled(rule.code()));
        }
        assert_eq!(active.len(), rules::catalog().count() - 2);
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("[output]\nformat = \"xml\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn json_has_no_line_layout() {
        assert_eq!(OutputFormat::Json.issue_format(), None);
        assert_eq!(OutputFormat::Pylint.issue_format(), Some(IssueFormat::Pylint));
    }
}
