//! Init command implementation.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};

use crate::exit;

const CONFIG_NAME: &str = "archives.toml";

const DEFAULT_CONFIG: &str = r#"# archives configuration

# Rule codes or names to disable, e.g. ["F106", "function-cc"]
disable = []

[analyzer]
# Regex for files to include, searched in the /-prefixed path relative to
# the project root
include = '\.pyi?$'

# Regex for files and directories to exclude; directories end with /
exclude = '/(\.eggs|\.git|\.hg|\.mypy_cache|\.nox|\.tox|\.venv|env|_build|buck-out|build|dist)/'

# Extra glob patterns to exclude
# extend_exclude = ["**/migrations/**"]

# Respect .gitignore files
respect_gitignore = true

# Files that fail to parse: "report", "ignore" or "fail"
parse_errors = "report"

[output]
# "flake8", "pylint" or "json"
format = "flake8"

# Per-rule settings
# [rules.A102]
# enabled = false
"#;

/// Runs the init command in `dir`.
///
/// # Errors
///
/// Fails if a config already exists and `force` is not set, or if the file
/// cannot be written.
pub fn run(dir: &Path, force: bool) -> Result<ExitCode> {
    let config_path = dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {CONFIG_NAME}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to configure rules");
    println!("  2. Run: archives check .");

    Ok(exit::CLEAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use archives::{Config, OutputFormat, ParsePolicy, DEFAULT_EXCLUDE, DEFAULT_INCLUDE};
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_defaults() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.analyzer.include, DEFAULT_INCLUDE);
        assert_eq!(config.analyzer.exclude, DEFAULT_EXCLUDE);
        assert!(config.analyzer.respect_gitignore);
        assert_eq!(config.analyzer.parse_errors, ParsePolicy::Report);
        assert_eq!(config.output.format, OutputFormat::Flake8);
        assert!(config.disable.is_empty());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_NAME);
        std::fs::write(&path, "disable = [\"F106\"]\n").unwrap();

        assert!(run(tmp.path(), false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "disable = [\"F106\"]\n");

        run(tmp.path(), true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
