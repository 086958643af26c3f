//! Subcommand implementations.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use archives::{Config, Discovery, ParsePolicy};

use crate::exit;

pub mod check;
pub mod doc;
pub mod init;
pub mod list_rules;
pub mod list_tags;
mod output;

/// Paths and filters shared by commands that read Python sources.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SourceArgs {
    /// Files or directories to scan
    pub paths: Vec<PathBuf>,

    /// Regex for files to include
    #[arg(long)]
    pub include: Option<String>,

    /// Regex for files and directories to exclude
    #[arg(long)]
    pub exclude: Option<String>,

    /// Skip files that fail to parse instead of reporting them
    #[arg(long)]
    pub ignore_exceptions: bool,
}

/// Files to work on, or the exit code when there are none.
pub enum Sources {
    /// Discovered files, sorted.
    Files(Vec<PathBuf>),
    /// Nothing to do.
    Done(ExitCode),
}

impl SourceArgs {
    /// Overrides `config` with the flags that were given.
    pub fn apply(&self, config: &mut Config) {
        if let Some(include) = &self.include {
            config.analyzer.include.clone_from(include);
        }
        if let Some(exclude) = &self.exclude {
            config.analyzer.exclude.clone_from(exclude);
        }
        if self.ignore_exceptions {
            config.analyzer.parse_errors = ParsePolicy::Ignore;
        }
    }

    /// Expands the paths into Python files.
    ///
    /// # Errors
    ///
    /// Returns an error if a filter in `config` does not compile.
    pub fn collect(&self, config: &Config, quiet: bool) -> Result<Sources> {
        if self.paths.is_empty() {
            eprintln!("no paths provided!");
            return Ok(Sources::Done(exit::usage()));
        }
        let files = Discovery::new(&config.analyzer)?.discover(&self.paths);
        if files.is_empty() {
            if !quiet {
                println!("no python files are detected");
            }
            return Ok(Sources::Done(exit::CLEAN));
        }
        tracing::debug!("Discovered {} files", files.len());
        Ok(Sources::Files(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        let args = SourceArgs {
            paths: vec![PathBuf::from("src")],
            include: Some(r"\.py$".to_string()),
            exclude: None,
            ignore_exceptions: true,
        };
        args.apply(&mut config);
        assert_eq!(config.analyzer.include, r"\.py$");
        assert_eq!(config.analyzer.exclude, archives::DEFAULT_EXCLUDE);
        assert_eq!(config.analyzer.parse_errors, ParsePolicy::Ignore);
    }

    #[test]
    fn no_paths_is_a_usage_error() {
        let args = SourceArgs::default();
        let outcome = args.collect(&Config::default(), true).unwrap();
        assert!(matches!(outcome, Sources::Done(_)));
    }

    #[test]
    fn bad_regex_is_an_error() {
        let args = SourceArgs {
            paths: vec![PathBuf::from(".")],
            exclude: Some("(".to_string()),
            ..SourceArgs::default()
        };
        let mut config = Config::default();
        args.apply(&mut config);
        let err = args.collect(&config, true).err().unwrap();
        assert!(err.downcast_ref::<archives::ArchivesError>().is_some());
    }
}
