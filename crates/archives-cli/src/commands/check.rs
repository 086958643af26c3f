//! Check command implementation.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use archives::{Config, Runner};

use super::{output, SourceArgs, Sources};
use crate::config_resolver;
use crate::{exit, OutputFormat};

/// Arguments of `archives check`.
#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Output format [default: flake8, or the config's]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Comma separated rule codes or names to disable
    #[arg(long, value_delimiter = ',')]
    pub disable: Vec<String>,

    /// Print visit counters after the summary
    #[arg(long)]
    pub stats: bool,

    /// Only print issues
    #[arg(short, long)]
    pub quiet: bool,
}

impl CheckArgs {
    fn apply(&self, config: &mut Config) {
        self.sources.apply(config);
        config.disable.extend(
            self.disable
                .iter()
                .map(String::as_str)
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string),
        );
        if let Some(format) = self.format {
            config.output.format = format.into();
        }
        config.output.quiet |= self.quiet;
        config.output.stats |= self.stats;
    }
}

/// Runs the check command.
///
/// # Errors
///
/// Returns an error for unreadable configuration, bad filters, or a parse
/// failure under the fail policy.
pub fn run(args: &CheckArgs, explicit_config: Option<&Path>) -> Result<ExitCode> {
    let mut config = config_resolver::resolve(&args.sources.paths, explicit_config).load()?;
    args.apply(&mut config);

    let files = match args.sources.collect(&config, config.output.quiet)? {
        Sources::Files(files) => files,
        Sources::Done(code) => return Ok(code),
    };

    let runner = Runner::from_config(&config);
    tracing::info!("Checking {} files with {} rules", files.len(), runner.rules().len());
    let summary = runner.run(&files)?;

    output::print(&summary, &config.output)?;

    if summary.is_clean() {
        Ok(exit::CLEAN)
    } else {
        Ok(exit::issues())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(disable: &[&str]) -> CheckArgs {
        CheckArgs {
            sources: SourceArgs {
                paths: vec![PathBuf::from(".")],
                ..SourceArgs::default()
            },
            format: Some(OutputFormat::Pylint),
            disable: disable.iter().map(ToString::to_string).collect(),
            stats: true,
            quiet: false,
        }
    }

    #[test]
    fn flags_extend_config() {
        let mut config = Config::parse("disable = [\"M102\"]\n").unwrap();
        args(&["F106", " function-cc ", ""]).apply(&mut config);
        assert_eq!(config.disable, ["M102", "F106", "function-cc"]);
        assert_eq!(config.output.format, archives::OutputFormat::Pylint);
        assert!(config.output.stats);
        assert!(!config.is_rule_enabled("F102"));
    }

    #[test]
    fn quiet_in_config_survives() {
        let mut config = Config::parse("[output]\nquiet = true\n").unwrap();
        args(&[]).apply(&mut config);
        assert!(config.output.quiet);
    }
}
