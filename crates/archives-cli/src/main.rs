//! archives CLI tool.
//!
//! Usage:
//! ```bash
//! archives check [OPTIONS] [PATHS]...
//! archives doc [PATHS]...
//! archives list-rules
//! archives list-tags
//! archives init
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use archives::ArchivesError;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Check if your code's archives are incomplete!
#[derive(Parser)]
#[command(name = "archives")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint docstrings against the code they document
    Check(commands::check::CheckArgs),

    /// Print documentation records as JSON, keyed by file name
    Doc(commands::doc::DocArgs),

    /// List all rules
    ListRules,

    /// List all docstring tags
    ListTags,

    /// Create an archives.toml in the current directory
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `path:line:column: CODE message`
    #[default]
    Flake8,
    /// `path:line: [CODE] message`
    Pylint,
    /// A single JSON document with issues, failures and counters.
    Json,
}

impl From<OutputFormat> for archives::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Flake8 => Self::Flake8,
            OutputFormat::Pylint => Self::Pylint,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// Process exit status.
mod exit {
    use std::process::ExitCode;

    /// Nothing to report.
    pub const CLEAN: ExitCode = ExitCode::SUCCESS;

    /// Issues were found or a file failed to parse.
    #[must_use]
    pub fn issues() -> ExitCode {
        ExitCode::from(1)
    }

    /// Bad usage or configuration.
    #[must_use]
    pub fn usage() -> ExitCode {
        ExitCode::from(2)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => report(err),
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Check(args) => commands::check::run(&args, config),
        Commands::Doc(args) => commands::doc::run(&args, config),
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(exit::CLEAN)
        }
        Commands::ListTags => {
            commands::list_tags::run();
            Ok(exit::CLEAN)
        }
        Commands::Init { force } => commands::init::run(std::path::Path::new("."), force),
    }
}

/// Prints a fatal error. Parse failures under the fail policy exit like
/// issues; anything else is a usage or configuration problem.
fn report(err: anyhow::Error) -> ExitCode {
    match err.downcast::<ArchivesError>() {
        Ok(error) => {
            let code = if error.is_parse_error() {
                exit::issues()
            } else {
                exit::usage()
            };
            eprintln!("{:?}", miette::Report::new(error));
            code
        }
        Err(other) => {
            eprintln!("Error: {other:#}");
            exit::usage()
        }
    }
}
