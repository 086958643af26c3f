//! Doc command implementation.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use archives::record::{self, ModuleRecord};
use archives::{Module, Runner};
use tracing::{debug, warn};

use super::{SourceArgs, Sources};
use crate::config_resolver;
use crate::exit;

/// Arguments of `archives doc`.
#[derive(Debug, clap::Args)]
pub struct DocArgs {
    #[command(flatten)]
    pub sources: SourceArgs,
}

/// Runs the doc command.
///
/// # Errors
///
/// Returns an error for unreadable configuration, bad filters, or a parse
/// failure under the fail policy.
pub fn run(args: &DocArgs, explicit_config: Option<&Path>) -> Result<ExitCode> {
    let mut config = config_resolver::resolve(&args.sources.paths, explicit_config).load()?;
    args.sources.apply(&mut config);

    let files = match args.sources.collect(&config, false)? {
        Sources::Files(files) => files,
        Sources::Done(code) => return Ok(code),
    };

    let parsed = Runner::from_config(&config).parse(&files)?;
    let records = by_file_name(&parsed.modules);
    println!("{}", serde_json::to_string_pretty(&records)?);

    if parsed.failures.is_empty() {
        Ok(exit::CLEAN)
    } else {
        Ok(exit::issues())
    }
}

/// Records keyed by file name. Later paths win on a name clash.
fn by_file_name(modules: &[Module]) -> BTreeMap<&str, ModuleRecord<'_>> {
    let mut records = BTreeMap::new();
    for module in modules {
        let Some(doc) = record::document(module) else {
            debug!("Skipping @nodoc module: {}", module.path().display());
            continue;
        };
        if records.insert(module.name(), doc).is_some() {
            warn!(
                "Duplicate file name {}, keeping {}",
                module.name(),
                module.path().display()
            );
        }
    }
    records
}
