//! # archives
//!
//! Docstring-convention linter for Python projects.
//!
//! This is the facade crate: it wires the tree-sitter Python frontend into
//! the core model and rule engine, and adds multi-file discovery and runs.
//!
//! ## Single file
//!
//! ```no_run
//! let module = archives::parse_file("pkg/util.py")?;
//! let report = archives::lint(&module, None);
//! for issue in &report.issues {
//!     println!("{issue}");
//! }
//! # Ok::<(), archives::ArchivesError>(())
//! ```
//!
//! ## Whole project
//!
//! ```no_run
//! use archives::{Config, Discovery, Runner};
//!
//! let config = Config::default();
//! let files = Discovery::new(&config.analyzer)?.discover(&["src"]);
//! let summary = Runner::from_config(&config).run(&files)?;
//! println!("{} issues", summary.issue_count());
//! # Ok::<(), archives::ArchivesError>(())
//! ```
//!
//! ## Docstring tags
//!
//! ```python
//! def scale(x: float, factor: float = 2.0) -> float:
//!     """
//!     @desc multiply x by factor
//!     @cc 1
//!     @arg x: the value
//!     @arg factor: how much to scale by
//!     @ret the scaled value
//!     """
//! ```

#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use archives_python::{McCabe, ParseError, PythonParser};
use tracing::debug;

pub use archives_core::*;

/// The tree-sitter Python frontend.
pub mod python {
    pub use archives_python::*;
}

mod discovery;
mod runner;

pub use discovery::{find_project_root, Discovery};
pub use runner::{Failure, FailureKind, FileReport, ParsedFiles, RunSummary, Runner};

/// Parses Python `source` into a [`Module`] recorded under `path`.
///
/// # Errors
///
/// Returns [`ArchivesError::Parse`] if `source` is not valid Python.
pub fn parse_source(source: impl Into<String>, path: impl Into<PathBuf>) -> Result<Module> {
    let path = path.into();
    let parsed = PythonParser::new()
        .parse(source)
        .map_err(|e| parse_error(&path, &e))?;
    Ok(ModelBuilder::new(&McCabe).build(&parsed.root(), path))
}

/// Reads and parses the Python file at `path`.
///
/// The file is decoded as UTF-8, replacing invalid sequences.
///
/// # Errors
///
/// Returns [`ArchivesError::FileNotFound`] if `path` does not exist,
/// [`ArchivesError::Io`] if it cannot be read, and
/// [`ArchivesError::Parse`] if it is not valid Python.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Module> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ArchivesError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    debug!("Parsing: {}", path.display());
    let bytes = std::fs::read(path).map_err(|source| ArchivesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // Undecodable bytes become U+FFFD
    let source = String::from_utf8_lossy(&bytes).into_owned();
    parse_source(source, path)
}

fn parse_error(path: &Path, error: &ParseError) -> ArchivesError {
    let (line, column) = error.position();
    let message = match error {
        ParseError::Syntax { message, .. } => message.clone(),
        other => other.to_string(),
    };
    ArchivesError::Parse {
        path: path.to_path_buf(),
        line,
        column,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_source_builds_the_model() {
        let module = parse_source(
            "\"\"\"@desc tools\"\"\"\nclass A:\n    def m(self): pass\ndef f(): pass\n",
            "pkg/tools.py",
        )
        .unwrap();
        assert_eq!(module.name(), "tools.py");
        assert_eq!(module.classes().len(), 1);
        assert_eq!(module.classes()[0].functions().len(), 1);
        assert_eq!(module.functions().len(), 1);
        assert_eq!(module.doc().map(Docstring::description), Some("tools"));
    }

    #[test]
    fn syntax_errors_carry_the_path() {
        let err = parse_source("def f(:\n", "bad.py").unwrap_err();
        match err {
            ArchivesError::Parse { path, line, .. } => {
                assert_eq!(path, PathBuf::from("bad.py"));
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn python2_and_duplicate_parameters_are_parse_errors() {
        for source in ["print 'hello'\n", "def f(a, a): pass\n"] {
            let err = parse_source(source, "p.py").unwrap_err();
            assert!(err.is_parse_error(), "{source}");
        }
    }

    #[test]
    fn missing_files_are_reported() {
        let err = parse_file("definitely/not/here.py").unwrap_err();
        assert!(matches!(err, ArchivesError::FileNotFound { .. }));
    }
}
