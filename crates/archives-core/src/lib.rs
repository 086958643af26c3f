//! # archives-core
//!
//! Documentation-convention engine for Python sources.
//!
//! This crate knows nothing about parsing Python. A frontend hands it a
//! syntax tree through the [`SyntaxNode`] and [`ComplexityOracle`] traits;
//! from there it provides:
//!
//! - the `@tag` grammar ([`tags`]) and the [`Docstring`] parser
//! - the structural [`model`] and its [`ModelBuilder`]
//! - the fixed rule catalog ([`rules`]) and the [`lint`] walker
//! - [`Issue`]s with flake8 / pylint rendering
//! - serializable documentation [`record`]s
//! - [`Config`] loaded from `archives.toml`
//!
//! ## Example
//!
//! ```ignore
//! use archives_core::{lint, ModelBuilder};
//!
//! let module = ModelBuilder::new(&oracle).build(&root, "pkg/mod.py");
//! let report = lint(&module, None);
//! for issue in &report.issues {
//!     println!("{issue}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod docstring;
mod error;
mod issue;
mod lint;
pub mod model;
pub mod record;
pub mod rules;
pub mod syntax;
pub mod tags;

#[cfg(test)]
mod testing;

pub use config::{
    AnalyzerConfig, Config, ConfigError, OutputConfig, OutputFormat, ParsePolicy, RuleConfig,
    DEFAULT_EXCLUDE, DEFAULT_INCLUDE,
};
pub use docstring::Docstring;
pub use error::{ArchivesError, Result};
pub use issue::{Issue, IssueFormat, Location};
pub use lint::{lint, lint_with, LintContext, LintReport, LintStats};
pub use model::{
    Annotation, Argument, Class, Entity, EntityKind, Function, ModelBuilder, Module, ModuleKey,
};
pub use rules::{Rule, RuleKind, RuleSet};
pub use syntax::{Complexity, ComplexityOracle, NodeKind, Position, SyntaxNode};
