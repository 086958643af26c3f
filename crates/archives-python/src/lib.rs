//! # archives-python
//!
//! Tree-sitter based Python frontend for archives.
//!
//! This crate implements the `archives-core` syntax seams over
//! `tree-sitter-python`:
//!
//! - [`PythonParser`] turns source text into a [`ParsedSource`], rejecting
//!   invalid Python with the position of the first error
//! - [`PyNode`] implements [`SyntaxNode`](archives_core::SyntaxNode)
//! - [`McCabe`] implements [`ComplexityOracle`](archives_core::ComplexityOracle)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod complexity;
pub mod literal;
pub mod node;
pub mod parser;

pub use complexity::McCabe;
pub use node::PyNode;
pub use parser::{ParseError, ParsedSource, PythonParser};
