//! Syntax tree abstraction consumed by the model builder.
//!
//! The core never parses source text itself. A frontend implements
//! [`SyntaxNode`] over its own tree and a [`ComplexityOracle`] scoring
//! function nodes; the builder only sees these two seams.

use serde::{Deserialize, Serialize};

/// Source position of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (0-indexed byte offset within the line).
    pub column: usize,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Kind of a syntax node, as far as the builder cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The root of a file.
    Module,
    /// A class definition, decorated or not.
    Class,
    /// A function definition, decorated or not.
    Function,
    /// An expression statement consisting of a single string literal.
    StringExpr,
    /// Anything else.
    Other,
}

/// A type annotation as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationNode {
    /// Source text of the annotation expression.
    pub text: String,
    /// Where the annotation starts.
    pub position: Position,
}

/// One declared parameter of a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterNode {
    /// Parameter name without `*` / `**` prefixes.
    pub name: String,
    /// Where the parameter starts.
    pub position: Position,
    /// Type annotation, if any.
    pub annotation: Option<AnnotationNode>,
}

/// A node of a parsed source file.
///
/// Nodes are cheap handles; `body` returns the direct child statements of a
/// module, class or function in source order.
pub trait SyntaxNode: Sized {
    /// Kind of this node.
    fn kind(&self) -> NodeKind;

    /// Declared name of a class or function.
    fn name(&self) -> Option<String>;

    /// Start position of the definition.
    fn position(&self) -> Position;

    /// Direct child statements.
    fn body(&self) -> Vec<Self>;

    /// Decorator expressions as source text.
    fn decorators(&self) -> Vec<String> {
        Vec::new()
    }

    /// Declared parameters of a function, in order.
    fn parameters(&self) -> Vec<ParameterNode> {
        Vec::new()
    }

    /// Declared return annotation of a function.
    fn return_annotation(&self) -> Option<AnnotationNode> {
        None
    }

    /// Value of a string expression statement, escapes resolved and
    /// delimiters removed.
    fn string_value(&self) -> Option<String> {
        None
    }

    /// Whether a function is declared `async`.
    fn is_async(&self) -> bool {
        false
    }
}

/// Result of scoring one function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Complexity {
    /// Cyclomatic complexity score.
    pub score: u32,
    /// Whether the function is bound to a class.
    pub is_method: bool,
}

/// Computes the cyclomatic complexity of function nodes.
pub trait ComplexityOracle<N: SyntaxNode> {
    /// Scores one function node. Nested definitions do not contribute.
    fn measure(&self, function: &N) -> Complexity;
}
