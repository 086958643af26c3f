//! Structural model of a parsed source file.
//!
//! A [`Module`] owns its classes and functions transitively. Nested entities
//! refer back to their module only through a [`ModuleKey`], which is the
//! module's path and never a reference to the module itself.

mod builder;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::docstring::Docstring;
use crate::syntax::Position;

pub use builder::ModelBuilder;

/// Implicit receiver names ignored during argument reconciliation.
pub const RECEIVER_NAMES: &[&str] = &["self", "cls"];

/// Closed set of entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A source file.
    Module,
    /// A class definition.
    Class,
    /// A function or method definition.
    Function,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module => write!(f, "module"),
            Self::Class => write!(f, "class"),
            Self::Function => write!(f, "function"),
        }
    }
}

/// Non-owning handle to the module an entity lives in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleKey(Arc<Path>);

impl ModuleKey {
    /// Creates a key for the module at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(Arc::from(path.into()))
    }

    /// Path of the module.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// A normalized type annotation.
///
/// Whitespace runs collapse to one space and whitespace hugging brackets
/// and commas is dropped, so `Dict[ str ,int ]` becomes `Dict[str, int]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    text: String,
    position: Position,
}

impl Annotation {
    /// Normalizes raw annotation source text.
    #[must_use]
    pub fn new(raw: &str, position: Position) -> Self {
        Self {
            text: normalize_annotation(raw),
            position,
        }
    }

    /// Normalized annotation text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Where the annotation starts.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// True when the annotation declares that no value is returned.
    #[must_use]
    pub fn is_no_value(&self) -> bool {
        self.text == "None"
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn normalize_annotation(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    let mut chars = collapsed.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ' ' {
            let next = chars.peek().copied();
            let prev = out.chars().last();
            if matches!(next, Some(']' | ')' | ',')) || matches!(prev, Some('[' | '(')) {
                continue;
            }
        }
        out.push(c);
        if c == ',' && chars.peek().is_some_and(|n| *n != ' ') {
            out.push(' ');
        }
    }
    out
}

/// A declared function argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    name: String,
    position: Position,
    annotation: Option<Annotation>,
}

impl Argument {
    /// Creates an argument.
    #[must_use]
    pub fn new(name: impl Into<String>, position: Position, annotation: Option<Annotation>) -> Self {
        Self {
            name: name.into(),
            position,
            annotation,
        }
    }

    /// Argument name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the argument is declared.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Declared type annotation.
    #[must_use]
    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// Whether a type annotation is present.
    #[must_use]
    pub fn is_typed(&self) -> bool {
        self.annotation.is_some()
    }

    /// Whether this is an implicit receiver (`self` / `cls`).
    #[must_use]
    pub fn is_receiver(&self) -> bool {
        RECEIVER_NAMES.contains(&self.name.as_str())
    }
}

/// A function or method.
#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    position: Position,
    module: ModuleKey,
    decorators: Vec<String>,
    arguments: Vec<Argument>,
    functions: Vec<Function>,
    classes: Vec<Class>,
    doc: Option<Docstring>,
    complexity: u32,
    is_method: bool,
    is_async: bool,
    returns: Option<Annotation>,
    missing_args: BTreeSet<String>,
    unexpected_args: BTreeSet<String>,
}

impl Function {
    /// Function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the definition starts.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// The module this function lives in.
    #[must_use]
    pub fn module(&self) -> &ModuleKey {
        &self.module
    }

    /// Decorators as source text.
    #[must_use]
    pub fn decorators(&self) -> &[String] {
        &self.decorators
    }

    /// Declared arguments in order.
    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Functions defined directly in this function's body.
    #[must_use]
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Classes defined directly in this function's body.
    #[must_use]
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Parsed docstring.
    #[must_use]
    pub fn doc(&self) -> Option<&Docstring> {
        self.doc.as_ref()
    }

    /// Computed cyclomatic complexity.
    #[must_use]
    pub fn complexity(&self) -> u32 {
        self.complexity
    }

    /// Whether the function is bound to a class.
    #[must_use]
    pub fn is_method(&self) -> bool {
        self.is_method
    }

    /// Whether the function is declared `async`.
    #[must_use]
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Declared return annotation.
    #[must_use]
    pub fn returns(&self) -> Option<&Annotation> {
        self.returns.as_ref()
    }

    /// Whether a return type is declared.
    #[must_use]
    pub fn is_return_typed(&self) -> bool {
        self.returns.is_some()
    }

    /// Declared non-receiver argument names missing an `@arg` tag.
    #[must_use]
    pub fn missing_args(&self) -> &BTreeSet<String> {
        &self.missing_args
    }

    /// `@arg` names that are not declared arguments.
    #[must_use]
    pub fn unexpected_args(&self) -> &BTreeSet<String> {
        &self.unexpected_args
    }

    /// Non-receiver arguments without a type annotation, in order.
    pub fn untyped_args(&self) -> impl Iterator<Item = &Argument> {
        self.arguments
            .iter()
            .filter(|arg| !arg.is_typed() && !arg.is_receiver())
    }
}

/// A class.
#[derive(Debug, Clone)]
pub struct Class {
    name: String,
    position: Position,
    module: ModuleKey,
    decorators: Vec<String>,
    functions: Vec<Function>,
    classes: Vec<Class>,
    doc: Option<Docstring>,
}

impl Class {
    /// Class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the definition starts.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// The module this class lives in.
    #[must_use]
    pub fn module(&self) -> &ModuleKey {
        &self.module
    }

    /// Decorators as source text.
    #[must_use]
    pub fn decorators(&self) -> &[String] {
        &self.decorators
    }

    /// Methods and other functions defined in the class body.
    #[must_use]
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Nested classes.
    #[must_use]
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Parsed docstring.
    #[must_use]
    pub fn doc(&self) -> Option<&Docstring> {
        self.doc.as_ref()
    }
}

/// A source file.
#[derive(Debug, Clone)]
pub struct Module {
    key: ModuleKey,
    name: String,
    functions: Vec<Function>,
    classes: Vec<Class>,
    doc: Option<Docstring>,
}

impl Module {
    /// Key nested entities use to refer to this module.
    #[must_use]
    pub fn key(&self) -> &ModuleKey {
        &self.key
    }

    /// Path the module was parsed from.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.key.path()
    }

    /// Final path component.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level functions.
    #[must_use]
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Top-level classes.
    #[must_use]
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Parsed module docstring.
    #[must_use]
    pub fn doc(&self) -> Option<&Docstring> {
        self.doc.as_ref()
    }

    /// Number of modules, classes and functions in this tree, including the
    /// module itself.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        fn count(functions: &[Function], classes: &[Class]) -> usize {
            functions
                .iter()
                .map(|f| 1 + count(&f.functions, &f.classes))
                .chain(classes.iter().map(|c| 1 + count(&c.functions, &c.classes)))
                .sum()
        }
        1 + count(&self.functions, &self.classes)
    }
}

/// Borrowed view of any entity, used by rules and issues.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    /// A module.
    Module(&'a Module),
    /// A class.
    Class(&'a Class),
    /// A function.
    Function(&'a Function),
}

impl<'a> Entity<'a> {
    /// Kind of the entity.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match *self {
            Self::Module(_) => EntityKind::Module,
            Self::Class(_) => EntityKind::Class,
            Self::Function(_) => EntityKind::Function,
        }
    }

    /// Entity name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        match *self {
            Self::Module(m) => m.name(),
            Self::Class(c) => c.name(),
            Self::Function(f) => f.name(),
        }
    }

    /// Parsed docstring.
    #[must_use]
    pub fn doc(&self) -> Option<&'a Docstring> {
        match *self {
            Self::Module(m) => m.doc(),
            Self::Class(c) => c.doc(),
            Self::Function(f) => f.doc(),
        }
    }

    /// Path of the owning module.
    #[must_use]
    pub fn module_path(&self) -> &'a Path {
        match *self {
            Self::Module(m) => m.path(),
            Self::Class(c) => c.module().path(),
            Self::Function(f) => f.module().path(),
        }
    }

    /// Position of the entity; modules report `0:0`.
    #[must_use]
    pub fn position(&self) -> Position {
        match *self {
            Self::Module(_) => Position::default(),
            Self::Class(c) => c.position(),
            Self::Function(f) => f.position(),
        }
    }

    /// Whether the docstring carries `@nolint`.
    #[must_use]
    pub fn is_lint_suppressed(&self) -> bool {
        self.doc().is_some_and(Docstring::suppresses_lint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_normalization() {
        let pos = Position::default();
        assert_eq!(Annotation::new("int", pos).as_str(), "int");
        assert_eq!(Annotation::new("Dict[ str ,int ]", pos).as_str(), "Dict[str, int]");
        assert_eq!(
            Annotation::new("Optional[\n    List[str]\n]", pos).as_str(),
            "Optional[List[str]]"
        );
        assert_eq!(Annotation::new("Tuple[int,str]", pos).as_str(), "Tuple[int, str]");
    }

    #[test]
    fn only_none_is_no_value() {
        let pos = Position::default();
        assert!(Annotation::new("None", pos).is_no_value());
        assert!(Annotation::new(" None ", pos).is_no_value());
        assert!(!Annotation::new("Optional[None]", pos).is_no_value());
        assert!(!Annotation::new("NoReturn", pos).is_no_value());
    }

    #[test]
    fn receiver_detection() {
        let pos = Position::default();
        assert!(Argument::new("self", pos, None).is_receiver());
        assert!(Argument::new("cls", pos, None).is_receiver());
        assert!(!Argument::new("this", pos, None).is_receiver());
    }

    #[test]
    fn module_key_is_shared_path() {
        let key = ModuleKey::new("pkg/mod.py");
        let other = key.clone();
        assert_eq!(key, other);
        assert_eq!(other.path(), Path::new("pkg/mod.py"));
    }
}
