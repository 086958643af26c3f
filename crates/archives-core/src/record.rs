//! Serializable documentation records.
//!
//! Records are borrowed snapshots of the model shaped for JSON output. They
//! never include back-references to the owning module, and entities whose
//! docstring carries `@nodoc` are left out together with their children.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::docstring::Docstring;
use crate::model::{Argument, Class, Function, Module};

/// Serialized `@cc` value when no claim is present.
pub const NO_COMPLEXITY_CLAIM: i64 = -1;

/// Documentation of one module.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleRecord<'a> {
    /// `@author` of the module docstring.
    pub author: Option<&'a str>,
    /// File name.
    pub name: &'a str,
    /// Documented top-level functions.
    pub functions: Vec<FunctionRecord<'a>>,
    /// Documented top-level classes.
    pub classes: Vec<ClassRecord<'a>>,
    /// Parsed module docstring.
    pub doc: Option<DocRecord<'a>>,
}

/// Documentation of one class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassRecord<'a> {
    /// `@author` of the class docstring.
    pub author: Option<&'a str>,
    /// Class name.
    pub name: &'a str,
    /// Definition line.
    pub line: usize,
    /// Definition column.
    pub column: usize,
    /// Documented methods.
    pub functions: Vec<FunctionRecord<'a>>,
    /// Documented nested classes.
    pub classes: Vec<ClassRecord<'a>>,
    /// Parsed docstring.
    pub doc: Option<DocRecord<'a>>,
}

/// Documentation of one function.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionRecord<'a> {
    /// `@author` of the function docstring.
    pub author: Option<&'a str>,
    /// Function name.
    pub name: &'a str,
    /// Definition line.
    pub line: usize,
    /// Definition column.
    pub column: usize,
    /// Declared arguments.
    pub args: Vec<ArgumentRecord<'a>>,
    /// Documented nested functions.
    pub functions: Vec<FunctionRecord<'a>>,
    /// Documented nested classes.
    pub classes: Vec<ClassRecord<'a>>,
    /// Computed cyclomatic complexity.
    pub complexity: u32,
    /// Normalized return annotation.
    pub returns: Option<&'a str>,
    /// Parsed docstring.
    pub doc: Option<DocRecord<'a>>,
}

/// One declared argument.
#[derive(Debug, Clone, Serialize)]
pub struct ArgumentRecord<'a> {
    /// Argument name.
    pub name: &'a str,
    /// Whether an annotation is present.
    pub typed: bool,
    /// Declaration line.
    pub line: usize,
    /// Declaration column.
    pub column: usize,
    /// Normalized annotation.
    #[serde(rename = "type")]
    pub annotation: Option<&'a str>,
}

/// Tag payloads of one docstring.
#[derive(Debug, Clone, Serialize)]
pub struct DocRecord<'a> {
    /// `@desc`, empty when absent.
    pub desc: &'a str,
    /// `@ret`.
    pub ret: Option<&'a str>,
    /// `@cc`, or [`NO_COMPLEXITY_CLAIM`].
    pub cc: i64,
    /// `@author`.
    pub author: Option<&'a str>,
    /// `@link` payloads.
    pub links: &'a BTreeMap<String, String>,
    /// `@arg` payloads.
    pub args: &'a BTreeMap<String, String>,
    /// `@note` payloads.
    pub notes: &'a [String],
    /// `@warn` payloads.
    pub warnings: &'a [String],
    /// `@todo`.
    pub todo: Option<&'a str>,
    /// Whether `@nolint` is present.
    pub no_lint: bool,
}

impl<'a> From<&'a Docstring> for DocRecord<'a> {
    fn from(doc: &'a Docstring) -> Self {
        Self {
            desc: doc.description(),
            ret: doc.return_doc(),
            cc: doc.complexity_claim().map_or(NO_COMPLEXITY_CLAIM, i64::from),
            author: doc.author(),
            links: doc.links(),
            args: doc.argument_docs(),
            notes: doc.notes(),
            warnings: doc.warnings(),
            todo: doc.todo(),
            no_lint: doc.suppresses_lint(),
        }
    }
}

impl<'a> From<&'a Argument> for ArgumentRecord<'a> {
    fn from(arg: &'a Argument) -> Self {
        Self {
            name: arg.name(),
            typed: arg.is_typed(),
            line: arg.position().line,
            column: arg.position().column,
            annotation: arg.annotation().map(|a| a.as_str()),
        }
    }
}

impl<'a> From<&'a Function> for FunctionRecord<'a> {
    fn from(function: &'a Function) -> Self {
        Self {
            author: function.doc().and_then(Docstring::author),
            name: function.name(),
            line: function.position().line,
            column: function.position().column,
            args: function.arguments().iter().map(ArgumentRecord::from).collect(),
            functions: functions(function.functions()),
            classes: classes(function.classes()),
            complexity: function.complexity(),
            returns: function.returns().map(|a| a.as_str()),
            doc: function.doc().map(DocRecord::from),
        }
    }
}

impl<'a> From<&'a Class> for ClassRecord<'a> {
    fn from(class: &'a Class) -> Self {
        Self {
            author: class.doc().and_then(Docstring::author),
            name: class.name(),
            line: class.position().line,
            column: class.position().column,
            functions: functions(class.functions()),
            classes: classes(class.classes()),
            doc: class.doc().map(DocRecord::from),
        }
    }
}

impl<'a> From<&'a Module> for ModuleRecord<'a> {
    fn from(module: &'a Module) -> Self {
        Self {
            author: module.doc().and_then(Docstring::author),
            name: module.name(),
            functions: functions(module.functions()),
            classes: classes(module.classes()),
            doc: module.doc().map(DocRecord::from),
        }
    }
}

/// Record of `module`, or `None` when the module itself is `@nodoc`.
#[must_use]
pub fn document(module: &Module) -> Option<ModuleRecord<'_>> {
    (!hidden(module.doc())).then(|| ModuleRecord::from(module))
}

fn hidden(doc: Option<&Docstring>) -> bool {
    doc.is_some_and(Docstring::suppresses_doc)
}

fn functions(functions: &[Function]) -> Vec<FunctionRecord<'_>> {
    functions
        .iter()
        .filter(|f| !hidden(f.doc()))
        .map(FunctionRecord::from)
        .collect()
}

fn classes(classes: &[Class]) -> Vec<ClassRecord<'_>> {
    classes
        .iter()
        .filter(|c| !hidden(c.doc()))
        .map(ClassRecord::from)
        .collect()
}
