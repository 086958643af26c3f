//! Lint issues and their rendering.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

use crate::docstring::Docstring;
use crate::model::{Entity, EntityKind};
use crate::rules::Rule;

/// Where an issue was found.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Path of the module.
    pub file: PathBuf,
    /// Line number (1-indexed, 0 for modules).
    pub line: usize,
    /// Column (0-indexed).
    pub column: usize,
}

impl Location {
    /// Creates a location.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Line layout of a rendered issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueFormat {
    /// `{path}:{line}:{column}: {code} {text}`
    #[default]
    Flake8,
    /// `{path}:{line}: [{code}] {text}`
    Pylint,
}

/// One rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    rule: &'static Rule,
    kind: EntityKind,
    name: String,
    location: Location,
    substitutions: BTreeMap<&'static str, String>,
}

impl Issue {
    /// Records `rule` firing on `entity`.
    ///
    /// `arg` names the offending argument for argument rules. Functions
    /// always expose `{cc}`, and `{doc_cc}` when a claim is present.
    #[must_use]
    pub fn new(rule: &'static Rule, entity: Entity<'_>, arg: Option<&str>) -> Self {
        let mut substitutions = BTreeMap::new();
        substitutions.insert("name", entity.name().to_owned());
        if let Entity::Function(f) = entity {
            substitutions.insert("cc", f.complexity().to_string());
            if let Some(claim) = f.doc().and_then(Docstring::complexity_claim) {
                substitutions.insert("doc_cc", claim.to_string());
            }
        }
        if let Some(arg) = arg {
            substitutions.insert("arg", arg.to_owned());
        }

        let position = entity.position();
        Self {
            rule,
            kind: entity.kind(),
            name: entity.name().to_owned(),
            location: Location::new(entity.module_path(), position.line, position.column),
            substitutions,
        }
    }

    /// The rule that fired.
    #[must_use]
    pub fn rule(&self) -> &'static Rule {
        self.rule
    }

    /// Rule code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.rule.code()
    }

    /// Kind of the offending entity.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Name of the offending entity.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the offending entity is defined.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Path of the module the issue belongs to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.location.file
    }

    /// Value substituted for `placeholder`, if any.
    #[must_use]
    pub fn substitution(&self, placeholder: &str) -> Option<&str> {
        self.substitutions.get(placeholder).map(String::as_str)
    }

    /// The rule's template with every placeholder substituted.
    #[must_use]
    pub fn message(&self) -> String {
        render_template(self.rule.template(), &self.substitutions)
    }

    /// Renders the issue as one output line.
    #[must_use]
    pub fn render(&self, format: IssueFormat) -> String {
        let path = self.location.file.display();
        match format {
            IssueFormat::Flake8 => format!(
                "{path}:{}:{}: {} {}",
                self.location.line,
                self.location.column,
                self.code(),
                self.message()
            ),
            IssueFormat::Pylint => {
                format!("{path}:{}: [{}] {}", self.location.line, self.code(), self.message())
            }
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(IssueFormat::Flake8))
    }
}

impl Serialize for Issue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Issue", 8)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("rule", self.rule.name())?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("path", &self.location.file)?;
        state.serialize_field("line", &self.location.line)?;
        state.serialize_field("column", &self.location.column)?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

/// Substitutes `{placeholder}`s; unknown placeholders render empty.
fn render_template(template: &str, values: &BTreeMap<&'static str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                if let Some(value) = values.get(&after[..close]) {
                    out.push_str(value);
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{FUNCTION_RULES, MISSING_ARG, MODULE_RULES};
    use crate::testing::{build_module, FakeNode};

    #[test]
    fn template_substitution() {
        let mut values = BTreeMap::new();
        values.insert("name", "f".to_owned());
        assert_eq!(render_template("function '{name}' ({unknown})", &values), "function 'f' ()");
        assert_eq!(render_template("dangling {name", &values), "dangling {name");
        assert_eq!(render_template("no placeholders", &values), "no placeholders");
    }

    #[test]
    fn module_issue_reports_origin() {
        let module = build_module(&FakeNode::module(vec![]), "pkg/mod.py");
        let issue = Issue::new(&MODULE_RULES[0], Entity::Module(&module), None);
        assert_eq!(issue.location(), &Location::new("pkg/mod.py", 0, 0));
        assert_eq!(issue.render(IssueFormat::Flake8), "pkg/mod.py:0:0: M100 module 'mod.py' missing docstring");
        assert_eq!(issue.render(IssueFormat::Pylint), "pkg/mod.py:0: [M100] module 'mod.py' missing docstring");
    }

    #[test]
    fn function_issue_carries_complexity() {
        let module = build_module(
            &FakeNode::module(vec![FakeNode::function("run", vec![FakeNode::string("@cc 7")]).at(12, 4)]),
            "m.py",
        );
        let f = Entity::Function(&module.functions()[0]);

        let missing = Issue::new(&FUNCTION_RULES[2], f, None);
        assert_eq!(missing.message(), "function 'run' missing @cc tag (cc: 1)");
        let mismatch = Issue::new(&FUNCTION_RULES[3], f, None);
        assert_eq!(mismatch.message(), "function 'run' mismatched @cc tag (7, expected 1)");
        assert_eq!(mismatch.to_string(), "m.py:12:4: F103 function 'run' mismatched @cc tag (7, expected 1)");
    }

    #[test]
    fn argument_issue_names_the_argument() {
        let module = build_module(&FakeNode::module(vec![FakeNode::function("f", vec![])]), "m.py");
        let issue = Issue::new(&MISSING_ARG, Entity::Function(&module.functions()[0]), Some("path"));
        assert_eq!(issue.message(), "function 'f' missing @arg for 'path'");
        assert_eq!(issue.substitution("arg"), Some("path"));
        assert_eq!(issue.kind(), EntityKind::Function);
    }

    #[test]
    fn serializes_flat_json() {
        let module = build_module(&FakeNode::module(vec![]), "m.py");
        let issue = Issue::new(&MODULE_RULES[1], Entity::Module(&module), None);
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["code"], "M101");
        assert_eq!(json["rule"], "module-desc");
        assert_eq!(json["kind"], "module");
        assert_eq!(json["line"], 0);
        assert_eq!(json["message"], "module 'm.py' missing @desc tag");
    }
}
