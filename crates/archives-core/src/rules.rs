//! The rule catalog.
//!
//! Rules are plain data: a stable code, a kebab-case name, the entity kind
//! they inspect, a message template and a pure predicate over the model.
//! The catalog is fixed at compile time and can be listed without linting.

use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::docstring::Docstring;
use crate::model::{Annotation, Argument, Entity, EntityKind, Function};

/// What a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Module docstrings.
    Module,
    /// Class docstrings.
    Class,
    /// Function docstrings and signatures.
    Function,
    /// Individual function arguments; one issue per offending argument.
    Argument,
}

impl RuleKind {
    /// Entity kind the rule is evaluated against.
    #[must_use]
    pub fn entity_kind(self) -> EntityKind {
        match self {
            Self::Module => EntityKind::Module,
            Self::Class => EntityKind::Class,
            Self::Function | Self::Argument => EntityKind::Function,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module => write!(f, "module"),
            Self::Class => write!(f, "class"),
            Self::Function => write!(f, "function"),
            Self::Argument => write!(f, "argument"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    NoDocstring,
    NoDescription,
    NoAuthor,
    NoComplexity,
    WrongComplexity,
    NoReturnDoc,
    UnnecessaryReturnDoc,
    NoReturnType,
    MissingArgument,
    UnexpectedArgument,
    UntypedArgument,
}

/// A documentation rule.
#[derive(Debug, PartialEq, Eq)]
pub struct Rule {
    code: &'static str,
    name: &'static str,
    kind: RuleKind,
    template: &'static str,
    description: &'static str,
    check: Check,
}

impl Rule {
    const fn new(
        code: &'static str,
        name: &'static str,
        kind: RuleKind,
        template: &'static str,
        description: &'static str,
        check: Check,
    ) -> Self {
        Self {
            code,
            name,
            kind,
            template,
            description,
            check,
        }
    }

    /// Stable rule code, e.g. `F102`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Kebab-case rule name, e.g. `function-cc`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// What the rule inspects.
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Message template with `{name}`, `{cc}`, `{doc_cc}` and `{arg}`
    /// placeholders.
    #[must_use]
    pub fn template(&self) -> &'static str {
        self.template
    }

    /// One line description for rule listings.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Returns true if `entity` breaks this rule.
    ///
    /// Total over every entity: a rule asked about an entity of another kind
    /// answers false. Argument rules answer whether any argument offends.
    #[must_use]
    pub fn is_violated_by(&self, entity: Entity<'_>) -> bool {
        if entity.kind() != self.kind.entity_kind() {
            return false;
        }
        let doc = entity.doc();
        match (self.check, entity) {
            (Check::NoDocstring, _) => doc.is_none(),
            (Check::NoDescription, _) => doc.map_or(true, |d| d.description().is_empty()),
            (Check::NoAuthor, _) => doc.and_then(Docstring::author).is_none(),
            (Check::NoComplexity, _) => doc.and_then(Docstring::complexity_claim).is_none(),
            (Check::WrongComplexity, Entity::Function(f)) => doc
                .and_then(Docstring::complexity_claim)
                .is_some_and(|claim| claim != f.complexity()),
            (Check::NoReturnDoc, Entity::Function(f)) => {
                !f.returns().is_some_and(Annotation::is_no_value)
                    && doc.and_then(Docstring::return_doc).is_none()
            }
            (Check::UnnecessaryReturnDoc, Entity::Function(f)) => {
                f.returns().is_some_and(Annotation::is_no_value)
                    && doc.and_then(Docstring::return_doc).is_some()
            }
            (Check::NoReturnType, Entity::Function(f)) => !f.is_return_typed(),
            (Check::MissingArgument | Check::UnexpectedArgument | Check::UntypedArgument, Entity::Function(f)) => {
                !self.offending_args(f).is_empty()
            }
            _ => false,
        }
    }

    /// Argument names an argument rule reports for `function`.
    ///
    /// Missing and unexpected names come out sorted, untyped names in
    /// declaration order. Non-argument rules return nothing.
    #[must_use]
    pub fn offending_args<'f>(&self, function: &'f Function) -> Vec<&'f str> {
        match self.check {
            Check::MissingArgument => function.missing_args().iter().map(String::as_str).collect(),
            Check::UnexpectedArgument => function.unexpected_args().iter().map(String::as_str).collect(),
            Check::UntypedArgument => function.untyped_args().map(Argument::name).collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.name)
    }
}

impl Serialize for Rule {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Rule", 4)?;
        state.serialize_field("code", self.code)?;
        state.serialize_field("name", self.name)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("description", self.description)?;
        state.end()
    }
}

/// Module rules in evaluation order.
pub static MODULE_RULES: [Rule; 3] = [
    Rule::new(
        "M100",
        "module-docstring",
        RuleKind::Module,
        "module '{name}' missing docstring",
        "modules must have a docstring",
        Check::NoDocstring,
    ),
    Rule::new(
        "M101",
        "module-desc",
        RuleKind::Module,
        "module '{name}' missing @desc tag",
        "module docstrings must carry a non-empty @desc",
        Check::NoDescription,
    ),
    Rule::new(
        "M102",
        "module-author",
        RuleKind::Module,
        "module '{name}' missing @author tag",
        "module docstrings must carry @author",
        Check::NoAuthor,
    ),
];

/// Class rules in evaluation order.
pub static CLASS_RULES: [Rule; 2] = [
    Rule::new(
        "C100",
        "class-docstring",
        RuleKind::Class,
        "class '{name}' missing docstring",
        "classes must have a docstring",
        Check::NoDocstring,
    ),
    Rule::new(
        "C101",
        "class-desc",
        RuleKind::Class,
        "class '{name}' missing @desc tag",
        "class docstrings must carry a non-empty @desc",
        Check::NoDescription,
    ),
];

/// Function rules in evaluation order.
pub static FUNCTION_RULES: [Rule; 7] = [
    Rule::new(
        "F100",
        "function-docstring",
        RuleKind::Function,
        "function '{name}' missing docstring",
        "functions must have a docstring",
        Check::NoDocstring,
    ),
    Rule::new(
        "F101",
        "function-desc",
        RuleKind::Function,
        "function '{name}' missing @desc tag",
        "function docstrings must carry a non-empty @desc",
        Check::NoDescription,
    ),
    Rule::new(
        "F102",
        "function-cc",
        RuleKind::Function,
        "function '{name}' missing @cc tag (cc: {cc})",
        "function docstrings must claim their cyclomatic complexity with @cc",
        Check::NoComplexity,
    ),
    Rule::new(
        "F103",
        "function-cc-mismatch",
        RuleKind::Function,
        "function '{name}' mismatched @cc tag ({doc_cc}, expected {cc})",
        "a claimed @cc must equal the computed complexity",
        Check::WrongComplexity,
    ),
    Rule::new(
        "F104",
        "function-ret",
        RuleKind::Function,
        "function '{name}' missing @ret tag",
        "functions returning a value must document it with @ret",
        Check::NoReturnDoc,
    ),
    Rule::new(
        "F105",
        "function-ret-unnecessary",
        RuleKind::Function,
        "function '{name}' has unnecessary @ret tag",
        "functions annotated to return None must not carry @ret",
        Check::UnnecessaryReturnDoc,
    ),
    Rule::new(
        "F106",
        "function-return-type",
        RuleKind::Function,
        "function '{name}' has no return type",
        "functions must declare a return annotation",
        Check::NoReturnType,
    ),
];

/// Declared argument without an `@arg` tag.
pub static MISSING_ARG: Rule = Rule::new(
    "A100",
    "missing-arg",
    RuleKind::Argument,
    "function '{name}' missing @arg for '{arg}'",
    "every declared argument must be documented with @arg",
    Check::MissingArgument,
);

/// `@arg` tag naming no declared argument.
pub static UNEXPECTED_ARG: Rule = Rule::new(
    "A101",
    "unexpected-arg",
    RuleKind::Argument,
    "function '{name}' unexpected @arg for '{arg}'",
    "@arg tags must name a declared argument",
    Check::UnexpectedArgument,
);

/// Declared argument without a type annotation.
pub static UNTYPED_ARG: Rule = Rule::new(
    "A102",
    "untyped-arg",
    RuleKind::Argument,
    "function '{name}' has untyped arg '{arg}'",
    "every declared argument must carry a type annotation",
    Check::UntypedArgument,
);

/// Argument rules in evaluation order.
pub static ARGUMENT_RULES: [&Rule; 3] = [&MISSING_ARG, &UNEXPECTED_ARG, &UNTYPED_ARG];

/// Every rule, grouped by kind in evaluation order.
pub fn catalog() -> impl Iterator<Item = &'static Rule> {
    MODULE_RULES
        .iter()
        .chain(CLASS_RULES.iter())
        .chain(FUNCTION_RULES.iter())
        .chain(ARGUMENT_RULES.iter().copied())
}

/// Looks a rule up by code or name.
#[must_use]
pub fn find(code_or_name: &str) -> Option<&'static Rule> {
    catalog().find(|rule| rule.code == code_or_name || rule.name == code_or_name)
}

/// The active selection of rules for a lint run.
///
/// Defaults to the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    enabled: BTreeSet<&'static str>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            enabled: catalog().map(Rule::code).collect(),
        }
    }
}

static DEFAULT_RULES: Lazy<RuleSet> = Lazy::new(RuleSet::default);

impl RuleSet {
    /// The whole catalog.
    #[must_use]
    pub fn all() -> &'static Self {
        &DEFAULT_RULES
    }

    /// Removes rules by code or name. Unknown entries are ignored.
    #[must_use]
    pub fn without<I, S>(mut self, disabled: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for entry in disabled {
            if let Some(rule) = find(entry.as_ref()) {
                self.enabled.remove(rule.code);
            }
        }
        self
    }

    /// Whether `rule` is active.
    #[must_use]
    pub fn contains(&self, rule: &Rule) -> bool {
        self.enabled.contains(rule.code)
    }

    /// Active rules of `kind` in evaluation order.
    pub fn of_kind(&self, kind: RuleKind) -> impl Iterator<Item = &'static Rule> + '_ {
        catalog().filter(move |rule| rule.kind == kind && self.contains(rule))
    }

    /// Number of active rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    /// Whether every rule is disabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}
