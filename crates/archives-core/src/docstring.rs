//! Docstring parsing.

use std::collections::BTreeMap;

use crate::model::{EntityKind, RECEIVER_NAMES};
use crate::tags::TAGS;

/// Structured view of one entity's docstring.
///
/// Built once from the raw text when the owning entity is built and never
/// changed afterwards. Absent tags are represented by empty or `None`
/// values; parsing never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Docstring {
    kind: EntityKind,
    raw: String,
    description: String,
    author: Option<String>,
    return_doc: Option<String>,
    complexity_claim: Option<u32>,
    argument_docs: BTreeMap<String, String>,
    links: BTreeMap<String, String>,
    notes: Vec<String>,
    warnings: Vec<String>,
    todo: Option<String>,
    suppress_lint: bool,
    suppress_doc: bool,
}

impl Docstring {
    /// Parses docstring text.
    ///
    /// `text` is the literal's value without its delimiters. `kind` records
    /// which entity the docstring belongs to and does not affect parsing.
    #[must_use]
    pub fn parse(text: &str, kind: EntityKind) -> Self {
        let raw = text.trim();
        let owned = |s: &str| s.to_owned();

        // later duplicates overwrite earlier ones
        let argument_docs = TAGS
            .arg
            .pairs(raw)
            .into_iter()
            .filter(|(name, _)| !RECEIVER_NAMES.contains(name))
            .map(|(name, doc)| (name.to_owned(), doc.to_owned()))
            .collect();
        let links = TAGS
            .link
            .pairs(raw)
            .into_iter()
            .map(|(label, url)| (label.to_owned(), url.to_owned()))
            .collect();

        Self {
            kind,
            raw: raw.to_owned(),
            description: TAGS.desc.first(raw).map(owned).unwrap_or_default(),
            author: TAGS.author.first(raw).map(owned),
            return_doc: TAGS.ret.first(raw).map(owned),
            complexity_claim: TAGS.cc.first_integer(raw),
            argument_docs,
            links,
            notes: TAGS.note.all(raw).into_iter().map(owned).collect(),
            warnings: TAGS.warn.all(raw).into_iter().map(owned).collect(),
            todo: TAGS.todo.first(raw).map(owned),
            suppress_lint: TAGS.no_lint.is_present(raw),
            suppress_doc: TAGS.no_doc.is_present(raw),
        }
    }

    /// Kind of entity this docstring is attached to.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// The trimmed docstring text.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// `@desc` payload, empty when absent.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// `@author` payload.
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// `@ret` payload.
    #[must_use]
    pub fn return_doc(&self) -> Option<&str> {
        self.return_doc.as_deref()
    }

    /// `@cc` payload.
    #[must_use]
    pub fn complexity_claim(&self) -> Option<u32> {
        self.complexity_claim
    }

    /// `@arg` payloads keyed by argument name. Never contains `self` or `cls`.
    #[must_use]
    pub fn argument_docs(&self) -> &BTreeMap<String, String> {
        &self.argument_docs
    }

    /// `@link` payloads keyed by label.
    #[must_use]
    pub fn links(&self) -> &BTreeMap<String, String> {
        &self.links
    }

    /// `@note` payloads in order of appearance.
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// `@warn` payloads in order of appearance.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// `@todo` payload.
    #[must_use]
    pub fn todo(&self) -> Option<&str> {
        self.todo.as_deref()
    }

    /// Whether `@nolint` is present.
    #[must_use]
    pub fn suppresses_lint(&self) -> bool {
        self.suppress_lint
    }

    /// Whether `@nodoc` is present.
    #[must_use]
    pub fn suppresses_doc(&self) -> bool {
        self.suppress_doc
    }
}
