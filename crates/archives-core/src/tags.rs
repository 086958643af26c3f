//! Docstring tag grammar.
//!
//! A tag is an `@name value` annotation inside a docstring. Every tag
//! compiles to its own independent pattern; tags are searched for one at a
//! time rather than through a combined grammar.
//!
//! ```text
//! @desc a one line description
//! @arg path: the file to read
//! @cc 3
//! @nolint
//! ```
//!
//! Payloads never span lines. Unknown markers are ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Character introducing every tag.
pub const MARKER: char = '@';

/// Shape of the payload following a tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    /// No payload; presence alone is the signal.
    Flag,
    /// Remaining text of the line, trimmed.
    Text,
    /// An identifier key followed by free text.
    Keyed,
    /// A decimal integer.
    Integer,
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flag => write!(f, "flag"),
            Self::Text => write!(f, "text"),
            Self::Keyed => write!(f, "keyed"),
            Self::Integer => write!(f, "integer"),
        }
    }
}

/// A named annotation kind with its compiled pattern.
#[derive(Debug)]
pub struct Tag {
    name: &'static str,
    arity: Arity,
    repeatable: bool,
    description: &'static str,
    pattern: Regex,
}

impl Tag {
    fn new(name: &'static str, arity: Arity, repeatable: bool, description: &'static str) -> Self {
        Self {
            name,
            arity,
            repeatable,
            description,
            pattern: compile(name, arity),
        }
    }

    /// Tag name as written after the marker.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Payload shape.
    #[must_use]
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Whether every occurrence is collected rather than only the first.
    #[must_use]
    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// The tag as it appears in a docstring, e.g. `@desc`.
    #[must_use]
    pub fn usage(&self) -> String {
        format!("{MARKER}{}", self.name)
    }

    /// Returns true if the tag occurs anywhere in `text`.
    #[must_use]
    pub fn is_present(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// First text payload, trimmed.
    #[must_use]
    pub fn first<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
    }

    /// Every text payload in order of appearance, trimmed.
    #[must_use]
    pub fn all<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .collect()
    }

    /// First integer payload.
    ///
    /// Values that do not fit in a `u32` are treated as absent.
    #[must_use]
    pub fn first_integer(&self, text: &str) -> Option<u32> {
        self.first(text).and_then(|digits| digits.parse().ok())
    }

    /// Every `(key, text)` pair in order of appearance.
    #[must_use]
    pub fn pairs<'t>(&self, text: &'t str) -> Vec<(&'t str, &'t str)> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str().trim())))
            .collect()
    }
}

/// Builds the pattern for one tag.
///
/// The marker must not follow a word character, so `user@desc` is not a tag.
#[allow(clippy::expect_used)]
fn compile(name: &str, arity: Arity) -> Regex {
    let head = format!(r"\B{}{}", regex::escape(&MARKER.to_string()), regex::escape(name));
    let pattern = match arity {
        Arity::Flag => format!(r"{head}\b"),
        Arity::Text => format!(r"{head}:?[ \t]+(\S.*)"),
        Arity::Keyed => format!(r"{head}[ \t]+([A-Za-z0-9_]+):?[ \t]+(\S.*)"),
        Arity::Integer => format!(r"(?m){head}:?[ \t]+([0-9]+)[ \t]*\r?$"),
    };
    // tag names are fixed identifiers, so the pattern is always valid
    Regex::new(&pattern).expect("tag pattern must compile")
}

/// The fixed tag catalog.
#[derive(Debug)]
pub struct TagSet {
    /// `@author`
    pub author: Tag,
    /// `@desc`
    pub desc: Tag,
    /// `@ret`
    pub ret: Tag,
    /// `@cc`
    pub cc: Tag,
    /// `@arg`
    pub arg: Tag,
    /// `@link`
    pub link: Tag,
    /// `@todo`
    pub todo: Tag,
    /// `@note`
    pub note: Tag,
    /// `@warn`
    pub warn: Tag,
    /// `@nolint`
    pub no_lint: Tag,
    /// `@nodoc`
    pub no_doc: Tag,
}

impl TagSet {
    fn new() -> Self {
        Self {
            author: Tag::new("author", Arity::Text, false, "author of this object"),
            desc: Tag::new("desc", Arity::Text, false, "description of this object"),
            ret: Tag::new("ret", Arity::Text, false, "description of the return value"),
            cc: Tag::new("cc", Arity::Integer, false, "cyclomatic complexity of this function"),
            arg: Tag::new("arg", Arity::Keyed, true, "description of an argument, keyed by name"),
            link: Tag::new("link", Arity::Keyed, true, "a labelled link, e.g. `@link docs https://...`"),
            todo: Tag::new("todo", Arity::Text, false, "outstanding work for this object"),
            note: Tag::new("note", Arity::Text, true, "a free-form note"),
            warn: Tag::new("warn", Arity::Text, true, "a free-form warning"),
            no_lint: Tag::new("nolint", Arity::Flag, false, "skip lint rules for this object"),
            no_doc: Tag::new("nodoc", Arity::Flag, false, "omit this object from generated docs"),
        }
    }

    /// All tags in catalog order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        [
            &self.author,
            &self.desc,
            &self.ret,
            &self.cc,
            &self.arg,
            &self.link,
            &self.todo,
            &self.note,
            &self.warn,
            &self.no_lint,
            &self.no_doc,
        ]
        .into_iter()
    }

    /// Looks a tag up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.iter().find(|tag| tag.name == name)
    }
}

/// The global tag catalog, compiled on first use.
pub static TAGS: Lazy<TagSet> = Lazy::new(TagSet::new);

/// Enumerates every known tag.
pub fn catalog() -> impl Iterator<Item = &'static Tag> {
    TAGS.iter()
}
