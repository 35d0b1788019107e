//! Static tag tables and structural validity rules.
//!
//!     Every decision the converter makes about a scanned tag name goes through this module:
//!     alias resolution, the set of always-legal containers, the nesting rules for list items
//!     and table parts, and the tags reserved for argument grammars.
//!
//!     Names stored on the tag stack are always canonical, so every predicate here works on
//!     canonical names only.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Markup shorthand → canonical tag.
pub static TAG_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([("url", "a"), ("code", "pre"), ("quote", "blockquote"), ("*", "li")])
});

/// Containers that may be opened anywhere.
pub static SIMPLE_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "b",
        "i",
        "u",
        "s",
        "sup",
        "sub",
        "blockquote",
        "ol",
        "ul",
        "table",
    ])
});

/// Tags that take a single `tag=value` argument.
static ASSIGN_ARGUMENT_TAGS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["a", "color", "size"]));

/// Tags that take a space separated option list.
static OPTION_ARGUMENT_TAGS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["font", "img"]));

/// How an opening tag name was terminated when it carries arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentForm {
    /// `[tag=value]`
    Assign,
    /// `[tag opt opt]`
    Options,
}

impl ArgumentForm {
    pub fn from_terminator(ch: char) -> Option<Self> {
        match ch {
            '=' => Some(ArgumentForm::Assign),
            ' ' => Some(ArgumentForm::Options),
            _ => None,
        }
    }

    pub fn terminator(self) -> char {
        match self {
            ArgumentForm::Assign => '=',
            ArgumentForm::Options => ' ',
        }
    }
}

/// Outcome of resolving a complete, argument-free opening tag against the current stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenDecision {
    /// Push the canonical tag and emit its opening element.
    Open(&'static str),
    /// Known tag, but not legal at this nesting position.
    Misplaced,
    /// Not a tag this converter renders.
    Unrecognized,
}

/// Lowercase a scanned name and apply the alias table.
pub fn canonical_name(raw: &str) -> String {
    let lowered = raw.to_ascii_lowercase();
    match TAG_ALIASES.get(lowered.as_str()) {
        Some(alias) => (*alias).to_string(),
        None => lowered,
    }
}

/// Check whether a character may start a tag name, or continue a closing one.
pub fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '*'
}

/// Decide what to do with `[canonical]` given the currently open tags.
pub fn resolve_open(canonical: &str, stack: &[&str]) -> OpenDecision {
    if let Some(&tag) = SIMPLE_TAGS.get(canonical) {
        return OpenDecision::Open(tag);
    }

    match canonical {
        "li" => legal_if(can_open_list_item(stack), "li"),
        "tr" => legal_if(can_open_table_row(stack), "tr"),
        "td" => legal_if(can_open_table_cell(stack), "td"),
        "th" => legal_if(can_open_table_cell(stack), "th"),
        // Content inside a preformatted block is still interpreted as markup.
        "pre" => OpenDecision::Open("pre"),
        // Argument-bearing tags have no bare form yet.
        "a" | "img" => OpenDecision::Unrecognized,
        _ => OpenDecision::Unrecognized,
    }
}

/// Check whether `canonical` reserves a hook for the given argument form.
///
/// No argument grammar exists yet, so the converter treats hooked and unhooked tags the same
/// way; the hook only changes what gets logged.
pub fn accepts_arguments(canonical: &str, form: ArgumentForm) -> bool {
    match form {
        ArgumentForm::Assign => ASSIGN_ARGUMENT_TAGS.contains(canonical),
        ArgumentForm::Options => OPTION_ARGUMENT_TAGS.contains(canonical),
    }
}

/// A list item needs an open ordered or unordered list somewhere below it.
pub fn can_open_list_item(stack: &[&str]) -> bool {
    position(stack, "ol").is_some() || position(stack, "ul").is_some()
}

/// A table row needs an open table somewhere below it.
pub fn can_open_table_row(stack: &[&str]) -> bool {
    position(stack, "table").is_some()
}

/// A cell needs an open row that is itself inside an open table.
pub fn can_open_table_cell(stack: &[&str]) -> bool {
    match (position(stack, "table"), position(stack, "tr")) {
        (Some(table), Some(row)) => table < row,
        _ => false,
    }
}

fn legal_if(legal: bool, tag: &'static str) -> OpenDecision {
    if legal {
        OpenDecision::Open(tag)
    } else {
        OpenDecision::Misplaced
    }
}

fn position(stack: &[&str], tag: &str) -> Option<usize> {
    stack.iter().position(|open| *open == tag)
}
