//! Company-name text normalization.
//!
//! - [`relocate`] — un-wraps every parenthetical except the last, which is kept as a
//!   trailing `(marker)`.
//! - [`canonicalize`] — keeps 5-digit IDs in parentheses, un-wraps everything else and wraps
//!   bare IDs.
//! - [`brackets`] — the unconditional `)(` repair pass run after either strategy.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ReinsertMode, Strategy};

pub mod brackets;
pub mod canonicalize;
pub mod relocate;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Non-greedy `(` through the next `)`, including empty `()`. Spans may cross
/// line breaks inside quoted fields.
static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\(.*?\)").expect("valid regex"));

/// Rewrites one text field. Implementations are pure and total over `&str`.
pub trait Normalizer {
    fn normalize(&self, text: &str) -> String;

    /// Rewrite a field other than the company name under `all-fields` scope.
    fn normalize_other(&self, text: &str) -> String {
        self.normalize(text)
    }
}

/// Build the normalizer selected for a run.
pub fn build(strategy: Strategy, reinsert: ReinsertMode) -> Box<dyn Normalizer> {
    match strategy {
        Strategy::RelocateLastParenthetical => {
            Box::new(relocate::RelocateLastParenthetical::new(reinsert))
        }
        Strategy::CanonicalizeIdParentheses => {
            Box::new(canonicalize::CanonicalizeIdParentheses)
        }
    }
}

/// Collapse whitespace runs to a single space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Remove every parenthetical span, then collapse whitespace.
pub fn strip_parentheticals(text: &str) -> String {
    collapse_whitespace(&PARENTHETICAL.replace_all(text, ""))
}
