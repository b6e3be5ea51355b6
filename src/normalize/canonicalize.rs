use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{collapse_whitespace, Normalizer};

/// Digits in a branch ID.
pub const ID_DIGITS: usize = 5;

/// `(` through the next `)`, possibly empty.
static SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]*)\)").expect("valid regex"));

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Keeps `(12345)` spans, un-wraps every other parenthetical in place, and
/// wraps a bare `12345` token unless that value is already parenthesised.
///
/// Only the company name gets bare IDs wrapped; other fields keep their digits
/// as they are, so a postal code like `01000` survives.
#[derive(Debug, Default)]
pub struct CanonicalizeIdParentheses;

fn is_id(text: &str) -> bool {
    DIGIT_RUN
        .find(text)
        .is_some_and(|m| m.start() == 0 && m.end() == text.len())
        && text.chars().count() == ID_DIGITS
}

/// Un-wrap every non-ID span, collecting the IDs that stay wrapped.
fn unwrap_spans(text: &str) -> (String, HashSet<String>) {
    let mut existing: HashSet<String> = HashSet::new();
    let unwrapped = SPAN.replace_all(text, |caps: &Captures<'_>| {
        let inner = &caps[1];
        if is_id(inner) {
            existing.insert(inner.to_string());
            caps[0].to_string()
        } else {
            inner.to_string()
        }
    });
    (unwrapped.into_owned(), existing)
}

impl Normalizer for CanonicalizeIdParentheses {
    fn normalize(&self, text: &str) -> String {
        let (unwrapped, mut existing) = unwrap_spans(text);

        let mut out = String::with_capacity(unwrapped.len() + 2);
        let mut cursor = 0;

        for m in DIGIT_RUN.find_iter(&unwrapped) {
            let token = m.as_str();
            if !is_id(token) {
                continue;
            }

            let before = unwrapped[..m.start()].chars().next_back();
            let after = unwrapped[m.end()..].chars().next();

            // Part of a larger word such as "A12345" or "12345B"
            if before.is_some_and(char::is_alphanumeric) || after.is_some_and(char::is_alphanumeric)
            {
                continue;
            }
            if before == Some('(') && after == Some(')') {
                continue;
            }
            // A value is wrapped at most once per field
            if !existing.insert(token.to_string()) {
                continue;
            }

            out.push_str(&unwrapped[cursor..m.start()]);
            out.push('(');
            out.push_str(token);
            out.push(')');
            cursor = m.end();
        }
        out.push_str(&unwrapped[cursor..]);

        collapse_whitespace(&out)
    }

    fn normalize_other(&self, text: &str) -> String {
        collapse_whitespace(&unwrap_spans(text).0)
    }
}
