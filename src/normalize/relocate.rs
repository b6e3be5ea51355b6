use once_cell::sync::Lazy;
use regex::Regex;

use super::{collapse_whitespace, strip_parentheticals, Normalizer, PARENTHETICAL};
use crate::models::ReinsertMode;

/// A non-empty `(inner)` span; the inner text may not contain `)`.
static SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]+)\)").expect("valid regex"));

#[derive(Debug, Clone, Copy)]
struct Span<'a> {
    /// Byte offset of the opening parenthesis in the raw text.
    start: usize,
    inner: &'a str,
}

fn spans(text: &str) -> Vec<Span<'_>> {
    SPAN.captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let inner = caps.get(1)?;
            Some(Span {
                start: whole.start(),
                inner: inner.as_str(),
            })
        })
        .collect()
}

/// Un-wraps every parenthetical except the last one, which moves to the end as
/// a trailing `(marker)`.
///
/// `"Shop Alpha (Downtown) (00123)"` → `"Downtown Shop Alpha (00123)"` with the
/// default [`ReinsertMode::Leading`].
pub struct RelocateLastParenthetical {
    mode: ReinsertMode,
}

impl RelocateLastParenthetical {
    pub fn new(mode: ReinsertMode) -> Self {
        Self { mode }
    }
}

impl Normalizer for RelocateLastParenthetical {
    fn normalize(&self, text: &str) -> String {
        let spans = spans(text);
        // Only empty `()` pairs can remain here; they are dropped.
        let Some((last, relocated)) = spans.split_last() else {
            return strip_parentheticals(text);
        };

        let body = match self.mode {
            ReinsertMode::Leading => leading(text, relocated),
            ReinsertMode::InPlace => in_place(text, last),
            ReinsertMode::LegacyOffsets => legacy_offsets(text, relocated),
        };

        format!("{} ({})", body, last.inner).trim().to_string()
    }
}

fn leading(text: &str, relocated: &[Span<'_>]) -> String {
    let cleaned = strip_parentheticals(text);
    relocated
        .iter()
        .map(|span| span.inner)
        .chain(std::iter::once(cleaned.as_str()))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Single left-to-right pass: every span is dropped, and all but `last` leave
/// their inner text behind.
fn in_place(text: &str, last: &Span<'_>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for m in PARENTHETICAL.find_iter(text) {
        out.push_str(&text[cursor..m.start()]);
        let inner = &text[m.start() + 1..m.end() - 1];
        if m.start() != last.start && !inner.is_empty() {
            out.push(' ');
            out.push_str(inner);
            out.push(' ');
        }
        cursor = m.end();
    }
    out.push_str(&text[cursor..]);

    collapse_whitespace(&out)
}

/// Reinserts each inner text at its character offset in the *raw* text, applied
/// to the already-shortened text. Offsets past the end append. Positions drift
/// once more than one span is relocated.
fn legacy_offsets(text: &str, relocated: &[Span<'_>]) -> String {
    let mut result = strip_parentheticals(text);
    for span in relocated {
        let char_offset = text[..span.start].chars().count();
        let byte_offset = result
            .char_indices()
            .nth(char_offset)
            .map(|(i, _)| i)
            .unwrap_or(result.len());
        result.insert_str(byte_offset, &format!("{} ", span.inner));
    }
    result
}
