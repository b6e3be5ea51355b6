use once_cell::sync::Lazy;
use regex::Regex;

static ADJACENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\)\s*\(").expect("valid regex"));

/// Replace every `)(` pair (whitespace allowed between) with a single space,
/// then trim.
///
/// The rewrite repeats until no pair is left, so `clean_adjacent` is
/// idempotent even when a replacement exposes a new pair (`"x))(("`).
pub fn clean_adjacent(text: &str) -> String {
    let mut cleaned = ADJACENT.replace_all(text, " ").into_owned();
    while ADJACENT.is_match(&cleaned) {
        cleaned = ADJACENT.replace_all(&cleaned, " ").into_owned();
    }
    cleaned.trim().to_string()
}
