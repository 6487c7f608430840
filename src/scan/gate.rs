//! Marker detection: a document only yields references once it has shown
//! that the generated translations are in play.

use crate::config::MatcherConfig;
use crate::util::{char_before, is_ident_char};

const IMPORT_KEYWORD: &str = "import";

/// Byte offset of the earliest marker in `text`, if any.
pub fn marker_offset(text: &str, config: &MatcherConfig) -> Option<usize> {
    let import = first_qualifying_import(text, &config.import_suffixes);
    let literal = config
        .markers
        .iter()
        .filter(|marker| !marker.is_empty())
        .filter_map(|marker| text.find(marker.as_str()))
        .min();

    match (import, literal) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn first_qualifying_import(text: &str, suffixes: &[String]) -> Option<usize> {
    if suffixes.is_empty() {
        return None;
    }
    let mut from = 0;
    while let Some(found) = text[from..].find(IMPORT_KEYWORD) {
        let start = from + found;
        from = start + IMPORT_KEYWORD.len();
        if char_before(text, start).is_some_and(is_ident_char) {
            continue;
        }
        if let Some(literal) = import_literal(&text[from..]) {
            if suffixes.iter().any(|suffix| names_generated_file(literal, suffix)) {
                return Some(start);
            }
        }
    }
    None
}

/// The quoted literal that follows `import` (keyword already consumed).
fn import_literal(rest: &str) -> Option<&str> {
    let trimmed = rest.trim_start();
    // At least one whitespace character must separate keyword and literal.
    if trimmed.len() == rest.len() {
        return None;
    }
    let quote = trimmed.chars().next().filter(|c| matches!(*c, '\'' | '"'))?;
    let body = &trimmed[1..];
    let end = body.find(|c: char| c == quote || c == '\n')?;
    if !body[end..].starts_with(quote) {
        return None;
    }
    Some(&body[..end])
}

fn names_generated_file(literal: &str, suffix: &str) -> bool {
    let suffix = suffix.trim();
    match literal.strip_suffix(suffix) {
        Some("") => true,
        Some(head) => head.ends_with('/') || head.ends_with(':'),
        None => false,
    }
}
