//! Path and call-argument parsing that follows an accepted anchor.

use std::collections::HashMap;

use crate::util::{char_before, is_ident_char, path_len};

/// A quoted literal being skipped. Dart adds triple-quoted literals, which
/// may hold lone quotes, and raw literals (`r'...'`), where a backslash is
/// an ordinary character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Literal {
    quote: char,
    triple: bool,
    raw: bool,
}

/// Lexical state while walking a call's argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Quoted(Literal),
    Escaped(Literal),
    LineComment,
    BlockComment,
}

/// Results of balancing, keyed by the byte offset of an opening parenthesis.
///
/// A scan from any `(` reached in [`State::Code`] follows the same
/// transitions as the enclosing scan from that point on, so one pass settles
/// every parenthesis it opens. Lives for a single document.
#[derive(Debug, Default)]
pub struct CallCache {
    ends: HashMap<usize, Option<usize>>,
}

impl CallCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, open: usize) -> Option<Option<usize>> {
        self.ends.get(&open).copied()
    }

    fn settle(&mut self, open: usize, end: Option<usize>) {
        self.ends.insert(open, end);
    }

    /// Every parenthesis still open when balancing fails is unbalanced too.
    fn fail_open(&mut self, closers: &[(char, usize)]) {
        for &(closer, open) in closers {
            if closer == ')' {
                self.ends.insert(open, None);
            }
        }
    }
}

/// A message path and where the reference ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedReference<'a> {
    pub message_id: &'a str,
    /// Byte offset just past the path, or past the closing parenthesis of
    /// the first call when one follows.
    pub end: usize,
}

/// Parse the path starting at `path_start` and an optional call right after it.
///
/// Returns `None` when no path character follows the anchor or when the
/// argument list is never closed.
pub fn parse_reference<'a>(
    text: &'a str,
    path_start: usize,
    cache: &mut CallCache,
) -> Option<ParsedReference<'a>> {
    let rest = text.get(path_start..)?;
    if rest.starts_with('.') {
        return None;
    }
    let len = path_len(rest);
    if len == 0 {
        return None;
    }
    let path_end = path_start + len;
    let end = if text[path_end..].starts_with('(') {
        balanced_call_end(text, path_end, cache)?
    } else {
        path_end
    };
    Some(ParsedReference {
        message_id: &text[path_start..path_end],
        end,
    })
}

/// Byte offset just past the parenthesis closing the one opened at `open`.
///
/// Brackets and braces nest inside the call; quoted literals and comments
/// are skipped so their delimiters never count. A closer that does not match
/// the innermost open delimiter makes the call malformed.
pub fn balanced_call_end(text: &str, open: usize, cache: &mut CallCache) -> Option<usize> {
    let src = text.get(open..)?;
    if !src.starts_with('(') {
        return None;
    }
    if let Some(end) = cache.get(open) {
        return end;
    }

    // Expected closer and the absolute offset of its opener.
    let mut closers: Vec<(char, usize)> = Vec::new();
    let mut state = State::Code;
    let mut chars = src.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let at = open + idx;
        state = match state {
            State::Code => match c {
                '(' => {
                    closers.push((')', at));
                    State::Code
                }
                '[' => {
                    closers.push((']', at));
                    State::Code
                }
                '{' => {
                    closers.push(('}', at));
                    State::Code
                }
                ')' | ']' | '}' => {
                    match closers.pop() {
                        Some((expected, opened)) if expected == c => {
                            let end = at + c.len_utf8();
                            if c == ')' {
                                cache.settle(opened, Some(end));
                            }
                        }
                        popped => {
                            if let Some((expected, opened)) = popped {
                                closers.push((expected, opened));
                            }
                            cache.fail_open(&closers);
                            return None;
                        }
                    }
                    if closers.is_empty() {
                        return Some(at + c.len_utf8());
                    }
                    State::Code
                }
                '\'' | '"' => {
                    let triple = src[idx + 1..].starts_with(c) && src[idx + 2..].starts_with(c);
                    if triple {
                        chars.next();
                        chars.next();
                    }
                    State::Quoted(Literal {
                        quote: c,
                        triple,
                        raw: is_raw_prefix(text, at),
                    })
                }
                '`' => State::Quoted(Literal {
                    quote: c,
                    triple: false,
                    raw: false,
                }),
                '/' => match chars.peek() {
                    Some((_, '/')) => {
                        chars.next();
                        State::LineComment
                    }
                    Some((_, '*')) => {
                        chars.next();
                        State::BlockComment
                    }
                    _ => State::Code,
                },
                _ => State::Code,
            },
            State::Quoted(literal) => match c {
                '\\' if !literal.raw => State::Escaped(literal),
                _ if c == literal.quote && !literal.triple => State::Code,
                _ if c == literal.quote => {
                    let rest = &src[idx + 1..];
                    if rest.starts_with(c) && rest[1..].starts_with(c) {
                        chars.next();
                        chars.next();
                        State::Code
                    } else {
                        State::Quoted(literal)
                    }
                }
                _ => State::Quoted(literal),
            },
            State::Escaped(literal) => State::Quoted(literal),
            State::LineComment => {
                if c == '\n' {
                    State::Code
                } else {
                    State::LineComment
                }
            }
            State::BlockComment => {
                if c == '*' && matches!(chars.peek(), Some((_, '/'))) {
                    chars.next();
                    State::Code
                } else {
                    State::BlockComment
                }
            }
        };
    }

    cache.fail_open(&closers);
    None
}

/// Whether the quote at `quote` opens a raw literal: a lone `r` right before it.
fn is_raw_prefix(text: &str, quote: usize) -> bool {
    char_before(text, quote) == Some('r')
        && !char_before(text, quote - 1).is_some_and(is_ident_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_text(text: &str) -> Option<&str> {
        balanced_call_end(text, 0, &mut CallCache::new()).map(|end| &text[..end])
    }

    fn parse(text: &str, path_start: usize) -> Option<ParsedReference<'_>> {
        parse_reference(text, path_start, &mut CallCache::new())
    }

    #[test]
    fn test_empty_call() {
        assert_eq!(call_text("();"), Some("()"));
        assert_eq!(call_text("(*).x"), Some("(*)"));
    }

    #[test]
    fn test_nested_calls_and_objects() {
        let text = "({args1: someFunction(), args2: otherFunction()});";
        assert_eq!(call_text(text), Some(&text[..text.len() - 1]));
        assert_eq!(call_text("([1, [2]], {a: {b: 1}}) + 1"), Some("([1, [2]], {a: {b: 1}})"));
    }

    #[test]
    fn test_stops_before_chained_call() {
        assert_eq!(call_text("().someFunction().other()"), Some("()"));
    }

    #[test]
    fn test_delimiters_inside_literals() {
        assert_eq!(call_text("(\")\", '(', `}`)x"), Some("(\")\", '(', `}`)"));
        assert_eq!(call_text(r#"("a \" ) b")x"#), Some(r#"("a \" ) b")"#));
        assert_eq!(call_text("(name: 'it\\'s (ok')x"), Some("(name: 'it\\'s (ok')"));
    }

    #[test]
    fn test_triple_quoted_literals() {
        assert_eq!(call_text("(x: '''it's''');"), Some("(x: '''it's''')"));
        assert_eq!(call_text("(x: \"\"\"a \" ) b\"\"\")x"), Some("(x: \"\"\"a \" ) b\"\"\")"));
        assert_eq!(call_text("(x: '''\n) ''\n''')x"), Some("(x: '''\n) ''\n''')"));
        // An empty literal is not the start of a triple-quoted one.
        assert_eq!(call_text("(x: '', y: 1)x"), Some("(x: '', y: 1)"));
        assert_eq!(call_text("(x: '''never closed)"), None);
    }

    #[test]
    fn test_raw_literals() {
        assert_eq!(call_text(r"(path: r'C:\');"), Some(r"(path: r'C:\')"));
        assert_eq!(call_text(r#"(r"\", x)y"#), Some(r#"(r"\", x)"#));
        assert_eq!(call_text(r"(r'''\''', x)y"), Some(r"(r'''\''', x)"));
        // Only a lone `r` marks a raw literal.
        assert_eq!(call_text(r"(bar'\')x')y"), Some(r"(bar'\')x')"));
    }

    #[test]
    fn test_delimiters_inside_comments() {
        assert_eq!(call_text("(a, // ) not here\n b)x"), Some("(a, // ) not here\n b)"));
        assert_eq!(call_text("(a /* ) */, b)x"), Some("(a /* ) */, b)"));
        assert_eq!(call_text("(a / b)x"), Some("(a / b)"));
    }

    #[test]
    fn test_unterminated() {
        assert_eq!(call_text("("), None);
        assert_eq!(call_text("(a, {b: 1}"), None);
        assert_eq!(call_text("(\")\""), None);
        assert_eq!(call_text("(a /* )"), None);
    }

    #[test]
    fn test_mismatched_closer() {
        assert_eq!(call_text("(a]"), None);
        assert_eq!(call_text("({a: 1)}"), None);
    }

    #[test]
    fn test_not_a_call() {
        let mut cache = CallCache::new();
        assert_eq!(balanced_call_end("abc", 0, &mut cache), None);
        assert_eq!(balanced_call_end("()", 5, &mut cache), None);
    }

    #[test]
    fn test_cache_settles_inner_parentheses() {
        let text = "(a(b), c(d";
        let mut cache = CallCache::new();
        assert_eq!(balanced_call_end(text, 0, &mut cache), None);
        assert_eq!(cache.get(0), Some(None));
        assert_eq!(cache.get(2), Some(Some(5)));
        assert_eq!(cache.get(8), Some(None));
        // Cached answers match a fresh scan.
        for open in [0, 2, 8] {
            assert_eq!(
                balanced_call_end(text, open, &mut cache),
                balanced_call_end(text, open, &mut CallCache::new()),
                "open {open}"
            );
        }
    }

    #[test]
    fn test_cache_after_mismatch() {
        let text = "(a, (b]";
        let mut cache = CallCache::new();
        assert_eq!(balanced_call_end(text, 0, &mut cache), None);
        assert_eq!(cache.get(0), Some(None));
        assert_eq!(cache.get(4), Some(None));
        assert_eq!(balanced_call_end(text, 4, &mut CallCache::new()), None);
    }

    #[test]
    fn test_parse_reference_property_access() {
        let text = "b: helloWorld,";
        let parsed = parse(text, 3).unwrap();
        assert_eq!(parsed.message_id, "helloWorld");
        assert_eq!(parsed.end, 13);
    }

    #[test]
    fn test_parse_reference_call() {
        let text = "core.page.title(n: 1).x";
        let parsed = parse(text, 0).unwrap();
        assert_eq!(parsed.message_id, "core.page.title");
        assert_eq!(&text[..parsed.end], "core.page.title(n: 1)");
    }

    #[test]
    fn test_parse_reference_rejects() {
        assert_eq!(parse("();", 0), None);
        assert_eq!(parse(".x()", 0), None);
        assert_eq!(parse("", 0), None);
        assert_eq!(parse("helloWorld(", 0), None);
    }
}
