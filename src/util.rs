/// Characters that may appear inside an identifier: letters, digits and `_`.
pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Characters that may appear inside a dotted message path.
pub fn is_path_char(c: char) -> bool {
    is_ident_char(c) || c == '.'
}

/// Check that `segment` is a plain identifier (non-empty, not starting with a digit).
pub fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if is_ident_char(first) && !first.is_ascii_digit() => {
            chars.all(is_ident_char)
        }
        _ => false,
    }
}

/// The character ending right before byte offset `idx`, if any.
pub fn char_before(text: &str, idx: usize) -> Option<char> {
    text.get(..idx).and_then(|head| head.chars().next_back())
}

/// Byte length of the longest prefix of `text` made of path characters.
/// Trailing dots are not part of the path.
pub fn path_len(text: &str) -> usize {
    let greedy = text
        .char_indices()
        .find(|(_, c)| !is_path_char(*c))
        .map_or(text.len(), |(idx, _)| idx);
    text[..greedy].trim_end_matches('.').len()
}
