use crate::util::{char_before, is_ident_char};

/// Finds `<anchor>.` occurrences that start on an identifier boundary.
#[derive(Debug, Clone)]
pub struct AnchorScanner {
    /// Anchor plus its trailing path separator, e.g. `context.t.`.
    needle: String,
}

impl AnchorScanner {
    pub fn new(anchor: &str) -> Self {
        Self {
            needle: format!("{anchor}."),
        }
    }

    /// Length in bytes of the anchor including the path separator.
    pub fn prefix_len(&self) -> usize {
        self.needle.len()
    }

    /// Byte offset of the first accepted anchor at or after `from`.
    pub fn next_from(&self, text: &str, mut from: usize) -> Option<usize> {
        while let Some(found) = text.get(from..)?.find(self.needle.as_str()) {
            let start = from + found;
            if !char_before(text, start).is_some_and(is_ident_char) {
                return Some(start);
            }
            from = start + self.needle.chars().next().map_or(1, char::len_utf8);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_in_order() {
        let scanner = AnchorScanner::new("context.t");
        let text = "a(context.t.x);context.t.y";
        assert_eq!(scanner.next_from(text, 0), Some(2));
        assert_eq!(scanner.next_from(text, 3), Some(15));
        assert_eq!(scanner.next_from(text, 16), None);
    }

    #[test]
    fn test_rejects_identifier_suffix() {
        let scanner = AnchorScanner::new("context.t");
        assert_eq!(scanner.next_from("xcontext.t.hello", 0), None);
        assert_eq!(scanner.next_from("my_context.t.hello", 0), None);
        assert_eq!(scanner.next_from("1context.t.hello", 0), None);
        assert_eq!(scanner.next_from("ücontext.t.hello", 0), None);
        assert_eq!(scanner.next_from("$context.t.hello", 0), Some(1));
        assert_eq!(scanner.next_from("(context.t.hello", 0), Some(1));
    }

    #[test]
    fn test_requires_separator() {
        let scanner = AnchorScanner::new("context.t");
        assert_eq!(scanner.next_from("context.tr.hello", 0), None);
        assert_eq!(scanner.next_from("context.t", 0), None);
        assert_eq!(scanner.prefix_len(), "context.t.".len());
    }

    #[test]
    fn test_out_of_range_start() {
        let scanner = AnchorScanner::new("context.t");
        assert_eq!(scanner.next_from("context.t.a", 100), None);
    }
}
