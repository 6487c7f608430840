use serde::{Deserialize, Serialize};

/// Zero-indexed line/character pair. `character` counts Unicode scalar
/// values from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// One-based coordinates, as used by the editor extension.
    pub fn to_one_based(self) -> Self {
        Self {
            line: self.line.saturating_add(1),
            character: self.character.saturating_add(1),
        }
    }
}

/// Byte offsets of every line start in a document, built once per scan.
#[derive(Debug)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
    /// Lines holding only ASCII, where characters and bytes coincide.
    ascii_lines: Vec<bool>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        let mut ascii_lines = Vec::new();
        let mut ascii = true;
        for (idx, b) in text.bytes().enumerate() {
            if b == b'\n' {
                ascii_lines.push(ascii);
                line_starts.push(idx + 1);
                ascii = true;
            } else if !b.is_ascii() {
                ascii = false;
            }
        }
        ascii_lines.push(ascii);
        Self {
            text,
            line_starts,
            ascii_lines,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line_of(&self, offset: usize) -> usize {
        // Number of line starts <= offset, minus the implicit first line.
        self.line_starts.partition_point(|&start| start <= offset) - 1
    }

    /// Translate a byte offset into a position. Offsets past the end clamp
    /// to the end of the document; offsets inside a multi-byte character
    /// resolve to that character.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = self.line_of(offset);
        let line_start = self.line_starts[line];
        let character = if self.ascii_lines[line] {
            offset - line_start
        } else {
            self.text[line_start..]
                .char_indices()
                .take_while(|(idx, _)| line_start + idx < offset)
                .count()
        };
        Position {
            line: to_u32(line),
            character: to_u32(character),
        }
    }

    /// A cursor for translating offsets that mostly move forward.
    pub fn cursor(&self) -> PositionCursor<'_, 'a> {
        PositionCursor {
            index: self,
            line: 0,
            byte: 0,
            character: 0,
        }
    }
}

/// Remembers the last translated offset so that increasing offsets on a
/// non-ASCII line only count the characters in between. Moving backwards or
/// to another line restarts from the line start.
#[derive(Debug)]
pub struct PositionCursor<'i, 'a> {
    index: &'i LineIndex<'a>,
    line: usize,
    /// Always on a character boundary inside `line`.
    byte: usize,
    /// Characters between the line start and `byte`.
    character: usize,
}

impl PositionCursor<'_, '_> {
    pub fn position(&mut self, offset: usize) -> Position {
        let text = self.index.text;
        let offset = offset.min(text.len());
        let line = self.index.line_of(offset);
        if self.index.ascii_lines[line] {
            return self.index.position(offset);
        }

        if line != self.line || offset < self.byte {
            self.line = line;
            self.byte = self.index.line_starts[line];
            self.character = 0;
        }

        let mut advanced = 0;
        for (idx, c) in text[self.byte..].char_indices() {
            if self.byte + idx >= offset {
                break;
            }
            self.character += 1;
            advanced = idx + c.len_utf8();
        }
        self.byte += advanced;

        Position {
            line: to_u32(line),
            character: to_u32(self.character),
        }
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
