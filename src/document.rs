//! In-memory text document buffer.
//!
//! Mirrors the teacher's `LspDocument`/rope-backed document model, generalized
//! to correctly treat LSP positions as UTF-16 code units (Design Notes §9:
//! "Position units") instead of the char-offset shortcut the source took.

use ropey::Rope;
use tower_lsp::lsp_types::{Position, Range, TextDocumentContentChangeEvent, Url};

#[derive(Debug, Clone)]
pub struct TextDocument {
    pub uri: Url,
    text: Rope,
    pub version: i32,
}

impl TextDocument {
    pub fn new(uri: Url, text: impl Into<String>, version: i32) -> Self {
        Self {
            uri,
            text: Rope::from_str(&text.into()),
            version,
        }
    }

    pub fn text(&self) -> String {
        self.text.to_string()
    }

    pub fn rope(&self) -> &Rope {
        &self.text
    }

    /// Converts an LSP `Position` (UTF-16 code units) to a char offset.
    pub fn position_to_char(&self, position: Position) -> usize {
        let line = (position.line as usize).min(self.text.len_lines().saturating_sub(1));
        let line_char_start = self.text.line_to_char(line);
        let line_utf16_start = self.text.char_to_utf16_cu(line_char_start);
        let target_utf16 = line_utf16_start + position.character as usize;
        // Clamp to end of document; editors occasionally send a position one
        // past the last character.
        target_utf16.min(self.text.len_utf16_cu())
    }

    /// Converts a char offset back to an LSP `Position`.
    pub fn char_to_position(&self, char_idx: usize) -> Position {
        let char_idx = char_idx.min(self.text.len_chars());
        let line = self.text.char_to_line(char_idx);
        let line_char_start = self.text.line_to_char(line);
        let character = self.text.char_to_utf16_cu(char_idx) - self.text.char_to_utf16_cu(line_char_start);
        Position::new(line as u32, character as u32)
    }

    pub fn range_to_chars(&self, range: Range) -> (usize, usize) {
        (
            self.position_to_char(range.start),
            self.position_to_char(range.end),
        )
    }

    /// Applies a sequence of content-change events in array order, each
    /// against the result of the previous (§4.G `didChange`).
    pub fn apply_changes(&mut self, changes: Vec<TextDocumentContentChangeEvent>, version: i32) {
        for change in changes {
            match change.range {
                Some(range) => {
                    let (start, end) = self.range_to_chars(range);
                    self.text.remove(start..end);
                    self.text.insert(start, &change.text);
                }
                None => {
                    self.text = Rope::from_str(&change.text);
                }
            }
        }
        self.version = version;
    }

    pub fn byte_to_position(&self, byte_idx: usize) -> Position {
        let char_idx = self.text.byte_to_char(byte_idx.min(self.text.len_bytes()));
        self.char_to_position(char_idx)
    }

    pub fn position_to_byte(&self, position: Position) -> usize {
        self.text.char_to_byte(self.position_to_char(position))
    }
}

/// Converts a byte span within an arbitrary source string to an LSP `Range`,
/// honoring UTF-16 code units. Used for spans computed over documents that
/// are not tracked as a live `TextDocument` (e.g. decompiled metadata text).
pub fn byte_span_to_range(text: &str, start_byte: usize, end_byte: usize) -> Range {
    let rope = Rope::from_str(text);
    let start_char = rope.byte_to_char(start_byte.min(rope.len_bytes()));
    let end_char = rope.byte_to_char(end_byte.min(rope.len_bytes()));
    let to_position = |char_idx: usize| -> Position {
        let line = rope.char_to_line(char_idx);
        let line_char_start = rope.line_to_char(line);
        let character = rope.char_to_utf16_cu(char_idx) - rope.char_to_utf16_cu(line_char_start);
        Position::new(line as u32, character as u32)
    };
    Range::new(to_position(start_char), to_position(end_char))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_replacement_change() {
        let mut doc = TextDocument::new(Url::parse("file:///a.cs").unwrap(), "old", 0);
        doc.apply_changes(
            vec![TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "new text".into(),
            }],
            1,
        );
        assert_eq!(doc.text(), "new text");
        assert_eq!(doc.version, 1);
    }

    #[test]
    fn incremental_change_applied_in_order() {
        let mut doc = TextDocument::new(Url::parse("file:///a.cs").unwrap(), "hello world", 0);
        doc.apply_changes(
            vec![
                TextDocumentContentChangeEvent {
                    range: Some(Range::new(Position::new(0, 6), Position::new(0, 11))),
                    range_length: None,
                    text: "rust".into(),
                },
                TextDocumentContentChangeEvent {
                    range: Some(Range::new(Position::new(0, 0), Position::new(0, 5))),
                    range_length: None,
                    text: "hi".into(),
                },
            ],
            1,
        );
        assert_eq!(doc.text(), "hi rust");
    }

    #[test]
    fn position_roundtrip_handles_non_ascii() {
        // "café" — 'é' is one UTF-16 code unit but two UTF-8 bytes.
        let doc = TextDocument::new(Url::parse("file:///a.cs").unwrap(), "café bar", 0);
        let pos = Position::new(0, 4); // right after the 'é'
        let char_idx = doc.position_to_char(pos);
        assert_eq!(doc.char_to_position(char_idx), pos);
    }
}
