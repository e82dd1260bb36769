//! Mapping between byte offsets and line/column positions.

use rowan::TextSize;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A location in the source text.
///
/// `line` and `column` are 1-based, `column` counts characters.
/// `offset` is the 0-based byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub const START: Position = Position {
        line: 1,
        column: 1,
        offset: 0,
    };

    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Move past a single character.
    pub fn step(&mut self, ch: char) {
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// The position reached after walking over `text`.
    pub fn advanced_by(mut self, text: &str) -> Self {
        for ch in text.chars() {
            self.step(ch);
        }
        self
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// Resolves offsets of a source text into [`Position`]s.
#[derive(Debug, Clone)]
pub struct Mapper<'s> {
    source: &'s str,
    line_starts: Vec<usize>,
}

impl<'s> Mapper<'s> {
    pub fn new(source: &'s str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            source,
            line_starts,
        }
    }

    pub fn position(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.source.len());
        while !self.source.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = self.source[line_start..offset].chars().count() + 1;
        Position::new(line + 1, column, offset)
    }

    pub fn position_at(&self, offset: TextSize) -> Position {
        self.position(u32::from(offset) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapper() {
        let source = "a = 1\nb = \"é\"\n\nc";
        let mapper = Mapper::new(source);
        assert_eq!(mapper.position(0), Position::new(1, 1, 0));
        assert_eq!(mapper.position(4), Position::new(1, 5, 4));
        assert_eq!(mapper.position(6), Position::new(2, 1, 6));
        // after the two-byte `é` and the closing quote
        assert_eq!(mapper.position(13), Position::new(2, 7, 13));
        assert_eq!(mapper.position(15), Position::new(3, 1, 15));
        assert_eq!(mapper.position(16), Position::new(4, 1, 16));
        assert_eq!(mapper.position(100), Position::new(4, 2, 17));
    }

    #[test]
    fn test_advanced_by() {
        let pos = Position::START.advanced_by("ab\ncd");
        assert_eq!(pos, Position::new(2, 3, 5));
    }
}
