use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CharPosition {
    pub line_number: i32,
    pub char_column: i32,
}

/// Where in the source an expression came from.
/// Lowering never reads source text, it only carries this through to diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextLocation {
    pub start_pos: CharPosition,
    pub end_pos: CharPosition,
}

impl Default for TextLocation {
    fn default() -> Self {
        TextLocation::UNKNOWN
    }
}

impl TextLocation {
    /// A negative line marks a missing location
    pub const UNKNOWN: TextLocation = TextLocation {
        start_pos: CharPosition {
            line_number: -1,
            char_column: 0,
        },
        end_pos: CharPosition {
            line_number: -1,
            char_column: 0,
        },
    };

    pub fn new(start_pos: CharPosition, end_pos: CharPosition) -> Self {
        TextLocation { start_pos, end_pos }
    }

    pub fn new_just_line(line: i32) -> Self {
        let pos = CharPosition {
            line_number: line,
            char_column: 0,
        };

        TextLocation {
            start_pos: pos,
            end_pos: pos,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.start_pos.line_number < 0
    }
}

impl Display for TextLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        // Lines are stored zero based
        write!(
            f,
            "{}:{}",
            self.start_pos.line_number + 1,
            self.start_pos.char_column
        )
    }
}
