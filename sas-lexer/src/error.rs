use std::fmt;

/// A 1-based line/column position in the source text.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Location {
    /// 1-based line number.
    pub line: u64,
    /// 1-based column number.
    pub column: u64,
}

impl Location {
    /// Advances the location past `ch`, wrapping to the next line on `\n`.
    pub fn advance(&mut self, ch: char) {
        if self.line == 0 {
            self.line = 1;
            self.column = 1;
        }
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Wraps a message into a [`LexerError`] at this location.
    pub fn into_error(self, message: impl Into<String>) -> LexerError {
        LexerError::At {
            location: self,
            message: message.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Lexer error.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LexerError {
    /// A byte outside the accepted vocabulary.
    #[error("unknown character {character:?} at {location}")]
    UnknownCharacter {
        /// The offending character.
        character: char,
        /// Where it was found.
        location: Location,
    },
    /// Any other lexing failure, tagged with a location.
    #[error("{message} at {location}")]
    At {
        /// Where the failure occurred.
        location: Location,
        /// Human-readable description.
        message: String,
    },
}

impl LexerError {
    /// The location the error was raised at.
    pub fn location(&self) -> Location {
        match self {
            LexerError::UnknownCharacter { location, .. } => *location,
            LexerError::At { location, .. } => *location,
        }
    }
}
