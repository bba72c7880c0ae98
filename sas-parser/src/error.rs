use thiserror::Error;

use sas_lexer::{Location, LexerError};

/// A syntactic failure: wrong token kind, or a required keyword that cannot
/// be explained by running out of input (spec §4.2, §7 "Syntactic").
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParserError {
    /// The lexer rejected the source before the parser ever saw tokens.
    #[error(transparent)]
    Lexer(#[from] LexerError),

    /// A token of the wrong kind, or an unexpected end of a clause.
    #[error("{message} at {location}")]
    UnexpectedToken {
        /// Human-readable description, including what was expected.
        message: String,
        /// Source position of the offending token (or of the last token
        /// scanned, if the mismatch was discovered at EOF elsewhere in the
        /// clause).
        location: Location,
    },
}

/// Internal result type used throughout the recursive-descent grammar.
/// `Eof` is distinguished from a plain syntax error so that a statement
/// driver can turn "ran out of tokens before an explicit terminator" into
/// [`crate::ParseOutcome::Incomplete`] rather than a hard error (spec §4.2
/// "Incompleteness is first-class").
pub(crate) type ParseResult<T> = Result<T, ParseFailure>;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ParseFailure {
    /// End of token stream reached while a required token was still
    /// expected.
    Eof,
    /// A syntactic error that is not explainable by missing input.
    Syntax(ParserError),
}

impl From<ParserError> for ParseFailure {
    fn from(err: ParserError) -> Self {
        ParseFailure::Syntax(err)
    }
}

impl From<LexerError> for ParseFailure {
    fn from(err: LexerError) -> Self {
        ParseFailure::Syntax(ParserError::Lexer(err))
    }
}
