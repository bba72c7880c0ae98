//! The interpreter's top-level error type (spec §7 "Error Handling
//! Design"): wraps the lexical, syntactic, and semantic/runtime taxonomies
//! from the three lower crates into one type the REPL and CLI report
//! against.

use sas_core::CoreError;
use sas_lexer::LexerError;
use sas_parser::ParserError;
use thiserror::Error;

/// Any failure surfaced while running a program.
#[derive(Debug, Error)]
pub enum InterpError {
    /// A lexical failure (spec §7 "Lexical").
    #[error(transparent)]
    Lexer(#[from] LexerError),

    /// A syntactic failure (spec §7 "Syntactic").
    #[error(transparent)]
    Parser(#[from] ParserError),

    /// A semantic or runtime failure (spec §7 "Semantic"/"Runtime").
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A batch script ended with unconsumed, truncated input — distinct
    /// from [`InterpError::Parser`] so the CLI can report it without a
    /// misleading "unexpected token" framing.
    #[error("script ended with an incomplete statement")]
    TruncatedScript,
}
