mod data_step;
mod global;
mod proc;

use sas_ast::{QualifiedName, TopLevelStatement};
use sas_lexer::{Keyword, Token};

use crate::parser::{ParseResult, Parser};

/// Parses one top-level statement: a `DATA` step, a `PROC`, or a global
/// statement (spec §3 "Program": an ordered sequence of top-level
/// statements).
pub(crate) fn parse_top_level(parser: &mut Parser) -> ParseResult<TopLevelStatement> {
    match parser.peek_token() {
        Some(Token::Keyword(Keyword::Data)) => {
            Ok(TopLevelStatement::Data(data_step::parse_data_step(parser)?))
        }
        Some(Token::Keyword(Keyword::Proc)) => {
            Ok(TopLevelStatement::Proc(proc::parse_proc(parser)?))
        }
        Some(Token::Keyword(
            Keyword::Options | Keyword::Libname | Keyword::Title | Keyword::Footnote,
        )) => Ok(TopLevelStatement::Global(global::parse_global(parser)?)),
        _ => parser.expected("DATA, PROC, OPTIONS, LIBNAME, TITLE, or FOOTNOTE"),
    }
}

/// `[libref.]name` (spec §4.5 "Qualified names are case-insensitive").
pub(crate) fn parse_qualified_name(parser: &mut Parser) -> ParseResult<QualifiedName> {
    let first = parser.expect_ident()?;
    if parser.next_token_if_is(&Token::Period) {
        let second = parser.expect_ident()?;
        Ok(QualifiedName::qualified(first, second))
    } else {
        Ok(QualifiedName::bare(first))
    }
}

/// One value of a `name=value` pair: an identifier/number/string token, or
/// a parenthesized whitespace-joined token list (e.g. `KEEP=(a b c)`). The
/// spec (§3 "DataStepStmt") keeps option values as written rather than
/// interpreting them, so callers that need structure (e.g. `KEEP=`) parse
/// the captured text themselves.
pub(crate) fn parse_option_value(parser: &mut Parser) -> ParseResult<String> {
    if parser.next_token_if_is(&Token::LeftParen) {
        let mut parts = Vec::new();
        while !parser.next_token_if_is(&Token::RightParen) {
            match parser.next_token() {
                Some(token) => parts.push(token.to_string()),
                None => return parser.expected("')'"),
            }
        }
        Ok(parts.join(" "))
    } else {
        match parser.peek_token() {
            Some(Token::Ident(_) | Token::Number(_) | Token::Str(_) | Token::Keyword(_)) => {
                Ok(parser.next_token().expect("peeked Some").to_string())
            }
            _ => parser.expected("an option value"),
        }
    }
}

/// `name=value name=value ...`, stopping at `;` (spec's `OPTIONS` grammar)
/// or, for dataset options, at a closing `)` the caller consumes itself.
pub(crate) fn parse_name_value_pairs(
    parser: &mut Parser,
    stop: &Token,
) -> ParseResult<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    while parser.peek_token() != Some(stop) {
        let name = parser.expect_name()?;
        parser.expect_token(&Token::Equal)?;
        let value = parse_option_value(parser)?;
        pairs.push((name.to_ascii_uppercase(), value));
    }
    Ok(pairs)
}

/// `(name=value ...)` — dataset options following a dataset reference.
pub(crate) fn parse_parenthesized_options(parser: &mut Parser) -> ParseResult<Vec<(String, String)>> {
    if !parser.next_token_if_is(&Token::LeftParen) {
        return Ok(Vec::new());
    }
    let pairs = parse_name_value_pairs(parser, &Token::RightParen)?;
    parser.expect_token(&Token::RightParen)?;
    Ok(pairs)
}
