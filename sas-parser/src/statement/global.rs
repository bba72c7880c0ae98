use sas_ast::GlobalStatement;
use sas_lexer::{Keyword, Token};

use super::parse_name_value_pairs;
use crate::parser::{ParseResult, Parser};

/// `OPTIONS ...;` / `LIBNAME ...;` / `TITLE ...;` / `FOOTNOTE ...;`
/// (spec §3 "GlobalStatement").
pub(crate) fn parse_global(parser: &mut Parser) -> ParseResult<GlobalStatement> {
    match parser.peek_token() {
        Some(Token::Keyword(Keyword::Options)) => parse_options(parser),
        Some(Token::Keyword(Keyword::Libname)) => parse_libname(parser),
        Some(Token::Keyword(Keyword::Title)) => parse_title_like(parser, GlobalStatement::Title),
        Some(Token::Keyword(Keyword::Footnote)) => {
            parse_title_like(parser, GlobalStatement::Footnote)
        }
        _ => parser.expected("OPTIONS, LIBNAME, TITLE, or FOOTNOTE"),
    }
}

/// `OPTIONS name1=value1 name2=value2 ...;`
fn parse_options(parser: &mut Parser) -> ParseResult<GlobalStatement> {
    parser.next_token();
    let pairs = parse_name_value_pairs(parser, &Token::SemiColon)?;
    parser.expect_token(&Token::SemiColon)?;
    Ok(GlobalStatement::Options(pairs))
}

/// `LIBNAME libref 'path';`
fn parse_libname(parser: &mut Parser) -> ParseResult<GlobalStatement> {
    parser.next_token();
    let libref = parser.expect_ident()?.to_ascii_uppercase();
    let path = parser.expect_str()?;
    parser.expect_token(&Token::SemiColon)?;
    Ok(GlobalStatement::Libname { libref, path })
}

/// `TITLE 'text';`/`FOOTNOTE 'text';`, or the bare form that clears it.
fn parse_title_like(
    parser: &mut Parser,
    build: impl Fn(Option<String>) -> GlobalStatement,
) -> ParseResult<GlobalStatement> {
    parser.next_token();
    let text = if parser.next_token_if_is(&Token::SemiColon) {
        None
    } else {
        let text = parser.expect_str()?;
        parser.expect_token(&Token::SemiColon)?;
        Some(text)
    };
    Ok(build(text))
}
