use sas_ast::{
    ArrayDecl, AssignTarget, DataStepStmt, Expr, InputVarSpec, LengthSpec, RetainSpec, Statement,
};
use sas_lexer::{Keyword, Token};

use super::{parse_option_value, parse_parenthesized_options, parse_qualified_name};
use crate::parser::{ParseResult, Parser};

/// `DATA <qualified-name> [(options)] ; <body> RUN ;` (spec §4.2).
pub(crate) fn parse_data_step(parser: &mut Parser) -> ParseResult<DataStepStmt> {
    parser.expect_keyword(Keyword::Data)?;
    let name = parse_qualified_name(parser)?;
    let options = parse_parenthesized_options(parser)?;
    parser.expect_token(&Token::SemiColon)?;
    let body = parse_body_until(parser, Keyword::Run)?;
    parser.expect_keyword(Keyword::Run)?;
    parser.expect_token(&Token::SemiColon)?;
    Ok(DataStepStmt { name, options, body })
}

/// Parses statements until `stop` is the next keyword, without consuming it.
fn parse_body_until(parser: &mut Parser, stop: Keyword) -> ParseResult<Vec<Statement>> {
    let mut body = Vec::new();
    while !matches!(parser.peek_token(), Some(Token::Keyword(kw)) if *kw == stop) {
        body.push(parse_statement(parser)?);
    }
    Ok(body)
}

/// Parses statements until `END ;`, consuming the `END ;`.
fn parse_block_body(parser: &mut Parser) -> ParseResult<Vec<Statement>> {
    let body = parse_body_until(parser, Keyword::End)?;
    parser.expect_keyword(Keyword::End)?;
    parser.expect_token(&Token::SemiColon)?;
    Ok(body)
}

/// One DATA-step body statement (spec §3 "DATA-step body statement").
pub(crate) fn parse_statement(parser: &mut Parser) -> ParseResult<Statement> {
    match parser.peek_token() {
        Some(Token::SemiColon) => {
            parser.next_token();
            Ok(Statement::Null)
        }
        Some(Token::Keyword(Keyword::Set)) => parse_set_or_merge(parser, true),
        Some(Token::Keyword(Keyword::Merge)) => parse_set_or_merge(parser, false),
        Some(Token::Keyword(Keyword::By)) => parse_by(parser),
        Some(Token::Keyword(Keyword::Input)) => parse_input(parser),
        Some(Token::Keyword(Keyword::Datalines)) | Some(Token::Keyword(Keyword::Cards)) => {
            parse_datalines(parser)
        }
        Some(Token::Keyword(Keyword::Output)) => {
            parser.next_token();
            parser.expect_token(&Token::SemiColon)?;
            Ok(Statement::Output)
        }
        Some(Token::Keyword(Keyword::If)) => parse_if(parser),
        Some(Token::Keyword(Keyword::Do)) => parse_do(parser),
        Some(Token::Keyword(Keyword::Leave)) => {
            parser.next_token();
            parser.expect_token(&Token::SemiColon)?;
            Ok(Statement::Leave)
        }
        Some(Token::Keyword(Keyword::Continue)) => {
            parser.next_token();
            parser.expect_token(&Token::SemiColon)?;
            Ok(Statement::Continue)
        }
        Some(Token::Keyword(Keyword::Drop)) => {
            parser.next_token();
            Ok(Statement::Drop(parse_name_list(parser)?))
        }
        Some(Token::Keyword(Keyword::Keep)) => {
            parser.next_token();
            Ok(Statement::Keep(parse_name_list(parser)?))
        }
        Some(Token::Keyword(Keyword::Retain)) => parse_retain(parser),
        Some(Token::Keyword(Keyword::Array)) => parse_array(parser),
        Some(Token::Keyword(Keyword::Label)) => parse_label(parser),
        Some(Token::Keyword(Keyword::Length)) => parse_length(parser),
        Some(Token::Keyword(Keyword::Format)) => parse_format_like(parser, Statement::Format),
        Some(Token::Keyword(Keyword::Informat)) => parse_format_like(parser, Statement::Informat),
        Some(Token::Ident(_)) => parse_assign(parser),
        _ => parser.expected("a DATA step statement"),
    }
}

/// `SET ds1 ds2 ...;` or `MERGE ds1 ds2 ...;`.
fn parse_set_or_merge(parser: &mut Parser, is_set: bool) -> ParseResult<Statement> {
    parser.next_token();
    let mut names = vec![parse_qualified_name(parser)?];
    while !matches!(parser.peek_token(), Some(Token::SemiColon)) {
        names.push(parse_qualified_name(parser)?);
    }
    parser.expect_token(&Token::SemiColon)?;
    Ok(if is_set {
        Statement::Set(names)
    } else {
        Statement::Merge(names)
    })
}

/// `BY var1 var2 ...;`
fn parse_by(parser: &mut Parser) -> ParseResult<Statement> {
    parser.next_token();
    Ok(Statement::By(parse_name_list(parser)?))
}

/// `INPUT var[$] [var[$]]... ;`
fn parse_input(parser: &mut Parser) -> ParseResult<Statement> {
    parser.next_token();
    let mut vars = Vec::new();
    while !matches!(parser.peek_token(), Some(Token::SemiColon)) {
        let name = parser.expect_ident()?.to_ascii_uppercase();
        let is_char = parser.next_token_if_is(&Token::Dollar);
        vars.push(InputVarSpec { name, is_char });
    }
    parser.expect_token(&Token::SemiColon)?;
    Ok(Statement::Input(vars))
}

/// `DATALINES ; <raw-lines> ;` — the lexer has already switched to
/// line-buffered mode by the time this statement's own `;` is consumed.
fn parse_datalines(parser: &mut Parser) -> ParseResult<Statement> {
    parser.next_token();
    parser.expect_token(&Token::SemiColon)?;
    let mut lines = Vec::new();
    loop {
        match parser.peek_token() {
            Some(Token::DatalinesLine(_)) => match parser.next_token() {
                Some(Token::DatalinesLine(line)) => lines.push(line),
                _ => unreachable!(),
            },
            Some(Token::SemiColon) => {
                parser.next_token();
                break;
            }
            _ => return parser.expected("a DATALINES line or closing ';'"),
        }
    }
    Ok(Statement::Datalines(lines))
}

/// `IF <expr> THEN <statement-or-block> [ELSE IF ... THEN ...]* [ELSE ...]`
fn parse_if(parser: &mut Parser) -> ParseResult<Statement> {
    parser.next_token();
    let cond = parser.parse_expr()?;
    parser.expect_keyword(Keyword::Then)?;
    let then_branch = parse_statement_or_block(parser)?;
    let else_branch = if parser.parse_keyword(Keyword::Else) {
        if parser.parse_keyword(Keyword::If) {
            Some(vec![parse_if_tail(parser)?])
        } else {
            Some(parse_statement_or_block(parser)?)
        }
    } else {
        None
    };
    Ok(Statement::IfThenElse {
        cond,
        then_branch,
        else_branch,
    })
}

/// The `<expr> THEN ...` continuation of an `ELSE IF`, with `ELSE IF`
/// itself already consumed.
fn parse_if_tail(parser: &mut Parser) -> ParseResult<Statement> {
    let cond = parser.parse_expr()?;
    parser.expect_keyword(Keyword::Then)?;
    let then_branch = parse_statement_or_block(parser)?;
    let else_branch = if parser.parse_keyword(Keyword::Else) {
        if parser.parse_keyword(Keyword::If) {
            Some(vec![parse_if_tail(parser)?])
        } else {
            Some(parse_statement_or_block(parser)?)
        }
    } else {
        None
    };
    Ok(Statement::IfThenElse {
        cond,
        then_branch,
        else_branch,
    })
}

/// A single statement, or a `DO ; ... END ;` block, as an IF/ELSE branch.
fn parse_statement_or_block(parser: &mut Parser) -> ParseResult<Vec<Statement>> {
    if parser.peek_token() == Some(&Token::Keyword(Keyword::Do))
        && parser.peek_next_token() == Some(&Token::SemiColon)
    {
        parser.reset_peek_cursor();
        parser.next_token(); // DO
        parser.next_token(); // ;
        parse_block_body(parser)
    } else {
        Ok(vec![parse_statement(parser)?])
    }
}

/// `DO ; ... END ;` / `DO WHILE (cond) ; ... END ;` / `DO UNTIL (cond) ; ... END ;`
/// / `DO var = start TO end [BY step] ; ... END ;`
fn parse_do(parser: &mut Parser) -> ParseResult<Statement> {
    parser.next_token();
    if parser.next_token_if_is(&Token::SemiColon) {
        return Ok(Statement::Block(parse_block_body(parser)?));
    }
    if parser.parse_keyword(Keyword::While) {
        parser.expect_token(&Token::LeftParen)?;
        let cond = parser.parse_expr()?;
        parser.expect_token(&Token::RightParen)?;
        parser.expect_token(&Token::SemiColon)?;
        return Ok(Statement::DoWhile {
            cond,
            body: parse_block_body(parser)?,
        });
    }
    if parser.parse_keyword(Keyword::Until) {
        parser.expect_token(&Token::LeftParen)?;
        let cond = parser.parse_expr()?;
        parser.expect_token(&Token::RightParen)?;
        parser.expect_token(&Token::SemiColon)?;
        return Ok(Statement::DoUntil {
            cond,
            body: parse_block_body(parser)?,
        });
    }
    let var = parser.expect_ident()?.to_ascii_uppercase();
    parser.expect_token(&Token::Equal)?;
    let start = parser.parse_expr()?;
    parser.expect_keyword(Keyword::To)?;
    let end = parser.parse_expr()?;
    let by = if parser.parse_keyword(Keyword::By) {
        Some(parser.parse_expr()?)
    } else {
        None
    };
    parser.expect_token(&Token::SemiColon)?;
    Ok(Statement::DoIndexed {
        var,
        start,
        end,
        by,
        body: parse_block_body(parser)?,
    })
}

/// `name1 name2 ...;` — a bare variable-name list (`DROP`/`KEEP`/`BY`).
fn parse_name_list(parser: &mut Parser) -> ParseResult<Vec<String>> {
    let mut names = Vec::new();
    while !matches!(parser.peek_token(), Some(Token::SemiColon)) {
        names.push(parser.expect_ident()?.to_ascii_uppercase());
    }
    parser.expect_token(&Token::SemiColon)?;
    Ok(names)
}

/// `RETAIN var1 [init1] var2 [init2] ...;` — an initial value is present
/// when the token after a variable name is a literal rather than another
/// identifier.
fn parse_retain(parser: &mut Parser) -> ParseResult<Statement> {
    parser.next_token();
    let mut specs = Vec::new();
    while !matches!(parser.peek_token(), Some(Token::SemiColon)) {
        let name = parser.expect_ident()?.to_ascii_uppercase();
        let initial = match parser.peek_token() {
            Some(Token::Number(_)) => Some(Expr::NumberLit(parser.expect_number()?)),
            Some(Token::Str(_)) => Some(Expr::StringLit(parser.expect_str()?)),
            _ => None,
        };
        specs.push(RetainSpec { name, initial });
    }
    parser.expect_token(&Token::SemiColon)?;
    Ok(Statement::Retain(specs))
}

/// `ARRAY name {size} var1 var2 ...;`
fn parse_array(parser: &mut Parser) -> ParseResult<Statement> {
    parser.next_token();
    let name = parser.expect_ident()?.to_ascii_uppercase();
    parser.expect_token(&Token::LeftBrace)?;
    let size = parser.expect_number()? as usize;
    parser.expect_token(&Token::RightBrace)?;
    let vars = parse_name_list(parser)?;
    Ok(Statement::Array(ArrayDecl { name, size, vars }))
}

/// `LABEL var1='label1' var2='label2' ...;`
fn parse_label(parser: &mut Parser) -> ParseResult<Statement> {
    parser.next_token();
    let mut labels = Vec::new();
    while !matches!(parser.peek_token(), Some(Token::SemiColon)) {
        let name = parser.expect_ident()?.to_ascii_uppercase();
        parser.expect_token(&Token::Equal)?;
        let label = parser.expect_str()?;
        labels.push((name, label));
    }
    parser.expect_token(&Token::SemiColon)?;
    Ok(Statement::Label(labels))
}

/// `LENGTH var1 [$]n1 var2 [$]n2 ...;`
fn parse_length(parser: &mut Parser) -> ParseResult<Statement> {
    parser.next_token();
    let mut specs = Vec::new();
    while !matches!(parser.peek_token(), Some(Token::SemiColon)) {
        let name = parser.expect_ident()?.to_ascii_uppercase();
        let is_char = parser.next_token_if_is(&Token::Dollar);
        let length = parser.expect_number()? as u32;
        specs.push(LengthSpec {
            name,
            is_char,
            length,
        });
    }
    parser.expect_token(&Token::SemiColon)?;
    Ok(Statement::Length(specs))
}

/// `FORMAT var1 fmt1 var2 fmt2 ...;` / `INFORMAT var1 fmt1 var2 fmt2 ...;`
fn parse_format_like(
    parser: &mut Parser,
    build: impl Fn(Vec<(String, String)>) -> Statement,
) -> ParseResult<Statement> {
    parser.next_token();
    let mut pairs = Vec::new();
    while !matches!(parser.peek_token(), Some(Token::SemiColon)) {
        let name = parser.expect_ident()?.to_ascii_uppercase();
        let format = parse_option_value(parser)?;
        pairs.push((name, format));
    }
    parser.expect_token(&Token::SemiColon)?;
    Ok(build(pairs))
}

/// `target = expr;` where `target` is a variable or an array element.
fn parse_assign(parser: &mut Parser) -> ParseResult<Statement> {
    let name = parser.expect_ident()?.to_ascii_uppercase();
    let target = if parser.next_token_if_is(&Token::LeftBrace) {
        let index = parser.parse_expr()?;
        parser.expect_token(&Token::RightBrace)?;
        AssignTarget::ArrayElem { name, index }
    } else {
        AssignTarget::Variable(name)
    };
    parser.expect_token(&Token::Equal)?;
    let value = parser.parse_expr()?;
    parser.expect_token(&Token::SemiColon)?;
    Ok(Statement::Assign { target, value })
}
