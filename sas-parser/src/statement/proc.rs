use sas_ast::{
    ContentsClauses, FreqClauses, FreqTable, MeansClauses, PrintClauses, ProcStatement,
    QualifiedName, SortClauses, SortKey, SqlClauses, Statistic, TransposeClauses,
};
use sas_lexer::{Keyword, Token};

use super::{parse_option_value, parse_qualified_name};
use crate::parser::{ParseResult, Parser};

/// `PROC <name> ... RUN|QUIT;` (spec §4.6). Procedure names are ordinary
/// identifiers (the lexer has no notion of "PROC context"); unrecognized
/// names still parse — their clauses are skipped opaquely up to the
/// terminator, so `UnsupportedProc` is reported by the dispatcher, not here.
pub(crate) fn parse_proc(parser: &mut Parser) -> ParseResult<ProcStatement> {
    parser.expect_keyword(Keyword::Proc)?;
    let name = parser.expect_ident()?.to_ascii_uppercase();
    match name.as_str() {
        "PRINT" => Ok(ProcStatement::Print(parse_print(parser)?)),
        "SORT" => Ok(ProcStatement::Sort(parse_sort(parser)?)),
        "MEANS" => Ok(ProcStatement::Means(parse_means(parser)?)),
        "FREQ" => Ok(ProcStatement::Freq(parse_freq(parser)?)),
        "TRANSPOSE" => Ok(ProcStatement::Transpose(parse_transpose(parser)?)),
        "SQL" => Ok(ProcStatement::Sql(parse_sql(parser)?)),
        "CONTENTS" => Ok(ProcStatement::Contents(parse_contents(parser)?)),
        _ => {
            skip_to_terminator(parser)?;
            Ok(ProcStatement::Unsupported { name })
        }
    }
}

/// Skips every token of an unrecognized procedure's body up to and
/// including its `RUN;`/`QUIT;` terminator.
fn skip_to_terminator(parser: &mut Parser) -> ParseResult<()> {
    loop {
        match parser.peek_token() {
            Some(Token::Keyword(Keyword::Run)) | Some(Token::Keyword(Keyword::Quit)) => {
                parser.next_token();
                parser.expect_token(&Token::SemiColon)?;
                return Ok(());
            }
            Some(_) => {
                parser.next_token();
            }
            None => return parser.expected("RUN or QUIT"),
        }
    }
}

/// `DATA=name;` as a whole main-statement line, for procedures with no
/// other top-line options.
fn parse_data_eq_then_semi(parser: &mut Parser) -> ParseResult<QualifiedName> {
    parser.expect_keyword(Keyword::Data)?;
    parser.expect_token(&Token::Equal)?;
    let data = parse_qualified_name(parser)?;
    parser.expect_token(&Token::SemiColon)?;
    Ok(data)
}

/// `name1 name2 ...;` — a bare variable-name list ending a clause statement.
fn parse_var_list(parser: &mut Parser) -> ParseResult<Vec<String>> {
    let mut names = Vec::new();
    while !matches!(parser.peek_token(), Some(Token::SemiColon)) {
        names.push(parser.expect_ident()?.to_ascii_uppercase());
    }
    parser.expect_token(&Token::SemiColon)?;
    Ok(names)
}

/// `PROC PRINT DATA=... [NOOBS] [LABEL]; [VAR ...;] [WHERE ...;] [TITLE ...;] RUN;`
fn parse_print(parser: &mut Parser) -> ParseResult<PrintClauses> {
    let mut data = None;
    let mut noobs = false;
    let mut label = false;
    loop {
        match parser.peek_token() {
            Some(Token::Keyword(Keyword::Data)) => {
                parser.next_token();
                parser.expect_token(&Token::Equal)?;
                data = Some(parse_qualified_name(parser)?);
            }
            Some(Token::Keyword(Keyword::Noobs)) => {
                parser.next_token();
                noobs = true;
            }
            Some(Token::Keyword(Keyword::Label)) => {
                parser.next_token();
                label = true;
            }
            Some(Token::SemiColon) => {
                parser.next_token();
                break;
            }
            _ => return parser.expected("DATA=, NOOBS, LABEL, or ';'"),
        }
    }
    let Some(data) = data else {
        return parser.error("PROC PRINT requires DATA=");
    };

    let mut var = None;
    let mut where_expr = None;
    let mut title = None;
    loop {
        match parser.peek_token() {
            Some(Token::Keyword(Keyword::Var)) => {
                parser.next_token();
                var = Some(parse_var_list(parser)?);
            }
            Some(Token::Keyword(Keyword::Where)) => {
                parser.next_token();
                let expr = parser.parse_expr()?;
                parser.expect_token(&Token::SemiColon)?;
                where_expr = Some(expr);
            }
            Some(Token::Keyword(Keyword::Title)) => {
                parser.next_token();
                let text = parser.expect_str()?;
                parser.expect_token(&Token::SemiColon)?;
                title = Some(text);
            }
            Some(Token::Keyword(Keyword::Run)) => {
                parser.next_token();
                parser.expect_token(&Token::SemiColon)?;
                break;
            }
            _ => return parser.expected("VAR, WHERE, TITLE, or RUN"),
        }
    }
    Ok(PrintClauses {
        data,
        var,
        noobs,
        label,
        where_expr,
        title,
    })
}

/// `PROC SORT DATA=... [OUT=...]; BY [DESCENDING] key ...; RUN;`
fn parse_sort(parser: &mut Parser) -> ParseResult<SortClauses> {
    let mut data = None;
    let mut out = None;
    loop {
        match parser.peek_token() {
            Some(Token::Keyword(Keyword::Data)) => {
                parser.next_token();
                parser.expect_token(&Token::Equal)?;
                data = Some(parse_qualified_name(parser)?);
            }
            Some(Token::Keyword(Keyword::Out)) => {
                parser.next_token();
                parser.expect_token(&Token::Equal)?;
                out = Some(parse_qualified_name(parser)?);
            }
            Some(Token::SemiColon) => {
                parser.next_token();
                break;
            }
            _ => return parser.expected("DATA=, OUT=, or ';'"),
        }
    }
    let Some(data) = data else {
        return parser.error("PROC SORT requires DATA=");
    };

    parser.expect_keyword(Keyword::By)?;
    let mut by = Vec::new();
    loop {
        let descending = parser.parse_keyword(Keyword::Descending);
        let name = parser.expect_ident()?.to_ascii_uppercase();
        by.push(SortKey { name, descending });
        if parser.next_token_if_is(&Token::SemiColon) {
            break;
        }
    }
    parser.expect_keyword(Keyword::Run)?;
    parser.expect_token(&Token::SemiColon)?;
    Ok(SortClauses { data, out, by })
}

fn statistic_from_name(name: &str) -> Option<Statistic> {
    match name {
        "N" => Some(Statistic::N),
        "MEAN" => Some(Statistic::Mean),
        "STD" => Some(Statistic::Std),
        "MIN" => Some(Statistic::Min),
        "MAX" => Some(Statistic::Max),
        "SUM" => Some(Statistic::Sum),
        _ => None,
    }
}

/// `PROC MEANS DATA=...; [VAR ...;] [BY ...;] [CLASS var;] [stat stat ...;] RUN;`
fn parse_means(parser: &mut Parser) -> ParseResult<MeansClauses> {
    let data = parse_data_eq_then_semi(parser)?;
    let mut var = None;
    let mut by = None;
    let mut class = None;
    let mut stats = Vec::new();
    loop {
        match parser.peek_token() {
            Some(Token::Keyword(Keyword::Var)) => {
                parser.next_token();
                var = Some(parse_var_list(parser)?);
            }
            Some(Token::Keyword(Keyword::By)) => {
                parser.next_token();
                by = Some(parse_var_list(parser)?);
            }
            Some(Token::Keyword(Keyword::Class)) => {
                parser.next_token();
                let name = parser.expect_ident()?.to_ascii_uppercase();
                parser.expect_token(&Token::SemiColon)?;
                class = Some(name);
            }
            Some(Token::SemiColon) => {
                parser.next_token();
            }
            Some(Token::Keyword(Keyword::Run)) => {
                parser.next_token();
                parser.expect_token(&Token::SemiColon)?;
                break;
            }
            Some(Token::Ident(_)) => {
                let name = parser.expect_ident()?.to_ascii_uppercase();
                match statistic_from_name(&name) {
                    Some(stat) => stats.push(stat),
                    None => return parser.error(format!("unknown statistic {name}")),
                }
            }
            _ => return parser.expected("VAR, BY, CLASS, a statistic name, or RUN"),
        }
    }
    Ok(MeansClauses {
        data,
        var,
        by,
        class,
        stats,
    })
}

/// `PROC FREQ DATA=...; TABLES table[*table2] ...; [WHERE ...;] RUN;`
fn parse_freq(parser: &mut Parser) -> ParseResult<FreqClauses> {
    let data = parse_data_eq_then_semi(parser)?;
    let mut tables = Vec::new();
    let mut where_expr = None;
    loop {
        match parser.peek_token() {
            Some(Token::Keyword(Keyword::Tables)) => {
                parser.next_token();
                tables = parse_freq_tables(parser)?;
            }
            Some(Token::Keyword(Keyword::Where)) => {
                parser.next_token();
                let expr = parser.parse_expr()?;
                parser.expect_token(&Token::SemiColon)?;
                where_expr = Some(expr);
            }
            Some(Token::Keyword(Keyword::Run)) => {
                parser.next_token();
                parser.expect_token(&Token::SemiColon)?;
                break;
            }
            _ => return parser.expected("TABLES, WHERE, or RUN"),
        }
    }
    if tables.is_empty() {
        return parser.error("PROC FREQ requires TABLES");
    }
    Ok(FreqClauses {
        data,
        tables,
        where_expr,
    })
}

fn parse_freq_tables(parser: &mut Parser) -> ParseResult<Vec<FreqTable>> {
    let mut tables = Vec::new();
    loop {
        let mut vars = vec![parser.expect_ident()?.to_ascii_uppercase()];
        while parser.next_token_if_is(&Token::Asterisk) {
            vars.push(parser.expect_ident()?.to_ascii_uppercase());
        }
        tables.push(FreqTable { vars });
        if parser.next_token_if_is(&Token::SemiColon) {
            break;
        }
    }
    Ok(tables)
}

/// `PROC TRANSPOSE DATA=... OUT=... [PREFIX=...] [NAME=...]; [BY ...;] [VAR ...;] [ID var;] RUN;`
fn parse_transpose(parser: &mut Parser) -> ParseResult<TransposeClauses> {
    let mut data = None;
    let mut out = None;
    let mut prefix = None;
    let mut name = None;
    loop {
        match parser.peek_token() {
            Some(Token::Keyword(Keyword::Data)) => {
                parser.next_token();
                parser.expect_token(&Token::Equal)?;
                data = Some(parse_qualified_name(parser)?);
            }
            Some(Token::Keyword(Keyword::Out)) => {
                parser.next_token();
                parser.expect_token(&Token::Equal)?;
                out = Some(parse_qualified_name(parser)?);
            }
            Some(Token::Keyword(Keyword::Prefix)) => {
                parser.next_token();
                parser.expect_token(&Token::Equal)?;
                prefix = Some(parse_option_value(parser)?);
            }
            Some(Token::Keyword(Keyword::Name)) => {
                parser.next_token();
                parser.expect_token(&Token::Equal)?;
                name = Some(parse_option_value(parser)?);
            }
            Some(Token::SemiColon) => {
                parser.next_token();
                break;
            }
            _ => return parser.expected("DATA=, OUT=, PREFIX=, NAME=, or ';'"),
        }
    }
    let Some(data) = data else {
        return parser.error("PROC TRANSPOSE requires DATA=");
    };
    let Some(out) = out else {
        return parser.error("PROC TRANSPOSE requires OUT=");
    };

    let mut by = None;
    let mut var = None;
    let mut id = None;
    loop {
        match parser.peek_token() {
            Some(Token::Keyword(Keyword::By)) => {
                parser.next_token();
                by = Some(parse_var_list(parser)?);
            }
            Some(Token::Keyword(Keyword::Var)) => {
                parser.next_token();
                var = Some(parse_var_list(parser)?);
            }
            Some(Token::Keyword(Keyword::Id)) => {
                parser.next_token();
                let v = parser.expect_ident()?.to_ascii_uppercase();
                parser.expect_token(&Token::SemiColon)?;
                id = Some(v);
            }
            Some(Token::Keyword(Keyword::Run)) => {
                parser.next_token();
                parser.expect_token(&Token::SemiColon)?;
                break;
            }
            _ => return parser.expected("BY, VAR, ID, or RUN"),
        }
    }
    Ok(TransposeClauses {
        data,
        out,
        by,
        var,
        id,
        prefix,
        name,
    })
}

/// `PROC SQL; SELECT * | col, ... FROM name [WHERE ...]; QUIT;` — `SELECT`
/// and `FROM` are ordinary identifiers here, not keywords, since they only
/// mean anything inside `PROC SQL`.
fn parse_sql(parser: &mut Parser) -> ParseResult<SqlClauses> {
    parser.expect_token(&Token::SemiColon)?;
    expect_ident_text(parser, "SELECT")?;
    let select = if parser.next_token_if_is(&Token::Asterisk) {
        None
    } else {
        Some(parser.parse_comma_separated(|p| Ok(p.expect_ident()?.to_ascii_uppercase()))?)
    };
    expect_ident_text(parser, "FROM")?;
    let from = parse_qualified_name(parser)?;
    let where_expr = if parser.parse_keyword(Keyword::Where) {
        Some(parser.parse_expr()?)
    } else {
        None
    };
    parser.expect_token(&Token::SemiColon)?;
    parser.expect_keyword(Keyword::Quit)?;
    parser.expect_token(&Token::SemiColon)?;
    Ok(SqlClauses {
        select,
        from,
        where_expr,
    })
}

fn expect_ident_text(parser: &mut Parser, expected: &str) -> ParseResult<()> {
    match parser.peek_token() {
        Some(Token::Ident(s)) if s.eq_ignore_ascii_case(expected) => {
            parser.next_token();
            Ok(())
        }
        _ => parser.expected(expected),
    }
}

/// `PROC CONTENTS DATA=...; RUN;`
fn parse_contents(parser: &mut Parser) -> ParseResult<ContentsClauses> {
    let data = parse_data_eq_then_semi(parser)?;
    parser.expect_keyword(Keyword::Run)?;
    parser.expect_token(&Token::SemiColon)?;
    Ok(ContentsClauses { data })
}
