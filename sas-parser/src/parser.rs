use std::fmt::Display;

use sas_ast::{Program, TopLevelStatement};
use sas_lexer::{Keyword, Lexer, Location, Token};

use crate::{
    error::{ParseFailure, ParserError},
    peek::{MultiPeek, PeekIteratorExt},
};

/// The result of one call to [`Parser::parse_next_statement`] (spec §4.2):
/// the central tri-state that lets a REPL distinguish "keep reading" from
/// "that was wrong".
#[derive(Debug)]
pub enum ParseOutcome {
    /// A full statement was parsed.
    Complete(TopLevelStatement),
    /// The token stream ran out before the statement's terminator; a REPL
    /// should buffer more input and try again. Never returned for a
    /// genuinely malformed statement.
    Incomplete,
    /// A syntactic error, not explainable by missing input.
    Error(ParserError),
    /// The token stream is exhausted and no statement was started.
    Eof,
}

pub(crate) type ParseResult<T> = Result<T, ParseFailure>;

/// SAS-subset parser: consumes a token stream and produces [`sas_ast`] nodes.
pub struct Parser {
    iter: MultiPeek<std::vec::IntoIter<(Token, Location)>>,
    last_location: Location,
}

impl Parser {
    /// Builds a parser directly from a token/location stream, filtering
    /// whitespace and comments (the statement grammar never sees them).
    pub fn new_with_tokens(tokens: Vec<(Token, Location)>) -> Self {
        let filtered: Vec<_> = tokens
            .into_iter()
            .filter(|(token, _)| !token.is_whitespace() && !token.is_comment())
            .collect();
        Self {
            iter: filtered.into_iter().multipeek(),
            last_location: Location::default(),
        }
    }

    /// Lexes `source` and builds a parser over the resulting tokens.
    pub fn new_with_source(source: &str) -> Result<Self, ParserError> {
        let tokens = Lexer::new(source).tokenize_with_locations()?;
        Ok(Self::new_with_tokens(tokens))
    }

    /// Parses every statement in the token stream, stopping at the first
    /// [`ParseOutcome::Error`] or at end of input. An [`ParseOutcome::Incomplete`]
    /// statement this deep into a whole-file parse means the script itself
    /// is truncated, which batch mode reports as an error (spec §6 "batch
    /// mode"); the tri-state distinction exists for the REPL, not here.
    pub fn parse_program(&mut self) -> (Program, Vec<ParserError>) {
        let mut program = Program::new();
        let mut errors = Vec::new();
        loop {
            match self.parse_next_statement() {
                ParseOutcome::Complete(stmt) => program.statements.push(stmt),
                ParseOutcome::Incomplete => {
                    errors.push(ParserError::UnexpectedToken {
                        message: "unexpected end of input".to_string(),
                        location: self.last_location,
                    });
                    break;
                }
                ParseOutcome::Error(err) => {
                    errors.push(err);
                    self.recover_to_next_statement();
                }
                ParseOutcome::Eof => break,
            }
        }
        (program, errors)
    }

    /// Parses one top-level statement (spec §4.2 `parseStatement`).
    pub fn parse_next_statement(&mut self) -> ParseOutcome {
        if self.peek_token().is_none() {
            return ParseOutcome::Eof;
        }
        match crate::statement::parse_top_level(self) {
            Ok(stmt) => ParseOutcome::Complete(stmt),
            Err(ParseFailure::Eof) => ParseOutcome::Incomplete,
            Err(ParseFailure::Syntax(err)) => ParseOutcome::Error(err),
        }
    }

    /// Error recovery (spec §4.2): skip tokens until the next `;` (consumed)
    /// or end of input.
    fn recover_to_next_statement(&mut self) {
        while let Some(token) = self.next_token() {
            if token == Token::SemiColon {
                break;
            }
        }
    }

    /// Reports an unexpected-token failure: EOF becomes [`ParseFailure::Eof`]
    /// (spec §4.2 incompleteness), anything else a syntax error carrying the
    /// offending token's text and location.
    pub(crate) fn expected<R>(&mut self, expected: impl Display) -> ParseResult<R> {
        match self.peek_token().cloned() {
            Some(found) => {
                let location = self.peek_location().unwrap_or(self.last_location);
                Err(ParseFailure::Syntax(ParserError::UnexpectedToken {
                    message: format!("expected {expected}, found {found}"),
                    location,
                }))
            }
            None => Err(ParseFailure::Eof),
        }
    }

    /// Raises a syntax error not tied to the next peeked token, e.g. a
    /// required clause (`DATA=`) missing from a just-finished statement.
    pub(crate) fn error<R>(&mut self, message: impl Display) -> ParseResult<R> {
        Err(ParseFailure::Syntax(ParserError::UnexpectedToken {
            message: message.to_string(),
            location: self.last_location,
        }))
    }

    /// Consumes the next keyword token, failing if it doesn't match.
    pub(crate) fn expect_keyword(&mut self, keyword: Keyword) -> ParseResult<()> {
        if self.parse_keyword(keyword) {
            Ok(())
        } else {
            self.expected(keyword)
        }
    }

    /// Consumes the next token, failing if it doesn't match `expected`.
    pub(crate) fn expect_token(&mut self, expected: &Token) -> ParseResult<()> {
        if self.next_token_if_is(expected) {
            Ok(())
        } else {
            self.expected(expected)
        }
    }

    /// Consumes an identifier token, failing otherwise.
    pub(crate) fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek_token() {
            Some(Token::Ident(_)) => match self.next_token() {
                Some(Token::Ident(s)) => Ok(s),
                _ => unreachable!(),
            },
            _ => self.expected("an identifier"),
        }
    }

    /// Consumes an identifier or a keyword token as a bare name, returning
    /// its canonical text. Option/variable names such as `DATA=`, `OUT=`, or
    /// `KEEP=` collide with reserved keywords, so callers that parse
    /// `name=value` clauses need this instead of [`Parser::expect_ident`].
    pub(crate) fn expect_name(&mut self) -> ParseResult<String> {
        match self.peek_token() {
            Some(Token::Ident(_)) => self.expect_ident(),
            Some(Token::Keyword(kw)) => {
                let text = kw.to_string();
                self.next_token();
                Ok(text)
            }
            _ => self.expected("a name"),
        }
    }

    /// Consumes a numeric literal token, parsing it to `f64`.
    pub(crate) fn expect_number(&mut self) -> ParseResult<f64> {
        match self.peek_token() {
            Some(Token::Number(_)) => match self.next_token() {
                Some(Token::Number(s)) => {
                    s.parse::<f64>().map_err(|_| {
                        ParseFailure::Syntax(ParserError::UnexpectedToken {
                            message: format!("malformed numeric literal {s}"),
                            location: self.last_location,
                        })
                    })
                }
                _ => unreachable!(),
            },
            _ => self.expected("a number"),
        }
    }

    /// Consumes a string literal token.
    pub(crate) fn expect_str(&mut self) -> ParseResult<String> {
        match self.peek_token() {
            Some(Token::Str(_)) => match self.next_token() {
                Some(Token::Str(s)) => Ok(s),
                _ => unreachable!(),
            },
            _ => self.expected("a string literal"),
        }
    }

    /// Consumes the next keyword token if it matches `keyword`.
    pub(crate) fn parse_keyword(&mut self, keyword: Keyword) -> bool {
        self.next_token_if(|token| token.is_keyword(keyword)).is_some()
    }

    /// Consumes the next several tokens if and only if they match `keywords`
    /// in order; otherwise consumes nothing.
    pub(crate) fn parse_keywords(&mut self, keywords: &[Keyword]) -> bool {
        for &keyword in keywords {
            match self.peek_next_token() {
                Some(token) if token.is_keyword(keyword) => {}
                _ => {
                    self.reset_peek_cursor();
                    return false;
                }
            }
        }
        for _ in 0..keywords.len() {
            self.next_token();
        }
        true
    }

    /// Consumes the next token if it is one of `keywords`, returning which.
    pub(crate) fn parse_one_of_keywords(&mut self, keywords: &[Keyword]) -> Option<Keyword> {
        let found = match self.peek_token() {
            Some(Token::Keyword(kw)) if keywords.contains(kw) => Some(*kw),
            _ => None,
        };
        if found.is_some() {
            self.next_token();
        }
        found
    }

    pub(crate) fn peek_token(&mut self) -> Option<&Token> {
        self.iter.peek().map(|(token, _)| token)
    }

    pub(crate) fn peek_location(&mut self) -> Option<Location> {
        self.iter.peek().map(|(_, location)| *location)
    }

    pub(crate) fn peek_next_token(&mut self) -> Option<&Token> {
        self.iter.peek_next().map(|(token, _)| token)
    }

    pub(crate) fn reset_peek_cursor(&mut self) {
        self.iter.reset_cursor();
    }

    pub(crate) fn next_token(&mut self) -> Option<Token> {
        let (token, location) = self.iter.next()?;
        self.last_location = location;
        Some(token)
    }

    pub(crate) fn next_token_if(&mut self, func: impl FnOnce(&Token) -> bool) -> Option<Token> {
        match self.peek_token() {
            Some(token) if func(token) => self.next_token(),
            _ => None,
        }
    }

    pub(crate) fn next_token_if_is(&mut self, expected: &Token) -> bool {
        self.next_token_if(|token| token == expected).is_some()
    }

    /// Parses a comma-separated list of 1+ items accepted by `f`.
    pub(crate) fn parse_comma_separated<T>(
        &mut self,
        mut f: impl FnMut(&mut Parser) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        let mut values = vec![f(self)?];
        while self.next_token_if_is(&Token::Comma) {
            values.push(f(self)?);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use sas_ast::{GlobalStatement, Statement, TopLevelStatement};

    use super::*;

    fn parse_one(source: &str) -> ParseOutcome {
        Parser::new_with_source(source).unwrap().parse_next_statement()
    }

    #[test]
    fn complete_data_step_parses() {
        let outcome = parse_one("data a; x = 1; run;");
        assert!(matches!(outcome, ParseOutcome::Complete(TopLevelStatement::Data(_))));
    }

    #[test]
    fn truncated_data_step_is_incomplete_not_error() {
        let outcome = parse_one("data a; x = 1;");
        assert!(matches!(outcome, ParseOutcome::Incomplete));
    }

    #[test]
    fn truncated_expression_is_incomplete() {
        let outcome = parse_one("data a; x = 1 +");
        assert!(matches!(outcome, ParseOutcome::Incomplete));
    }

    #[test]
    fn genuine_syntax_error_is_error_not_incomplete() {
        let outcome = parse_one("data a; x = ; run;");
        assert!(matches!(outcome, ParseOutcome::Error(_)));
    }

    #[test]
    fn empty_input_is_eof() {
        let outcome = parse_one("");
        assert!(matches!(outcome, ParseOutcome::Eof));
    }

    #[test]
    fn else_if_chain_nests_as_single_branch_statements() {
        let outcome = parse_one(
            "data a; if x = 1 then y = 1; else if x = 2 then y = 2; else y = 3; run;",
        );
        let ParseOutcome::Complete(TopLevelStatement::Data(step)) = outcome else {
            panic!("expected a complete DATA step, got {outcome:?}");
        };
        let Statement::IfThenElse { else_branch, .. } = &step.body[0] else {
            panic!("expected an IfThenElse statement");
        };
        let else_branch = else_branch.as_ref().expect("ELSE IF present");
        assert_eq!(else_branch.len(), 1);
        assert!(matches!(else_branch[0], Statement::IfThenElse { .. }));
    }

    #[test]
    fn options_statement_parses_name_value_pairs() {
        let outcome = parse_one("options linesize=80 pagesize=60;");
        let ParseOutcome::Complete(TopLevelStatement::Global(GlobalStatement::Options(pairs))) =
            outcome
        else {
            panic!("expected a complete OPTIONS statement, got {outcome:?}");
        };
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("LINESIZE".to_string(), "80".to_string()));
    }

    #[test]
    fn expression_precedence_orders_multiplication_above_addition() {
        let outcome = parse_one("data a; x = 1 + 2 * 3; run;");
        let ParseOutcome::Complete(TopLevelStatement::Data(step)) = outcome else {
            panic!("expected a complete DATA step, got {outcome:?}");
        };
        let Statement::Assign { value, .. } = &step.body[0] else {
            panic!("expected an Assign statement");
        };
        match value {
            sas_ast::Expr::BinaryOp { op: sas_ast::BinOp::Add, rhs, .. } => {
                assert!(matches!(**rhs, sas_ast::Expr::BinaryOp { op: sas_ast::BinOp::Mul, .. }));
            }
            other => panic!("expected a top-level Add, got {other:?}"),
        }
    }

    #[test]
    fn unary_minus_binds_tighter_than_exponentiation() {
        // Per the spec's literal precedence list, unary NOT/minus binds
        // tighter than `**`, so `-2 ** 2` parses as `(-2) ** 2`.
        let outcome = parse_one("data a; x = -2 ** 2; run;");
        let ParseOutcome::Complete(TopLevelStatement::Data(step)) = outcome else {
            panic!("expected a complete DATA step, got {outcome:?}");
        };
        let Statement::Assign { value, .. } = &step.body[0] else {
            panic!("expected an Assign statement");
        };
        match value {
            sas_ast::Expr::BinaryOp { op: sas_ast::BinOp::Pow, lhs, .. } => {
                assert!(matches!(**lhs, sas_ast::Expr::UnaryOp { op: sas_ast::UnOp::Neg, .. }));
            }
            other => panic!("expected a top-level Pow, got {other:?}"),
        }
    }

    #[test]
    fn datalines_captures_raw_lines_up_to_closing_semicolon() {
        let outcome = parse_one("data a; input x; datalines;\n1\n2\n3\n;\nrun;");
        let ParseOutcome::Complete(TopLevelStatement::Data(step)) = outcome else {
            panic!("expected a complete DATA step, got {outcome:?}");
        };
        let Statement::Datalines(lines) = &step.body[1] else {
            panic!("expected a Datalines statement");
        };
        assert_eq!(lines, &vec!["1".to_string(), "2".to_string(), "3".to_string()]);
    }
}
