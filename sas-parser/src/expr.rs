use sas_ast::{BinOp, Expr, UnOp};
use sas_lexer::{Keyword, Token};

use crate::parser::{ParseResult, Parser};

const OR_PREC: u8 = 10;
const AND_PREC: u8 = 20;
const CMP_PREC: u8 = 30;
const ADD_PREC: u8 = 40;
const MUL_PREC: u8 = 50;
const POW_PREC: u8 = 60;
const UNARY_PREC: u8 = 70;

impl Parser {
    /// Parses a full expression (spec §4.2's precedence climber).
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_subexpr(0)
    }

    fn parse_subexpr(&mut self, min_prec: u8) -> ParseResult<Expr> {
        let mut lhs = self.parse_prefix()?;
        loop {
            let Some((op, prec, right_assoc)) = self.peek_binop() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.next_token();
            let next_min = if right_assoc { prec } else { prec + 1 };
            let rhs = self.parse_subexpr(next_min)?;
            lhs = Expr::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn peek_binop(&mut self) -> Option<(BinOp, u8, bool)> {
        let token = self.peek_token()?;
        let result = match token {
            Token::Keyword(Keyword::Or) => (BinOp::Or, OR_PREC, false),
            Token::Keyword(Keyword::And) => (BinOp::And, AND_PREC, false),
            Token::Equal | Token::DoubleEqual | Token::Keyword(Keyword::Eq) => {
                (BinOp::Eq, CMP_PREC, false)
            }
            Token::NotEqual | Token::Keyword(Keyword::Ne) => (BinOp::Ne, CMP_PREC, false),
            Token::LessThan | Token::Keyword(Keyword::Lt) => (BinOp::Lt, CMP_PREC, false),
            Token::LessThanOrEqual | Token::Keyword(Keyword::Le) => (BinOp::Le, CMP_PREC, false),
            Token::GreaterThan | Token::Keyword(Keyword::Gt) => (BinOp::Gt, CMP_PREC, false),
            Token::GreaterThanOrEqual | Token::Keyword(Keyword::Ge) => {
                (BinOp::Ge, CMP_PREC, false)
            }
            Token::Plus => (BinOp::Add, ADD_PREC, false),
            Token::Minus => (BinOp::Sub, ADD_PREC, false),
            Token::Concat => (BinOp::Concat, ADD_PREC, false),
            Token::Asterisk => (BinOp::Mul, MUL_PREC, false),
            Token::Slash => (BinOp::Div, MUL_PREC, false),
            Token::Power => (BinOp::Pow, POW_PREC, true),
            _ => return None,
        };
        Some(result)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        match self.peek_token() {
            Some(Token::Minus) => {
                self.next_token();
                let expr = self.parse_subexpr(UNARY_PREC)?;
                Ok(Expr::UnaryOp {
                    op: UnOp::Neg,
                    expr: Box::new(expr),
                })
            }
            Some(Token::Keyword(Keyword::Not)) => {
                self.next_token();
                let expr = self.parse_subexpr(UNARY_PREC)?;
                Ok(Expr::UnaryOp {
                    op: UnOp::Not,
                    expr: Box::new(expr),
                })
            }
            Some(Token::Number(_)) => Ok(Expr::NumberLit(self.expect_number()?)),
            Some(Token::Str(_)) => Ok(Expr::StringLit(self.expect_str()?)),
            Some(Token::LeftParen) => {
                self.next_token();
                let expr = self.parse_expr()?;
                self.expect_token(&Token::RightParen)?;
                Ok(expr)
            }
            Some(Token::Ident(_)) => self.parse_ident_expr(),
            _ => self.expected("an expression"),
        }
    }

    /// An identifier-led primary: a function call (`name(args)`), an
    /// array-element reference (`name{index}`), or a bare variable
    /// reference.
    fn parse_ident_expr(&mut self) -> ParseResult<Expr> {
        let name = self.expect_ident()?;
        match self.peek_token() {
            Some(Token::Period) if name.eq_ignore_ascii_case("FIRST") || name.eq_ignore_ascii_case("LAST") => {
                // `FIRST.byvar` / `LAST.byvar`: the BY-group automatic
                // variables a MERGE/BY step maintains (spec §4.3.1). Not a
                // qualified `library.dataset` name — that production only
                // appears in dataset-reference position, never here — so
                // the marker name and the BY variable fold into one
                // canonical PDV reference, `FIRST.VAR`/`LAST.VAR`.
                self.next_token();
                let by_var = self.expect_ident()?;
                Ok(Expr::VarRef(format!("{}.{}", name.to_ascii_uppercase(), by_var.to_ascii_uppercase())))
            }
            Some(Token::LeftParen) => {
                self.next_token();
                let args = if self.next_token_if_is(&Token::RightParen) {
                    Vec::new()
                } else {
                    let args = self.parse_comma_separated(Parser::parse_expr)?;
                    self.expect_token(&Token::RightParen)?;
                    args
                };
                Ok(Expr::FunctionCall {
                    name: name.to_ascii_uppercase(),
                    args,
                })
            }
            Some(Token::LeftBrace) => {
                self.next_token();
                let index = self.parse_expr()?;
                self.expect_token(&Token::RightBrace)?;
                Ok(Expr::ArrayElemRef {
                    name: name.to_ascii_uppercase(),
                    index: Box::new(index),
                })
            }
            _ => Ok(Expr::VarRef(name.to_ascii_uppercase())),
        }
    }
}
