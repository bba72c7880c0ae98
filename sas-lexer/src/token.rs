use std::fmt;

use crate::keyword::Keyword;

/// A single lexical token, paired with its source [`Location`](crate::Location)
/// by the lexer's caller (the lexer tracks location internally and attaches
/// it only to errors; token position is reconstructed by the parser as it
/// consumes tokens, matching the teacher's `Lexer::location()` pull model).
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// Whitespace (space, newline, tab). Filtered out before parsing.
    Whitespace(Whitespace),
    /// `* … ;` or `/* … */` comment. Filtered out before parsing.
    Comment(Comment),

    /// An identifier that is not a reserved keyword.
    Ident(String),
    /// A reserved keyword.
    Keyword(Keyword),
    /// A numeric literal: digits with an optional single decimal point.
    Number(String),
    /// A single- or double-quoted string literal, quotes stripped.
    Str(String),
    /// One raw line of a `DATALINES`/`CARDS` block, produced by the lexer's
    /// line-buffered mode and opaque to the statement grammar.
    DatalinesLine(String),

    /// `,`
    Comma,
    /// `;`
    SemiColon,
    /// `:`
    Colon,
    /// `.`
    Period,
    /// `$`
    Dollar,

    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,

    /// `=`
    Equal,
    /// `==`
    DoubleEqual,
    /// `<>` or `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Asterisk,
    /// `**`
    Power,
    /// `/`
    Slash,
    /// `||`
    Concat,

    /// Any other single character, kept so the parser can report it verbatim.
    Other(char),
}

impl Token {
    /// Builds a keyword-or-identifier token: keywords are recognized
    /// case-insensitively and promoted at lex time (§4.1).
    pub fn ident_or_keyword(text: impl Into<String>) -> Token {
        let text = text.into();
        match Keyword::lookup(&text) {
            Some(kw) => Token::Keyword(kw),
            None => Token::Ident(text),
        }
    }

    /// True for [`Token::Whitespace`].
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Token::Whitespace(_))
    }

    /// True for [`Token::Comment`].
    pub fn is_comment(&self) -> bool {
        matches!(self, Token::Comment(_))
    }

    /// True if this token is the given keyword.
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, Token::Keyword(kw) if *kw == keyword)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Whitespace(w) => write!(f, "{w}"),
            Token::Comment(c) => write!(f, "{c}"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Keyword(k) => write!(f, "{k}"),
            Token::Number(n) => write!(f, "{n}"),
            Token::Str(s) => write!(f, "'{s}'"),
            Token::DatalinesLine(s) => write!(f, "{s}"),
            Token::Comma => f.write_str(","),
            Token::SemiColon => f.write_str(";"),
            Token::Colon => f.write_str(":"),
            Token::Period => f.write_str("."),
            Token::Dollar => f.write_str("$"),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::LeftBrace => f.write_str("{"),
            Token::RightBrace => f.write_str("}"),
            Token::LeftBracket => f.write_str("["),
            Token::RightBracket => f.write_str("]"),
            Token::Equal => f.write_str("="),
            Token::DoubleEqual => f.write_str("=="),
            Token::NotEqual => f.write_str("<>"),
            Token::LessThan => f.write_str("<"),
            Token::LessThanOrEqual => f.write_str("<="),
            Token::GreaterThan => f.write_str(">"),
            Token::GreaterThanOrEqual => f.write_str(">="),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Asterisk => f.write_str("*"),
            Token::Power => f.write_str("**"),
            Token::Slash => f.write_str("/"),
            Token::Concat => f.write_str("||"),
            Token::Other(c) => write!(f, "{c}"),
        }
    }
}

/// Whitespace token payload.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Whitespace {
    /// ` `
    Space,
    /// `\n` (also emitted for a bare `\r` or `\r\n`)
    Newline,
    /// `\t`
    Tab,
}

impl fmt::Display for Whitespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Space => f.write_str(" "),
            Self::Newline => f.write_str("\n"),
            Self::Tab => f.write_str("\t"),
        }
    }
}

/// Comment token payload.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Comment {
    /// `* … ;` statement-comment, including the terminating `;`.
    Star(String),
    /// `/* … */` block comment, contents between the delimiters.
    Block(String),
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Star(s) => write!(f, "*{s}"),
            Self::Block(s) => write!(f, "/*{s}*/"),
        }
    }
}
