use std::{iter::Peekable, str::Chars};

use crate::{
    error::{LexerError, Location},
    keyword::Keyword,
    token::{Comment, Token, Whitespace},
};

/// Lexing mode. `Datalines` is entered mid-stream once `DATALINES ;` (or
/// `CARDS ;`) has been seen and returns to `Normal` once the raw-line block's
/// closing `;` is found (§4.1 "DATALINES block").
#[derive(Copy, Clone, Eq, PartialEq)]
enum Mode {
    Normal,
    Datalines,
}

/// SAS lexer: produces the next token from a source buffer, or `None` at EOF.
pub struct Lexer<'a> {
    iter: Peekable<Chars<'a>>,
    location: Location,
    mode: Mode,
    /// True at the start of input and immediately after a `;`: a `*` seen
    /// here opens a `* … ;` comment rather than meaning multiplication.
    at_statement_start: bool,
    /// Set once a `DATALINES`/`CARDS` keyword has been emitted; consumed by
    /// the immediately following `;`, which flips `mode` to `Datalines`.
    saw_datalines_keyword: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            iter: input.chars().peekable(),
            location: Location { line: 1, column: 1 },
            mode: Mode::Normal,
            at_statement_start: true,
            saw_datalines_keyword: false,
        }
    }

    /// Returns the current location scanned by the lexer.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Tokenizes the whole input and produces a sequence of tokens,
    /// including whitespace and comment tokens (callers that only care about
    /// the statement grammar filter those, matching the parser's own intake).
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        Ok(self
            .tokenize_with_locations()?
            .into_iter()
            .map(|(token, _)| token)
            .collect())
    }

    /// Like [`Lexer::tokenize`], but pairs each token with the location of
    /// its first character, so the parser can report source positions
    /// without re-scanning.
    pub fn tokenize_with_locations(&mut self) -> Result<Vec<(Token, Location)>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let start = self.location;
            let Some(token) = self.next_token()? else {
                break;
            };
            let token = (token, start);
            self.record_mode_transition(&token.0);
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn record_mode_transition(&mut self, token: &Token) {
        match token {
            Token::Keyword(Keyword::Datalines) | Token::Keyword(Keyword::Cards) => {
                self.saw_datalines_keyword = true;
            }
            Token::Whitespace(_) | Token::Comment(_) => {}
            Token::SemiColon if self.saw_datalines_keyword => {
                self.saw_datalines_keyword = false;
                self.mode = Mode::Datalines;
            }
            _ => self.saw_datalines_keyword = false,
        }
        match token {
            Token::Whitespace(_) | Token::Comment(_) => {}
            Token::SemiColon => self.at_statement_start = true,
            _ => self.at_statement_start = false,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        if self.mode == Mode::Datalines {
            return Ok(self.next_datalines_token());
        }
        match self.iter.peek().copied() {
            Some(ch) => match ch {
                ' ' | '\t' | '\n' | '\r' => Ok(self.tokenize_whitespace().map(Token::Whitespace)),
                '\'' | '"' => {
                    self.next_char();
                    let s = self.tokenize_string_literal(ch)?;
                    Ok(Some(Token::Str(s)))
                }
                '*' if self.at_statement_start => {
                    self.next_char();
                    Ok(Some(Token::Comment(self.tokenize_star_comment()?)))
                }
                ch if is_ident_start(ch) => {
                    self.next_char();
                    let ident = self.tokenize_ident(ch);
                    Ok(Some(Token::ident_or_keyword(ident)))
                }
                ch if ch.is_ascii_digit() || ch == '.' => self.tokenize_number(),
                _ => self.tokenize_symbol(),
            },
            None => Ok(None),
        }
    }

    fn tokenize_whitespace(&mut self) -> Option<Whitespace> {
        self.iter.next().map(|ch| match ch {
            ' ' => {
                self.location.column += 1;
                Whitespace::Space
            }
            '\t' => {
                self.location.column += 1;
                Whitespace::Tab
            }
            '\n' => {
                self.location.line += 1;
                self.location.column = 1;
                Whitespace::Newline
            }
            '\r' => {
                self.iter.next_if_eq(&'\n');
                self.location.line += 1;
                self.location.column = 1;
                Whitespace::Newline
            }
            _ => unreachable!(),
        })
    }

    fn tokenize_string_literal(&mut self, quote: char) -> Result<String, LexerError> {
        let mut s = String::new();
        loop {
            match self.next_char() {
                Some(ch) if ch == quote => {
                    if self.next_if_is(quote) {
                        s.push(quote); // doubled quote -> literal quote
                    } else {
                        return Ok(s);
                    }
                }
                Some(ch) => s.push(ch),
                None => return Err(self.location.into_error("Unterminated string literal")),
            }
        }
    }

    fn tokenize_ident(&mut self, first: char) -> String {
        let mut ident = String::from(first);
        ident.push_str(&self.next_while(|&ch| is_ident_part(ch)));
        ident
    }

    fn tokenize_number(&mut self) -> Result<Option<Token>, LexerError> {
        let mut s = self.next_while(|ch| ch.is_ascii_digit());
        if self.next_if_is('.') {
            s.push('.');
            s += &self.next_while(|ch| ch.is_ascii_digit());
        }
        if s == "." {
            return Ok(Some(Token::Period));
        }
        Ok(Some(Token::Number(s)))
    }

    fn tokenize_symbol(&mut self) -> Result<Option<Token>, LexerError> {
        let Some(ch) = self.next_char() else {
            return Ok(None);
        };
        let token = match ch {
            ',' => Token::Comma,
            ';' => Token::SemiColon,
            ':' => Token::Colon,
            '$' => Token::Dollar,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '{' => Token::LeftBrace,
            '}' => Token::RightBrace,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            '=' if self.next_if_is('=') => Token::DoubleEqual,
            '=' => Token::Equal,
            '<' if self.next_if_is('>') => Token::NotEqual,
            '<' if self.next_if_is('=') => Token::LessThanOrEqual,
            '<' => Token::LessThan,
            '>' if self.next_if_is('=') => Token::GreaterThanOrEqual,
            '>' => Token::GreaterThan,
            '!' if self.next_if_is('=') => Token::NotEqual,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' if self.next_if_is('*') => Token::Power,
            '*' => Token::Asterisk,
            '/' if self.next_if_is('*') => Token::Comment(self.tokenize_block_comment()?),
            '/' => Token::Slash,
            '|' if self.next_if_is('|') => Token::Concat,
            other => {
                return Err(self.location.into_error(format!("unknown character {other:?}")));
            }
        };
        Ok(Some(token))
    }

    /// `* … ;` comment: everything through the next `;`, inclusive.
    fn tokenize_star_comment(&mut self) -> Result<Comment, LexerError> {
        let mut text = String::new();
        loop {
            match self.next_char() {
                Some(';') => return Ok(Comment::Star(text)),
                Some(ch) => text.push(ch),
                None => return Err(self.location.into_error("Unterminated comment")),
            }
        }
    }

    /// `/* … */` comment. Non-nested: the first `*/` closes it.
    fn tokenize_block_comment(&mut self) -> Result<Comment, LexerError> {
        let mut text = String::new();
        loop {
            match self.next_char() {
                Some('*') if self.next_if_is('/') => return Ok(Comment::Block(text)),
                Some(ch) => text.push(ch),
                None => return Err(self.location.into_error("Unterminated comment")),
            }
        }
    }

    fn next_datalines_token(&mut self) -> Option<Token> {
        self.iter.peek()?;
        let mut line = String::new();
        loop {
            match self.iter.peek().copied() {
                None => break,
                Some('\n') => {
                    self.next_char();
                    break;
                }
                Some('\r') => {
                    self.next_char();
                    self.iter.next_if_eq(&'\n');
                    break;
                }
                Some(ch) => {
                    self.next_char();
                    line.push(ch);
                }
            }
        }
        if line.trim() == ";" {
            self.mode = Mode::Normal;
            Some(Token::SemiColon)
        } else {
            Some(Token::DatalinesLine(line))
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.iter.next()?;
        self.location.advance(ch);
        Some(ch)
    }

    fn next_if_is(&mut self, ch: char) -> bool {
        if self.iter.next_if_eq(&ch).is_some() {
            self.location.advance(ch);
            true
        } else {
            false
        }
    }

    fn next_while<F: Fn(&char) -> bool>(&mut self, predicate: F) -> String {
        let mut value = String::new();
        while let Some(ch) = self.iter.next_if(&predicate) {
            self.location.advance(ch);
            value.push(ch);
        }
        value
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize().expect("should lex")
    }

    fn significant(input: &str) -> Vec<Token> {
        tokens(input)
            .into_iter()
            .filter(|t| !t.is_whitespace() && !t.is_comment())
            .collect()
    }

    #[test]
    fn tokenize_keywords_case_insensitive() {
        assert_eq!(
            significant("data work.out; run;"),
            vec![
                Token::Keyword(Keyword::Data),
                Token::Ident("work".into()),
                Token::Period,
                Token::Ident("out".into()),
                Token::SemiColon,
                Token::Keyword(Keyword::Run),
                Token::SemiColon,
            ]
        );
        assert_eq!(
            significant("DATA work.out; RUN;"),
            significant("data work.out; run;")
        );
    }

    #[test]
    fn tokenize_numbers() {
        assert_eq!(
            significant("1 2.5 .5 5."),
            vec![
                Token::Number("1".into()),
                Token::Number("2.5".into()),
                Token::Number(".5".into()),
                Token::Number("5.".into()),
            ]
        );
    }

    #[test]
    fn tokenize_string_with_doubled_quote() {
        assert_eq!(significant("'it''s'"), vec![Token::Str("it's".into())]);
    }

    #[test]
    fn tokenize_double_char_operators() {
        assert_eq!(
            significant("a >= b <= c <> d ** e || f"),
            vec![
                Token::Ident("a".into()),
                Token::GreaterThanOrEqual,
                Token::Ident("b".into()),
                Token::LessThanOrEqual,
                Token::Ident("c".into()),
                Token::NotEqual,
                Token::Ident("d".into()),
                Token::Power,
                Token::Ident("e".into()),
                Token::Concat,
                Token::Ident("f".into()),
            ]
        );
    }

    #[test]
    fn tokenize_star_comment_only_at_statement_start() {
        assert_eq!(
            significant("* this is a comment; x=1;"),
            vec![
                Token::Ident("x".into()),
                Token::Equal,
                Token::Number("1".into()),
                Token::SemiColon,
            ]
        );
        // not a comment mid-statement: '*' is multiplication.
        assert_eq!(
            significant("x=2*3;"),
            vec![
                Token::Ident("x".into()),
                Token::Equal,
                Token::Number("2".into()),
                Token::Asterisk,
                Token::Number("3".into()),
                Token::SemiColon,
            ]
        );
    }

    #[test]
    fn tokenize_block_comment() {
        assert_eq!(
            tokens("x /* a comment */ = 1;")
                .into_iter()
                .filter(|t| !t.is_whitespace())
                .collect::<Vec<_>>(),
            vec![
                Token::Ident("x".into()),
                Token::Comment(Comment::Block(" a comment ".into())),
                Token::Equal,
                Token::Number("1".into()),
                Token::SemiColon,
            ]
        );
    }

    #[test]
    fn tokenize_datalines_block() {
        let toks = significant("data a; input x; datalines;\n1\n2\n;\nrun;");
        assert_eq!(
            toks,
            vec![
                Token::Keyword(Keyword::Data),
                Token::Ident("a".into()),
                Token::SemiColon,
                Token::Keyword(Keyword::Input),
                Token::Ident("x".into()),
                Token::SemiColon,
                Token::Keyword(Keyword::Datalines),
                Token::SemiColon,
                Token::DatalinesLine("1".into()),
                Token::DatalinesLine("2".into()),
                Token::SemiColon,
                Token::Keyword(Keyword::Run),
                Token::SemiColon,
            ]
        );
    }

    #[test]
    fn tokenize_unterminated_string_reports_location() {
        let err = Lexer::new("x = 'abc").tokenize().unwrap_err();
        assert_eq!(err.location(), Location { line: 1, column: 9 });
    }
}
