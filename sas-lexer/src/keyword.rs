use std::fmt;

/// Reserved words of the DATA step / global statement / PROC clause grammar.
///
/// Procedure names (`PRINT`, `SORT`, `MEANS`, ...) are deliberately *not*
/// keywords: the lexer has no notion of "PROC context", so the parser
/// recognizes them as plain identifiers immediately following `PROC`.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Keyword {
    Data,
    Run,
    Quit,
    If,
    Then,
    Else,
    Do,
    End,
    While,
    Until,
    To,
    By,
    Leave,
    Continue,
    Output,
    Set,
    Merge,
    Retain,
    Drop,
    Keep,
    Array,
    Length,
    Label,
    Format,
    Informat,
    Input,
    Datalines,
    Cards,
    Proc,
    Var,
    Where,
    Options,
    Libname,
    Title,
    Footnote,
    Descending,
    Out,
    Noobs,
    Class,
    Tables,
    Id,
    Prefix,
    Name,
    And,
    Or,
    Not,
    Ne,
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Keyword {
    const ALL: &'static [(Keyword, &'static str)] = &[
        (Keyword::Data, "DATA"),
        (Keyword::Run, "RUN"),
        (Keyword::Quit, "QUIT"),
        (Keyword::If, "IF"),
        (Keyword::Then, "THEN"),
        (Keyword::Else, "ELSE"),
        (Keyword::Do, "DO"),
        (Keyword::End, "END"),
        (Keyword::While, "WHILE"),
        (Keyword::Until, "UNTIL"),
        (Keyword::To, "TO"),
        (Keyword::By, "BY"),
        (Keyword::Leave, "LEAVE"),
        (Keyword::Continue, "CONTINUE"),
        (Keyword::Output, "OUTPUT"),
        (Keyword::Set, "SET"),
        (Keyword::Merge, "MERGE"),
        (Keyword::Retain, "RETAIN"),
        (Keyword::Drop, "DROP"),
        (Keyword::Keep, "KEEP"),
        (Keyword::Array, "ARRAY"),
        (Keyword::Length, "LENGTH"),
        (Keyword::Label, "LABEL"),
        (Keyword::Format, "FORMAT"),
        (Keyword::Informat, "INFORMAT"),
        (Keyword::Input, "INPUT"),
        (Keyword::Datalines, "DATALINES"),
        (Keyword::Cards, "CARDS"),
        (Keyword::Proc, "PROC"),
        (Keyword::Var, "VAR"),
        (Keyword::Where, "WHERE"),
        (Keyword::Options, "OPTIONS"),
        (Keyword::Libname, "LIBNAME"),
        (Keyword::Title, "TITLE"),
        (Keyword::Footnote, "FOOTNOTE"),
        (Keyword::Descending, "DESCENDING"),
        (Keyword::Out, "OUT"),
        (Keyword::Noobs, "NOOBS"),
        (Keyword::Class, "CLASS"),
        (Keyword::Tables, "TABLES"),
        (Keyword::Id, "ID"),
        (Keyword::Prefix, "PREFIX"),
        (Keyword::Name, "NAME"),
        (Keyword::And, "AND"),
        (Keyword::Or, "OR"),
        (Keyword::Not, "NOT"),
        (Keyword::Ne, "NE"),
        (Keyword::Eq, "EQ"),
        (Keyword::Lt, "LT"),
        (Keyword::Le, "LE"),
        (Keyword::Gt, "GT"),
        (Keyword::Ge, "GE"),
    ];

    /// Looks up a keyword by its (case-insensitive) spelling. `ELSE IF` is
    /// two tokens, `Else` followed by `If`; the parser recognizes the pair
    /// by peeking one token past a matched `ELSE` rather than the lexer
    /// fusing them (spec §4.1 asks for a single logical token, but a
    /// two-token lookahead in the recursive-descent parser is equivalent
    /// and keeps the lexer dialect-agnostic).
    pub fn lookup(ident: &str) -> Option<Keyword> {
        let upper = ident.to_ascii_uppercase();
        Self::ALL
            .iter()
            .find(|(_, spelling)| *spelling == upper)
            .map(|(kw, _)| *kw)
    }

    /// The canonical uppercase spelling.
    pub fn as_str(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(kw, _)| *kw == self)
            .map(|(_, spelling)| *spelling)
            .expect("every keyword is listed in ALL")
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
