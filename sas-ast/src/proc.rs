use crate::expr::Expr;
use crate::program::QualifiedName;

/// A `PROC ...; ... RUN|QUIT;` statement, one tagged variant per supported
/// procedure (spec §4.6). Anything not in this list is [`ProcStatement::Unsupported`]:
/// the parser still recognizes the `PROC <name> ... RUN;` shape (skipping its
/// clauses opaquely) so the dispatcher — not the parser — is the single place
/// that reports `UnsupportedProc`.
#[derive(Clone, Debug, PartialEq)]
pub enum ProcStatement {
    /// `PROC PRINT`
    Print(PrintClauses),
    /// `PROC SORT`
    Sort(SortClauses),
    /// `PROC MEANS`
    Means(MeansClauses),
    /// `PROC FREQ`
    Freq(FreqClauses),
    /// `PROC TRANSPOSE`
    Transpose(TransposeClauses),
    /// `PROC SQL`
    Sql(SqlClauses),
    /// `PROC CONTENTS`
    Contents(ContentsClauses),
    /// Any other procedure name; clauses are discarded up to `RUN;`/`QUIT;`.
    Unsupported {
        /// The procedure name as written, uppercased.
        name: String,
    },
}

/// `PROC PRINT DATA=... [VAR ...] [NOOBS] [LABEL] [WHERE ...] [TITLE ...];`
#[derive(Clone, Debug, PartialEq)]
pub struct PrintClauses {
    /// `DATA=`
    pub data: QualifiedName,
    /// `VAR`; `None` means "all columns".
    pub var: Option<Vec<String>>,
    /// `NOOBS` suppresses the observation-number column.
    pub noobs: bool,
    /// `LABEL` uses variable labels as headers where present.
    pub label: bool,
    /// `WHERE`
    pub where_expr: Option<Expr>,
    /// `TITLE`, overriding the environment's current title for this report.
    pub title: Option<String>,
}

/// `PROC SORT DATA=... [OUT=...]; BY [DESCENDING] key ...;`
#[derive(Clone, Debug, PartialEq)]
pub struct SortClauses {
    /// `DATA=`
    pub data: QualifiedName,
    /// `OUT=`; `None` means sort in place.
    pub out: Option<QualifiedName>,
    /// Sort keys, in precedence order.
    pub by: Vec<SortKey>,
}

/// One `BY` key of a `PROC SORT`.
#[derive(Clone, Debug, PartialEq)]
pub struct SortKey {
    /// The variable name.
    pub name: String,
    /// `true` if prefixed with `DESCENDING`.
    pub descending: bool,
}

/// A statistic keyword recognized by `PROC MEANS`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Statistic {
    /// `N`
    N,
    /// `MEAN`
    Mean,
    /// `STD`
    Std,
    /// `MIN`
    Min,
    /// `MAX`
    Max,
    /// `SUM`
    Sum,
}

/// `PROC MEANS DATA=... [VAR ...] [BY ...] [CLASS ...] [stat ...];`
#[derive(Clone, Debug, PartialEq)]
pub struct MeansClauses {
    /// `DATA=`
    pub data: QualifiedName,
    /// `VAR`; `None` means "all numeric columns".
    pub var: Option<Vec<String>>,
    /// `BY`, requiring pre-sorted input.
    pub by: Option<Vec<String>>,
    /// `CLASS`, grouping by first-seen order (no sortedness requirement).
    pub class: Option<String>,
    /// Requested statistics; defaults to `N MEAN STD MIN MAX` when empty.
    pub stats: Vec<Statistic>,
}

/// One `TABLES` entry of a `PROC FREQ`: one variable for a one-way table,
/// two for a `a*b` two-way crosstab.
#[derive(Clone, Debug, PartialEq)]
pub struct FreqTable {
    /// The variable(s) in this table, in `*`-join order.
    pub vars: Vec<String>,
}

/// `PROC FREQ DATA=... TABLES ... [WHERE ...];`
#[derive(Clone, Debug, PartialEq)]
pub struct FreqClauses {
    /// `DATA=`
    pub data: QualifiedName,
    /// `TABLES`, one or more independent table requests.
    pub tables: Vec<FreqTable>,
    /// `WHERE`
    pub where_expr: Option<Expr>,
}

/// `PROC TRANSPOSE DATA=... OUT=... [BY ...] [VAR ...] [ID ...] [PREFIX=...] [NAME=...];`
#[derive(Clone, Debug, PartialEq)]
pub struct TransposeClauses {
    /// `DATA=`
    pub data: QualifiedName,
    /// `OUT=`
    pub out: QualifiedName,
    /// `BY`, grouping rows before transposing.
    pub by: Option<Vec<String>>,
    /// `VAR`; `None` means "all numeric columns when no BY is given".
    pub var: Option<Vec<String>>,
    /// `ID`, naming the variable whose values become new column names.
    pub id: Option<String>,
    /// `PREFIX=`, prepended to generated column names.
    pub prefix: Option<String>,
    /// `NAME=`, the name of the column holding original variable names.
    pub name: Option<String>,
}

/// `PROC SQL; SELECT ... FROM ... [WHERE ...]; QUIT;` (minimal subset, §11).
#[derive(Clone, Debug, PartialEq)]
pub struct SqlClauses {
    /// `SELECT *` when `None`, else the listed columns.
    pub select: Option<Vec<String>>,
    /// `FROM`
    pub from: QualifiedName,
    /// `WHERE`
    pub where_expr: Option<Expr>,
}

/// `PROC CONTENTS DATA=...;`
#[derive(Clone, Debug, PartialEq)]
pub struct ContentsClauses {
    /// `DATA=`
    pub data: QualifiedName,
}
