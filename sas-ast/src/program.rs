use std::fmt;

use crate::data_step::Statement;
use crate::global::GlobalStatement;
use crate::proc::ProcStatement;

/// A `library.name` or bare `name` reference. Bare names are resolved
/// against the default `work` library by the interpreter, not the parser.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct QualifiedName {
    /// The libref, if explicitly qualified.
    pub library: Option<String>,
    /// The dataset name.
    pub name: String,
}

impl QualifiedName {
    /// Builds a bare (unqualified) name.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            library: None,
            name: name.into(),
        }
    }

    /// Builds a `library.name` reference.
    pub fn qualified(library: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            library: Some(library.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.library {
            Some(lib) => write!(f, "{}.{}", lib, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// `DATA name [(options)]; <body> RUN;`
#[derive(Clone, Debug, PartialEq)]
pub struct DataStepStmt {
    /// The output dataset name.
    pub name: QualifiedName,
    /// Dataset options such as `(KEEP=... DROP=...)`, name/value as written.
    pub options: Vec<(String, String)>,
    /// The body statements, in program order.
    pub body: Vec<Statement>,
}

/// One top-level statement: a DATA step, a PROC, or a global statement.
#[derive(Clone, Debug, PartialEq)]
pub enum TopLevelStatement {
    /// A `DATA ... RUN;` step.
    Data(DataStepStmt),
    /// A `PROC ... RUN|QUIT;` procedure invocation.
    Proc(ProcStatement),
    /// `OPTIONS`/`LIBNAME`/`TITLE`/`FOOTNOTE`.
    Global(GlobalStatement),
}

/// An ordered sequence of top-level statements: the whole parsed program.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    /// The statements, in source order.
    pub statements: Vec<TopLevelStatement>,
}

impl Program {
    /// An empty program.
    pub fn new() -> Self {
        Self::default()
    }
}
