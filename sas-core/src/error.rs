use thiserror::Error;

/// The full error taxonomy of spec §7, minus the lexer/parser-only
/// syntactic variants (those live in `sas-lexer::LexerError` and
/// `sas-parser::ParserError`). `CoreError` covers semantic, runtime, I/O,
/// and control-flow-misuse errors raised by the data model and, later, the
/// interpreter built on top of it.
#[derive(Debug, Error)]
pub enum CoreError {
    /// `lookup_dataset` on a name with no bound dataset.
    #[error("dataset {0} is not defined")]
    UnknownDataset(String),

    /// A `LIBNAME` reference to a libref never assigned.
    #[error("library {0} is not assigned")]
    UnknownLibrary(String),

    /// A variable reference with no PDV or dataset column of that name.
    #[error("variable {0} is not defined")]
    UnknownVariable(String),

    /// An `arr{i}` reference to an array name never declared.
    #[error("array {0} is not defined")]
    UndefinedArray(String),

    /// A `PROC` name with no registered dispatcher handler.
    #[error("PROC {0} is not supported")]
    UnsupportedProc(String),

    /// A function call with the wrong number of arguments.
    #[error("{function} expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        /// The function name.
        function: String,
        /// The arity the function requires.
        expected: usize,
        /// The arity actually supplied.
        actual: usize,
    },

    /// An operation applied to an incompatible `Cell` variant.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// `arr{i}` with `i` outside the declared range.
    #[error("subscript {index} out of bounds for array {array} (size {size})")]
    ArrayBounds {
        /// The array name.
        array: String,
        /// The declared size.
        size: usize,
        /// The subscript that was out of range.
        index: i64,
    },

    /// A floating-point operation produced a non-finite result outside the
    /// missing convention (e.g. overflow to infinity).
    #[error("numeric overflow evaluating {0}")]
    NumericOverflow(String),

    /// Re-declaring a variable's type (character vs. numeric) after it was
    /// already established — unrecoverable, aborts the DATA step.
    #[error("length/type conflict for variable {0}")]
    LengthConflict(String),

    /// A persistence backend failed to read a dataset.
    #[error("failed to load dataset from {path}: {message}")]
    LoadFailed {
        /// The source path.
        path: String,
        /// The backend's failure message.
        message: String,
    },

    /// A persistence backend failed to write a dataset.
    #[error("failed to save dataset to {path}: {message}")]
    SaveFailed {
        /// The destination path.
        path: String,
        /// The backend's failure message.
        message: String,
    },

    /// A library or script path does not exist on disk.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// `LEAVE`/`CONTINUE` used outside any enclosing `DO`.
    #[error("LEAVE/CONTINUE used outside a loop")]
    NotInLoop,

    /// An `ELSE` with no preceding `IF` in the same statement position.
    #[error("ELSE without a matching IF")]
    ElseWithoutIf,
}
