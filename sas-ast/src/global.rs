/// A top-level statement that is neither a DATA step nor a PROC (spec §3).
#[derive(Clone, Debug, PartialEq)]
pub enum GlobalStatement {
    /// `OPTIONS name1=value1 name2=value2 ...;`
    Options(Vec<(String, String)>),
    /// `LIBNAME libref 'path';`
    Libname {
        /// The libref being assigned.
        libref: String,
        /// The filesystem path it is bound to.
        path: String,
    },
    /// `TITLE 'text';` or bare `TITLE;` to clear it.
    Title(Option<String>),
    /// `FOOTNOTE 'text';` or bare `FOOTNOTE;` to clear it.
    Footnote(Option<String>),
}
