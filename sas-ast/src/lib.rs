//! # sas-ast
//!
//! Abstract syntax tree types produced by `sas-parser`: a closed family of
//! expression, DATA-step statement, global statement, and PROC statement
//! variants (see spec §3 "AST").

#![deny(missing_docs)]
#![warn(unused_imports)]

mod data_step;
mod expr;
mod global;
mod proc;
mod program;

pub use self::{data_step::*, expr::*, global::*, proc::*, program::*};
