//! # sas-parser
//!
//! sas-parser converts a SAS-subset token stream into [`sas_ast`] nodes.
//! The central design requirement is the tri-state [`ParseOutcome`]:
//! statements can be complete, merely incomplete (more input needed, for
//! the REPL), or genuinely erroneous.

#![deny(missing_docs)]
#![warn(unused_imports)]

mod error;
mod expr;
mod parser;
mod peek;
mod statement;

pub use self::{
    error::ParserError,
    parser::{ParseOutcome, Parser},
};
