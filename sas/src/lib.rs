//! # sas
//!
//! An interpreter for a subset of the SAS language: DATA steps, a handful
//! of bundled procedures, and the global statements that configure an
//! [`Environment`] between them.
//!
//! The pipeline is lexer → parser → [`sas_ast::Program`] → this crate,
//! which walks the program's [`sas_ast::TopLevelStatement`]s and drives the
//! [`sas_core`] data model. [`run_program`] is the batch entry point; the
//! REPL in [`repl`] drives the same statement execution one parsed
//! statement at a time, fed by a line-accumulating buffer.

#![deny(missing_docs)]

mod error;
mod eval;
mod executor;
mod listing;
mod persistence;
mod proc;
pub mod repl;

pub use error::InterpError;
pub use listing::{BufferListing, Listing, StdoutListing};
pub use persistence::{CsvPersistence, DatasetPersistence, ReadstatPersistence};
pub use sas_ast as ast;
pub use sas_core as core;
pub use sas_core::Environment;

use sas_ast::{GlobalStatement, Program, TopLevelStatement};

/// Runs every statement in `program` against `env` in order, sending any
/// PROC-rendered report text to `listing`.
///
/// A DATA step that aborts (spec §4.3.6) or a PROC naming an unsupported
/// procedure stops the whole program: later statements are not attempted.
/// This matches a SAS session halting the current submission on a severe
/// error while leaving everything already stored in `env` intact.
pub fn run_program(program: &Program, env: &mut Environment, listing: &mut dyn Listing) -> Result<(), InterpError> {
    for stmt in &program.statements {
        run_statement(stmt, env, listing)?;
    }
    Ok(())
}

/// Runs one already-parsed top-level statement. Exposed separately from
/// [`run_program`] so the REPL can execute statements as they complete,
/// without waiting for a whole program to parse.
pub fn run_statement(
    stmt: &TopLevelStatement,
    env: &mut Environment,
    listing: &mut dyn Listing,
) -> Result<(), InterpError> {
    match stmt {
        TopLevelStatement::Data(step) => executor::run_data_step(step, env).map_err(InterpError::from),
        TopLevelStatement::Proc(proc_stmt) => proc::run_proc(proc_stmt, env, listing).map_err(InterpError::from),
        TopLevelStatement::Global(global) => {
            run_global(global, env);
            Ok(())
        }
    }
}

fn run_global(stmt: &GlobalStatement, env: &mut Environment) {
    match stmt {
        GlobalStatement::Options(pairs) => {
            for (name, value) in pairs {
                env.set_option(name, value);
            }
        }
        GlobalStatement::Libname { libref, path } => env.assign(libref, path),
        GlobalStatement::Title(text) => env.title = text.clone(),
        GlobalStatement::Footnote(text) => env.footnote = text.clone(),
    }
}
