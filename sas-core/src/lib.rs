//! # sas-core
//!
//! The data model shared by the parser and interpreter: interned strings,
//! `Cell` values, the Program Data Vector, columnar `Dataset` storage, and
//! the process-lifetime `Environment` (libraries, datasets, options). Also
//! hosts the semantic/runtime error taxonomy (`CoreError`); lexical and
//! syntactic errors live in `sas-lexer` and `sas-parser` respectively.

#![deny(missing_docs)]
#![warn(unused_imports)]

mod cell;
mod dataset;
mod environment;
mod error;
mod intern;
mod pdv;

pub use self::{
    cell::Cell,
    dataset::{Dataset, VarMeta},
    environment::{Environment, Library, WORK_LIBRARY},
    error::CoreError,
    intern::{StringInterner, Symbol},
    pdv::{Pdv, PdvVar},
};
