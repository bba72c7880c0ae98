//! `PROC SORT` (spec §4.6): stable multi-key sort, in place or to `OUT=`.

use sas_ast::SortClauses;
use sas_core::{CoreError, Environment};

use super::sort_dataset;

pub(super) fn run(clauses: &SortClauses, env: &mut Environment) -> Result<(), CoreError> {
    let mut dataset = env.lookup_dataset(clauses.data.library.as_deref(), &clauses.data.name)?.clone();
    sort_dataset(&mut dataset, &clauses.by, &env.interner)?;

    match &clauses.out {
        Some(out) => env.store_dataset(out.library.as_deref(), &out.name, dataset),
        None => env.store_dataset(clauses.data.library.as_deref(), &clauses.data.name, dataset),
    }
    Ok(())
}
