//! `PROC SQL` (spec §11): the minimal `SELECT ... FROM ... [WHERE ...]`
//! subset — no joins, aggregates, or `CREATE TABLE`. Results are rendered
//! to the listing exactly like `PROC PRINT`.

use sas_ast::SqlClauses;
use sas_core::{CoreError, Environment};

use super::{display_cell, render_table, where_filter};
use crate::listing::Listing;

pub(super) fn run(clauses: &SqlClauses, env: &mut Environment, listing: &mut dyn Listing) -> Result<(), CoreError> {
    let dataset = env.lookup_dataset(clauses.from.library.as_deref(), &clauses.from.name)?.clone();

    let column_indices: Vec<usize> = match &clauses.select {
        Some(names) => names.iter().filter_map(|n| dataset.column_index(n)).collect(),
        None => (0..dataset.column_count()).collect(),
    };
    let headers: Vec<String> = column_indices.iter().map(|&i| dataset.columns()[i].name.clone()).collect();

    let rows = where_filter(&dataset, &clauses.where_expr, &mut env.interner);
    let rendered: Vec<Vec<String>> = rows
        .iter()
        .map(|&row| column_indices.iter().map(|&i| display_cell(dataset.row(row)[i], &env.interner)).collect())
        .collect();

    render_table(listing, &headers, &rendered);
    Ok(())
}
