//! `PROC FREQ` (spec §4.6 / §11): one-way and two-way frequency tables.
//! Two-way tables are rendered as a tally per observed `a*b` combination
//! rather than a dense crosstab grid — the simpler shape covers the same
//! information and avoids inventing a grid-layout renderer nothing else in
//! this crate needs.

use indexmap::IndexMap;
use sas_ast::FreqClauses;
use sas_core::{CoreError, Environment};

use super::{display_cell, render_table, where_filter};
use crate::listing::Listing;

pub(super) fn run(clauses: &FreqClauses, env: &mut Environment, listing: &mut dyn Listing) -> Result<(), CoreError> {
    let dataset = env.lookup_dataset(clauses.data.library.as_deref(), &clauses.data.name)?.clone();
    let rows = where_filter(&dataset, &clauses.where_expr, &mut env.interner);
    let total = rows.len() as f64;

    for table in &clauses.tables {
        let columns: Vec<usize> = table.vars.iter().filter_map(|v| dataset.column_index(v)).collect();
        if columns.len() != table.vars.len() {
            continue;
        }

        let mut counts: IndexMap<Vec<String>, usize> = IndexMap::new();
        for &row in &rows {
            let key: Vec<String> = columns.iter().map(|&c| display_cell(dataset.row(row)[c], &env.interner)).collect();
            *counts.entry(key).or_insert(0) += 1;
        }

        let mut headers = table.vars.clone();
        headers.push("FREQUENCY".to_string());
        headers.push("PERCENT".to_string());

        let mut rendered = Vec::new();
        for (key, count) in &counts {
            let mut line = key.clone();
            line.push(count.to_string());
            let percent = if total > 0.0 { 100.0 * *count as f64 / total } else { 0.0 };
            line.push(format!("{percent:.2}"));
            rendered.push(line);
        }

        listing.write_line(&format!("Table: {}", table.vars.join(" * ")));
        render_table(listing, &headers, &rendered);
    }
    Ok(())
}
