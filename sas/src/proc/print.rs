//! `PROC PRINT` (spec §4.6): lists a dataset's rows.

use sas_ast::PrintClauses;
use sas_core::{CoreError, Environment};

use super::{display_cell, render_table, where_filter};
use crate::listing::Listing;

pub(super) fn run(clauses: &PrintClauses, env: &mut Environment, listing: &mut dyn Listing) -> Result<(), CoreError> {
    // Cloned so the dataset borrow doesn't overlap the interner's mutable
    // borrow needed for WHERE evaluation below.
    let dataset = env.lookup_dataset(clauses.data.library.as_deref(), &clauses.data.name)?.clone();

    let column_indices: Vec<usize> = match &clauses.var {
        Some(names) => names
            .iter()
            .map(|name| dataset.column_index(name).ok_or_else(|| CoreError::UnknownVariable(name.clone())))
            .collect::<Result<Vec<_>, _>>()?,
        None => (0..dataset.column_count()).collect(),
    };

    let mut headers = Vec::new();
    if !clauses.noobs {
        headers.push("OBS".to_string());
    }
    for &idx in &column_indices {
        let meta = &dataset.columns()[idx];
        let header = if clauses.label {
            meta.label.clone().unwrap_or_else(|| meta.name.clone())
        } else {
            meta.name.clone()
        };
        headers.push(header);
    }

    let rows = where_filter(&dataset, &clauses.where_expr, &mut env.interner);
    let mut rendered = Vec::new();
    for (obs, &row) in rows.iter().enumerate() {
        let mut line = Vec::new();
        if !clauses.noobs {
            line.push((obs + 1).to_string());
        }
        for &idx in &column_indices {
            line.push(display_cell(dataset.row(row)[idx], &env.interner));
        }
        rendered.push(line);
    }

    if let Some(title) = clauses.title.as_ref().or(env.title.as_ref()) {
        listing.write_line(title);
    }
    render_table(listing, &headers, &rendered);
    Ok(())
}
