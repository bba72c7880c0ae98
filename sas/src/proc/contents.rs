//! `PROC CONTENTS` (spec §11): lists a dataset's column metadata.

use sas_ast::ContentsClauses;
use sas_core::{CoreError, Environment};

use super::render_table;
use crate::listing::Listing;

pub(super) fn run(clauses: &ContentsClauses, env: &mut Environment, listing: &mut dyn Listing) -> Result<(), CoreError> {
    let dataset = env.lookup_dataset(clauses.data.library.as_deref(), &clauses.data.name)?;

    listing.write_line(&format!("Data Set: {}", dataset.name));
    listing.write_line(&format!("Observations: {}", dataset.row_count()));
    listing.write_line(&format!("Variables: {}", dataset.column_count()));

    let headers = vec![
        "#".to_string(),
        "NAME".to_string(),
        "TYPE".to_string(),
        "LENGTH".to_string(),
        "LABEL".to_string(),
        "FORMAT".to_string(),
        "INFORMAT".to_string(),
    ];
    let rows: Vec<Vec<String>> = dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(i, meta)| {
            vec![
                (i + 1).to_string(),
                meta.name.clone(),
                if meta.is_char { "Char".to_string() } else { "Num".to_string() },
                meta.length.to_string(),
                meta.label.clone().unwrap_or_default(),
                meta.format.clone().unwrap_or_default(),
                meta.informat.clone().unwrap_or_default(),
            ]
        })
        .collect();
    render_table(listing, &headers, &rows);
    Ok(())
}
