//! `PROC TRANSPOSE` (spec §4.6 / §11): pivots variables into observations.
//! Each `BY` group (or the whole dataset, with no `BY`) becomes a block of
//! output rows, one per transposed variable; the values across that
//! variable's original observations become the new row's columns, named
//! from `ID` (with `PREFIX=`) or `COL1`, `COL2`, ... otherwise.

use sas_core::{Cell, CoreError, Dataset, Environment, VarMeta};

use super::by_groups;

pub(super) fn run(clauses: &sas_ast::TransposeClauses, env: &mut Environment) -> Result<(), CoreError> {
    let dataset = env.lookup_dataset(clauses.data.library.as_deref(), &clauses.data.name)?.clone();

    let by = clauses.by.clone().unwrap_or_default();
    let var_indices: Vec<usize> = match &clauses.var {
        Some(names) => names
            .iter()
            .map(|n| dataset.column_index(n).ok_or_else(|| CoreError::UnknownVariable(n.clone())))
            .collect::<Result<Vec<_>, _>>()?,
        None => dataset
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_char && !by.iter().any(|b| b.eq_ignore_ascii_case(&c.name)))
            .map(|(i, _)| i)
            .collect(),
    };

    let all_rows: Vec<usize> = (0..dataset.row_count()).collect();
    let groups = if by.is_empty() { vec![all_rows] } else { by_groups(&dataset, &all_rows, &by) };

    let name_col = clauses.name.clone().unwrap_or_else(|| "_NAME_".to_string());
    let prefix = clauses.prefix.clone().unwrap_or_else(|| "COL".to_string());
    let id_col = clauses.id.as_deref().and_then(|id| dataset.column_index(id));

    let mut out = Dataset::new(env.qualify(clauses.out.library.as_deref(), &clauses.out.name));
    for name in &by {
        if let Some(idx) = dataset.column_index(name) {
            out.append_column(dataset.columns()[idx].clone());
        }
    }
    out.append_column(VarMeta {
        name: name_col.to_ascii_uppercase(),
        is_char: true,
        length: 32,
        label: None,
        format: None,
        informat: None,
    });

    for group in &groups {
        let value_col_names: Vec<String> = match id_col {
            Some(id_idx) => group
                .iter()
                .map(|&r| format!("{}{}", prefix, dataset.row(r)[id_idx].to_display_string(&env.interner)))
                .collect(),
            None => (1..=group.len()).map(|i| format!("{prefix}{i}")).collect(),
        };
        for name in &value_col_names {
            out.append_column(VarMeta {
                name: name.to_ascii_uppercase(),
                is_char: false,
                length: 8,
                label: None,
                format: None,
                informat: None,
            });
        }

        for &var_idx in &var_indices {
            let mut row = vec![Cell::MISSING_NUMBER; out.column_count()];
            for (col_idx, by_name) in by.iter().enumerate() {
                if let Some(src_idx) = dataset.column_index(by_name) {
                    row[col_idx] = dataset.row(group[0])[src_idx];
                }
            }
            let name_idx = out.column_index(&name_col).expect("declared above");
            row[name_idx] = Cell::from_str(&mut env.interner, &dataset.columns()[var_idx].name);
            for (i, &r) in group.iter().enumerate() {
                let out_idx = out.column_index(&value_col_names[i]).expect("declared above");
                row[out_idx] = dataset.row(r)[var_idx];
            }
            out.append_row(row);
        }
    }

    env.store_dataset(clauses.out.library.as_deref(), &clauses.out.name, out);
    Ok(())
}
