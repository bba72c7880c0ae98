//! `PROC MEANS` (spec §4.6 / §11): summary statistics over numeric
//! variables, optionally grouped by `BY` (pre-sorted, contiguous groups) or
//! `CLASS` (grouped by first-seen order, no sortedness requirement).

use indexmap::IndexMap;
use sas_ast::{MeansClauses, Statistic};
use sas_core::{CoreError, Dataset, Environment, StringInterner};

use super::{by_groups, display_cell, render_table};
use crate::listing::Listing;

pub(super) fn run(clauses: &MeansClauses, env: &mut Environment, listing: &mut dyn Listing) -> Result<(), CoreError> {
    let dataset = env.lookup_dataset(clauses.data.library.as_deref(), &clauses.data.name)?.clone();

    let var_indices: Vec<usize> = match &clauses.var {
        Some(names) => names.iter().filter_map(|n| dataset.column_index(n)).collect(),
        None => dataset
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_char)
            .map(|(i, _)| i)
            .collect(),
    };

    let stats = if clauses.stats.is_empty() {
        vec![Statistic::N, Statistic::Mean, Statistic::Std, Statistic::Min, Statistic::Max]
    } else {
        clauses.stats.clone()
    };

    let all_rows: Vec<usize> = (0..dataset.row_count()).collect();
    let groups: Vec<(Option<String>, Vec<usize>)> = if let Some(by) = &clauses.by {
        by_groups(&dataset, &all_rows, by)
            .into_iter()
            .map(|rows| (group_label(&dataset, &rows, by, &env.interner), rows))
            .collect()
    } else if let Some(class) = &clauses.class {
        group_by_class(&dataset, &all_rows, class, &env.interner)
    } else {
        vec![(None, all_rows)]
    };

    let mut headers = Vec::new();
    if clauses.by.is_some() || clauses.class.is_some() {
        headers.push("GROUP".to_string());
    }
    headers.push("VARIABLE".to_string());
    for stat in &stats {
        headers.push(stat_name(*stat).to_string());
    }

    let mut rows = Vec::new();
    for (label, group_rows) in &groups {
        for &col in &var_indices {
            let values: Vec<f64> = group_rows
                .iter()
                .map(|&r| dataset.row(r)[col].to_number(&env.interner))
                .filter(|v| !v.is_nan())
                .collect();
            let mut line = Vec::new();
            if let Some(label) = label {
                line.push(label.clone());
            }
            line.push(dataset.columns()[col].name.clone());
            for stat in &stats {
                line.push(format_stat(*stat, &values));
            }
            rows.push(line);
        }
    }

    render_table(listing, &headers, &rows);
    Ok(())
}

fn group_label(dataset: &Dataset, rows: &[usize], by: &[String], interner: &StringInterner) -> Option<String> {
    let first = *rows.first()?;
    let parts: Vec<String> = by
        .iter()
        .filter_map(|name| dataset.column_index(name))
        .map(|idx| display_cell(dataset.row(first)[idx], interner))
        .collect();
    Some(parts.join(", "))
}

fn group_by_class(
    dataset: &Dataset,
    rows: &[usize],
    class: &str,
    interner: &StringInterner,
) -> Vec<(Option<String>, Vec<usize>)> {
    let Some(col) = dataset.column_index(class) else {
        return vec![(None, rows.to_vec())];
    };
    let mut order: IndexMap<String, Vec<usize>> = IndexMap::new();
    for &row in rows {
        let key = display_cell(dataset.row(row)[col], interner);
        order.entry(key).or_default().push(row);
    }
    order.into_iter().map(|(key, rows)| (Some(key), rows)).collect()
}

fn stat_name(stat: Statistic) -> &'static str {
    match stat {
        Statistic::N => "N",
        Statistic::Mean => "MEAN",
        Statistic::Std => "STD",
        Statistic::Min => "MIN",
        Statistic::Max => "MAX",
        Statistic::Sum => "SUM",
    }
}

fn format_stat(stat: Statistic, values: &[f64]) -> String {
    if values.is_empty() {
        return ".".to_string();
    }
    let n = values.len() as f64;
    let result = match stat {
        Statistic::N => n,
        Statistic::Sum => values.iter().sum(),
        Statistic::Mean => values.iter().sum::<f64>() / n,
        Statistic::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
        Statistic::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        Statistic::Std => {
            if values.len() < 2 {
                return ".".to_string();
            }
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        }
    };
    format!("{result:.4}")
}
