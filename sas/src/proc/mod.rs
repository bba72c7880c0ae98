//! The PROC dispatcher (spec §4.6): one handler module per bundled
//! procedure, registered here by `ProcStatement` variant. Unrecognized
//! procedure names were already carried through parsing as
//! [`ProcStatement::Unsupported`]; this is the single place that turns that
//! into [`CoreError::UnsupportedProc`] (spec §9's redesign note: the parser
//! stays permissive, the dispatcher is the source of truth for support).

mod contents;
mod freq;
mod means;
mod print;
mod sort;
mod sql;
mod transpose;

use sas_ast::{Expr, ProcStatement, SortKey};
use sas_core::{Cell, CoreError, Dataset, Environment, StringInterner};

use crate::eval::{eval, EvalContext};
use crate::listing::Listing;

/// Runs one `PROC ...; ... RUN|QUIT;` statement.
pub fn run_proc(stmt: &ProcStatement, env: &mut Environment, listing: &mut dyn Listing) -> Result<(), CoreError> {
    match stmt {
        ProcStatement::Print(clauses) => print::run(clauses, env, listing),
        ProcStatement::Sort(clauses) => sort::run(clauses, env),
        ProcStatement::Means(clauses) => means::run(clauses, env, listing),
        ProcStatement::Freq(clauses) => freq::run(clauses, env, listing),
        ProcStatement::Transpose(clauses) => transpose::run(clauses, env),
        ProcStatement::Sql(clauses) => sql::run(clauses, env, listing),
        ProcStatement::Contents(clauses) => contents::run(clauses, env, listing),
        ProcStatement::Unsupported { name } => Err(CoreError::UnsupportedProc(name.clone())),
    }
}

/// A read-only view over one dataset row, for `WHERE`-clause evaluation.
/// PROCs never mutate rows, so there is no array support here (spec §9:
/// arrays are a DATA step concept only).
struct RowView<'a> {
    dataset: &'a Dataset,
    row: usize,
}

impl EvalContext for RowView<'_> {
    fn var(&self, name: &str) -> Cell {
        self.dataset
            .column_index(name)
            .map(|idx| self.dataset.row(self.row)[idx])
            .unwrap_or(Cell::MISSING_NUMBER)
    }

    fn array_elem(&self, name: &str, _index: i64) -> Result<Cell, CoreError> {
        Err(CoreError::UndefinedArray(name.to_string()))
    }
}

/// The row indices of `dataset` that satisfy `where_expr` (or every row,
/// when there is none), in original order.
pub(crate) fn where_filter(
    dataset: &Dataset,
    where_expr: &Option<Expr>,
    interner: &mut StringInterner,
) -> Vec<usize> {
    let Some(expr) = where_expr else {
        return (0..dataset.row_count()).collect();
    };
    (0..dataset.row_count())
        .filter(|&row| {
            let ctx = RowView { dataset, row };
            eval(expr, &ctx, interner).map(|cell| cell.is_truthy(interner)).unwrap_or(false)
        })
        .collect()
}

/// Renders a cell the way a SAS listing does: numeric missing as `.`,
/// character missing as an empty field.
pub(crate) fn display_cell(cell: Cell, interner: &StringInterner) -> String {
    if cell.is_missing() && cell.is_numeric() {
        ".".to_string()
    } else {
        cell.to_display_string(interner)
    }
}

/// Writes a simple fixed-width table: a header row, a rule, then one row
/// per entry. Columns are sized to their widest cell.
pub(crate) fn render_table(listing: &mut dyn Listing, headers: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }
    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
    };
    listing.write_line(&format_row(headers));
    let rule: String = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ");
    listing.write_line(&rule);
    for row in rows {
        listing.write_line(&format_row(row));
    }
}

/// Sorts `dataset`'s rows in place by `keys`, stably (spec §8 "sort
/// stability" — rows with equal keys keep their original relative order).
/// Fails with [`CoreError::UnknownVariable`] if any BY key does not name an
/// existing column (spec §4.6).
pub(crate) fn sort_dataset(dataset: &mut Dataset, keys: &[SortKey], interner: &StringInterner) -> Result<(), CoreError> {
    let columns: Vec<usize> = keys
        .iter()
        .map(|k| dataset.column_index(&k.name).ok_or_else(|| CoreError::UnknownVariable(k.name.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    let mut indexed: Vec<(usize, Vec<Cell>)> = dataset.rows().enumerate().map(|(i, r)| (i, r.to_vec())).collect();
    indexed.sort_by(|(_, a), (_, b)| {
        for (key, &col) in keys.iter().zip(columns.iter()) {
            let ordering = a[col].compare(&b[col], interner).unwrap_or(std::cmp::Ordering::Equal);
            let ordering = if key.descending { ordering.reverse() } else { ordering };
            if ordering != std::cmp::Ordering::Equal {
                return ordering;
            }
        }
        std::cmp::Ordering::Equal
    });
    dataset.set_rows(indexed.into_iter().map(|(_, row)| row).collect());
    Ok(())
}

/// Splits `rows` (already sorted by `by`) into contiguous same-key groups,
/// returning each group's row indices.
pub(crate) fn by_groups(dataset: &Dataset, rows: &[usize], by: &[String]) -> Vec<Vec<usize>> {
    let columns: Vec<Option<usize>> = by.iter().map(|name| dataset.column_index(name)).collect();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut current_key: Option<Vec<Cell>> = None;
    for &row in rows {
        let key: Vec<Cell> = columns.iter().map(|c| c.map(|i| dataset.row(row)[i]).unwrap_or(Cell::MISSING_NUMBER)).collect();
        if current_key.as_ref() != Some(&key) {
            groups.push(Vec::new());
            current_key = Some(key);
        }
        groups.last_mut().expect("just pushed").push(row);
    }
    groups
}
