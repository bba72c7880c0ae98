use indexmap::IndexMap;

use crate::cell::Cell;
use crate::pdv::PdvVar;

/// Metadata for one column of a [`Dataset`] (spec §3 "Dataset").
#[derive(Clone, Debug, PartialEq)]
pub struct VarMeta {
    /// Canonical (uppercased) name.
    pub name: String,
    /// `true` for a character column.
    pub is_char: bool,
    /// Declared byte length.
    pub length: u32,
    /// `LABEL` text, if assigned.
    pub label: Option<String>,
    /// `FORMAT` name, if assigned.
    pub format: Option<String>,
    /// `INFORMAT` name, if assigned.
    pub informat: Option<String>,
}

impl From<&PdvVar> for VarMeta {
    fn from(var: &PdvVar) -> Self {
        VarMeta {
            name: var.name.clone(),
            is_char: var.is_char,
            length: var.length,
            label: var.label.clone(),
            format: var.format.clone(),
            informat: var.informat.clone(),
        }
    }
}

/// A named table: ordered column metadata plus row-major `Cell` storage
/// (spec §3 "Dataset"). Mutable during DATA step execution; PROCs treat it
/// as immutable for the duration of one invocation.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    /// The qualified name this dataset was last stored under, lowercased.
    pub name: String,
    vars: Vec<VarMeta>,
    index: IndexMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// An empty dataset with no columns or rows.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: Vec::new(),
            index: IndexMap::new(),
            rows: Vec::new(),
        }
    }

    /// The column metadata, in column order.
    pub fn columns(&self) -> &[VarMeta] {
        &self.vars
    }

    /// The row count.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The column count.
    pub fn column_count(&self) -> usize {
        self.vars.len()
    }

    /// Looks up a column's index by name, case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_ascii_uppercase()).copied()
    }

    /// One row's cells, in column order.
    pub fn row(&self, idx: usize) -> &[Cell] {
        &self.rows[idx]
    }

    /// An iterator over all rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// Appends a new column if not already present, back-filling every
    /// already-emitted row with missing (spec §4.3.2 "PDV-to-dataset sync").
    /// Returns the column's index either way.
    pub fn append_column(&mut self, meta: VarMeta) -> usize {
        let canonical = meta.name.to_ascii_uppercase();
        if let Some(&idx) = self.index.get(&canonical) {
            return idx;
        }
        let idx = self.vars.len();
        let missing = if meta.is_char {
            Cell::MISSING_STR
        } else {
            Cell::MISSING_NUMBER
        };
        for row in &mut self.rows {
            row.push(missing);
        }
        self.index.insert(canonical, idx);
        self.vars.push(meta);
        idx
    }

    /// Appends one row. `cells` must have exactly `column_count()` entries,
    /// in column order; callers (the DATA step executor) are responsible
    /// for having synced columns via [`Dataset::append_column`] first.
    pub fn append_row(&mut self, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len(), self.vars.len());
        self.rows.push(cells);
    }

    /// Replaces all rows, keeping existing column metadata — used by
    /// `PROC SORT` to reorder in place.
    pub fn set_rows(&mut self, rows: Vec<Vec<Cell>>) {
        self.rows = rows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_col(name: &str) -> VarMeta {
        VarMeta {
            name: name.to_ascii_uppercase(),
            is_char: false,
            length: 8,
            label: None,
            format: None,
            informat: None,
        }
    }

    #[test]
    fn appending_a_column_backfills_existing_rows_with_missing() {
        let mut ds = Dataset::new("work.a");
        ds.append_column(numeric_col("x"));
        ds.append_row(vec![Cell::Number(1.0)]);
        ds.append_row(vec![Cell::Number(2.0)]);

        ds.append_column(numeric_col("y"));

        assert_eq!(ds.column_count(), 2);
        assert_eq!(ds.row(0)[1], Cell::MISSING_NUMBER);
        assert_eq!(ds.row(1)[1], Cell::MISSING_NUMBER);
    }

    #[test]
    fn appending_an_existing_column_name_is_idempotent() {
        let mut ds = Dataset::new("work.a");
        let first = ds.append_column(numeric_col("x"));
        let second = ds.append_column(numeric_col("x"));
        assert_eq!(first, second);
        assert_eq!(ds.column_count(), 1);
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        let mut ds = Dataset::new("work.a");
        ds.append_column(numeric_col("Id"));
        assert_eq!(ds.column_index("ID"), Some(0));
        assert_eq!(ds.column_index("id"), Some(0));
    }
}
