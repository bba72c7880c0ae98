use indexmap::IndexMap;

use crate::cell::Cell;

/// Metadata for one variable in a [`Pdv`] (spec §3 "PdvVar").
#[derive(Clone, Debug, PartialEq)]
pub struct PdvVar {
    /// Canonical (uppercased) name.
    pub name: String,
    /// `true` for a character variable, `false` for numeric.
    pub is_char: bool,
    /// Declared byte length; `0` means unset (numeric variables ignore this).
    pub length: u32,
    /// `LABEL` text, if assigned.
    pub label: Option<String>,
    /// `FORMAT` name, if assigned.
    pub format: Option<String>,
    /// `INFORMAT` name, if assigned.
    pub informat: Option<String>,
    /// `true` if this variable survives row reset (`RETAIN`, or an automatic
    /// variable such as `_N_`).
    pub retain: bool,
}

impl PdvVar {
    /// A fresh, non-retained variable with no metadata set.
    pub fn new(name: impl Into<String>, is_char: bool) -> Self {
        Self {
            name: name.into(),
            is_char,
            length: 0,
            label: None,
            format: None,
            informat: None,
            retain: false,
        }
    }
}

/// The per-DATA-step mutable row (spec §3 "PDV", §4.3).
///
/// Lookup by canonical name is O(1) amortized via a side index, matching
/// the ordered-sequence-plus-hash contract the spec calls for.
#[derive(Debug, Default)]
pub struct Pdv {
    vars: Vec<PdvVar>,
    values: Vec<Cell>,
    index: IndexMap<String, usize>,
    /// `_N_`: the row iteration counter, starting at 1 on the first row.
    pub n: u64,
    /// `_ERROR_`: cleared at the start of every iteration, set by a failed
    /// expression evaluation (spec §4.3.6).
    pub error: bool,
}

impl Pdv {
    /// An empty PDV, as constructed at DATA step entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a new variable if `name` is not already present, returning
    /// its index either way. Matches spec §3: "variables discovered
    /// mid-execution append both to the PDV and to every already-emitted
    /// row of the output dataset" — this handles the PDV half; dataset sync
    /// is the caller's responsibility (see `Dataset::append_column`).
    pub fn declare(&mut self, name: &str, is_char: bool) -> usize {
        let canonical = name.to_ascii_uppercase();
        if let Some(&idx) = self.index.get(&canonical) {
            return idx;
        }
        let idx = self.vars.len();
        self.vars.push(PdvVar::new(canonical.clone(), is_char));
        self.values.push(if is_char {
            Cell::MISSING_STR
        } else {
            Cell::MISSING_NUMBER
        });
        self.index.insert(canonical, idx);
        idx
    }

    /// Looks up a variable's index by name, case-insensitively.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_ascii_uppercase()).copied()
    }

    /// The full variable metadata list, in PDV order.
    pub fn vars(&self) -> &[PdvVar] {
        &self.vars
    }

    /// Mutable access to one variable's metadata, e.g. to set `retain`,
    /// `length`, `label`, `format`, or `informat`.
    pub fn var_mut(&mut self, idx: usize) -> &mut PdvVar {
        &mut self.vars[idx]
    }

    /// The current value at `idx`.
    pub fn value(&self, idx: usize) -> Cell {
        self.values[idx]
    }

    /// Sets the current value at `idx`.
    pub fn set_value(&mut self, idx: usize, value: Cell) {
        self.values[idx] = value;
    }

    /// Gets a value by name, if the variable exists.
    pub fn get(&self, name: &str) -> Option<Cell> {
        self.index_of(name).map(|idx| self.values[idx])
    }

    /// Resets all non-retained variables to missing and advances `_N_`,
    /// clearing `_ERROR_` — the per-row "Reset" step (spec §4.3 step 1).
    pub fn reset_for_next_row(&mut self) {
        for (var, value) in self.vars.iter().zip(self.values.iter_mut()) {
            if !var.retain {
                *value = if var.is_char {
                    Cell::MISSING_STR
                } else {
                    Cell::MISSING_NUMBER
                };
            }
        }
        self.n += 1;
        self.error = false;
    }

    /// The number of declared variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// `true` if no variables have been declared yet.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_is_idempotent_and_case_insensitive() {
        let mut pdv = Pdv::new();
        let a = pdv.declare("x", false);
        let b = pdv.declare("X", false);
        assert_eq!(a, b);
        assert_eq!(pdv.len(), 1);
    }

    #[test]
    fn new_variable_starts_missing() {
        let mut pdv = Pdv::new();
        let idx = pdv.declare("name", true);
        assert!(pdv.value(idx).is_missing());
    }

    #[test]
    fn reset_clears_non_retained_but_keeps_retained() {
        let mut pdv = Pdv::new();
        let kept = pdv.declare("total", false);
        let reset = pdv.declare("tmp", false);
        pdv.var_mut(kept).retain = true;
        pdv.set_value(kept, Cell::Number(10.0));
        pdv.set_value(reset, Cell::Number(5.0));
        pdv.error = true;

        pdv.reset_for_next_row();

        assert_eq!(pdv.value(kept), Cell::Number(10.0));
        assert!(pdv.value(reset).is_missing());
        assert!(!pdv.error);
        assert_eq!(pdv.n, 1);
    }
}
