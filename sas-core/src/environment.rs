use indexmap::IndexMap;

use crate::dataset::Dataset;
use crate::error::CoreError;
use crate::intern::StringInterner;

/// The default libref bare dataset names resolve against (spec §4.5).
pub const WORK_LIBRARY: &str = "WORK";

/// A `libref → filesystem path` binding (spec §3 "Library").
#[derive(Clone, Debug, PartialEq)]
pub struct Library {
    /// The libref, canonicalized to uppercase.
    pub libref: String,
    /// The bound filesystem path.
    pub path: String,
}

/// Process-lifetime interpreter state (spec §3 "Environment", §4.5 "Data
/// Environment"): libraries, datasets keyed by qualified name, options, the
/// active title/footnote, and the string intern pool all Cells within this
/// environment share.
#[derive(Debug)]
pub struct Environment {
    libraries: IndexMap<String, Library>,
    datasets: IndexMap<String, Dataset>,
    options: IndexMap<String, String>,
    /// The active `TITLE`, if any.
    pub title: Option<String>,
    /// The active `FOOTNOTE`, if any.
    pub footnote: Option<String>,
    /// The string pool backing every `Cell::Str` held by this environment's
    /// datasets and in-flight PDVs.
    pub interner: StringInterner,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// A fresh environment with the `WORK` library bound to a process-local
    /// scratch path and no datasets.
    pub fn new() -> Self {
        let mut libraries = IndexMap::new();
        libraries.insert(
            WORK_LIBRARY.to_string(),
            Library {
                libref: WORK_LIBRARY.to_string(),
                path: String::new(),
            },
        );
        Self {
            libraries,
            datasets: IndexMap::new(),
            options: IndexMap::new(),
            title: None,
            footnote: None,
            interner: StringInterner::new(),
        }
    }

    /// Builds the canonical (lowercased) `library.name` key used to index
    /// `datasets`. A `None` library resolves against [`WORK_LIBRARY`].
    pub fn qualify(&self, library: Option<&str>, name: &str) -> String {
        let lib = library.unwrap_or(WORK_LIBRARY);
        format!("{}.{}", lib.to_ascii_lowercase(), name.to_ascii_lowercase())
    }

    /// Assigns a library; an existing binding for `libref` is replaced.
    pub fn assign(&mut self, libref: impl Into<String>, path: impl Into<String>) {
        let libref = libref.into().to_ascii_uppercase();
        self.libraries.insert(
            libref.clone(),
            Library {
                libref,
                path: path.into(),
            },
        );
    }

    /// Looks up a library binding by libref.
    pub fn library(&self, libref: &str) -> Option<&Library> {
        self.libraries.get(&libref.to_ascii_uppercase())
    }

    /// Returns a writable handle to the dataset named `library.name`,
    /// creating an empty dataset with no columns if absent (spec §4.5).
    pub fn get_or_create_dataset(&mut self, library: Option<&str>, name: &str) -> &mut Dataset {
        let key = self.qualify(library, name);
        self.datasets
            .entry(key.clone())
            .or_insert_with(|| Dataset::new(key))
    }

    /// Returns a read handle to the dataset named `library.name`, failing
    /// with [`CoreError::UnknownDataset`] if it has never been created.
    pub fn lookup_dataset(&self, library: Option<&str>, name: &str) -> Result<&Dataset, CoreError> {
        let key = self.qualify(library, name);
        self.datasets
            .get(&key)
            .ok_or_else(|| CoreError::UnknownDataset(key))
    }

    /// Mutable variant of [`Environment::lookup_dataset`], for in-place
    /// mutation (e.g. `PROC SORT` without `OUT=`).
    pub fn lookup_dataset_mut(
        &mut self,
        library: Option<&str>,
        name: &str,
    ) -> Result<&mut Dataset, CoreError> {
        let key = self.qualify(library, name);
        self.datasets
            .get_mut(&key)
            .ok_or(CoreError::UnknownDataset(key))
    }

    /// Stores `dataset` under `library.name`, replacing any prior dataset
    /// there (used when a PROC writes an `OUT=` dataset).
    pub fn store_dataset(&mut self, library: Option<&str>, name: &str, dataset: Dataset) {
        let key = self.qualify(library, name);
        self.datasets.insert(key, dataset);
    }

    /// Sets a global option (`OPTIONS name=value;`).
    pub fn set_option(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.options.insert(name.into().to_ascii_uppercase(), value.into());
    }

    /// Reads a global option's current value, if set.
    pub fn get_option(&self, name: &str) -> Option<&str> {
        self.options.get(&name.to_ascii_uppercase()).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::dataset::VarMeta;

    #[test]
    fn bare_names_resolve_against_work() {
        let env = Environment::new();
        assert_eq!(env.qualify(None, "A"), "work.a");
    }

    #[test]
    fn qualified_names_use_the_given_library() {
        let env = Environment::new();
        assert_eq!(env.qualify(Some("MYLIB"), "A"), "mylib.a");
    }

    #[test]
    fn get_or_create_dataset_creates_an_empty_dataset_once() {
        let mut env = Environment::new();
        env.get_or_create_dataset(None, "a").append_column(VarMeta {
            name: "X".to_string(),
            is_char: false,
            length: 8,
            label: None,
            format: None,
            informat: None,
        });
        assert_eq!(env.get_or_create_dataset(None, "a").column_count(), 1);
    }

    #[test]
    fn lookup_dataset_fails_for_unknown_name() {
        let env = Environment::new();
        match env.lookup_dataset(None, "missing") {
            Err(CoreError::UnknownDataset(name)) => assert_eq!(name, "work.missing"),
            other => panic!("expected UnknownDataset, got {other:?}"),
        }
    }

    #[test]
    fn options_round_trip_case_insensitively() {
        let mut env = Environment::new();
        env.set_option("linesize", "120");
        assert_eq!(env.get_option("LINESIZE"), Some("120"));
    }

    #[test]
    fn store_dataset_replaces_existing() {
        let mut env = Environment::new();
        let mut ds = Dataset::new("work.a");
        ds.append_column(VarMeta {
            name: "X".to_string(),
            is_char: false,
            length: 8,
            label: None,
            format: None,
            informat: None,
        });
        ds.append_row(vec![Cell::Number(1.0)]);
        env.store_dataset(None, "a", ds);
        assert_eq!(env.lookup_dataset(None, "a").unwrap().row_count(), 1);
    }
}
