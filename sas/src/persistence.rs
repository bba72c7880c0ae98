//! Dataset persistence (spec §6 "persistence contract"): loading a dataset
//! from disk into the Environment and saving one back out. `CsvPersistence`
//! is the only backend this crate actually drives end to end;
//! `ReadstatPersistence` is a stub for the `.sas7bdat` format that the spec
//! names but puts out of scope for a full implementation.

use std::fs;
use std::path::Path;

use sas_core::{Cell, CoreError, Dataset, Environment, VarMeta};

/// Reads and writes datasets against some on-disk representation.
pub trait DatasetPersistence {
    /// Loads a dataset from `path`, interning any string cells into `env`.
    fn load(&self, path: &Path, env: &mut Environment) -> Result<Dataset, CoreError>;

    /// Writes `dataset` to `path`.
    fn save(&self, dataset: &Dataset, path: &Path, env: &Environment) -> Result<(), CoreError>;
}

/// CSV, with a header row of column names and per-column type inferred at
/// load time: a column is numeric only if every non-empty value in it
/// parses as a float, otherwise character.
pub struct CsvPersistence;

impl DatasetPersistence for CsvPersistence {
    fn load(&self, path: &Path, env: &mut Environment) -> Result<Dataset, CoreError> {
        let text = fs::read_to_string(path).map_err(|e| CoreError::LoadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut lines = text.lines();
        let header = lines.next().ok_or_else(|| CoreError::LoadFailed {
            path: path.display().to_string(),
            message: "empty file, no header row".to_string(),
        })?;
        let names: Vec<&str> = header.split(',').map(str::trim).collect();
        let raw_rows: Vec<Vec<&str>> = lines.map(|line| line.split(',').map(str::trim).collect()).collect();

        let is_char: Vec<bool> = (0..names.len())
            .map(|col| {
                raw_rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .filter(|v| !v.is_empty())
                    .any(|v| v.parse::<f64>().is_err())
            })
            .collect();

        let mut dataset = Dataset::new(path.display().to_string());
        for (name, &char_col) in names.iter().zip(is_char.iter()) {
            dataset.append_column(VarMeta {
                name: name.to_ascii_uppercase(),
                is_char: char_col,
                length: if char_col { 200 } else { 8 },
                label: None,
                format: None,
                informat: None,
            });
        }
        for row in raw_rows {
            let cells = (0..names.len())
                .map(|col| {
                    let raw = row.get(col).copied().unwrap_or("");
                    if is_char[col] {
                        Cell::from_str(&mut env.interner, raw)
                    } else if raw.is_empty() {
                        Cell::MISSING_NUMBER
                    } else {
                        Cell::Number(raw.parse().unwrap_or(f64::NAN))
                    }
                })
                .collect();
            dataset.append_row(cells);
        }
        Ok(dataset)
    }

    fn save(&self, dataset: &Dataset, path: &Path, env: &Environment) -> Result<(), CoreError> {
        let mut text = dataset.columns().iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(",");
        text.push('\n');
        for row in dataset.rows() {
            let line = row.iter().map(|c| c.to_display_string(&env.interner)).collect::<Vec<_>>().join(",");
            text.push_str(&line);
            text.push('\n');
        }
        fs::write(path, text).map_err(|e| CoreError::SaveFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Stub for the `.sas7bdat` binary format. Reading and writing that format
/// needs a real decoder (e.g. the `readstat` C library's bindings); this
/// crate has no such dependency, so both operations fail explicitly rather
/// than silently producing a CSV-shaped file under a `.sas7bdat` name.
pub struct ReadstatPersistence;

impl DatasetPersistence for ReadstatPersistence {
    fn load(&self, path: &Path, _env: &mut Environment) -> Result<Dataset, CoreError> {
        Err(CoreError::LoadFailed {
            path: path.display().to_string(),
            message: "sas7bdat decoding is not implemented".to_string(),
        })
    }

    fn save(&self, _dataset: &Dataset, path: &Path, _env: &Environment) -> Result<(), CoreError> {
        Err(CoreError::SaveFailed {
            path: path.display().to_string(),
            message: "sas7bdat encoding is not implemented".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_round_trips_numeric_and_character_columns() {
        let dir = std::env::temp_dir().join(format!("sas-csv-test-{:?}", std::thread::current().id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("data.csv");
        fs::write(&path, "name,age\nAda,36\nGrace,85\n").unwrap();

        let mut env = Environment::new();
        let dataset = CsvPersistence.load(&path, &mut env).unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.column_index("AGE"), Some(1));
        assert!(!dataset.columns()[1].is_char);
        assert!(dataset.columns()[0].is_char);

        let out_path = dir.join("out.csv");
        CsvPersistence.save(&dataset, &out_path, &env).unwrap();
        let roundtripped = fs::read_to_string(&out_path).unwrap();
        assert!(roundtripped.contains("Ada"));
        fs::remove_dir_all(&dir).ok();
    }
}
