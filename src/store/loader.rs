//! Loading a result store from its JSON serialization.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use indexmap::IndexMap;

use super::{Store, StoreError, StoreResult, Table};

impl Store {
    /// Parse a store from JSON text.
    pub fn from_json_str(json: &str) -> StoreResult<Self> {
        let tables: IndexMap<String, Table> = serde_json::from_str(json)?;
        Self::checked(tables)
    }

    /// Parse a store from a JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> StoreResult<Self> {
        let tables: IndexMap<String, Table> = serde_json::from_reader(reader)?;
        Self::checked(tables)
    }

    /// Load a store from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_reader(BufReader::new(file))?;
        tracing::debug!(path = %path.display(), tables = store.len(), "loaded result store");
        Ok(store)
    }

    fn checked(tables: IndexMap<String, Table>) -> StoreResult<Self> {
        for (name, table) in &tables {
            if let Table::Step(step) = table {
                let expected = step.row_count();
                for (column, values) in &step.columns {
                    if values.len() != expected {
                        return Err(StoreError::RaggedTable {
                            table: name.clone(),
                            column: column.clone(),
                            expected,
                            found: values.len(),
                        });
                    }
                }
            }
        }
        Ok(Self::new(tables))
    }
}
