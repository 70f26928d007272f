//! Read-only view over a loaded result store.
//!
//! A result store maps table names to either step tables (records written by
//! each executed step) or template tables (`pipeline_<key>.captain`, listing
//! the step roles that make up each pipeline). Lookups by name ignore case,
//! but names are always reported with their stored casing.
//!
//! # Example
//!
//! ```ignore
//! use captain::store::{Naming, Store};
//!
//! let store = Store::from_file("results.json")?;
//! assert!(store.table_exists("MEAN"));
//! let refs = store.filter_known_tables(&refs, &Naming::default());
//! ```

mod loader;
pub mod table;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::reference::Reference;

pub use table::{Column, ColumnKind, StepTable, Table, TemplateTable};

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while loading or reading a result store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse store: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Column `{column}` of table `{table}` has {found} rows, expected {expected}")]
    RaggedTable {
        table: String,
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Template `{template}` has no step table `{group}`")]
    MissingTemplateGroup { template: String, group: String },

    #[error("Table `{table}` has no column `{column}`")]
    MissingRoleColumn { table: String, column: String },

    #[error("Column `{column}` of table `{table}` must hold text, found {kind}")]
    NotATextColumn {
        table: String,
        column: String,
        kind: ColumnKind,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// Naming conventions
// ============================================================================

/// Naming conventions of a result store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Naming {
    /// Prefix shared by template tables and their role-name tables.
    pub template_prefix: String,
    /// Suffix that marks a template table.
    pub template_suffix: String,
    /// Role-name value meaning "no step ran at this role".
    pub no_step_sentinel: String,
    /// Row identifier column.
    pub id_column: String,
    /// Column holding the predecessor row's identifier.
    pub parent_column: String,
    /// Column holding the path of a row's output file.
    pub file_column: String,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            template_prefix: "pipeline_".to_string(),
            template_suffix: ".captain".to_string(),
            no_step_sentinel: "-".to_string(),
            id_column: "ID".to_string(),
            parent_column: "parent".to_string(),
            file_column: "FILE".to_string(),
        }
    }
}

impl Naming {
    pub fn is_template_name(&self, name: &str) -> bool {
        name.starts_with(&self.template_prefix) && name.ends_with(&self.template_suffix)
    }

    /// Column listing the step chosen at `role`.
    pub fn role_column(&self, role: &str) -> String {
        format!("{role}_name")
    }
}

// ============================================================================
// Store
// ============================================================================

/// An immutable, loaded result store.
#[derive(Debug, Clone, Default)]
pub struct Store {
    tables: IndexMap<String, Table>,
    /// Lower-cased name to stored name.
    names: HashMap<String, String>,
}

impl Store {
    /// Build a store from tables in stored order.
    ///
    /// When two names differ only by case, case-insensitive lookups resolve
    /// to the first one.
    pub fn new(tables: IndexMap<String, Table>) -> Self {
        let mut names = HashMap::with_capacity(tables.len());
        for name in tables.keys() {
            names
                .entry(name.to_lowercase())
                .or_insert_with(|| name.clone());
        }
        Self { tables, names }
    }

    /// All tables, in stored order.
    pub fn tables(&self) -> &IndexMap<String, Table> {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// The stored spelling of `name`, matched ignoring case.
    pub fn resolve_table_name(&self, name: &str) -> Option<&str> {
        if let Some((stored, _)) = self.tables.get_key_value(name) {
            return Some(stored);
        }
        self.names.get(&name.to_lowercase()).map(String::as_str)
    }

    /// True if a table named `name` exists, ignoring case.
    pub fn table_exists(&self, name: &str) -> bool {
        self.resolve_table_name(name).is_some()
    }

    /// Look up a table, ignoring case.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.resolve_table_name(name)
            .and_then(|stored| self.tables.get(stored))
    }

    /// Look up a step table, ignoring case.
    pub fn step_table(&self, name: &str) -> Option<&StepTable> {
        self.table(name).and_then(Table::as_step)
    }

    /// True if `table` is a step table with a column `column`, both ignoring
    /// case.
    pub fn column_exists(&self, table: &str, column: &str) -> bool {
        self.step_table(table)
            .is_some_and(|step| step.has_column(column))
    }

    /// Template tables, in stored order.
    pub fn templates<'a>(
        &'a self,
        naming: &'a Naming,
    ) -> impl Iterator<Item = (&'a str, &'a TemplateTable)> + 'a {
        self.tables.iter().filter_map(move |(name, table)| {
            let template = table.as_template()?;
            naming
                .is_template_name(name)
                .then_some((name.as_str(), template))
        })
    }

    /// Keep references to tables that exist and are not pipeline tables,
    /// dropping duplicates but keeping first-seen order.
    pub fn filter_known_tables(&self, refs: &[Reference], naming: &Naming) -> Vec<Reference> {
        let mut seen = HashSet::new();
        refs.iter()
            .filter(|r| {
                self.resolve_table_name(&r.table)
                    .is_some_and(|stored| !stored.starts_with(&naming.template_prefix))
            })
            .filter(|r| seen.insert((*r).clone()))
            .cloned()
            .collect()
    }
}
