//! Typed tables held by a result store.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The value kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Int,
    Float,
    Text,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnKind::Int => "int",
            ColumnKind::Float => "float",
            ColumnKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// A column of nullable values of a single kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum Column {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Int(_) => ColumnKind::Int,
            Column::Float(_) => ColumnKind::Float,
            Column::Text(_) => ColumnKind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Int(values) => values.len(),
            Column::Float(values) => values.len(),
            Column::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The values of a text column, `None` for other kinds.
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match self {
            Column::Text(values) => Some(values),
            _ => None,
        }
    }

    /// The values of an integer column, `None` for other kinds.
    pub fn as_int(&self) -> Option<&[Option<i64>]> {
        match self {
            Column::Int(values) => Some(values),
            _ => None,
        }
    }
}

/// Per-step records: one row per step execution.
///
/// Rows carry an identifier column and a `parent` column pointing at the row
/// of the preceding step that fed them, which makes every pipeline run a
/// linear walk from the last step back to its root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepTable {
    pub columns: IndexMap<String, Column>,
}

impl StepTable {
    /// Look up a column, ignoring case.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name).or_else(|| {
            let lower = name.to_lowercase();
            self.columns
                .iter()
                .find(|(k, _)| k.to_lowercase() == lower)
                .map(|(_, v)| v)
        })
    }

    /// True if the table has a column named `name`, ignoring case.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Column names with their kinds, in stored order.
    pub fn schema(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.kind()))
    }

    /// Number of rows, taken from the first column.
    pub fn row_count(&self) -> usize {
        self.columns.values().next().map_or(0, Column::len)
    }
}

/// Pipeline definitions: each pipeline is an ordered list of step roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTable {
    pub pipelines: Vec<Vec<String>>,
}

/// A table in the result store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Table {
    Step(StepTable),
    Template(TemplateTable),
}

impl Table {
    pub fn as_step(&self) -> Option<&StepTable> {
        match self {
            Table::Step(table) => Some(table),
            Table::Template(_) => None,
        }
    }

    pub fn as_template(&self) -> Option<&TemplateTable> {
        match self {
            Table::Template(table) => Some(table),
            Table::Step(_) => None,
        }
    }
}
