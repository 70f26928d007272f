//! Extraction of `table.field` references from free-text clauses.
//!
//! Targets and conditions are written by hand, e.g. `mean.error` or
//! `mse.error < 0.1 AND rnorm.n > 50`. Only tokens that are already legal
//! identifiers are treated as references; everything else is skipped.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::sql::Legalizer;

/// Runs of characters that can never be part of a reference.
static NON_REFERENCE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9a-zA-Z_.]+").unwrap());

/// A `table.field` token.
static FIELD_REFERENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+\.\w+$").unwrap());

/// A table, optionally narrowed to one field.
///
/// `field == None` only asks that the table takes part in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub table: String,
    pub field: Option<String>,
}

impl Reference {
    pub fn field(table: &str, field: &str) -> Self {
        Self {
            table: table.into(),
            field: Some(field.into()),
        }
    }

    pub fn table(table: &str) -> Self {
        Self {
            table: table.into(),
            field: None,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}.{}", self.table, field),
            None => write!(f, "{}", self.table),
        }
    }
}

/// Split joined clause text into candidate reference tokens.
pub(crate) fn reference_tokens(text: &str) -> impl Iterator<Item = &str> {
    NON_REFERENCE_CHARS
        .split(text)
        .flat_map(str::split_whitespace)
}

/// Parse a single token as a `table.field` reference.
///
/// Both halves must already be legal identifiers; a token that would need
/// sanitizing is not a genuine reference.
pub(crate) fn parse_field_reference(token: &str, legalizer: &Legalizer) -> Option<Reference> {
    if !FIELD_REFERENCE.is_match(token) {
        return None;
    }
    let (table, field) = token.split_once('.')?;
    if legalizer.is_legal(table, false) && legalizer.is_legal(field, false) {
        Some(Reference::field(table, field))
    } else {
        None
    }
}

/// Extract references from a list of clauses.
///
/// The clauses are joined with spaces and every run of characters outside
/// `[A-Za-z0-9_.]` is treated as a separator. A `table.field` token yields a
/// field reference. A token without a dot yields a bare table reference only
/// when `allow_bare_table` is set and it is not a reserved word. All other
/// tokens are dropped.
pub fn parse_references<S: AsRef<str>>(clauses: &[S], allow_bare_table: bool) -> Vec<Reference> {
    let legalizer = Legalizer::default();
    let text = clauses
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");

    let mut references = Vec::new();
    for token in reference_tokens(&text) {
        if FIELD_REFERENCE.is_match(token) {
            if let Some(reference) = parse_field_reference(token, &legalizer) {
                references.push(reference);
            }
        } else if allow_bare_table && legalizer.is_legal(token, true) {
            references.push(Reference::table(token));
        }
    }
    references
}
