//! Per-chain query assembly.
//!
//! For one selected chain, builds:
//!
//! - the FROM / JOIN chain, walking from the last step back to the root
//!   through the `parent` → `ID` links;
//! - the SELECT list of the targets whose tables lie on the chain;
//! - the WHERE clause, keeping the condition predicates that only mention
//!   tables on the chain.

use std::collections::HashSet;

use crate::logic::Dnf;
use crate::pipeline::Chain;
use crate::reference::{parse_field_reference, reference_tokens, Reference};
use crate::sql::query::{Query, SelectItem, TableRef, WhereClause};
use crate::sql::Legalizer;
use crate::store::{Naming, Store};

/// Errors raised while assembling a query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("``{predicate}`` is invalid query: cannot find column ``{field}`` in table ``{table}``")]
    UnknownField {
        predicate: String,
        field: String,
        table: String,
    },
}

pub type AssemblyResult<T> = Result<T, AssemblyError>;

/// Build the query for `chain`.
///
/// `conditions` is the condition text already normalized to DNF.
pub fn assemble(
    chain: &Chain,
    targets: &[Reference],
    conditions: &Dnf,
    store: &Store,
    naming: &Naming,
) -> AssemblyResult<Query> {
    let mut query = from_clause(chain, naming);
    query = query.select(select_items(chain, targets, store, naming));
    query = query.filter(where_clause(chain, conditions, store)?);

    if query.select.is_empty() {
        tracing::warn!(%chain, "no target fields on this pipeline; SELECT list is empty");
    }
    if query.where_clause.has_empty_group() {
        tracing::warn!(%chain, "a condition group kept no predicates for this pipeline");
    }
    Ok(query)
}

/// `FROM <last step>` joined back, step by step, to the root.
pub fn from_clause(chain: &Chain, naming: &Naming) -> Query {
    let reversed: Vec<&String> = chain.steps().iter().rev().collect();
    let mut query = Query::new(TableRef::new(reversed[0]));
    for pair in reversed.windows(2) {
        query = query.inner_join(
            pair[0],
            TableRef::new(pair[1]),
            &naming.parent_column,
            &naming.id_column,
        );
    }
    query
}

/// SELECT items for the targets whose table is on `chain`, in target order.
pub fn select_items(
    chain: &Chain,
    targets: &[Reference],
    store: &Store,
    naming: &Naming,
) -> Vec<SelectItem> {
    targets
        .iter()
        .filter(|target| chain.contains_table(&target.table))
        .map(|target| {
            let table = target.table.clone();
            match &target.field {
                None => SelectItem::Membership { table },
                Some(field) if !store.column_exists(&table, field) => SelectItem::FileFallback {
                    table,
                    field: field.clone(),
                    file_column: naming.file_column.clone(),
                },
                Some(field) => SelectItem::Column {
                    table,
                    field: field.clone(),
                },
            }
        })
        .collect()
}

/// The WHERE clause of `chain`.
///
/// A predicate survives if it references at least one table on the chain and
/// none off it. Predicates without any reference are dropped as well. Every
/// referenced field of an on-chain table must exist.
pub fn where_clause(chain: &Chain, conditions: &Dnf, store: &Store) -> AssemblyResult<WhereClause> {
    let on_chain: HashSet<String> = chain.lowercase_steps().into_iter().collect();
    let legalizer = Legalizer::default();

    let mut groups = Vec::with_capacity(conditions.len());
    for group in conditions {
        let mut kept = Vec::new();
        for predicate in group {
            if keep_predicate(predicate, &on_chain, store, &legalizer)? {
                kept.push(predicate.clone());
            }
        }
        groups.push(kept);
    }
    Ok(WhereClause::new(groups))
}

fn keep_predicate(
    predicate: &str,
    on_chain: &HashSet<String>,
    store: &Store,
    legalizer: &Legalizer,
) -> AssemblyResult<bool> {
    let mut in_scope = 0usize;
    let mut out_of_scope = 0usize;

    for token in reference_tokens(predicate) {
        let Some(reference) = parse_field_reference(token, legalizer) else {
            continue;
        };
        if !on_chain.contains(&reference.table.to_lowercase()) {
            out_of_scope += 1;
            continue;
        }
        in_scope += 1;

        let field = reference.field.unwrap_or_default();
        if !store.column_exists(&reference.table, &field) {
            let table = store
                .resolve_table_name(&reference.table)
                .unwrap_or(&reference.table)
                .to_string();
            return Err(AssemblyError::UnknownField {
                predicate: predicate.to_string(),
                field,
                table,
            });
        }
    }

    Ok(in_scope >= 1 && out_of_scope == 0)
}
