//! Expansion of pipeline templates into concrete candidate chains.
//!
//! A template such as `pipeline_A.captain = [["simulate", "estimate"]]` lists
//! step roles. The companion table `pipeline_A` records, per executed row, the
//! concrete step chosen at each role in a `<role>_name` column. Every
//! combination of recorded names is a candidate chain.

use indexmap::IndexSet;

use super::Chain;
use crate::store::{Naming, StepTable, Store, StoreError, StoreResult};

/// Enumerate every candidate chain of every template in `store`.
///
/// Templates are visited in stored order. Within one pipeline the role order
/// is kept and the last role varies fastest.
pub fn enumerate(store: &Store, naming: &Naming) -> StoreResult<Vec<Chain>> {
    let mut chains = Vec::new();

    for (template_name, template) in store.templates(naming) {
        let (group_name, group) = template_group(store, template_name, naming)?;

        for roles in &template.pipelines {
            let variants = roles
                .iter()
                .map(|role| role_variants(group_name, group, role, naming))
                .collect::<StoreResult<Vec<_>>>()?;
            chains.extend(cartesian(&variants));
        }
    }

    tracing::debug!(count = chains.len(), "enumerated candidate chains");
    Ok(chains)
}

/// Find the step table holding role names for `template_name`.
///
/// `pipeline_A.captain` reads from `pipeline_A`, falling back to `A`.
fn template_group<'a>(
    store: &'a Store,
    template_name: &str,
    naming: &Naming,
) -> StoreResult<(&'a str, &'a StepTable)> {
    let group = template_name
        .strip_suffix(&naming.template_suffix)
        .unwrap_or(template_name);
    let short = group.strip_prefix(&naming.template_prefix).unwrap_or(group);

    [group, short]
        .into_iter()
        .find_map(|name| {
            let stored = store.resolve_table_name(name)?;
            store.step_table(stored).map(|table| (stored, table))
        })
        .ok_or_else(|| StoreError::MissingTemplateGroup {
            template: template_name.to_string(),
            group: group.to_string(),
        })
}

/// Distinct step names recorded for `role`, in first-seen order, without
/// nulls or the no-step sentinel.
fn role_variants(
    table_name: &str,
    table: &StepTable,
    role: &str,
    naming: &Naming,
) -> StoreResult<Vec<String>> {
    let column_name = naming.role_column(role);
    let column = table
        .column(&column_name)
        .ok_or_else(|| StoreError::MissingRoleColumn {
            table: table_name.to_string(),
            column: column_name.clone(),
        })?;
    let values = column.as_text().ok_or_else(|| StoreError::NotATextColumn {
        table: table_name.to_string(),
        column: column_name.clone(),
        kind: column.kind(),
    })?;

    let names: IndexSet<&str> = values
        .iter()
        .flatten()
        .map(String::as_str)
        .filter(|name| *name != naming.no_step_sentinel)
        .collect();
    Ok(names.into_iter().map(str::to_string).collect())
}

/// Every combination picking one name per role.
///
/// Yields nothing if there are no roles or any role has no names.
fn cartesian(variants: &[Vec<String>]) -> Vec<Chain> {
    if variants.is_empty() {
        return Vec::new();
    }
    variants
        .iter()
        .fold(vec![Vec::new()], |acc: Vec<Vec<String>>, names| {
            acc.iter()
                .flat_map(|prefix| {
                    names.iter().map(move |name| {
                        let mut steps = prefix.clone();
                        steps.push(name.clone());
                        steps
                    })
                })
                .collect()
        })
        .into_iter()
        .filter_map(Chain::new)
        .collect()
}
