//! Selection of the chains a request actually touches.

use std::collections::HashSet;

use indexmap::IndexSet;

use super::Chain;
use crate::reference::Reference;

/// Reduce candidate chains to the maximal chains relevant to a request.
///
/// 1. Each chain is cut at its first step not referenced by any target or
///    condition (ignoring case); chains whose root is unreferenced are dropped.
/// 2. Identical cut chains are merged, keeping first-seen order.
/// 3. A chain contained in another kept chain as an ordered subsequence is
///    dropped.
pub fn select(chains: &[Chain], targets: &[Reference], conditions: &[Reference]) -> Vec<Chain> {
    let wanted: HashSet<String> = targets
        .iter()
        .chain(conditions)
        .map(|r| r.table.to_lowercase())
        .collect();

    let truncated: IndexSet<Chain> = chains
        .iter()
        .filter_map(|chain| relevant_prefix(chain, &wanted))
        .collect();
    let truncated: Vec<Chain> = truncated.into_iter().collect();

    let maximal: Vec<Chain> = truncated
        .iter()
        .filter(|x| {
            !truncated
                .iter()
                .any(|y| y != *x && x.is_subsequence_of(y))
        })
        .cloned()
        .collect();

    tracing::debug!(
        candidates = chains.len(),
        selected = maximal.len(),
        "selected maximal chains"
    );
    maximal
}

/// The longest prefix of `chain` whose steps are all in `wanted`.
fn relevant_prefix(chain: &Chain, wanted: &HashSet<String>) -> Option<Chain> {
    let prefix = chain
        .steps()
        .iter()
        .take_while(|step| wanted.contains(&step.to_lowercase()))
        .cloned()
        .collect();
    Chain::new(prefix)
}
