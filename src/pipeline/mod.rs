//! Pipeline chains: expansion of templates and selection of relevant chains.
//!
//! ```text
//! templates ──[enumerate]──▶ candidate chains ──[select]──▶ maximal chains
//! ```

pub mod enumerate;
pub mod select;

use std::fmt;

use serde::Serialize;

pub use enumerate::enumerate;
pub use select::select;

/// An ordered run of concrete steps, root first.
///
/// Chains are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Chain(Vec<String>);

impl Chain {
    /// Create a chain; `None` if `steps` is empty.
    pub fn new(steps: Vec<String>) -> Option<Self> {
        (!steps.is_empty()).then_some(Self(steps))
    }

    pub fn steps(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first (root) step.
    pub fn root(&self) -> &str {
        &self.0[0]
    }

    /// The last step.
    pub fn last(&self) -> &str {
        &self.0[self.0.len() - 1]
    }

    /// True if the chain contains `table`, ignoring case.
    pub fn contains_table(&self, table: &str) -> bool {
        let lower = table.to_lowercase();
        self.0.iter().any(|step| step.to_lowercase() == lower)
    }

    /// Lower-cased step names.
    pub fn lowercase_steps(&self) -> Vec<String> {
        self.0.iter().map(|step| step.to_lowercase()).collect()
    }

    /// True if every step of `self` appears in `other` in the same order,
    /// not necessarily adjacent.
    pub fn is_subsequence_of(&self, other: &Chain) -> bool {
        let mut rest = other.0.iter();
        self.0.iter().all(|step| rest.any(|s| s == step))
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" -> "))
    }
}
