//! End-to-end compilation from targets and conditions to per-pipeline SQL.
//!
//! ```text
//! targets, conditions ─▶ References ─▶ known tables
//!                                          │
//! Store ─▶ enumerate ─▶ candidate chains ─▶ select ─▶ maximal chains
//!                                                        │
//! conditions ─▶ DNF ───────────────────────────────▶ assemble ─▶ SQL
//! ```
//!
//! # Example
//!
//! ```ignore
//! use captain::compile::{compile, CompileOptions};
//!
//! let compiled = compile(
//!     "results.json",
//!     &["mean.error", "rnorm"],
//!     &["mean.error < 0.5"],
//!     &CompileOptions::default(),
//! )?;
//! for (chain, sql) in compiled.pipelines().iter().zip(compiled.queries()) {
//!     println!("{chain}: {sql}");
//! }
//! ```

use std::path::Path;

use crate::assembler::{self, AssemblyError};
use crate::logic::{self, LogicError};
use crate::pipeline::{self, Chain};
use crate::reference::parse_references;
use crate::sql::query::Query;
use crate::store::{Naming, Store, StoreError};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Condition error: {0}")]
    Logic(#[from] LogicError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Naming conventions of the result store.
    pub naming: Naming,
}

impl CompileOptions {
    /// Replace all naming conventions at once.
    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    /// Set the prefix of template tables.
    pub fn with_template_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.naming.template_prefix = prefix.into();
        self
    }

    /// Set the suffix of template tables.
    pub fn with_template_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.naming.template_suffix = suffix.into();
        self
    }

    /// Set the role-name value that means "no step".
    pub fn with_no_step_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.naming.no_step_sentinel = sentinel.into();
        self
    }

    /// Set the columns used to join a step to its parent step.
    pub fn with_link_columns(
        mut self,
        parent_column: impl Into<String>,
        id_column: impl Into<String>,
    ) -> Self {
        self.naming.parent_column = parent_column.into();
        self.naming.id_column = id_column.into();
        self
    }

    /// Set the column selected for fields that are not stored columns.
    pub fn with_file_column(mut self, column: impl Into<String>) -> Self {
        self.naming.file_column = column.into();
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Queries generated for one request, aligned by index with their chains.
#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    /// One SQL string per selected chain.
    pub queries: Vec<String>,

    /// The selected chains.
    pub pipelines: Vec<Chain>,

    /// The query model behind each SQL string.
    pub plans: Vec<Query>,
}

impl CompileOutput {
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn pipelines(&self) -> &[Chain] {
        &self.pipelines
    }

    pub fn plans(&self) -> &[Query] {
        &self.plans
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Output of [`compile`]: the loaded store alongside the generated queries.
#[derive(Debug, Clone)]
pub struct Compilation {
    store: Store,
    output: CompileOutput,
}

impl Compilation {
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn output(&self) -> &CompileOutput {
        &self.output
    }

    pub fn queries(&self) -> &[String] {
        self.output.queries()
    }

    pub fn pipelines(&self) -> &[Chain] {
        self.output.pipelines()
    }

    pub fn into_parts(self) -> (Store, CompileOutput) {
        (self.store, self.output)
    }
}

// ============================================================================
// Compilation Functions
// ============================================================================

/// Load the store at `store_path` and compile against it.
pub fn compile<P, S>(
    store_path: P,
    targets: &[S],
    conditions: &[S],
    options: &CompileOptions,
) -> CompileResult<Compilation>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let store = Store::from_file(store_path)?;
    let output = compile_with_store(&store, targets, conditions, options)?;
    Ok(Compilation { store, output })
}

/// Compile against an already loaded store.
///
/// Targets may name a bare table; conditions only contribute `table.field`
/// references. All conditions are ANDed together.
pub fn compile_with_store<S: AsRef<str>>(
    store: &Store,
    targets: &[S],
    conditions: &[S],
    options: &CompileOptions,
) -> CompileResult<CompileOutput> {
    let naming = &options.naming;

    // Step 1: Collect references to known tables
    let target_refs = store.filter_known_tables(&parse_references(targets, true), naming);
    let condition_refs = store.filter_known_tables(&parse_references(conditions, false), naming);
    tracing::debug!(
        targets = target_refs.len(),
        conditions = condition_refs.len(),
        "parsed references"
    );

    // Step 2: Expand templates and keep the relevant chains
    let candidates = pipeline::enumerate(store, naming)?;
    let pipelines = pipeline::select(&candidates, &target_refs, &condition_refs);

    // Step 3: Normalize the conditions once for every chain
    let joined = conditions
        .iter()
        .map(AsRef::as_ref)
        .filter(|condition| !condition.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" AND ");
    let dnf = logic::to_dnf(&joined)?;

    // Step 4: Assemble one query per chain
    let plans = pipelines
        .iter()
        .map(|chain| assembler::assemble(chain, &target_refs, &dnf, store, naming))
        .collect::<Result<Vec<_>, _>>()?;

    let queries: Vec<String> = plans.iter().map(Query::to_sql).collect();
    for (chain, sql) in pipelines.iter().zip(&queries) {
        tracing::debug!(%chain, %sql, "generated query");
    }

    Ok(CompileOutput {
        queries,
        pipelines,
        plans,
    })
}

// ============================================================================
// Tests
// ============================================================================
