//! # Captain
//!
//! Compiles requests against a pipeline result store into one SQL query per
//! relevant pipeline.
//!
//! ## Architecture
//!
//! A request names target fields (`mean.error`, or a bare table such as
//! `rnorm`) and boolean conditions over fields. The store records, for every
//! pipeline template, which concrete steps ran at each role.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          Targets + Conditions (free text)                │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [reference]
//! ┌─────────────────────────────────────────────────────────┐
//! │          References to known step tables                 │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [pipeline::enumerate + select]
//! ┌─────────────────────────────────────────────────────────┐
//! │          Maximal relevant chains                         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [logic (DNF) + assembler]
//! ┌─────────────────────────────────────────────────────────┐
//! │          SELECT ... FROM ... INNER JOIN ... WHERE ...    │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod assembler;
pub mod compile;
pub mod config;
pub mod logic;
pub mod pipeline;
pub mod reference;
pub mod sql;
pub mod store;

pub use compile::{
    compile, compile_with_store, Compilation, CompileError, CompileOptions, CompileOutput,
};
pub use logic::to_dnf;
pub use pipeline::Chain;
pub use reference::{parse_references, Reference};
pub use sql::{legalize, Query};
pub use store::{Naming, Store};
