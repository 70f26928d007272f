//! SQL generation module.
//!
//! - [`ident`] - identifier legalization
//! - [`keywords`] - reserved word list
//! - [`query`] - SELECT / FROM / WHERE query model
//! - [`token`] - Token types for SQL generation

pub mod ident;
pub mod keywords;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

pub use ident::{legalize, Legalizer};
pub use keywords::SQL_KEYWORDS;
pub use query::{Join, Query, SelectItem, TableRef, WhereClause};
pub use token::{Token, TokenStream};
