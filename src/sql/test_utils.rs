//! Test utilities for SQL emission validation.
//!
//! Uses sqlparser-rs to check that generated queries parse.

use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// Validates that a SQL string is syntactically valid.
///
/// Degenerate queries (empty SELECT list, bare `WHERE `) are expected to
/// fail; only call this on queries with targets and conditions.
pub fn validate_sql(sql: &str) -> Result<(), String> {
    Parser::parse_sql(&GenericDialect {}, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL: {}\nSQL: {}", e, sql))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_sql() {
        validate_sql("SELECT mean.error AS mean_error FROM mean WHERE ((mean.error < 1))")
            .unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        assert!(validate_sql("SELECT  FROM mean WHERE ").is_err());
    }
}
