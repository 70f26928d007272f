//! Identifier legalization.
//!
//! Step and field names in a result store come from free text written by
//! pipeline authors. Before a name can appear unquoted in a generated query
//! it is mapped onto `[A-Za-z0-9_]`, with a leading underscore added when the
//! result would start with a digit or (optionally) collide with a reserved
//! word.

use super::keywords::SQL_KEYWORDS;

/// Sanitizes names against a fixed reserved-word list.
#[derive(Debug, Clone, Copy)]
pub struct Legalizer {
    keywords: &'static [&'static str],
}

impl Default for Legalizer {
    fn default() -> Self {
        Self::new(SQL_KEYWORDS)
    }
}

impl Legalizer {
    /// Create a legalizer over a sorted, upper-case keyword list.
    pub fn new(keywords: &'static [&'static str]) -> Self {
        Self { keywords }
    }

    /// Legalize `name`.
    ///
    /// Every character outside `[A-Za-z0-9_]` becomes `_`. The result gets a
    /// `_` prefix if it starts with a digit, or if `escape_keyword` is set and
    /// it is a reserved word. Applying this twice gives the same result as
    /// applying it once.
    pub fn legalize(&self, name: &str, escape_keyword: bool) -> String {
        let output: String = name
            .chars()
            .map(|c| if is_ident_char(c) { c } else { '_' })
            .collect();

        let leading_digit = output.starts_with(|c: char| c.is_ascii_digit());
        if leading_digit || (escape_keyword && self.is_keyword(&output)) {
            format!("_{output}")
        } else {
            output
        }
    }

    /// True if `name` is already in legal form.
    pub fn is_legal(&self, name: &str, escape_keyword: bool) -> bool {
        self.legalize(name, escape_keyword) == name
    }

    fn is_keyword(&self, word: &str) -> bool {
        self.keywords
            .binary_search(&word.to_uppercase().as_str())
            .is_ok()
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Legalize `name` against the default reserved-word list.
pub fn legalize(name: &str, escape_keyword: bool) -> String {
    Legalizer::default().legalize(name, escape_keyword)
}
