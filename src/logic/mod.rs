//! Boolean condition normalization.
//!
//! Conditions are written as free text joined with `AND` / `OR` words and
//! parentheses, e.g. `(mean.error < 0.1 OR median.error < 0.1) AND rnorm.n = 100`.
//! [`to_dnf`] turns such text into disjunctive normal form:
//!
//! ```text
//! [["mean.error < 0.1", "rnorm.n = 100"],
//!  ["median.error < 0.1", "rnorm.n = 100"]]
//! ```
//!
//! Predicates are opaque strings. Literal `*`, `+`, `,` and whitespace inside
//! them survive byte for byte; only the ends of each predicate are trimmed.

pub mod grouping;
pub mod placeholder;

use rand::Rng;

pub use grouping::Dnf;
pub use placeholder::{Literal, Placeholder};

/// Word operators and the grouping symbol each one becomes.
const WORD_OPERATORS: [(&str, &str); 4] =
    [(" or ", ","), (" OR ", ","), (" and ", "*"), (" AND ", "*")];

/// Errors raised while normalizing a condition.
#[derive(Debug, thiserror::Error)]
pub enum LogicError {
    #[error("Cannot parse condition `{expression}`: {message}")]
    Syntax { expression: String, message: String },

    #[error("Placeholder marker left in predicate `{text}`")]
    ResidualPlaceholder { text: String },
}

pub type LogicResult<T> = Result<T, LogicError>;

/// Normalize `expression` to DNF using thread-local entropy for markers.
pub fn to_dnf(expression: &str) -> LogicResult<Dnf> {
    to_dnf_with_rng(expression, &mut rand::rng())
}

/// Normalize `expression` to DNF, drawing marker entropy from `rng`.
///
/// Blank input has no groups.
pub fn to_dnf_with_rng<R: Rng + ?Sized>(expression: &str, rng: &mut R) -> LogicResult<Dnf> {
    if expression.trim().is_empty() {
        return Ok(Vec::new());
    }

    let placeholder = Placeholder::generate(expression, rng);
    let escaped = escape(expression, &placeholder);

    let groups = grouping::parse(&escaped).map_err(|errors| LogicError::Syntax {
        expression: expression.to_string(),
        message: errors.join("; "),
    })?;

    groups
        .into_iter()
        .map(|group| {
            group
                .into_iter()
                .map(|atom| {
                    let restored = placeholder.restore(&atom).trim().to_string();
                    if placeholder.leaked_into(&restored) {
                        Err(LogicError::ResidualPlaceholder { text: restored })
                    } else {
                        Ok(restored)
                    }
                })
                .collect::<LogicResult<Vec<String>>>()
        })
        .collect()
}

/// Rewrite `expression` into grouping-parser syntax.
///
/// Literal operator characters are masked first, then word operators become
/// the live `*` / `,`, and finally every remaining whitespace character is
/// masked on its own so restoration gives back the exact text.
fn escape(expression: &str, placeholder: &Placeholder) -> String {
    let mut text = expression
        .replace('*', &placeholder.marker(Literal::Asterisk))
        .replace('+', &placeholder.marker(Literal::Plus))
        .replace(',', &placeholder.marker(Literal::Comma));
    for (word, symbol) in WORD_OPERATORS {
        text = text.replace(word, symbol);
    }
    text.chars().fold(String::with_capacity(text.len()), |mut out, c| {
        if c.is_whitespace() {
            out.push_str(&placeholder.marker(Literal::Whitespace(c)));
        } else {
            out.push(c);
        }
        out
    })
}
