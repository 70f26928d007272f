//! Operator-grouping parser.
//!
//! Parses strings where `*` is AND, `,` is OR and parentheses group, and
//! distributes AND over OR so the result is always a flat OR of AND-groups:
//!
//! ```text
//! (a,b)*c  →  [[a, c], [b, c]]
//! a*b,c    →  [[a, b], [c]]
//! ```
//!
//! Operands are any non-empty run of characters other than `*`, `,`, `(`
//! and `)`; they are returned untouched.

use chumsky::prelude::*;

/// OR of AND-groups.
pub type Dnf = Vec<Vec<String>>;

/// AND a sequence of DNF factors together by cartesian product.
fn distribute(factors: Vec<Dnf>) -> Dnf {
    factors.into_iter().fold(vec![Vec::new()], |acc, factor| {
        acc.iter()
            .flat_map(|left| {
                factor.iter().map(move |right| {
                    let mut group = left.clone();
                    group.extend(right.iter().cloned());
                    group
                })
            })
            .collect()
    })
}

/// Create the grouping parser.
pub fn grouping<'src>() -> impl Parser<'src, &'src str, Dnf, extra::Err<Rich<'src, char>>> {
    recursive(|expr| {
        let operand = none_of("*,()")
            .repeated()
            .at_least(1)
            .to_slice()
            .map(|s: &str| vec![vec![s.to_string()]]);

        let group = expr.delimited_by(just('('), just(')'));

        let term = operand
            .or(group)
            .separated_by(just('*'))
            .at_least(1)
            .collect::<Vec<Dnf>>()
            .map(distribute);

        term.separated_by(just(','))
            .at_least(1)
            .collect::<Vec<Dnf>>()
            .map(|branches| branches.into_iter().flatten().collect::<Dnf>())
    })
    .then_ignore(end())
}

/// Parse and distribute `input`.
///
/// Returns the rendered parser errors on failure.
pub fn parse(input: &str) -> Result<Dnf, Vec<String>> {
    grouping()
        .parse(input)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.to_string()).collect())
}
