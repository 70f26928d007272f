// tests/pipeline/selection_test.rs
use captain::pipeline::{select, Chain};
use captain::reference::{parse_references, Reference};

fn chain(steps: &[&str]) -> Chain {
    Chain::new(steps.iter().map(|s| s.to_string()).collect()).unwrap()
}

fn candidates() -> Vec<Chain> {
    vec![
        chain(&["rnorm", "mean", "mse"]),
        chain(&["rnorm", "median", "mse"]),
        chain(&["rt", "mean", "mse"]),
        chain(&["rt", "median", "mse"]),
    ]
}

fn rendered(chains: &[Chain]) -> Vec<String> {
    chains.iter().map(Chain::to_string).collect()
}

#[test]
fn test_select_from_parsed_references() {
    let targets = parse_references(&["mse.error", "mean"], true);
    let conditions = parse_references(&["rnorm.n > 50"], false);

    let selected = select(&candidates(), &targets, &conditions);
    assert_eq!(rendered(&selected), vec!["rnorm -> mean -> mse"]);
}

#[test]
fn test_select_keeps_incomparable_chains() {
    let targets = parse_references(&["mean.error", "median.error", "rnorm"], true);

    let selected = select(&candidates(), &targets, &[]);
    assert_eq!(
        rendered(&selected),
        vec!["rnorm -> mean", "rnorm -> median"]
    );
}

#[test]
fn test_prefix_chains_are_absorbed() {
    let targets = vec![
        Reference::table("rnorm"),
        Reference::table("rt"),
        Reference::field("mean", "error"),
    ];

    let selected = select(&candidates(), &targets, &[]);
    assert_eq!(rendered(&selected), vec!["rnorm -> mean", "rt -> mean"]);
}

#[test]
fn test_only_root_referenced() {
    let targets = vec![Reference::table("rt")];

    let selected = select(&candidates(), &targets, &[]);
    assert_eq!(rendered(&selected), vec!["rt"]);
}

#[test]
fn test_non_root_only_selects_nothing() {
    let targets = vec![Reference::field("mse", "error")];

    assert!(select(&candidates(), &targets, &[]).is_empty());
}

#[test]
fn test_subsequence_not_just_prefix() {
    let chains = vec![chain(&["a", "c"]), chain(&["a", "b", "c"])];
    let targets = vec![
        Reference::table("a"),
        Reference::table("b"),
        Reference::table("c"),
    ];

    let selected = select(&chains, &targets, &[]);
    assert_eq!(rendered(&selected), vec!["a -> b -> c"]);
}

#[test]
fn test_selection_is_stable_under_duplicates() {
    let mut chains = candidates();
    chains.extend(candidates());
    let targets = parse_references(&["rnorm.n", "mean.error"], true);

    let selected = select(&chains, &targets, &[]);
    assert_eq!(rendered(&selected), vec!["rnorm -> mean"]);
}
