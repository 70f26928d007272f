//! Integration tests for the end-to-end request → SQL compilation pipeline.
//!
//! The fixture store holds one template with three roles:
//! - `sim`: rnorm, rt
//! - `est`: mean, median
//! - `score`: mse (only recorded after `mean`)

use std::io::Write;

use captain::compile::{compile, compile_with_store, CompileError, CompileOptions};
use captain::store::{Naming, Store, StoreError};
use captain::{to_dnf, Chain};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

const STORE: &str = r#"{
    "pipeline_A.captain": {"kind": "template", "pipelines": [["sim", "est", "score"]]},
    "pipeline_A": {"kind": "step", "columns": {
        "ID":         {"type": "int",  "values": [1, 2, 3]},
        "sim_name":   {"type": "text", "values": ["rnorm", "rt", "rnorm"]},
        "est_name":   {"type": "text", "values": ["mean", "median", "median"]},
        "score_name": {"type": "text", "values": ["mse", "-", "-"]}
    }},
    "rnorm": {"kind": "step", "columns": {
        "ID":     {"type": "int",   "values": [1, 2]},
        "parent": {"type": "int",   "values": [null, null]},
        "FILE":   {"type": "text",  "values": ["rnorm/1.rds", "rnorm/2.rds"]},
        "n":      {"type": "int",   "values": [50, 100]}
    }},
    "rt": {"kind": "step", "columns": {
        "ID":     {"type": "int",   "values": [1]},
        "parent": {"type": "int",   "values": [null]},
        "FILE":   {"type": "text",  "values": ["rt/1.rds"]},
        "df":     {"type": "int",   "values": [3]}
    }},
    "mean": {"kind": "step", "columns": {
        "ID":     {"type": "int",   "values": [1, 2]},
        "parent": {"type": "int",   "values": [1, 2]},
        "FILE":   {"type": "text",  "values": ["mean/1.rds", "mean/2.rds"]},
        "error":  {"type": "float", "values": [0.12, 0.31]}
    }},
    "median": {"kind": "step", "columns": {
        "ID":     {"type": "int",   "values": [1, 2]},
        "parent": {"type": "int",   "values": [1, 2]},
        "FILE":   {"type": "text",  "values": ["median/1.rds", "median/2.rds"]},
        "error":  {"type": "float", "values": [0.2, 0.4]}
    }},
    "mse": {"kind": "step", "columns": {
        "ID":     {"type": "int",   "values": [1]},
        "parent": {"type": "int",   "values": [1]},
        "FILE":   {"type": "text",  "values": ["mse/1.rds"]},
        "loss":   {"type": "float", "values": [0.01]}
    }}
}"#;

fn store() -> Store {
    Store::from_json_str(STORE).unwrap()
}

fn validate_sql(sql: &str) {
    if let Err(e) = Parser::parse_sql(&GenericDialect {}, sql) {
        panic!("Invalid SQL: {}\nSQL: {}", e, sql);
    }
}

// ============================================================================
// Basic Compilation Tests
// ============================================================================

#[test]
fn test_single_pipeline_with_condition() {
    let output = compile_with_store(
        &store(),
        &["mean.error", "rnorm"],
        &["mean.error < 0.2"],
        &CompileOptions::default(),
    )
    .unwrap();

    assert_eq!(output.pipelines().len(), 1);
    insta::assert_snapshot!(&output.queries()[0], @"SELECT mean.error AS mean_error, 'rnorm' AS rnorm FROM mean INNER JOIN rnorm ON mean.parent = rnorm.ID WHERE ((mean.error < 0.2))");
    validate_sql(&output.queries()[0]);
}

#[test]
fn test_one_query_per_pipeline() {
    let output = compile_with_store(
        &store(),
        &["mean.error", "median.error"],
        &["rnorm.n > 10 OR rt.df > 1"],
        &CompileOptions::default(),
    )
    .unwrap();

    let chains: Vec<String> = output.pipelines().iter().map(Chain::to_string).collect();
    assert_eq!(
        chains,
        vec![
            "rnorm -> mean",
            "rnorm -> median",
            "rt -> mean",
            "rt -> median"
        ]
    );
    assert_eq!(output.queries().len(), output.pipelines().len());

    insta::assert_snapshot!(&output.queries()[0], @"SELECT mean.error AS mean_error FROM mean INNER JOIN rnorm ON mean.parent = rnorm.ID WHERE ((rnorm.n > 10)) OR ()");
    insta::assert_snapshot!(&output.queries()[3], @"SELECT median.error AS median_error FROM median INNER JOIN rt ON median.parent = rt.ID WHERE () OR ((rt.df > 1))");
}

#[test]
fn test_three_step_chain_joins_back_to_root() {
    let output = compile_with_store(
        &store(),
        &["mse.loss", "mean.error"],
        &["rnorm.n = 100 AND mse.loss < 0.05"],
        &CompileOptions::default(),
    )
    .unwrap();

    assert_eq!(output.pipelines().len(), 1);
    let sql = &output.queries()[0];
    insta::assert_snapshot!(sql, @"SELECT mse.loss AS mse_loss, mean.error AS mean_error FROM mse INNER JOIN mean ON mse.parent = mean.ID INNER JOIN rnorm ON mean.parent = rnorm.ID WHERE ((rnorm.n = 100) AND (mse.loss < 0.05))");
    validate_sql(sql);
}

#[test]
fn test_field_without_column_selects_file() {
    let output = compile_with_store(
        &store(),
        &["rnorm", "mean.estimate"],
        &["mean.error < 1"],
        &CompileOptions::default(),
    )
    .unwrap();

    insta::assert_snapshot!(&output.queries()[0], @"SELECT 'rnorm' AS rnorm, mean.FILE AS mean_FILE_estimate FROM mean INNER JOIN rnorm ON mean.parent = rnorm.ID WHERE ((mean.error < 1))");
}

#[test]
fn test_parenthesised_conditions_distribute() {
    let output = compile_with_store(
        &store(),
        &["rnorm.n", "mean.error"],
        &["(rnorm.n > 10 OR rnorm.n < 5) AND mean.error < 0.5"],
        &CompileOptions::default(),
    )
    .unwrap();

    let sql = &output.queries()[0];
    insta::assert_snapshot!(sql, @"SELECT rnorm.n AS rnorm_n, mean.error AS mean_error FROM mean INNER JOIN rnorm ON mean.parent = rnorm.ID WHERE ((rnorm.n > 10) AND (mean.error < 0.5)) OR ((rnorm.n < 5) AND (mean.error < 0.5))");
    validate_sql(sql);
}

#[test]
fn test_multiple_conditions_are_anded() {
    let output = compile_with_store(
        &store(),
        &["mean.error"],
        &["rnorm.n > 10", "mean.error < 0.5"],
        &CompileOptions::default(),
    )
    .unwrap();

    assert_eq!(
        output.plans()[0].where_clause.groups,
        vec![vec![
            "rnorm.n > 10".to_string(),
            "mean.error < 0.5".to_string()
        ]]
    );
}

// ============================================================================
// Degenerate Output
// ============================================================================

#[test]
fn test_no_conditions_renders_bare_where() {
    let output =
        compile_with_store(&store(), &["rt"], &[], &CompileOptions::default()).unwrap();

    assert_eq!(output.queries(), &["SELECT 'rt' AS rt FROM rt WHERE ".to_string()]);
}

#[test]
fn test_condition_only_chain_gives_empty_select() {
    let output = compile_with_store(
        &store(),
        &["mse.loss"],
        &["rt.df > 1"],
        &CompileOptions::default(),
    )
    .unwrap();

    let chains: Vec<String> = output.pipelines().iter().map(Chain::to_string).collect();
    assert_eq!(chains, vec!["rt"]);
    assert!(output.plans()[0].select.is_empty());
    assert_eq!(output.queries()[0], "SELECT  FROM rt WHERE ((rt.df > 1))");
}

#[test]
fn test_nothing_known_compiles_to_nothing() {
    let output = compile_with_store(
        &store(),
        &["ghost.field", "select"],
        &["ghost.field > 1"],
        &CompileOptions::default(),
    )
    .unwrap();

    assert!(output.is_empty());
    assert!(output.pipelines().is_empty());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unknown_condition_field_reports_predicate() {
    let err = compile_with_store(
        &store(),
        &["mean.error"],
        &["rnorm.mu > 1"],
        &CompileOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, CompileError::Assembly(_)));
    assert_eq!(
        err.to_string(),
        "``rnorm.mu > 1`` is invalid query: cannot find column ``mu`` in table ``rnorm``"
    );
}

#[test]
fn test_unbalanced_condition_is_rejected() {
    let result = compile_with_store(
        &store(),
        &["mean.error"],
        &["(rnorm.n > 10 OR rnorm.n < 5"],
        &CompileOptions::default(),
    );
    assert!(matches!(result, Err(CompileError::Logic(_))));
}

#[test]
fn test_role_tables_without_companion_are_rejected() {
    let store = Store::from_json_str(
        r#"{
            "pipeline_A.captain": {"kind": "template", "pipelines": [["step1", "step2"]]},
            "step1": {"kind": "step", "columns": {
                "ID":         {"type": "int",  "values": [1, 2]},
                "step1_name": {"type": "text", "values": ["m1", "m2"]}
            }},
            "step2": {"kind": "step", "columns": {
                "ID":         {"type": "int",  "values": [1, 2]},
                "parent":     {"type": "int",  "values": [1, 2]},
                "step2_name": {"type": "text", "values": ["n1", "-"]}
            }}
        }"#,
    )
    .unwrap();

    let result = compile_with_store(&store, &["step1.out"], &[], &CompileOptions::default());
    assert!(matches!(
        result,
        Err(CompileError::Store(StoreError::MissingTemplateGroup { .. }))
    ));
}

#[test]
fn test_missing_store_file() {
    let result = compile(
        "/nonexistent/results.json",
        &["mean.error"],
        &[],
        &CompileOptions::default(),
    );
    assert!(matches!(
        result,
        Err(CompileError::Store(StoreError::Io { .. }))
    ));
}

// ============================================================================
// Loading and Options
// ============================================================================

#[test]
fn test_compile_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(STORE.as_bytes()).unwrap();

    let compiled = compile(
        file.path(),
        &["rt", "median.error"],
        &["median.error > 0.1"],
        &CompileOptions::default(),
    )
    .unwrap();

    assert!(compiled.store().table_exists("MEDIAN"));
    assert_eq!(compiled.pipelines().len(), 1);
    insta::assert_snapshot!(&compiled.queries()[0], @"SELECT 'rt' AS rt, median.error AS median_error FROM median INNER JOIN rt ON median.parent = rt.ID WHERE ((median.error > 0.1))");
}

#[test]
fn test_custom_link_columns() {
    let options = CompileOptions::default()
        .with_link_columns("up", "pk")
        .with_file_column("PATH");

    let output = compile_with_store(&store(), &["rnorm", "mean.estimate"], &[], &options).unwrap();

    insta::assert_snapshot!(output.plans()[0].from_tokens().serialize(), @"FROM mean INNER JOIN rnorm ON mean.up = rnorm.pk");
    assert_eq!(output.plans()[0].select[1].alias(), "mean_PATH_estimate");
}

#[test]
fn test_custom_naming_reaches_enumeration() {
    let json = STORE
        .replace("pipeline_A.captain", "flow_A.tpl")
        .replace("\"pipeline_A\"", "\"flow_A\"");
    let store = Store::from_json_str(&json).unwrap();

    let naming = Naming {
        template_prefix: "flow_".to_string(),
        template_suffix: ".tpl".to_string(),
        ..Naming::default()
    };
    let options = CompileOptions::default().with_naming(naming);

    let output = compile_with_store(&store, &["rnorm", "mean"], &[], &options).unwrap();
    let chains: Vec<String> = output.pipelines().iter().map(Chain::to_string).collect();
    assert_eq!(chains, vec!["rnorm -> mean"]);
}

#[test]
fn test_dnf_is_public() {
    let dnf = to_dnf("rnorm.n > 1 AND (mean.error < 1 OR median.error < 1)").unwrap();
    assert_eq!(dnf.len(), 2);
    assert!(dnf.iter().all(|group| group[0] == "rnorm.n > 1"));
}
