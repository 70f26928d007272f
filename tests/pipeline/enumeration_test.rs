// tests/pipeline/enumeration_test.rs
use captain::pipeline::{enumerate, Chain};
use captain::store::{Naming, Store, StoreError};

fn steps(chains: &[Chain]) -> Vec<String> {
    chains.iter().map(Chain::to_string).collect()
}

#[test]
fn test_every_template_and_pipeline_is_expanded() {
    let store = Store::from_json_str(
        r#"{
            "pipeline_A.captain": {"kind": "template", "pipelines": [
                ["sim", "est"],
                ["sim", "est", "score"]
            ]},
            "pipeline_A": {"kind": "step", "columns": {
                "sim_name":   {"type": "text", "values": ["rnorm", "rt", "rnorm"]},
                "est_name":   {"type": "text", "values": ["mean", "mean", "median"]},
                "score_name": {"type": "text", "values": ["mse", "-", "mse"]}
            }},
            "pipeline_B.captain": {"kind": "template", "pipelines": [["load"]]},
            "pipeline_B": {"kind": "step", "columns": {
                "load_name": {"type": "text", "values": ["csv"]}
            }}
        }"#,
    )
    .unwrap();

    let chains = enumerate(&store, &Naming::default()).unwrap();
    assert_eq!(
        steps(&chains),
        vec![
            "rnorm -> mean",
            "rnorm -> median",
            "rt -> mean",
            "rt -> median",
            "rnorm -> mean -> mse",
            "rnorm -> median -> mse",
            "rt -> mean -> mse",
            "rt -> median -> mse",
            "csv",
        ]
    );
}

#[test]
fn test_role_with_only_sentinel_yields_no_chains() {
    let store = Store::from_json_str(
        r#"{
            "pipeline_A.captain": {"kind": "template", "pipelines": [["sim", "est"]]},
            "pipeline_A": {"kind": "step", "columns": {
                "sim_name": {"type": "text", "values": ["rnorm"]},
                "est_name": {"type": "text", "values": ["-"]}
            }}
        }"#,
    )
    .unwrap();

    assert!(enumerate(&store, &Naming::default()).unwrap().is_empty());
}

#[test]
fn test_empty_pipeline_yields_no_chains() {
    let store = Store::from_json_str(
        r#"{
            "pipeline_A.captain": {"kind": "template", "pipelines": [[]]},
            "pipeline_A": {"kind": "step", "columns": {}}
        }"#,
    )
    .unwrap();

    assert!(enumerate(&store, &Naming::default()).unwrap().is_empty());
}

#[test]
fn test_store_without_templates() {
    let store = Store::from_json_str(
        r#"{"rnorm": {"kind": "step", "columns": {"ID": {"type": "int", "values": [1]}}}}"#,
    )
    .unwrap();

    assert!(enumerate(&store, &Naming::default()).unwrap().is_empty());
}

#[test]
fn test_custom_naming() {
    let store = Store::from_json_str(
        r#"{
            "flow_X.tpl": {"kind": "template", "pipelines": [["sim"]]},
            "flow_X": {"kind": "step", "columns": {
                "sim_name": {"type": "text", "values": ["rnorm", "none", "rt"]}
            }},
            "pipeline_A.captain": {"kind": "template", "pipelines": [["ignored"]]}
        }"#,
    )
    .unwrap();

    let naming = Naming {
        template_prefix: "flow_".to_string(),
        template_suffix: ".tpl".to_string(),
        no_step_sentinel: "none".to_string(),
        ..Naming::default()
    };
    let chains = enumerate(&store, &naming).unwrap();
    assert_eq!(steps(&chains), vec!["rnorm", "rt"]);
}

#[test]
fn test_missing_companion_table_is_an_error() {
    let store = Store::from_json_str(
        r#"{"pipeline_Z.captain": {"kind": "template", "pipelines": [["sim"]]}}"#,
    )
    .unwrap();

    let err = enumerate(&store, &Naming::default()).unwrap_err();
    match err {
        StoreError::MissingTemplateGroup { template, group } => {
            assert_eq!(template, "pipeline_Z.captain");
            assert_eq!(group, "pipeline_Z");
        }
        other => panic!("expected MissingTemplateGroup, got {:?}", other),
    }
}
