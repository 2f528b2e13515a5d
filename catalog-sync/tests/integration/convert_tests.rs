use crate::common::{
    TestEnv, assert_contains, assert_exit_code, fixture_path, init_test_logging, parse_stdout_json,
};
use serde_json::json;

const URL_CONFIG: &str = r#"
[urls]
terra_ui = "https://terra.test"
datarepo = "https://tdr.test/"
"#;

#[test]
fn test_workspace_dry_run_prints_entry() {
    init_test_logging();
    crate::test_log!("TEST START: test_workspace_dry_run_prints_entry");

    let workspace = fixture_path("workspace.json");
    let output = TestEnv::with_config(URL_CONFIG).run(&[
        "workspace",
        "--workspace-file",
        workspace.to_str().unwrap(),
        "--dry-run",
    ]);
    assert_exit_code(&output, 0);

    let entry = parse_stdout_json(&output);
    assert_eq!(entry["dct:identifier"], "8e1a7c2d-ws");
    assert_eq!(entry["dct:title"], "Heart Atlas");
    assert_eq!(entry["dct:description"], "Cardiac tissue atlas");
    assert_eq!(
        entry["dcat:accessURL"],
        "https://terra.test/#workspaces/broad-catalog/heart_atlas"
    );
    assert_eq!(
        entry["prov:wasGeneratedBy"][0]["TerraCore:hasDataModality"],
        json!([
            "TerraCoreValueSets:Genomic_WholeGenome",
            "TerraCoreValueSets:Transcriptomic"
        ])
    );
    assert_eq!(entry["counts"]["donors"], 42);
    assert_eq!(entry["storage"][0]["bucket"], "fc-8e1a7c2d");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_contains(&stderr, "no catalog mapping");
    assert_contains(&stderr, "Spatial");

    crate::test_log!("TEST PASS: test_workspace_dry_run_prints_entry");
}

#[test]
fn test_workspace_overrides_apply() {
    init_test_logging();

    let env = TestEnv::with_config(URL_CONFIG);
    let overrides = env.dir.path().join("overrides.json");
    std::fs::write(
        &overrides,
        r#"{"dct:title": "Heart Atlas v2", "dct:creator": null, "custom:flag": true}"#,
    )
    .unwrap();

    let workspace = fixture_path("workspace.json");
    let output = env.run(&[
        "workspace",
        "--workspace-file",
        workspace.to_str().unwrap(),
        "--overrides",
        overrides.to_str().unwrap(),
        "--dry-run",
        "--format",
        "json",
    ]);
    assert_exit_code(&output, 0);

    let entry = parse_stdout_json(&output);
    assert_eq!(entry["dct:title"], "Heart Atlas v2");
    assert!(entry.get("dct:creator").is_none());
    assert_eq!(entry["custom:flag"], true);
}

#[test]
fn test_workspace_overrides_must_be_object() {
    init_test_logging();

    let env = TestEnv::new();
    let overrides = env.dir.path().join("overrides.json");
    std::fs::write(&overrides, "[1, 2]").unwrap();

    let workspace = fixture_path("workspace.json");
    let output = env.run(&[
        "workspace",
        "--workspace-file",
        workspace.to_str().unwrap(),
        "--overrides",
        overrides.to_str().unwrap(),
        "--dry-run",
    ]);
    assert_exit_code(&output, 1);
    assert_contains(&String::from_utf8_lossy(&output.stderr), "overrides");
}

#[test]
fn test_workspace_without_coordinates_fails_before_auth() {
    init_test_logging();
    crate::test_log!("TEST START: test_workspace_without_coordinates_fails_before_auth");

    let output = TestEnv::new().run(&["workspace", "--dry-run"]);
    assert_exit_code(&output, 1);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_contains(&stderr, "[SYNC-E003]");
    assert_contains(&stderr, "WORKSPACE_NAMESPACE");

    crate::test_log!("TEST PASS: test_workspace_without_coordinates_fails_before_auth");
}

#[test]
fn test_snapshot_dry_run_prints_entry() {
    init_test_logging();
    crate::test_log!("TEST START: test_snapshot_dry_run_prints_entry");

    let snapshot = fixture_path("snapshot.json");
    let output = TestEnv::with_config(URL_CONFIG).run(&[
        "snapshot",
        "--snapshot-file",
        snapshot.to_str().unwrap(),
        "--dry-run",
    ]);
    assert_exit_code(&output, 0);

    let entry = parse_stdout_json(&output);
    assert_eq!(entry["dct:identifier"], "0b7d5f2e-snap");
    assert_eq!(entry["dct:title"], "heart_atlas_release_1");
    assert_eq!(
        entry["dcat:accessURL"],
        "https://tdr.test/snapshots/details/0b7d5f2e-snap"
    );
    assert_eq!(entry["TerraDCAT_ap:hasConsentGroup"], "GRU");
    assert_eq!(
        entry["TerraDCAT_ap:hasDataCollection"],
        json!([{"dct:identifier": "d-42", "dct:title": "heart_atlas_dataset"}])
    );
    assert_eq!(
        entry["storage"],
        json!([{"cloudPlatform": "gcp", "cloudResource": "bigquery"}])
    );
    assert_eq!(entry["counts"]["tables"], 3);

    crate::test_log!("TEST PASS: test_snapshot_dry_run_prints_entry");
}

#[test]
fn test_snapshot_file_must_exist() {
    init_test_logging();

    let env = TestEnv::new();
    let missing = env.dir.path().join("missing-snapshot.json");
    let output = env.run(&[
        "snapshot",
        "--snapshot-file",
        missing.to_str().unwrap(),
        "--dry-run",
    ]);
    assert_exit_code(&output, 1);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_contains(&stderr, "missing-snapshot.json");
    assert_contains(&stderr, "[SYNC-E");
}
