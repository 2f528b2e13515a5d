use crate::common::{
    TestEnv, assert_contains, assert_exit_code, fixture_path, init_test_logging, parse_stdout_json,
};
use serde_json::Value;

fn config_row<'a>(shown: &'a Value, key: &str) -> &'a Value {
    shown["values"]
        .as_array()
        .expect("values array")
        .iter()
        .find(|row| row["key"] == key)
        .unwrap_or_else(|| panic!("no row for {key} in {shown}"))
}

#[test]
fn test_help_includes_description() {
    init_test_logging();
    crate::test_log!("TEST START: test_help_includes_description");

    let output = TestEnv::new().run(&["--help"]);
    assert_exit_code(&output, 0);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_contains(&stdout, "data catalog");
    assert_contains(&stdout, "ingest-collection");

    crate::test_log!("TEST PASS: test_help_includes_description");
}

#[test]
fn test_config_show_reports_sources() {
    init_test_logging();
    crate::test_log!("TEST START: test_config_show_reports_sources");

    let env = TestEnv::with_config(
        r#"
timeout_secs = 45

[urls]
catalog = "http://localhost:8080/"
"#,
    )
    .env("USER_EMAIL", "steward@example.org")
    .env("AUTH_TOKEN", "secret-token-value");
    let output = env.run(&["config", "show", "--environment", "staging", "--format", "json"]);
    assert_exit_code(&output, 0);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("secret-token-value"), "token leaked: {stdout}");

    let shown = parse_stdout_json(&output);
    assert_eq!(
        shown["configFile"],
        Value::from(env.config_path.display().to_string())
    );

    let environment = config_row(&shown, "environment");
    assert_eq!(environment["value"], "staging");
    assert_eq!(environment["source"], "command_line");

    let catalog = config_row(&shown, "catalog_url");
    assert_eq!(catalog["value"], "http://localhost:8080");
    assert_eq!(catalog["source"], "config_file");

    let timeout = config_row(&shown, "timeout_secs");
    assert_eq!(timeout["value"], "45");
    assert_eq!(timeout["source"], "config_file");

    let steward = config_row(&shown, "steward_email");
    assert_eq!(steward["source"], "environment");
    assert_eq!(steward["env_var"], "USER_EMAIL");

    assert_eq!(config_row(&shown, "auth_token")["value"], "***");
    assert_eq!(config_row(&shown, "gcloud_user")["value"], "(unset)");

    crate::test_log!("TEST PASS: test_config_show_reports_sources");
}

#[test]
fn test_config_show_pretty() {
    init_test_logging();

    let output = TestEnv::new()
        .env("CATALOG_SYNC_TIMEOUT_SECS", "90")
        .run(&["config", "show"]);
    assert_exit_code(&output, 0);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_contains(&stdout, "Config file:");
    assert_contains(&stdout, "(environment: CATALOG_SYNC_TIMEOUT_SECS)");
}

#[test]
fn test_invalid_environment_variable_fails() {
    init_test_logging();
    crate::test_log!("TEST START: test_invalid_environment_variable_fails");

    let output = TestEnv::new()
        .env("CATALOG_SYNC_TIMEOUT_SECS", "0")
        .run(&["config", "show"]);
    assert_exit_code(&output, 1);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_contains(&stderr, "[SYNC-E002]");
    assert_contains(&stderr, "CATALOG_SYNC_TIMEOUT_SECS");

    crate::test_log!("TEST PASS: test_invalid_environment_variable_fails");
}

#[test]
fn test_missing_explicit_config_file_fails() {
    init_test_logging();

    let env = TestEnv::new();
    let missing = env.dir.path().join("nope.toml");
    let output = env.run(&["--config", missing.to_str().unwrap(), "config", "show"]);
    assert_exit_code(&output, 1);
    assert_contains(&String::from_utf8_lossy(&output.stderr), "nope.toml");
}

#[test]
fn test_malformed_config_file_fails() {
    init_test_logging();

    let output = TestEnv::with_config("colour = \"blue\"\n").run(&["config", "show"]);
    assert_exit_code(&output, 1);
    assert_contains(&String::from_utf8_lossy(&output.stderr), "[SYNC-E");
}

#[test]
fn test_validate_metadata_file() {
    init_test_logging();
    crate::test_log!("TEST START: test_validate_metadata_file");

    let env = TestEnv::new();
    let good = fixture_path("entry.json");
    let output = env.run(&["validate", "--metadata-file", good.to_str().unwrap()]);
    assert_exit_code(&output, 0);
    assert_contains(&String::from_utf8_lossy(&output.stdout), "ok");

    let bad = fixture_path("invalid_entry.json");
    let output = env.run(&["validate", "--metadata-file", bad.to_str().unwrap()]);
    assert_exit_code(&output, 1);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_contains(&stdout, "/dct:title: is required");
    assert_contains(&stdout, "/dct:issued");
    assert_contains(&stdout, "/counts/donors");
    assert_contains(&String::from_utf8_lossy(&output.stderr), "[SYNC-E300]");

    crate::test_log!("TEST PASS: test_validate_metadata_file");
}

#[test]
fn test_validate_json_lists_issues() {
    init_test_logging();

    let bad = fixture_path("invalid_entry.json");
    let output = TestEnv::new().run(&[
        "validate",
        "--metadata-file",
        bad.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert_exit_code(&output, 1);
    let issues = parse_stdout_json(&output);
    let paths: Vec<&str> = issues
        .as_array()
        .expect("issue array")
        .iter()
        .filter_map(|issue| issue["path"].as_str())
        .collect();
    assert!(paths.contains(&"/dct:title"), "{paths:?}");
    assert!(paths.contains(&"/dct:description"), "{paths:?}");
}
