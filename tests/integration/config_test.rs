//! Configuration loading integration tests.

use sqldesk::config::Config;
use std::io::Write;

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[endpoints.default]
url = "http://localhost:8080"

[endpoints.prod]
url = "https://sql.example.com"
timeout_secs = 120
"#
    )
    .unwrap();

    let config = Config::load_from_file(file.path()).unwrap();

    assert_eq!(
        config.get_endpoint(None).unwrap().url,
        "http://localhost:8080"
    );
    let prod = config.get_endpoint(Some("prod")).unwrap();
    assert_eq!(prod.url, "https://sql.example.com");
    assert_eq!(prod.timeout_secs, 120);
}

#[test]
fn test_load_config_invalid_toml_reports_location() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "endpoints = \"not a table\"").unwrap();

    let err = Config::load_from_file(file.path()).unwrap_err();
    assert_eq!(err.category(), "Configuration Error");
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn test_missing_config_file_is_empty_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from_file(&dir.path().join("missing.toml")).unwrap();
    assert!(config.endpoints.is_empty());
}
