//! Integration tests for `heapscope config` loading.
//!
//! Exercise `HeapscopeConfig` with real TOML files and environment overrides.

use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use heapscope_core::config::HeapscopeConfig;
use heapscope_core::error::{ConfigError, HeapscopeError};

fn write_config(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("should write config");
    path
}

#[tokio::test]
#[serial]
async fn test_config_validate_valid_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = write_config(
        &temp_dir,
        "heapscope.toml",
        r#"
[general]
log_level = "info"
log_format = "json"

[preprocess]
jvm_start = "2010-02-26 09:32:11,486"

[parser]
max_unidentified_lines = 50

[analysis]
throughput_threshold = 85
first_timestamp_threshold_secs = 120
jvm_options = "-Xms2g -Xmx2g -Xss512k"
"#,
    );

    let config = HeapscopeConfig::load(&path)
        .await
        .expect("valid config should load");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.parser.max_unidentified_lines, 50);
    assert_eq!(config.analysis.throughput_threshold, 85);
    assert_eq!(config.analysis.first_timestamp_threshold_secs, 120);
    assert!(
        config
            .preprocess
            .jvm_start_datetime()
            .expect("valid jvm start")
            .is_some()
    );
}

#[tokio::test]
#[serial]
async fn test_config_validate_malformed_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = write_config(&temp_dir, "bad.toml", "[general\nlog_level = \"info\"\n");

    let result = HeapscopeConfig::load(&path).await;
    assert!(matches!(
        result,
        Err(HeapscopeError::Config(ConfigError::ParseFailed { .. }))
    ));
}

#[tokio::test]
#[serial]
async fn test_config_validate_missing_file() {
    let result = HeapscopeConfig::load("/nonexistent/heapscope.toml").await;
    assert!(matches!(
        result,
        Err(HeapscopeError::Config(ConfigError::FileNotFound { .. }))
    ));
}

#[tokio::test]
#[serial]
async fn test_config_validate_empty_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = write_config(&temp_dir, "empty.toml", "");

    let config = HeapscopeConfig::load(&path)
        .await
        .expect("empty file should load defaults");
    assert_eq!(config.analysis.throughput_threshold, 90);
    assert_eq!(config.analysis.first_timestamp_threshold_secs, 60);
    assert!(config.preprocess.jvm_start.is_none());
}

#[tokio::test]
#[serial]
async fn test_config_rejects_invalid_values() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let cases = [
        ("[analysis]\nthroughput_threshold = 101\n", "analysis.throughput_threshold"),
        ("[parser]\nmax_unidentified_lines = 0\n", "parser.max_unidentified_lines"),
        ("[general]\nlog_format = \"xml\"\n", "general.log_format"),
        ("[preprocess]\njvm_start = \"2010/02/26\"\n", "preprocess.jvm_start"),
    ];

    for (index, (content, field)) in cases.iter().enumerate() {
        let path = write_config(&temp_dir, &format!("bad-{index}.toml"), content);
        let err = HeapscopeConfig::load(&path)
            .await
            .expect_err("invalid value should be rejected");
        assert!(
            err.to_string().contains(field),
            "error for {field} should name the field, got: {err}"
        );
    }
}

#[tokio::test]
#[serial]
async fn test_config_boundary_threshold_values() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    for threshold in [0, 100] {
        let path = write_config(
            &temp_dir,
            "boundary.toml",
            &format!("[analysis]\nthroughput_threshold = {threshold}\n"),
        );
        let config = HeapscopeConfig::load(&path)
            .await
            .expect("boundary threshold should be valid");
        assert_eq!(config.analysis.throughput_threshold, threshold);
    }
}

#[tokio::test]
#[serial]
async fn test_config_env_override_wins_over_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = write_config(
        &temp_dir,
        "heapscope.toml",
        "[analysis]\nthroughput_threshold = 70\n",
    );

    // SAFETY: serial 테스트에서만 환경변수를 변경
    unsafe {
        std::env::set_var("HEAPSCOPE_ANALYSIS_THROUGHPUT_THRESHOLD", "55");
    }
    let result = HeapscopeConfig::load(&path).await;
    unsafe {
        std::env::remove_var("HEAPSCOPE_ANALYSIS_THROUGHPUT_THRESHOLD");
    }

    let config = result.expect("config should load");
    assert_eq!(config.analysis.throughput_threshold, 55);
}

#[tokio::test]
#[serial]
async fn test_config_unicode_jvm_options() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = write_config(
        &temp_dir,
        "unicode.toml",
        "[analysis]\njvm_options = \"-Xms1g -Xmx1g -Dapp.name=힙스코프\"\n",
    );

    let config = HeapscopeConfig::load(&path)
        .await
        .expect("unicode values should load");
    assert_eq!(
        config.analysis.jvm_options.as_deref(),
        Some("-Xms1g -Xmx1g -Dapp.name=힙스코프")
    );
}

#[tokio::test]
#[serial]
async fn test_config_show_roundtrips_through_toml() {
    let config = HeapscopeConfig::parse("[analysis]\nthroughput_threshold = 80\n")
        .expect("should parse");
    let rendered = toml::to_string_pretty(&config).expect("should serialize");
    let reparsed = HeapscopeConfig::parse(&rendered).expect("rendered config should parse");
    assert_eq!(reparsed.analysis.throughput_threshold, 80);
    assert_eq!(reparsed.general.log_level, config.general.log_level);
}
