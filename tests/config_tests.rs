use std::fs;
use std::path::PathBuf;

use docbatch::app::config::{Config, LlmProvider};
use docbatch::domain::TaskCategory;
use docbatch::error::{ConfigError, Error};
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("docbatch.toml");
    fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn loads_full_config_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_config(
        &dir,
        r#"
[llm]
provider = "openai"
openai = { model = "gpt-4o", base_url = "http://localhost:8080/v1" }

[engine]
timeout_secs = 20
max_retries = 2

[rate_limit]
per_minute = 30
per_day = 500

[defaults]
task = "categorize"
temperature = 0.0
max_tokens = 256
concurrency = 3
"#,
    );

    let config = Config::load(&path).expect("valid config");

    assert_eq!(config.llm.provider, LlmProvider::OpenAi);
    assert_eq!(config.llm.model(), "gpt-4o");
    assert_eq!(config.llm.openai.base_url, "http://localhost:8080/v1");
    assert_eq!(config.engine.timeout_secs, 20);
    assert_eq!(config.engine.max_retries, 2);
    assert_eq!(config.engine.backoff_base_ms, 1_000);
    assert!(config.rate_limit.enabled);
    assert_eq!(config.rate_limit.per_minute, 30);
    assert_eq!(config.rate_limit.per_day, 500);
    assert_eq!(config.defaults.task, TaskCategory::Categorize);
    assert_eq!(config.defaults.max_tokens, 256);
    assert_eq!(config.defaults.concurrency, 3);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_config(&dir, "[engine\ntimeout_secs = 5");
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
}

#[test]
fn day_ceiling_below_minute_ceiling_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_config(&dir, "[rate_limit]\nper_minute = 100\nper_day = 50\n");
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidValue {
            field: "rate_limit.per_day",
            ..
        })
    ));
}

#[test]
fn disabled_limiter_skips_ceiling_checks() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_config(
        &dir,
        "[rate_limit]\nenabled = false\nper_minute = 0\nper_day = 0\n",
    );
    let config = Config::load(&path).expect("valid config");
    assert!(!config.rate_limit.enabled);
}

#[test]
fn invalid_base_url_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_config(&dir, "[llm.openai]\nbase_url = \"not a url\"\n");
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidValue {
            field: "llm.openai.base_url",
            ..
        })
    ));
}

#[test]
fn unknown_task_in_defaults_is_rejected() {
    let err = Config::parse("[defaults]\ntask = \"translate\"\n").unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
}
