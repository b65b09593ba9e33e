// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Valet configuration system.

use valet_config::diagnostic::{suggest_key, ConfigError};
use valet_config::model::ValetConfig;
use valet_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_valet_config() {
    let toml = r#"
[agent]
name = "jeeves"
log_level = "debug"
context_turns = 6

[llm]
base_url = "http://127.0.0.1:9090"
max_tokens = 256
temperature = 0.4

[storage]
database_path = "/tmp/valet-test.db"
busy_timeout_ms = 1000

[memory]
buffer_capacity = 8
similarity_threshold = 0.5
max_recall_results = 3

[training]
enabled = false

[talents]
manifest_dir = "/etc/valet/talents"

[talents.overrides.weather]
priority = 80
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "jeeves");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.agent.context_turns, 6);
    assert_eq!(config.llm.base_url, "http://127.0.0.1:9090");
    assert_eq!(config.llm.max_tokens, 256);
    assert_eq!(config.llm.temperature, 0.4);
    assert_eq!(config.storage.database_path, "/tmp/valet-test.db");
    assert_eq!(config.storage.busy_timeout_ms, 1000);
    assert_eq!(config.memory.buffer_capacity, 8);
    assert_eq!(config.memory.similarity_threshold, 0.5);
    assert_eq!(config.memory.max_recall_results, 3);
    assert!(!config.training.enabled);
    assert_eq!(config.talents.manifest_dir.as_deref(), Some("/etc/valet/talents"));
    assert_eq!(config.talents.overrides["weather"].priority, Some(80));
}

/// Unknown field in a section produces an error mentioning the key.
#[test]
fn unknown_field_in_memory_produces_error() {
    let toml = r#"
[memory]
bufer_capacity = 5
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("bufer_capacity"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "valet");
    assert_eq!(config.agent.log_level, "info");
    assert_eq!(config.llm.base_url, "http://127.0.0.1:8080");
    assert_eq!(config.llm.max_tokens, 512);
    assert_eq!(config.memory.buffer_capacity, 20);
    assert!(config.memory.embedding_enabled);
    assert!(config.training.enabled);
    assert!(config.talents.manifest_dir.is_none());
    assert!(config.talents.overrides.is_empty());
}

/// A later layer overrides an earlier one, section by section.
#[test]
fn later_layer_overrides_toml_value() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let toml_content = r#"
[llm]
base_url = "http://from-toml:8080"
"#;

    // The env provider merges last; a dotted tuple stands in for it here.
    let config: ValetConfig = Figment::new()
        .merge(Serialized::defaults(ValetConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("llm.base_url", "http://from-env:8080"))
        .extract()
        .expect("should merge the override");

    assert_eq!(config.llm.base_url, "http://from-env:8080");
}

/// Dotted-key overrides reach keys that themselves contain underscores.
/// `VALET_MEMORY_BUFFER_CAPACITY` must map to `memory.buffer_capacity`,
/// not `memory.buffer.capacity`.
#[test]
fn dotted_override_reaches_underscored_key() {
    use figment::{providers::Serialized, Figment};

    let config: ValetConfig = Figment::new()
        .merge(Serialized::defaults(ValetConfig::default()))
        .merge(("memory.buffer_capacity", 3))
        .extract()
        .expect("should set buffer_capacity via dot notation");

    assert_eq!(config.memory.buffer_capacity, 3);
}

/// Missing config files are silently skipped (Figment's Toml::file() behavior).
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: ValetConfig = Figment::new()
        .merge(Serialized::defaults(ValetConfig::default()))
        .merge(Toml::file("/nonexistent/path/valet.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.agent.name, "valet");
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[logging]
level = "debug"
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("logging"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unknown key advice names both the likely fix and the valid keys.
#[test]
fn diagnostic_advice_names_fix_and_valid_keys() {
    let toml = r#"
[memory]
bufer_capacity = 5
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    assert!(!errors.is_empty(), "should have at least one error");

    let has_advice = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, advice, .. } if {
            key == "bufer_capacity"
                && advice.as_deref().is_some_and(|a| {
                    a.contains("did you mean `buffer_capacity`") && a.contains("valid keys")
                })
        })
    });
    assert!(
        has_advice,
        "should have UnknownKey advice suggesting `buffer_capacity`, got: {errors:?}"
    );
}

/// suggest_key finds close typos and ignores distant strings.
#[test]
fn diagnostic_suggestions_respect_similarity() {
    let valid_keys = &["base_url", "max_tokens", "temperature"];
    assert_eq!(
        suggest_key("base_uri", valid_keys),
        Some("base_url".to_string())
    );
    assert_eq!(suggest_key("qqqqqq", valid_keys), None);
}

/// Invalid type (string where number expected) produces a clear message.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[memory]
buffer_capacity = "lots"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("buffer_capacity"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// ConfigError implements miette::Diagnostic with code and help.
#[test]
fn config_error_implements_diagnostic() {
    use miette::Diagnostic;

    let error = ConfigError::UnknownKey {
        key: "bufer_capacity".to_string(),
        advice: Some("did you mean `buffer_capacity`? valid keys: buffer_capacity".to_string()),
        span: None,
        src: None,
    };

    assert!(error.code().is_some(), "should have diagnostic code");

    let help = error.help().expect("should have help text").to_string();
    assert!(
        help.contains("did you mean `buffer_capacity`"),
        "help should contain the suggestion, got: {help}"
    );
}

/// ConfigError can be rendered using miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::UnknownKey {
        key: "bufer_capacity".to_string(),
        advice: Some("did you mean `buffer_capacity`?".to_string()),
        span: None,
        src: None,
    };

    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(!buf.is_empty(), "rendered report should not be empty");
    assert!(buf.contains("bufer_capacity"), "report should mention the key");
}

/// load_and_validate_str with valid TOML returns an Ok config.
#[test]
fn load_and_validate_valid_toml() {
    let toml = r#"
[agent]
name = "jarvis"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should validate");
    assert_eq!(config.agent.name, "jarvis");
}

/// Validation rejects an out-of-range sampling temperature.
#[test]
fn validation_catches_bad_temperature() {
    let toml = r#"
[llm]
temperature = 4.5
"#;

    let errors = load_and_validate_str(toml).expect_err("out-of-range temperature should fail");
    let has_validation_error = errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("temperature"))
    });
    assert!(
        has_validation_error,
        "should have validation error for temperature"
    );
}
