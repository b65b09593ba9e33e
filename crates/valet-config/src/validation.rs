// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URL shape, value ranges, and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::ValetConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ValetConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate log level is a known tracing level
    let level = config.agent.log_level.trim().to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{}` is not one of: {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    // Validate LLM base URL shape
    let base_url = config.llm.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "llm.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("llm.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.llm.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "llm.max_tokens must be at least 1".to_string(),
        });
    }

    if config.llm.extraction_max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "llm.extraction_max_tokens must be at least 1".to_string(),
        });
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                config.llm.temperature
            ),
        });
    }

    if !(0.0..=1.0).contains(&config.llm.top_p) {
        errors.push(ConfigError::Validation {
            message: format!(
                "llm.top_p must be between 0.0 and 1.0, got {}",
                config.llm.top_p
            ),
        });
    }

    // Validate database_path is not empty
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate memory parameters
    if config.memory.buffer_capacity < 1 {
        errors.push(ConfigError::Validation {
            message: "memory.buffer_capacity must be at least 1".to_string(),
        });
    }

    if !(0.0..=1.0).contains(&config.memory.similarity_threshold) {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.similarity_threshold must be between 0.0 and 1.0, got {}",
                config.memory.similarity_threshold
            ),
        });
    }

    if config.memory.recency_half_life_days <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.recency_half_life_days must be positive, got {}",
                config.memory.recency_half_life_days
            ),
        });
    }

    if config.memory.max_recall_results == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.max_recall_results must be at least 1".to_string(),
        });
    }

    // Validate training path when harvesting is enabled
    if config.training.enabled && config.training.pairs_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "training.pairs_path must not be empty when training.enabled is true"
                .to_string(),
        });
    }

    // Validate talent override keys
    for name in config.talents.overrides.keys() {
        if name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "talents.overrides contains an empty talent name".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
