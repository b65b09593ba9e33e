// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading via Figment.
//!
//! Later layers win: compiled defaults, then `/etc/valet/valet.toml`,
//! then the XDG user config, then `./valet.toml`, then `VALET_*`
//! environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ValetConfig;

/// Loads configuration from the standard XDG hierarchy with env overrides.
pub fn load_config() -> Result<ValetConfig, figment::Error> {
    defaults()
        .merge(Toml::file("/etc/valet/valet.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("valet/valet.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("valet.toml"))
        .merge(env_provider())
        .extract()
}

/// Loads configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ValetConfig, figment::Error> {
    defaults().merge(Toml::string(toml_content)).extract()
}

/// Loads configuration from one explicit file, still honoring env overrides.
pub fn load_config_from_path(path: &Path) -> Result<ValetConfig, figment::Error> {
    defaults()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The bottom layer every loader starts from: `ValetConfig::default()`
/// serialized back through figment, so a missing file or key never errors.
fn defaults() -> Figment {
    Figment::new().merge(Serialized::defaults(ValetConfig::default()))
}

/// `VALET_*` environment variables, mapped onto config paths.
///
/// The mapping is an explicit per-section `replacen`, not `Env::split("_")`:
/// key names themselves contain underscores, and `VALET_LLM_BASE_URL` has
/// to become `llm.base_url`, never `llm.base.url`.
fn env_provider() -> Env {
    Env::prefixed("VALET_").map(|key| {
        // `key` arrives lowercased with the prefix stripped,
        // e.g. VALET_MEMORY_BUFFER_CAPACITY -> "memory_buffer_capacity".
        let mapped = key
            .as_str()
            .replacen("agent_", "agent.", 1)
            .replacen("llm_", "llm.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("memory_", "memory.", 1)
            .replacen("training_", "training.", 1)
            .replacen("talents_", "talents.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_loader_merges_over_defaults() {
        let config = load_config_from_str(
            r#"
[llm]
base_url = "http://127.0.0.1:9090"
"#,
        )
        .unwrap();
        assert_eq!(config.llm.base_url, "http://127.0.0.1:9090");
        // Untouched sections keep defaults.
        assert_eq!(config.agent.name, "valet");
    }

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.memory.buffer_capacity, 20);
        assert_eq!(config.storage.busy_timeout_ms, 5000);
    }
}
