// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Valet assistant.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and Elm-style diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use valet_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Assistant name: {}", config.agent.name);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ValetConfig;

/// Loads configuration from the XDG hierarchy and validates it.
///
/// Figment failures become rich diagnostics pointing into whichever TOML
/// file defined the bad key; a config that deserializes cleanly still has
/// to pass the semantic checks in [`validation`].
pub fn load_and_validate() -> Result<ValetConfig, Vec<ConfigError>> {
    let config = loader::load_config().map_err(|err| {
        let sources = loaded_toml_sources();
        diagnostic::figment_to_config_errors(err, &sources)
    })?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Loads and validates configuration from a TOML string.
///
/// Used by tests and surfaces that receive config inline.
pub fn load_and_validate_str(toml_content: &str) -> Result<ValetConfig, Vec<ConfigError>> {
    let config = loader::load_config_from_str(toml_content).map_err(|err| {
        let sources = vec![("<inline>".to_string(), toml_content.to_string())];
        diagnostic::figment_to_config_errors(err, &sources)
    })?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Reads every TOML file the loader may have merged, lowest precedence
/// first, so diagnostics can quote the file that defined a bad key.
///
/// The paths mirror [`loader::load_config`] exactly; a file that does not
/// exist is simply skipped.
fn loaded_toml_sources() -> Vec<(String, String)> {
    let mut candidates = vec![std::path::PathBuf::from("/etc/valet/valet.toml")];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("valet/valet.toml"));
    }
    candidates.push(std::path::PathBuf::from("valet.toml"));

    candidates
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            Some((path.display().to_string(), content))
        })
        .collect()
}
