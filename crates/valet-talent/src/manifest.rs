// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Talent manifest parsing from TOML.
//!
//! A talent manifest describes a declarative talent: routing metadata plus a
//! prompt template rendered through the LLM at execution time. Manifests are
//! parsed at startup from the configured manifest directory; a manifest that
//! fails validation is rejected with a message naming the problem.

use std::path::Path;

use serde::Deserialize;
use valet_core::{DEFAULT_TALENT_PRIORITY, ValetError};

/// Placeholder in a prompt template replaced with the user's command text.
pub const COMMAND_PLACEHOLDER: &str = "{command}";

/// A parsed and validated talent manifest.
#[derive(Debug, Clone)]
pub struct TalentManifest {
    pub name: String,
    pub description: String,
    pub priority: i32,
    pub keywords: Vec<String>,
    pub exclusions: Vec<String>,
    pub enabled: bool,
    /// Prompt template containing [`COMMAND_PLACEHOLDER`].
    pub template: String,
    pub system: Option<String>,
    /// Per-talent generation budget; `None` uses the global `llm.max_tokens`.
    pub max_tokens: Option<u32>,
}

// --- TOML intermediate structs ---

/// Top-level structure of a talent manifest file.
#[derive(Debug, Deserialize)]
struct ManifestFile {
    talent: TalentSection,
    prompt: PromptSection,
}

/// The [talent] section of the manifest.
#[derive(Debug, Deserialize)]
struct TalentSection {
    name: String,
    description: String,
    #[serde(default = "default_priority")]
    priority: i32,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    exclusions: Vec<String>,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

/// The [prompt] section of the manifest.
#[derive(Debug, Deserialize)]
struct PromptSection {
    template: String,
    #[serde(default)]
    system: Option<String>,
    #[serde(default)]
    max_tokens: Option<u32>,
}

fn default_priority() -> i32 {
    DEFAULT_TALENT_PRIORITY
}

fn default_enabled() -> bool {
    true
}

// --- Public API ---

/// Parses a talent manifest from a TOML string.
///
/// Validates that the name is non-empty and uses only alphanumeric
/// characters, hyphens, and underscores; that at least one non-blank
/// keyword is declared (a manifest talent without keywords could never be
/// routed to); and that the prompt template contains the command
/// placeholder.
pub fn parse_manifest(toml_content: &str) -> Result<TalentManifest, ValetError> {
    let manifest_file: ManifestFile = toml::from_str(toml_content)
        .map_err(|e| ValetError::Config(format!("failed to parse talent manifest: {e}")))?;

    let name = &manifest_file.talent.name;
    if name.is_empty() {
        return Err(ValetError::Config(
            "talent name must not be empty".to_string(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValetError::Config(format!(
            "talent name '{name}' contains invalid characters (only alphanumeric, hyphens, underscores allowed)"
        )));
    }

    let keywords: Vec<String> = manifest_file
        .talent
        .keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .collect();
    if keywords.is_empty() || keywords.iter().any(|k| k.is_empty()) {
        return Err(ValetError::Config(format!(
            "talent '{name}' must declare at least one non-empty keyword"
        )));
    }

    if !manifest_file.prompt.template.contains(COMMAND_PLACEHOLDER) {
        return Err(ValetError::Config(format!(
            "prompt template for talent '{name}' must contain the {COMMAND_PLACEHOLDER} placeholder"
        )));
    }

    Ok(TalentManifest {
        name: manifest_file.talent.name,
        description: manifest_file.talent.description,
        priority: manifest_file.talent.priority,
        keywords,
        exclusions: manifest_file.talent.exclusions,
        enabled: manifest_file.talent.enabled,
        template: manifest_file.prompt.template,
        system: manifest_file.prompt.system,
        max_tokens: manifest_file.prompt.max_tokens,
    })
}

/// Loads and parses a talent manifest from a file path.
pub fn load_manifest(path: &Path) -> Result<TalentManifest, ValetError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ValetError::Config(format!(
            "failed to read manifest file '{}': {e}",
            path.display()
        ))
    })?;
    parse_manifest(&content)
}
