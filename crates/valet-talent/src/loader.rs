// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup scan of the declarative talent manifest directory.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};
use valet_core::ValetError;

use crate::manifest::load_manifest;
use crate::prompt::PromptTalent;

/// Loads every `*.toml` manifest in `dir` as a [`PromptTalent`].
///
/// Files are visited in filename order so registration order (and with it
/// priority tie-breaking) is stable across runs. A manifest that fails to
/// parse or validate aborts the whole load, as does a talent name declared
/// by two files.
pub fn load_manifest_dir(dir: &Path) -> Result<Vec<PromptTalent>, ValetError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        ValetError::Config(format!(
            "failed to read talent manifest directory '{}': {e}",
            dir.display()
        ))
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    let mut seen = HashSet::new();
    let mut talents = Vec::with_capacity(paths.len());
    for path in &paths {
        let manifest = load_manifest(path)?;
        if !seen.insert(manifest.name.clone()) {
            return Err(ValetError::Config(format!(
                "duplicate talent name '{}' in manifest '{}'",
                manifest.name,
                path.display()
            )));
        }
        debug!(talent = %manifest.name, path = %path.display(), "loaded talent manifest");
        talents.push(PromptTalent::new(manifest));
    }

    info!(count = talents.len(), dir = %dir.display(), "talent manifests loaded");
    Ok(talents)
}
