// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSONL training-pair harvest.
//!
//! Qualifying interactions (completed corrections, substantive answers)
//! are appended to an Alpaca-format JSONL file, one record per line,
//! ready to feed a fine-tuning pipeline unchanged. Records with short
//! outputs are dropped, and an instruction already present in the file
//! is never recorded twice. The linear dedup scan is fine at the scale
//! this file reaches in practice (hundreds of lines, not millions).

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use valet_config::model::TrainingConfig;
use valet_core::{TrainingPair, TrainingSink, ValetError, now_rfc3339};

#[derive(Serialize)]
struct PairRecord<'a> {
    instruction: &'a str,
    /// Always empty: single-turn pairs in Alpaca format.
    input: &'a str,
    output: &'a str,
    source: String,
    timestamp: String,
}

/// Appends training pairs to an Alpaca-format JSONL file.
pub struct JsonlSink {
    path: PathBuf,
    min_output_chars: usize,
}

impl JsonlSink {
    pub fn new(config: &TrainingConfig) -> Self {
        Self {
            path: PathBuf::from(&config.pairs_path),
            min_output_chars: config.min_output_chars,
        }
    }

    /// Whether `instruction` is already recorded. Unreadable or corrupt
    /// lines are skipped rather than treated as matches.
    async fn already_recorded(&self, instruction: &str) -> bool {
        let Ok(existing) = tokio::fs::read_to_string(&self.path).await else {
            return false;
        };
        existing.lines().any(|line| {
            serde_json::from_str::<serde_json::Value>(line)
                .ok()
                .and_then(|v| {
                    v.get("instruction")
                        .and_then(|i| i.as_str())
                        .map(|i| i == instruction)
                })
                .unwrap_or(false)
        })
    }
}

#[async_trait]
impl TrainingSink for JsonlSink {
    async fn record(&self, pair: &TrainingPair) -> Result<(), ValetError> {
        let instruction = pair.instruction.trim();
        let output = pair.output.trim();

        if instruction.is_empty() || output.is_empty() {
            return Ok(());
        }
        if output.chars().count() < self.min_output_chars {
            debug!(source = %pair.source, "training pair output too short, skipping");
            return Ok(());
        }
        if self.already_recorded(instruction).await {
            debug!(source = %pair.source, "training instruction already recorded, skipping");
            return Ok(());
        }

        let record = PairRecord {
            instruction,
            input: "",
            output,
            source: pair.source.to_string(),
            timestamp: now_rfc3339(),
        };
        let line = serde_json::to_string(&record)
            .map_err(|e| ValetError::Internal(format!("training pair serialization: {e}")))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ValetError::storage)?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(ValetError::storage)?;
        file.write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(ValetError::storage)?;

        debug!(
            source = %pair.source,
            instruction = instruction.chars().take(60).collect::<String>().as_str(),
            "harvested training pair"
        );
        Ok(())
    }
}

/// A sink that drops every pair, used when harvesting is disabled.
pub struct NullSink;

#[async_trait]
impl TrainingSink for NullSink {
    async fn record(&self, _pair: &TrainingPair) -> Result<(), ValetError> {
        Ok(())
    }
}

/// The sink matching the training configuration.
pub fn sink_from_config(config: &TrainingConfig) -> Arc<dyn TrainingSink> {
    if config.enabled {
        Arc::new(JsonlSink::new(config))
    } else {
        Arc::new(NullSink)
    }
}
