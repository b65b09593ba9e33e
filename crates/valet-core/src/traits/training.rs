// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Training data harvest trait.

use async_trait::async_trait;

use crate::error::ValetError;
use crate::types::TrainingPair;

/// Sink for instruction/output pairs harvested from live usage.
#[async_trait]
pub trait TrainingSink: Send + Sync + 'static {
    /// Records one training pair. Implementations deduplicate by
    /// instruction text and may silently drop pairs below quality
    /// thresholds.
    async fn record(&self, pair: &TrainingPair) -> Result<(), ValetError>;
}
