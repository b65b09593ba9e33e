// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capturing sinks for the notification and training-harvest traits.

use std::sync::Mutex;

use async_trait::async_trait;

use valet_core::{Notifier, TrainingPair, TrainingSink, ValetError};

/// A notifier that captures every message instead of delivering it.
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Every message notified so far, in call order.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// A training sink that captures every pair instead of writing JSONL.
pub struct RecordingSink {
    pairs: Mutex<Vec<TrainingPair>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            pairs: Mutex::new(Vec::new()),
        }
    }

    /// Every pair recorded so far, in call order.
    pub fn pairs(&self) -> Vec<TrainingPair> {
        self.pairs.lock().unwrap().clone()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrainingSink for RecordingSink {
    async fn record(&self, pair: &TrainingPair) -> Result<(), ValetError> {
        self.pairs.lock().unwrap().push(pair.clone());
        Ok(())
    }
}
