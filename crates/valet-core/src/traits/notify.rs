// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Out-of-band notification trait.

use async_trait::async_trait;

/// Sink for unsolicited assistant messages (rule proposals, background
/// consolidation notices).
///
/// Notification is best-effort; implementations log failures instead of
/// propagating them into the command pipeline.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Delivers a message to the user outside the request/response flow.
    async fn notify(&self, message: &str);
}
