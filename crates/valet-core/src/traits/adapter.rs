// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by every external-service adapter.

use async_trait::async_trait;

use crate::error::ValetError;
use crate::types::HealthStatus;

/// Identity, health, and lifecycle for an adapter wrapping an external
/// service.
///
/// The concrete adapters (the llama.cpp client, the embedder) layer their
/// domain traits on top of this one, so surfaces like `valet status` can
/// probe anything that talks to the outside world the same way.
#[async_trait]
pub trait ServiceAdapter: Send + Sync + 'static {
    /// Short name used in logs and status output.
    fn name(&self) -> &str;

    /// Adapter version, independent of the crate version.
    fn version(&self) -> semver::Version;

    /// Probes the underlying service.
    async fn health_check(&self) -> Result<HealthStatus, ValetError>;

    /// Releases held resources; called once at process exit.
    async fn shutdown(&self) -> Result<(), ValetError>;
}
