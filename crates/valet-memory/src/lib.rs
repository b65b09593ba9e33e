// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory system for the Valet assistant.
//!
//! Short-term recall is a fixed-capacity turn buffer with two-phase
//! eviction; evicted batches are summarized by the consolidator into
//! long-term entries stored in SQLite with embedding BLOBs and an FTS5
//! index, and recalled through hybrid vector + BM25 retrieval.
//!
//! ## Architecture
//!
//! - **TurnBuffer**: bounded FIFO, evictions gated on consolidation
//! - **Consolidator**: LLM summary + embedding for evicted batches
//! - **LtmStore**: SQLite persistence with BLOB vectors and FTS5
//! - **HybridRetriever**: vector + BM25 + RRF fusion with recency weight
//! - **MemoryService**: the `MemoryAccess` surface handed to talents

pub mod buffer;
pub mod consolidator;
pub mod retriever;
pub mod service;
pub mod store;
pub mod types;

pub use buffer::{PendingBatch, TurnBuffer};
pub use consolidator::Consolidator;
pub use retriever::HybridRetriever;
pub use service::MemoryService;
pub use store::LtmStore;
pub use types::*;
