// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded short-term turn buffer with two-phase eviction.
//!
//! Appending past capacity marks the oldest overflow turns as a pending
//! batch for consolidation. Pending turns remain in the buffer and stay
//! visible to reads; they are only removed by [`TurnBuffer::commit_eviction`]
//! after the consolidated entry is persisted. [`TurnBuffer::abort_eviction`]
//! clears the marker so a failed consolidation is retried on the next
//! append instead of dropping history.

use std::collections::VecDeque;

use valet_core::types::Turn;

/// Oldest turns marked for eviction, awaiting consolidation.
#[derive(Debug, Clone)]
pub struct PendingBatch {
    /// Monotone batch id, scoped to one buffer instance.
    pub id: u64,
    /// The turns to consolidate, oldest first.
    pub turns: Vec<Turn>,
}

/// Fixed-capacity FIFO of recent turns.
///
/// At most one batch is pending at a time; while a consolidation is in
/// flight the buffer absorbs further appends beyond capacity rather than
/// marking a second batch.
pub struct TurnBuffer {
    capacity: usize,
    turns: VecDeque<Turn>,
    pending: Option<(u64, usize)>,
    next_batch_id: u64,
}

impl TurnBuffer {
    /// Creates an empty buffer. Capacity must be at least 1 (enforced by
    /// config validation).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            turns: VecDeque::new(),
            pending: None,
            next_batch_id: 1,
        }
    }

    /// Appends a turn. When the buffer exceeds capacity and no batch is
    /// already pending, the overflow turns (oldest first) are marked
    /// pending and returned for consolidation. The marked turns stay in
    /// the buffer until [`TurnBuffer::commit_eviction`].
    pub fn append(&mut self, turn: Turn) -> Option<PendingBatch> {
        self.turns.push_back(turn);

        if self.turns.len() <= self.capacity || self.pending.is_some() {
            return None;
        }

        let overflow = self.turns.len() - self.capacity;
        let batch = PendingBatch {
            id: self.next_batch_id,
            turns: self.turns.iter().take(overflow).cloned().collect(),
        };
        self.next_batch_id += 1;
        self.pending = Some((batch.id, overflow));
        Some(batch)
    }

    /// Removes the pending turns after their consolidated entry has been
    /// persisted.
    ///
    /// Ignores ids that do not match the pending batch, so a late commit
    /// after an abort cannot evict unconsolidated turns.
    pub fn commit_eviction(&mut self, batch_id: u64) {
        if let Some((id, len)) = self.pending {
            if id == batch_id {
                self.turns.drain(..len);
                self.pending = None;
            }
        }
    }

    /// Clears the pending marker after a failed consolidation. The turns
    /// never left the buffer; the next append marks the (possibly larger)
    /// overflow pending again.
    pub fn abort_eviction(&mut self, batch_id: u64) {
        if self.pending.is_some_and(|(id, _)| id == batch_id) {
            self.pending = None;
        }
    }

    /// Number of turns currently readable, pending ones included.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True while a batch is awaiting consolidation.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Snapshot of all readable turns, oldest first.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    /// The most recent turns, oldest first, capped at `n`.
    pub fn recent(&self, n: usize) -> Vec<Turn> {
        let skip = self.turns.len().saturating_sub(n);
        self.turns.iter().skip(skip).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valet_core::types::{Command, CommandChannel, TalentOutcome};

    fn make_turn(n: usize) -> Turn {
        let command = Command::new(format!("command {n}"), CommandChannel::Text);
        Turn::new(
            "sess",
            &command,
            "conversation",
            &TalentOutcome::ok(format!("reply {n}")),
        )
    }

    #[test]
    fn no_overflow_until_capacity_exceeded() {
        let mut buffer = TurnBuffer::new(5);
        for n in 1..=5 {
            assert!(buffer.append(make_turn(n)).is_none());
        }
        assert_eq!(buffer.len(), 5);
        assert!(!buffer.has_pending());
    }

    #[test]
    fn sixth_append_marks_exactly_the_oldest_turn() {
        let mut buffer = TurnBuffer::new(5);
        for n in 1..=5 {
            buffer.append(make_turn(n));
        }
        let batch = buffer.append(make_turn(6)).expect("overflow should mark a batch");

        assert_eq!(batch.turns.len(), 1);
        assert_eq!(batch.turns[0].command, "command 1");
        // Turn 1 is still readable until the eviction commits.
        assert_eq!(buffer.len(), 6);
        assert_eq!(buffer.snapshot()[0].command, "command 1");

        buffer.commit_eviction(batch.id);
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.snapshot()[0].command, "command 2");
        assert_eq!(buffer.snapshot()[4].command, "command 6");
    }

    #[test]
    fn abort_keeps_turns_and_allows_retry() {
        let mut buffer = TurnBuffer::new(2);
        buffer.append(make_turn(1));
        buffer.append(make_turn(2));
        let first = buffer.append(make_turn(3)).unwrap();
        assert_eq!(first.turns[0].command, "command 1");

        buffer.abort_eviction(first.id);
        assert!(!buffer.has_pending());
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.snapshot()[0].command, "command 1");

        // The next append retries with the grown overflow.
        let second = buffer.append(make_turn(4)).unwrap();
        assert_eq!(second.turns.len(), 2);
        assert_eq!(second.turns[0].command, "command 1");
        assert_eq!(second.turns[1].command, "command 2");
    }

    #[test]
    fn no_second_batch_while_one_is_pending() {
        let mut buffer = TurnBuffer::new(2);
        buffer.append(make_turn(1));
        buffer.append(make_turn(2));
        let first = buffer.append(make_turn(3)).unwrap();

        // In-flight consolidation: further overflow does not mark again.
        assert!(buffer.append(make_turn(4)).is_none());
        assert_eq!(buffer.len(), 4);

        // After the commit the next append marks the accumulated overflow.
        buffer.commit_eviction(first.id);
        assert_eq!(buffer.len(), 3);
        let second = buffer.append(make_turn(5)).unwrap();
        assert_eq!(second.turns.len(), 2);
        assert_eq!(second.turns[0].command, "command 2");
        assert_eq!(second.turns[1].command, "command 3");
    }

    #[test]
    fn stale_commit_or_abort_ids_are_ignored() {
        let mut buffer = TurnBuffer::new(1);
        buffer.append(make_turn(1));
        let batch = buffer.append(make_turn(2)).unwrap();

        buffer.commit_eviction(batch.id + 100);
        assert!(buffer.has_pending());
        assert_eq!(buffer.len(), 2);
        buffer.abort_eviction(batch.id + 100);
        assert!(buffer.has_pending());

        buffer.commit_eviction(batch.id);
        assert!(!buffer.has_pending());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn late_commit_after_abort_does_not_evict() {
        let mut buffer = TurnBuffer::new(1);
        buffer.append(make_turn(1));
        let first = buffer.append(make_turn(2)).unwrap();

        buffer.abort_eviction(first.id);
        let second = buffer.append(make_turn(3)).unwrap();
        assert_ne!(first.id, second.id);

        // A straggling commit for the aborted batch must not drop turns
        // that belong to the newer pending batch.
        buffer.commit_eviction(first.id);
        assert_eq!(buffer.len(), 3);
        assert!(buffer.has_pending());

        buffer.commit_eviction(second.id);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.snapshot()[0].command, "command 3");
    }

    #[test]
    fn recent_returns_tail() {
        let mut buffer = TurnBuffer::new(10);
        for n in 1..=4 {
            buffer.append(make_turn(n));
        }
        let recent = buffer.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].command, "command 3");
        assert_eq!(recent[1].command, "command 4");
    }
}
