//! Append-only journal of transaction intents.
//!
//! Entries are appended in the order operations are accepted and carry a
//! strictly increasing [`Lsn`]. The journal only shrinks during a full
//! restart, which pops entries from the tail while undoing them.

mod entry;

pub use entry::{JournalEntry, Lsn, Operation, OperationKind};

use crate::registry::TxnId;
use crate::tree::NodePath;
use std::time::SystemTime;

#[derive(Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
    next_lsn: Lsn,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, txn: TxnId, op: Operation) -> Lsn {
        let lsn = self.next_lsn;
        self.next_lsn += 1;

        log::debug!(
            "Journal #{}: {} {} {}",
            lsn,
            txn,
            op.kind(),
            op.path().map(ToString::to_string).unwrap_or_default()
        );

        self.entries.push(JournalEntry {
            lsn,
            txn,
            timestamp: SystemTime::now(),
            op,
        });
        lsn
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of `txn` in journal order.
    pub fn entries_for(&self, txn: TxnId) -> impl DoubleEndedIterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |e| e.txn == txn)
    }

    /// Most recent entry of `txn` targeting `path`.
    pub fn latest_for(&self, txn: TxnId, path: &NodePath) -> Option<&JournalEntry> {
        self.entries.iter().rev().find(|e| e.touches(txn, path))
    }

    pub fn pop(&mut self) -> Option<JournalEntry> {
        self.entries.pop()
    }

    /// Drops every entry. LSNs keep counting from where they were.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
