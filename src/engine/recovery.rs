//! Commit-time redo and abort/restart undo.
//!
//! ## Redo
//!
//! [`redo`] applies one entry to a tree. Commit runs it over the
//! transaction's entries on a staged copy of the stable tree and swaps the
//! copy in only if every entry resolved; reads run it on the working tree.
//! A commit whose entries no longer resolve on the stable tree is refused
//! and the transaction stays active.
//!
//! ## Undo
//!
//! Entries are walked newest first. For each entry whose transaction is active
//! and not consolidated, the inverse operation runs in replay mode:
//!
//! | entry | inverse |
//! |---|---|
//! | start | transaction leaves the active set |
//! | commit, abort | nothing |
//! | write | write the before-value back |
//! | create | delete the created node |
//! | delete | create a node of the same kind, rename it, restore content |
//! | rename | rename back to the old name |
//!
//! A full restart empties the working tree first and pops every entry it
//! processes; the inverse operations are narrated but have nothing left to
//! act on.

use super::{Database, Mode, Publisher};
use crate::error::{JournalError, Rejection, Result};
use crate::journal::{JournalEntry, Operation};
use crate::narrative::Severity;
use crate::registry::TxnId;
use crate::tree::{Node, NodePath};

/// Statistics from an undo pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Journal entries examined.
    pub entries_processed: usize,
    /// Data operations (write/create/delete/rename) reversed.
    pub operations_undone: usize,
    /// Transactions removed from the active set as uncommitted.
    pub transactions_rolled_back: usize,
    /// Committed transactions left alone.
    pub transactions_kept: usize,
    /// Inverse operations refused by the working tree (non-fatal).
    pub skipped: usize,
}

/// Applies `entry` forward onto `tree`.
///
/// `tree_name` only labels the divergence error.
pub(crate) fn redo(tree: &mut Node, entry: &JournalEntry, tree_name: &'static str) -> Result<()> {
    apply(tree, &entry.op).map_err(|path| JournalError::Diverged {
        lsn: entry.lsn,
        tree: tree_name,
        path,
    })
}

/// Applies `op` onto `tree`, returning the path that failed to resolve.
pub(crate) fn apply(tree: &mut Node, op: &Operation) -> std::result::Result<(), NodePath> {
    match op {
        Operation::Start | Operation::Commit | Operation::Abort => Ok(()),
        Operation::Write { path, after, .. } => tree
            .get_mut(path)
            .ok_or_else(|| path.clone())?
            .set_content(after)
            .map_err(|_| path.clone()),
        Operation::Create { parent, kind, name } => tree
            .get_mut(parent)
            .ok_or_else(|| parent.clone())?
            .insert_child(Node::empty(*kind, name.clone()))
            .map_err(|_| parent.join(name)),
        Operation::Delete { path, .. } => {
            let (Some(parent), Some(name)) = (path.parent(), path.name()) else {
                return Err(path.clone());
            };
            tree.get_mut(&parent)
                .and_then(|p| p.remove_child(name))
                .map(|_| ())
                .ok_or_else(|| path.clone())
        }
        Operation::Rename { path, from, to } => {
            let parent = path.parent().ok_or_else(|| path.clone())?;
            tree.get_mut(&parent)
                .ok_or(parent)?
                .rename_child(from, to)
                .map_err(|_| path.clone())
        }
    }
}

impl<P: Publisher> Database<P> {
    /// Ends `txn` and makes its effects durable on the stable tree.
    pub fn commit(&mut self, txn: impl Into<Option<TxnId>>) -> Result<()> {
        let txn = txn.into();
        let result = self.selected(txn).and_then(|t| self.commit_in(t));
        self.finish(txn, None, result)
    }

    /// Abandons `txn` and undoes its working-tree effects.
    pub fn abort(&mut self, txn: impl Into<Option<TxnId>>) -> Result<RecoveryStats> {
        let txn = txn.into();
        let result = self.selected(txn).and_then(|t| {
            self.narrative
                .record(Severity::Danger, Some(t), "Abort", None, None);
            self.journal.append(t, Operation::Abort);
            self.undo(Some(t))
        });
        self.finish(txn, None, result)
    }

    /// Simulates a crash and recovers from the journal.
    pub fn restart(&mut self) -> Result<RecoveryStats> {
        let result = self.undo(None);
        self.finish(None, None, result)
    }

    fn commit_in(&mut self, txn: TxnId) -> Result<()> {
        let mut staged = self.stable.clone();
        let mut redone = 0;
        for entry in self.journal.entries_for(txn) {
            if let Err(e) = redo(&mut staged, entry, "stable") {
                // Another commit changed the disk under this transaction.
                log::debug!("Commit of {} refused: {}", txn, e);
                return Err(Rejection::Conflict.into());
            }
            redone += 1;
        }

        self.narrative
            .record(Severity::Primary, Some(txn), "end of transaction", None, None);
        self.journal.append(txn, Operation::Commit);
        self.registry.consolidate(txn);
        self.stable = staged;

        log::info!("Committed {}: {} entries redone on stable tree", txn, redone);
        Ok(())
    }

    /// Undoes the whole journal (`scope = None`) or one transaction.
    fn undo(&mut self, scope: Option<TxnId>) -> Result<RecoveryStats> {
        let full = scope.is_none();

        let pending: Vec<JournalEntry> = match scope {
            None => {
                self.working.reset();
                self.narrative
                    .record(Severity::Danger, None, "RESTART", None, None);
                self.journal.entries().to_vec()
            }
            Some(txn) => {
                self.narrative
                    .record(Severity::Danger, Some(txn), "Abort UNDO", None, None);
                self.journal.entries_for(txn).cloned().collect()
            }
        };

        let mut stats = RecoveryStats::default();
        for entry in pending.iter().rev() {
            if full {
                self.journal.pop();
            }
            stats.entries_processed += 1;

            if self.registry.is_active(entry.txn) {
                self.undo_entry(entry, full, &mut stats)?;
            } else if matches!(entry.op, Operation::Start)
                && self.registry.is_consolidated(entry.txn)
            {
                stats.transactions_kept += 1;
            }
        }

        if full {
            self.registry.clear_consolidated();
            self.journal.clear();
        }

        log::info!(
            "Recovery complete: {} entries, {} undone, {} rolled back",
            stats.entries_processed,
            stats.operations_undone,
            stats.transactions_rolled_back
        );
        Ok(stats)
    }

    fn undo_entry(
        &mut self,
        entry: &JournalEntry,
        full: bool,
        stats: &mut RecoveryStats,
    ) -> Result<()> {
        match &entry.op {
            Operation::Start => {
                self.registry.retire(entry.txn);
                stats.transactions_rolled_back += 1;
                return Ok(());
            }
            Operation::Commit | Operation::Abort => return Ok(()),
            _ => {}
        }

        stats.operations_undone += 1;
        self.narrative.record(
            Severity::Info,
            Some(entry.txn),
            format!("undo {}", entry.kind()),
            entry.path(),
            entry.op.before().as_deref(),
        );
        if full {
            return Ok(());
        }

        match self.invert(&entry.op) {
            Err(JournalError::Rejected(why)) => {
                self.narrative.record(
                    Severity::Warning,
                    Some(entry.txn),
                    format!("undo skipped: {}", why),
                    entry.path(),
                    None,
                );
                stats.skipped += 1;
                Ok(())
            }
            other => other,
        }
    }

    /// Runs the inverse of `op` against the working tree, unjournaled.
    fn invert(&mut self, op: &Operation) -> Result<()> {
        match op {
            Operation::Start | Operation::Commit | Operation::Abort => Ok(()),
            Operation::Write { path, before, .. } => {
                self.read_in(Mode::Replay, path)?;
                self.write_in(Mode::Replay, path, before)
            }
            Operation::Create { parent, name, .. } => {
                self.read_in(Mode::Replay, parent)?;
                self.delete_in(Mode::Replay, &parent.join(name))
            }
            Operation::Delete {
                path,
                kind,
                content,
            } => {
                let (Some(parent), Some(name)) = (path.parent(), path.name()) else {
                    return Ok(());
                };
                self.read_in(Mode::Replay, &parent)?;
                let created = self.create_in(Mode::Replay, &parent, *kind)?;
                self.rename_in(Mode::Replay, &parent.join(&created), name)?;
                match content {
                    Some(text) if !text.is_empty() => self.write_in(Mode::Replay, path, text),
                    _ => Ok(()),
                }
            }
            Operation::Rename { path, from, to } => {
                let current = path.with_name(to);
                self.read_in(Mode::Replay, &current)?;
                self.rename_in(Mode::Replay, &current, from)
            }
        }
    }
}
