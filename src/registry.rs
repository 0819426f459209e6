//! Transaction lifecycle bookkeeping.
//!
//! An id moves `active → consolidated` on commit, or `active → aborted` when
//! its effects are undone by abort or restart recovery. The three sets are
//! kept disjoint.

use crate::error::Rejection;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Opaque transaction identifier, displayed as `T<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxnId(u64);

impl TxnId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

impl FromStr for TxnId {
    type Err = Rejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('T')
            .or_else(|| s.strip_prefix('t'))
            .unwrap_or(s);
        digits
            .parse::<u64>()
            .map(TxnId)
            .map_err(|_| Rejection::InvalidArgument(format!("'{}' is not a transaction id", s)))
    }
}

/// Which set a transaction currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    Active,
    Aborted,
    Consolidated,
}

#[derive(Debug, Default)]
pub struct TransactionRegistry {
    next_id: u64,
    active: BTreeSet<TxnId>,
    aborted: BTreeSet<TxnId>,
    consolidated: BTreeSet<TxnId>,
}

impl TransactionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh id and marks it active. Ids are never reused.
    pub fn begin(&mut self) -> TxnId {
        let id = TxnId(self.next_id);
        self.next_id += 1;
        self.active.insert(id);
        log::debug!("Registry: {} is active", id);
        id
    }

    pub fn state(&self, id: TxnId) -> Option<TxnState> {
        if self.active.contains(&id) {
            Some(TxnState::Active)
        } else if self.consolidated.contains(&id) {
            Some(TxnState::Consolidated)
        } else if self.aborted.contains(&id) {
            Some(TxnState::Aborted)
        } else {
            None
        }
    }

    pub fn is_active(&self, id: TxnId) -> bool {
        self.active.contains(&id)
    }

    pub fn is_consolidated(&self, id: TxnId) -> bool {
        self.consolidated.contains(&id)
    }

    /// Moves `id` from active to consolidated.
    pub fn consolidate(&mut self, id: TxnId) -> bool {
        if !self.active.remove(&id) {
            return false;
        }
        self.consolidated.insert(id);
        log::debug!("Registry: {} is consolidated", id);
        true
    }

    /// Removes `id` from active and records it as aborted.
    pub fn retire(&mut self, id: TxnId) -> bool {
        if !self.active.remove(&id) {
            return false;
        }
        self.aborted.insert(id);
        log::debug!("Registry: {} is aborted", id);
        true
    }

    pub fn clear_consolidated(&mut self) {
        self.consolidated.clear();
    }

    pub fn active(&self) -> &BTreeSet<TxnId> {
        &self.active
    }

    pub fn aborted(&self) -> &BTreeSet<TxnId> {
        &self.aborted
    }

    pub fn consolidated(&self) -> &BTreeSet<TxnId> {
        &self.consolidated
    }

    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }
}
