//! Enabled-action snapshots published to the environment.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

/// An externally invocable operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Start,
    Commit,
    Abort,
    Read,
    Write,
    Create,
    Delete,
    Rename,
    Restart,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::Start,
        Action::Commit,
        Action::Abort,
        Action::Read,
        Action::Write,
        Action::Create,
        Action::Delete,
        Action::Rename,
        Action::Restart,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Commit => "commit",
            Action::Abort => "abort",
            Action::Read => "read",
            Action::Write => "write",
            Action::Create => "create",
            Action::Delete => "delete",
            Action::Rename => "rename",
            Action::Restart => "restart",
        }
    }

    /// Actions available given whether any transaction is active.
    pub fn enabled(has_active: bool) -> ActionSet {
        if has_active {
            Action::ALL.into_iter().collect()
        } else {
            [Action::Start, Action::Restart].into_iter().collect()
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type ActionSet = BTreeSet<Action>;

/// Receives the enabled actions after every state change.
///
/// `delay` is a presentation pacing hint; the engine never waits on it.
pub trait Publisher {
    fn publish(&mut self, actions: &ActionSet, delay: Option<Duration>);
}

/// Publisher that discards every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPublisher;

impl Publisher for NullPublisher {
    fn publish(&mut self, _actions: &ActionSet, _delay: Option<Duration>) {}
}

impl<F> Publisher for F
where
    F: FnMut(&ActionSet, Option<Duration>),
{
    fn publish(&mut self, actions: &ActionSet, delay: Option<Duration>) {
        self(actions, delay)
    }
}

/// Publisher that keeps every snapshot, for inspection.
#[derive(Debug, Default, Clone)]
pub struct RecordingPublisher {
    pub snapshots: Vec<ActionSet>,
}

impl RecordingPublisher {
    pub fn last(&self) -> Option<&ActionSet> {
        self.snapshots.last()
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&mut self, actions: &ActionSet, _delay: Option<Duration>) {
        self.snapshots.push(actions.clone());
    }
}
