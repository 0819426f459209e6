//! Human-readable account of what the engine did.
//!
//! Presentation only: recovery never reads it back. Every event is mirrored
//! to the `log` facade at a level matching its severity.

use crate::registry::TxnId;
use crate::tree::NodePath;
use std::fmt;

/// Category of a narrative event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Ordinary data operation.
    Info,
    /// Transaction started.
    Success,
    /// Transaction committed.
    Primary,
    /// Request refused.
    Warning,
    /// Abort or restart.
    Danger,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Primary => "primary",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub severity: Severity,
    pub txn: Option<TxnId>,
    pub description: String,
    pub path: Option<NodePath>,
    pub data: Option<String>,
}

#[derive(Debug, Default)]
pub struct Narrative {
    events: Vec<Event>,
}

impl Narrative {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        severity: Severity,
        txn: Option<TxnId>,
        description: impl Into<String>,
        path: Option<&NodePath>,
        data: Option<&str>,
    ) {
        let event = Event {
            severity,
            txn,
            description: description.into(),
            path: path.cloned(),
            data: data.map(str::to_string),
        };

        let who = event.txn.map(|t| t.to_string()).unwrap_or_else(|| "--".into());
        let at = event.path.as_ref().map(|p| p.to_string()).unwrap_or_default();
        match severity {
            Severity::Warning => log::warn!("[{}] {} {}", who, event.description, at),
            Severity::Info => log::debug!("[{}] {} {}", who, event.description, at),
            _ => log::info!("[{}] {} {}", who, event.description, at),
        }

        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(|e| e.severity == Severity::Warning)
    }
}
