//! Terminal rendering of engine state.

use crate::engine::ActionSet;
use crate::journal::{Journal, JournalEntry};
use crate::narrative::{Event, Narrative, Severity};
use crate::registry::{TransactionRegistry, TxnId};
use crate::tree::Node;
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use std::collections::BTreeSet;
use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

/// A printable part of the engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// Stable tree.
    Disk,
    /// Working tree.
    Cache,
    Journal,
    Transactions,
    /// Narrative log.
    Log,
    /// Enabled actions.
    Actions,
}

impl View {
    pub const DEFAULT: [View; 4] = [View::Disk, View::Cache, View::Journal, View::Transactions];
}

pub fn render_tree(title: &str, root: &Node) -> String {
    let mut out = format!("{}\n", title.bold().cyan());
    for (depth, node) in root.walk() {
        let indent = "  ".repeat(depth + 1);
        match node.content() {
            Some(content) => {
                let _ = writeln!(
                    out,
                    "{}{} {}",
                    indent,
                    node.name(),
                    format!("{:?}", content).dimmed()
                );
            }
            None => {
                let _ = writeln!(out, "{}{}/", indent, node.name().bold());
            }
        }
    }
    out
}

pub fn render_journal(journal: &Journal) -> String {
    let mut out = format!("{}\n", "Journal:".bold().cyan());
    if journal.is_empty() {
        let _ = writeln!(out, "  {}", "(empty)".dimmed());
        return out;
    }

    let _ = writeln!(
        out,
        "  {:>4}  {:<4}  {:<12}  {:<7}  {:<24}  {:<16}  {}",
        "lsn", "txn", "time", "op", "path", "before", "after"
    );
    for entry in journal.entries() {
        let _ = writeln!(out, "  {}", journal_row(entry));
    }
    out
}

fn journal_row(entry: &JournalEntry) -> String {
    let path = entry.path().map(|p| p.to_string()).unwrap_or_default();
    format!(
        "{:>4}  {:<4}  {:<12}  {:<7}  {:<24}  {:<16}  {}",
        entry.lsn,
        entry.txn.to_string(),
        clock(entry.timestamp),
        entry.kind().to_string(),
        path,
        quoted(entry.op.before()),
        quoted(entry.op.after())
    )
}

fn quoted(value: Option<String>) -> String {
    value.map(|v| format!("{:?}", v)).unwrap_or_default()
}

/// `HH:MM:SS.mmm` since midnight UTC.
pub fn clock(at: SystemTime) -> String {
    let millis = at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let day = millis % 86_400_000;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        day / 3_600_000,
        day / 60_000 % 60,
        day / 1000 % 60,
        day % 1000
    )
}

pub fn render_transactions(registry: &TransactionRegistry) -> String {
    fn ids(set: &BTreeSet<TxnId>) -> String {
        if set.is_empty() {
            return "-".to_string();
        }
        set.iter().map(TxnId::to_string).collect::<Vec<_>>().join(", ")
    }

    format!(
        "{}\n  {:<13} {}\n  {:<13} {}\n  {:<13} {}\n",
        "Transactions:".bold().cyan(),
        "active",
        ids(registry.active()).green(),
        "aborted",
        ids(registry.aborted()).red(),
        "consolidated",
        ids(registry.consolidated()).blue()
    )
}

pub fn render_event(event: &Event) -> String {
    let mut line = event.description.clone();
    if let Some(path) = &event.path {
        let _ = write!(line, " {}", path.to_string().dimmed());
    }
    if let Some(data) = &event.data {
        let _ = write!(line, " {}", format!("{:?}", data).dimmed());
    }

    let txn = event.txn.map(|t| t.to_string()).unwrap_or_else(|| "-".into());
    format!("{} {:<4} {}", marker(event.severity), txn, line)
}

fn marker(severity: Severity) -> ColoredString {
    match severity {
        Severity::Info => "•".normal(),
        Severity::Success => "✓".green(),
        Severity::Primary => "✓".blue().bold(),
        Severity::Warning => "⚠".yellow().bold(),
        Severity::Danger => "✗".red().bold(),
    }
}

pub fn render_narrative(narrative: &Narrative) -> String {
    let mut out = format!("{}\n", "Log:".bold().cyan());
    for event in narrative.events() {
        let _ = writeln!(out, "  {}", render_event(event));
    }
    out
}

pub fn render_actions(actions: &ActionSet) -> String {
    let names: Vec<&str> = actions.iter().map(|a| a.name()).collect();
    format!("{} {}\n", "Actions:".bold().cyan(), names.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Action;
    use crate::journal::Operation;
    use std::time::Duration;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_clock_format() {
        let at = UNIX_EPOCH + Duration::from_millis(3_723_045);
        assert_eq!(clock(at), "01:02:03.045");
    }

    #[test]
    fn test_render_tree_shows_content() {
        plain();
        let root = Node::folder_with("fs", [Node::file("readme", "hi")]);
        let out = render_tree("Disk:", &root);
        assert!(out.contains("fs/"));
        assert!(out.contains("readme \"hi\""));
    }

    #[test]
    fn test_render_journal_empty() {
        plain();
        assert!(render_journal(&Journal::new()).contains("(empty)"));
    }

    #[test]
    fn test_render_journal_row() {
        plain();
        let mut journal = Journal::new();
        journal.append(
            TxnId::new(0),
            Operation::Write {
                path: "fs/readme".parse().unwrap(),
                before: String::new(),
                after: "hi".into(),
            },
        );
        let out = render_journal(&journal);
        assert!(out.contains("T0"));
        assert!(out.contains("fs/readme"));
        assert!(out.contains("\"hi\""));
    }

    #[test]
    fn test_render_transactions_sets() {
        plain();
        let mut registry = TransactionRegistry::new();
        let t0 = registry.begin();
        registry.begin();
        registry.retire(t0);
        let out = render_transactions(&registry);
        assert!(out.contains("active        T1"));
        assert!(out.contains("aborted       T0"));
        assert!(out.contains("consolidated  -"));
    }

    #[test]
    fn test_render_actions() {
        plain();
        let out = render_actions(&Action::enabled(false));
        assert_eq!(out, "Actions: start restart\n");
    }
}
