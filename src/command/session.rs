use super::script::ScriptCommand;
use crate::engine::{ActionSet, Database, EngineConfig, Publisher};
use crate::error::{JournalError, Result};
use crate::report::{self, View};
use crate::tree::Node;
use colored::Colorize;
use std::thread;
use std::time::Duration;

/// Publisher that paces a terminal run.
///
/// Sleeps for the pacing hint after every snapshot so each step can be
/// followed on screen.
#[derive(Debug, Default)]
pub struct TerminalPublisher {
    last: Option<ActionSet>,
}

impl TerminalPublisher {
    pub fn last(&self) -> Option<&ActionSet> {
        self.last.as_ref()
    }
}

impl Publisher for TerminalPublisher {
    fn publish(&mut self, actions: &ActionSet, delay: Option<Duration>) {
        log::debug!(
            "Enabled actions: {}",
            actions.iter().map(|a| a.name()).collect::<Vec<_>>().join(" ")
        );
        self.last = Some(actions.clone());
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
    }
}

/// A database driven by script commands.
pub struct Session {
    db: Database<TerminalPublisher>,
    echo: bool,
    seen: usize,
}

impl Session {
    pub fn new(stable: Node, config: EngineConfig) -> Self {
        Self {
            db: Database::with_config(stable, TerminalPublisher::default(), config),
            echo: false,
            seen: 0,
        }
    }

    /// Prints narrative events as they happen.
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn database(&self) -> &Database<TerminalPublisher> {
        &self.db
    }

    /// Runs one command.
    ///
    /// Soft failures are reported and swallowed; only hard errors are returned.
    pub fn execute(&mut self, command: &ScriptCommand) -> Result<()> {
        let outcome = self.dispatch(command);
        if self.echo {
            self.flush_events();
        }

        match outcome {
            Err(JournalError::Rejected(why)) => {
                if !self.echo {
                    eprintln!("{:>12} {}", "Refused".yellow().bold(), why);
                }
                Ok(())
            }
            other => other,
        }
    }

    fn dispatch(&mut self, command: &ScriptCommand) -> Result<()> {
        match command {
            ScriptCommand::Start => {
                let txn = self.db.start();
                if !self.echo {
                    println!("{:>12} {}", "Started".green().bold(), txn);
                }
            }
            ScriptCommand::Commit(txn) => self.db.commit(*txn)?,
            ScriptCommand::Abort(txn) => {
                let stats = self.db.abort(*txn)?;
                log::info!("Abort undid {} operations", stats.operations_undone);
            }
            ScriptCommand::Read(txn, path) => self.db.read(*txn, path)?,
            ScriptCommand::Write(txn, path, text) => self.db.write(*txn, path, text)?,
            ScriptCommand::Create(txn, parent, kind) => {
                let name = self.db.create(*txn, parent, *kind)?;
                if !self.echo {
                    println!("{:>12} {}/{}", "Created".green().bold(), parent, name);
                }
            }
            ScriptCommand::Delete(txn, path) => self.db.delete(*txn, path)?,
            ScriptCommand::Rename(txn, path, name) => self.db.rename(*txn, path, name)?,
            ScriptCommand::Restart => {
                let stats = self.db.restart()?;
                if !self.echo {
                    println!(
                        "{:>12} {} rolled back, {} kept, {} entries replayed",
                        "Recovered".blue().bold(),
                        stats.transactions_rolled_back,
                        stats.transactions_kept,
                        stats.entries_processed
                    );
                }
            }
            ScriptCommand::Show(view) => print!("{}", self.render(*view)),
        }
        Ok(())
    }

    fn flush_events(&mut self) {
        let events = self.db.narrative().events();
        for event in &events[self.seen.min(events.len())..] {
            println!("  {}", report::render_event(event));
        }
        self.seen = events.len();
    }

    pub fn render(&self, view: View) -> String {
        match view {
            View::Disk => report::render_tree("Disk:", self.db.stable()),
            View::Cache => report::render_tree("Cache:", self.db.working()),
            View::Journal => report::render_journal(self.db.journal()),
            View::Transactions => report::render_transactions(self.db.registry()),
            View::Log => report::render_narrative(self.db.narrative()),
            View::Actions => report::render_actions(&self.db.enabled_actions()),
        }
    }
}
