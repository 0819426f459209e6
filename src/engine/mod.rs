//! Transaction, journal and recovery engine.
//!
//! [`Database`] owns the stable tree, the working tree, the journal, the
//! transaction registry and the narrative log. All of them are mutated only
//! through its operations, one at a time.
//!
//! ## Discipline
//!
//! Deferred writes (NO-UNDO/REDO):
//!
//! 1. **Operate**: every mutation is journaled with before/after values and
//!    applied to the working tree only
//! 2. **Commit**: the transaction's entries are redone, in journal order, on
//!    the stable tree
//! 3. **Abort**: the transaction's entries are undone, newest first, on the
//!    working tree
//! 4. **Restart**: the working tree is lost, uncommitted transactions are
//!    rolled back, and the journal and consolidated set are reset
//!
//! ## Example
//!
//! ```
//! # use redo_fs::engine::Database;
//! # use redo_fs::tree::{Node, NodePath};
//! # fn example() -> redo_fs::Result<()> {
//! let mut disk = Node::root();
//! disk.insert_child(Node::file("readme", "")).unwrap();
//!
//! let mut db = Database::with_stable(disk);
//! let readme: NodePath = "fs/readme".parse().unwrap();
//!
//! let t0 = db.start();
//! db.read(t0, &readme)?;
//! db.write(t0, &readme, "hi")?;
//! db.commit(t0)?;
//!
//! assert_eq!(db.stable().get(&readme).unwrap().content(), Some("hi"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod actions;
mod ops;
mod recovery;
mod working;

pub use actions::{Action, ActionSet, NullPublisher, Publisher, RecordingPublisher};
pub use recovery::RecoveryStats;
pub use working::WorkingTree;

use crate::error::{JournalError, Rejection, Result};
use crate::journal::Journal;
use crate::narrative::{Narrative, Severity};
use crate::registry::{TransactionRegistry, TxnId};
use crate::tree::{Node, NodePath, ROOT_NAME};
use std::collections::BTreeMap;
use std::time::Duration;

/// Engine settings.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Pacing hint handed to the publisher with every snapshot.
    pub pacing: Option<Duration>,
}

/// How an operation is being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// On behalf of a transaction; journaled.
    Logged(TxnId),
    /// Inverse operation during undo; never journaled.
    Replay,
}

pub struct Database<P: Publisher = NullPublisher> {
    stable: Node,
    working: WorkingTree,
    journal: Journal,
    registry: TransactionRegistry,
    narrative: Narrative,
    publisher: P,
    config: EngineConfig,
}

impl Database<NullPublisher> {
    /// Engine over `stable` that publishes nowhere.
    pub fn with_stable(stable: Node) -> Self {
        Self::new(stable, NullPublisher)
    }
}

impl<P: Publisher> Database<P> {
    pub fn new(stable: Node, publisher: P) -> Self {
        Self::with_config(stable, publisher, EngineConfig::default())
    }

    /// Creates the engine and publishes the initial action set.
    ///
    /// A stable root that is not a folder named `fs` is normalized into one.
    pub fn with_config(stable: Node, publisher: P, config: EngineConfig) -> Self {
        let stable = match stable {
            Node::Folder { name, children } => {
                if name != ROOT_NAME {
                    log::debug!("Stable root '{}' renamed to '{}'", name, ROOT_NAME);
                }
                Node::Folder {
                    name: ROOT_NAME.to_string(),
                    children,
                }
            }
            file @ Node::File { .. } => Node::Folder {
                name: ROOT_NAME.to_string(),
                children: BTreeMap::from([(file.name().to_string(), file)]),
            },
        };

        log::info!("Engine ready: {} nodes on stable tree", stable.count());

        let mut db = Self {
            stable,
            working: WorkingTree::new(),
            journal: Journal::new(),
            registry: TransactionRegistry::new(),
            narrative: Narrative::new(),
            publisher,
            config,
        };
        db.publish();
        db
    }

    pub fn stable(&self) -> &Node {
        &self.stable
    }

    pub fn working(&self) -> &Node {
        self.working.root()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn registry(&self) -> &TransactionRegistry {
        &self.registry
    }

    pub fn narrative(&self) -> &Narrative {
        &self.narrative
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn enabled_actions(&self) -> ActionSet {
        Action::enabled(self.registry.has_active())
    }

    fn publish(&mut self) {
        let actions = self.enabled_actions();
        self.publisher.publish(&actions, self.config.pacing);
    }

    /// Resolves the caller's transaction, refusing absent or inactive ids.
    fn selected(&self, txn: Option<TxnId>) -> Result<TxnId> {
        let txn = txn.ok_or(Rejection::NoTransaction)?;
        if !self.registry.is_active(txn) {
            return Err(Rejection::NotActive.into());
        }
        Ok(txn)
    }

    /// Narrates the outcome of a public operation and publishes actions.
    fn finish<T>(
        &mut self,
        txn: Option<TxnId>,
        path: Option<&NodePath>,
        result: Result<T>,
    ) -> Result<T> {
        match &result {
            Err(JournalError::Rejected(why)) => {
                self.narrative
                    .record(Severity::Warning, txn, why.to_string(), path, None);
            }
            Err(e) => log::error!("{}", e),
            Ok(_) => {}
        }
        self.publish();
        result
    }
}
