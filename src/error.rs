//! Error types for redo-fs.
//!
//! All operations return `Result<T>` which aliases `Result<T, JournalError>`.

use crate::tree::NodePath;
use thiserror::Error;

/// A request the engine refused without touching any state.
///
/// The `Display` text doubles as the narrative description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("transaction not selected")]
    NoTransaction,

    #[error("transaction not active")]
    NotActive,

    #[error("path not found")]
    NotFound,

    #[error("path is folder")]
    IsFolder,

    #[error("path is file")]
    IsFile,

    #[error("content not changed")]
    Unchanged,

    #[error("cant del root")]
    DeleteRoot,

    #[error("cant rename root")]
    RenameRoot,

    #[error("path already exists")]
    AlreadyExists,

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The transaction's entries no longer apply to the stable tree.
    #[error("commit conflicts with disk")]
    Conflict,
}

/// Errors from engine and driver operations.
#[derive(Debug, Error)]
pub enum JournalError {
    /// Soft failure; state is unchanged.
    #[error("{0}")]
    Rejected(#[from] Rejection),

    /// The journal references a path the target tree cannot resolve.
    ///
    /// Indicates journal/tree divergence, never a user mistake.
    #[error("journal entry #{lsn} diverged from the {tree} tree at '{path}'")]
    Diverged {
        lsn: u64,
        tree: &'static str,
        path: NodePath,
    },

    /// Scenario script could not be parsed.
    #[error("line {line}: {message}")]
    Script { line: usize, message: String },

    /// Seed directory could not be walked.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// File system operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Regex compilation failed (indicates bug).
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Unexpected error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JournalError {
    /// Returns `true` for rejections that leave the engine untouched.
    pub fn is_soft(&self) -> bool {
        matches!(self, JournalError::Rejected(_))
    }

    /// Returns the rejection reason, if this is a soft failure.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            JournalError::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

/// Result type alias for redo-fs operations.
pub type Result<T> = std::result::Result<T, JournalError>;
