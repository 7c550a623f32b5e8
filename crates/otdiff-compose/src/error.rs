//! Error types for the compositional operation type.

use otdiff_core::DiffError;
use otdiff_types::{Path, ValueKind};

/// Errors raised while applying composed operations.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// Nothing exists at the path.
    #[error("nothing at {0}")]
    Missing(Path),

    /// The path steps into a node that cannot hold the next segment.
    #[error("cannot address into {kind} at {path}")]
    BadContainer { path: Path, kind: ValueKind },

    #[error("index {index} out of bounds at {path} (len {len})")]
    OutOfBounds { path: Path, index: usize, len: usize },

    /// A remove or replace names a value the document does not hold.
    #[error("document value at {0} does not match the operation")]
    Mismatch(Path),

    #[error("unknown edit type: {0:?}")]
    UnknownEditType(String),

    #[error("malformed text edit at {path}: {reason}")]
    MalformedText { path: Path, reason: String },

    /// Computing the diff failed.
    #[error(transparent)]
    Diff(#[from] DiffError),
}

impl ComposeError {
    pub fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        Self::MalformedText {
            path: path.clone(),
            reason: reason.into(),
        }
    }
}

pub type ComposeResult<T> = Result<T, ComposeError>;
