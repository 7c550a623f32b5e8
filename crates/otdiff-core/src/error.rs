//! Error types for the diff crate.

use otdiff_types::Path;

/// Errors that can occur while computing or applying a diff.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The character-diff collaborator produced a hunk code other than
    /// delete (-1), equal (0) or insert (1).
    #[error("unsupported hunk type: {0}")]
    UnsupportedHunk(i8),

    /// The active encoding cannot express in-place text edits.
    #[error("encoding does not support text edits (at {0})")]
    TextEditsUnsupported(Path),

    /// A character-diff patch addressed text outside the string it was
    /// computed for.
    #[error("patch offset {offset} out of range for text of {len} UTF-16 units")]
    PatchOutOfRange { offset: usize, len: usize },

    /// A flat operation could not be applied to a document.
    #[error("cannot apply operation at {path}: {reason}")]
    Apply { path: Path, reason: String },
}

impl DiffError {
    /// Create an apply error for an operation path.
    pub fn apply(path: &Path, reason: impl Into<String>) -> Self {
        Self::Apply {
            path: path.clone(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
