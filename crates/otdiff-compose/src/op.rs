//! Composed operations.
//!
//! A [`ComposedOp`] is a sequence of path-addressed [`Edit`]s applied left
//! to right. Composition concatenates two sequences and cancels, at the
//! seam, any edit immediately followed by its exact inverse. Inputs to
//! `then` are always reduced this way, so the result is the same however
//! a chain of compositions is grouped.

use serde::{Deserialize, Serialize};
use tracing::trace;

use otdiff_core::ComposeAdapter;
use otdiff_types::{Path, Value};

/// What an edit does at its path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    /// Put a value into an empty slot; list elements after it shift up.
    Insert(Value),
    /// Take the value out of the slot; list elements after it shift down.
    Remove(Value),
    Replace { old: Value, new: Value },
    /// An embedded edit of the node at the path, interpreted by `edit_type`.
    Text { edit_type: String, payload: Value },
}

/// One path-addressed edit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edit {
    pub p: Path,
    #[serde(flatten)]
    pub action: EditAction,
}

impl Edit {
    pub fn new(p: Path, action: EditAction) -> Self {
        Self { p, action }
    }

    /// Returns `true` if applying `self` then `next` leaves the document
    /// as it was.
    pub fn is_undone_by(&self, next: &Edit) -> bool {
        if self.p != next.p {
            return false;
        }
        match (&self.action, &next.action) {
            (EditAction::Insert(a), EditAction::Remove(b))
            | (EditAction::Remove(a), EditAction::Insert(b)) => a == b,
            (
                EditAction::Replace { old, new },
                EditAction::Replace {
                    old: undo_old,
                    new: undo_new,
                },
            ) => old == undo_new && new == undo_old,
            _ => false,
        }
    }
}

/// An ordered sequence of edits.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComposedOp(Vec<Edit>);

impl ComposedOp {
    /// The empty operation.
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn single(edit: Edit) -> Self {
        Self(vec![edit])
    }

    pub fn edits(&self) -> &[Edit] {
        &self.0
    }

    pub fn into_edits(self) -> Vec<Edit> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `self` followed by `next`.
    pub fn then(mut self, next: ComposedOp) -> Self {
        for edit in next.0 {
            match self.0.last() {
                Some(last) if last.is_undone_by(&edit) => {
                    trace!(path = %edit.p, "edit cancelled by its inverse");
                    self.0.pop();
                }
                _ => self.0.push(edit),
            }
        }
        self
    }
}

impl From<Vec<Edit>> for ComposedOp {
    /// Reduce `edits` the same way composition does.
    fn from(edits: Vec<Edit>) -> Self {
        edits
            .into_iter()
            .fold(Self::noop(), |acc, edit| acc.then(Self::single(edit)))
    }
}

impl IntoIterator for ComposedOp {
    type Item = Edit;
    type IntoIter = std::vec::IntoIter<Edit>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// [`ComposeAdapter`] producing [`ComposedOp`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequenceAdapter;

impl ComposeAdapter for SequenceAdapter {
    type Op = ComposedOp;

    fn noop(&self) -> ComposedOp {
        ComposedOp::noop()
    }

    fn insert_op(&self, path: &Path, value: &Value) -> ComposedOp {
        ComposedOp::single(Edit::new(path.clone(), EditAction::Insert(value.clone())))
    }

    fn remove_op(&self, path: &Path, value: &Value) -> ComposedOp {
        ComposedOp::single(Edit::new(path.clone(), EditAction::Remove(value.clone())))
    }

    fn replace_op(&self, path: &Path, old: &Value, new: &Value) -> ComposedOp {
        let action = EditAction::Replace {
            old: old.clone(),
            new: new.clone(),
        };
        ComposedOp::single(Edit::new(path.clone(), action))
    }

    fn edit_op(&self, path: &Path, edit_type: &str, payload: Value) -> ComposedOp {
        let action = EditAction::Text {
            edit_type: edit_type.to_string(),
            payload,
        };
        ComposedOp::single(Edit::new(path.clone(), action))
    }

    fn compose(&self, a: ComposedOp, b: ComposedOp) -> ComposedOp {
        a.then(b)
    }
}
