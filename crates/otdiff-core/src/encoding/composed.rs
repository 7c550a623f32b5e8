//! The compositional encoding.
//!
//! Operations are built through a [`ComposeAdapter`] supplied by the OT type
//! and merged with its associative `compose`. Index shifting between sibling
//! operations is the adapter's business, so the differ walks lists
//! positionally here.

use std::fmt;

use otdiff_types::{Path, Value};

use crate::encoding::{Encoding, ListStrategy, Target, TextEdit};
use crate::error::{DiffError, DiffResult};

/// Constructors and merge function of a compositional OT type.
pub trait ComposeAdapter {
    type Op: Clone + fmt::Debug;

    /// The neutral operation; composing with it changes nothing.
    fn noop(&self) -> Self::Op;

    fn insert_op(&self, path: &Path, value: &Value) -> Self::Op;

    fn remove_op(&self, path: &Path, value: &Value) -> Self::Op;

    fn replace_op(&self, path: &Path, old: &Value, new: &Value) -> Self::Op;

    /// An embedded edit of the given sub-type on the node at `path`.
    fn edit_op(&self, path: &Path, edit_type: &str, payload: Value) -> Self::Op;

    /// `a` followed by `b`, as one operation. Must be associative.
    fn compose(&self, a: Self::Op, b: Self::Op) -> Self::Op;
}

/// Produces the payload of an embedded text edit.
///
/// Implementations may translate the character offsets they receive into
/// whatever unit their text type counts in.
pub trait TextEdits {
    /// Name of the embedded text type, passed to [`ComposeAdapter::edit_op`].
    fn edit_type(&self) -> &str;

    fn insert(&self, offset: usize, text: &str) -> Value;

    fn remove(&self, offset: usize, text: &str) -> Value;
}

/// Stand-in for "no text collaborator"; it has no values.
#[derive(Clone, Copy, Debug)]
pub enum NoTextEdits {}

impl TextEdits for NoTextEdits {
    fn edit_type(&self) -> &str {
        match *self {}
    }

    fn insert(&self, _offset: usize, _text: &str) -> Value {
        match *self {}
    }

    fn remove(&self, _offset: usize, _text: &str) -> Value {
        match *self {}
    }
}

/// The compositional encoding over an adapter `A` and an optional text
/// collaborator `U`.
#[derive(Clone, Debug)]
pub struct ComposedEncoding<A, U = NoTextEdits> {
    adapter: A,
    text: Option<U>,
}

impl<A: ComposeAdapter> ComposedEncoding<A, NoTextEdits> {
    /// Without a text collaborator; changed strings are replaced whole.
    pub fn without_text(adapter: A) -> Self {
        Self {
            adapter,
            text: None,
        }
    }
}

impl<A: ComposeAdapter, U: TextEdits> ComposedEncoding<A, U> {
    pub fn new(adapter: A, text: U) -> Self {
        Self {
            adapter,
            text: Some(text),
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }
}

impl<A: ComposeAdapter, U: TextEdits> Encoding for ComposedEncoding<A, U> {
    type Op = A::Op;
    type Output = A::Op;

    fn insert(&self, path: &Path, _target: Target, value: &Value) -> A::Op {
        self.adapter.insert_op(path, value)
    }

    fn remove(&self, path: &Path, _target: Target, value: &Value) -> A::Op {
        self.adapter.remove_op(path, value)
    }

    fn replace(&self, path: &Path, _target: Target, old: &Value, new: &Value) -> A::Op {
        self.adapter.replace_op(path, old, new)
    }

    /// Text payloads are positioned in code points.
    fn text_edit(&self, path: &Path, edit: TextEdit<'_>) -> DiffResult<A::Op> {
        let text = self
            .text
            .as_ref()
            .ok_or_else(|| DiffError::TextEditsUnsupported(path.clone()))?;
        let payload = match edit {
            TextEdit::Insert { char_offset, text: inserted, .. } => {
                text.insert(char_offset, inserted)
            }
            TextEdit::Remove { char_offset, text: removed, .. } => {
                text.remove(char_offset, removed)
            }
        };
        Ok(self.adapter.edit_op(path, text.edit_type(), payload))
    }

    fn supports_text(&self) -> bool {
        self.text.is_some()
    }

    fn list_strategy(&self) -> ListStrategy {
        ListStrategy::Positional
    }

    fn optimize(&self, ops: Vec<A::Op>) -> A::Op {
        ops.into_iter()
            .fold(self.adapter.noop(), |acc, op| self.adapter.compose(acc, op))
    }
}
