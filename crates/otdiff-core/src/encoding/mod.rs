//! Operation encodings.
//!
//! The differ is written once against [`Encoding`]. Each implementation
//! decides how a single insert, remove, replace or text edit looks, which
//! list strategy the differ should use, and how the final operation list
//! is normalized.

pub mod composed;
pub mod flat;

use std::fmt;

use otdiff_types::{Path, Value};

use crate::error::DiffResult;

pub use composed::{ComposeAdapter, ComposedEncoding, NoTextEdits, TextEdits};
pub use flat::{FlatEncoding, FlatOp};

/// Addressing mode of the slot an operation targets, decided by the
/// container that holds it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// The document root; no containing node.
    Root,
    /// An entry of a map.
    Map,
    /// An element of a list.
    List,
}

/// How the differ walks two lists of different shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListStrategy {
    /// Walk every slot and address each one as if all earlier operations
    /// on the same list were already applied.
    Shifted,
    /// Walk the common prefix positionally, then append trailing inserts
    /// or removes; the encoding's compose step settles final positions.
    Positional,
}

/// An in-place edit of a string leaf.
///
/// The position is given twice: `offset` in UTF-16 code units and
/// `char_offset` in Unicode scalar values. Each encoding picks the unit its
/// consumers index strings in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEdit<'a> {
    Insert { offset: usize, char_offset: usize, text: &'a str },
    Remove { offset: usize, char_offset: usize, text: &'a str },
}

/// Builds operations in the shape one OT type expects.
pub trait Encoding {
    /// A single operation.
    type Op: Clone + fmt::Debug;
    /// What [`Encoding::optimize`] hands back to the caller.
    type Output;

    fn insert(&self, path: &Path, target: Target, value: &Value) -> Self::Op;

    fn remove(&self, path: &Path, target: Target, value: &Value) -> Self::Op;

    /// Fused remove-then-insert at one path.
    fn replace(&self, path: &Path, target: Target, old: &Value, new: &Value) -> Self::Op;

    /// An edit inside the string at `path`.
    fn text_edit(&self, path: &Path, edit: TextEdit<'_>) -> DiffResult<Self::Op>;

    /// Whether [`Encoding::text_edit`] can be used at all. When it cannot,
    /// changed strings are replaced whole.
    fn supports_text(&self) -> bool;

    fn list_strategy(&self) -> ListStrategy;

    /// Normalize the raw operation list produced by the differ.
    fn optimize(&self, ops: Vec<Self::Op>) -> Self::Output;
}
