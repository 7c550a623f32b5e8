//! Diff engine for otdiff.
//!
//! Computes the ordered operations that turn one JSON document into another,
//! in the shape an operational-transform engine consumes. Strings can be
//! patched character by character; everything else is inserted, removed or
//! replaced at the deepest path that changed.
//!
//! # Key Types
//!
//! - [`TreeDiffer`] -- Recursive comparator over two documents
//! - [`Encoding`] -- Operation shape: [`FlatEncoding`] or [`ComposedEncoding`]
//! - [`CharDiff`] / [`SimilarCharDiff`] -- Character-level diff of string leaves
//! - [`DiffOptions`] / [`DiffConfig`] -- Per-call options and serializable settings
//!
//! ```
//! use otdiff_core::{compute_diff, DiffOptions, FlatOp};
//! use otdiff_types::path;
//! use serde_json::json;
//!
//! let ops = compute_diff(&json!({"one": 1}), &json!({"one": 2}), &DiffOptions::flat()).unwrap();
//! assert_eq!(ops, vec![FlatOp::object_replace(path!["one"], json!(1), json!(2))]);
//! ```

pub mod apply;
pub mod char_diff;
pub mod config;
pub mod differ;
pub mod encoding;
pub mod error;
pub mod optimize;
pub mod string_patch;

pub use apply::apply_flat;
pub use char_diff::{shared_char_diff, CharDiff, Hunk, HunkTag, Patch, SimilarCharDiff};
pub use config::{CharDiffConfig, DiffAlgorithm, DiffConfig};
pub use differ::TreeDiffer;
pub use encoding::{
    ComposeAdapter, ComposedEncoding, Encoding, FlatEncoding, FlatOp, ListStrategy, NoTextEdits,
    Target, TextEdit, TextEdits,
};
pub use error::{DiffError, DiffResult};

use tracing::debug;

use otdiff_types::Value;

/// What to diff with: an encoding and, optionally, a character diff engine.
///
/// Without an engine, changed strings are replaced whole.
pub struct DiffOptions<'a, E> {
    pub encoding: E,
    pub char_diff: Option<&'a dyn CharDiff>,
}

impl DiffOptions<'static, FlatEncoding> {
    /// Flat encoding, no string patching.
    pub fn flat() -> Self {
        Self::new(FlatEncoding)
    }
}

impl<A: ComposeAdapter, U: TextEdits> DiffOptions<'static, ComposedEncoding<A, U>> {
    /// Compositional encoding over `adapter`, with text edits built by `text`.
    pub fn composed(adapter: A, text: U) -> Self {
        Self::new(ComposedEncoding::new(adapter, text))
    }
}

impl<'a, E: Encoding> DiffOptions<'a, E> {
    pub fn new(encoding: E) -> Self {
        Self {
            encoding,
            char_diff: None,
        }
    }

    /// Patch strings with `engine`.
    pub fn with_char_diff<'b>(self, engine: &'b dyn CharDiff) -> DiffOptions<'b, E> {
        DiffOptions {
            encoding: self.encoding,
            char_diff: Some(engine),
        }
    }

    /// Patch strings with the process-wide default engine.
    pub fn with_shared_char_diff(self) -> Self {
        Self {
            char_diff: Some(shared_char_diff()),
            ..self
        }
    }
}

/// Operations turning `input` into `output`, optimized for the encoding.
///
/// Fails only if the character diff engine reports a hunk type it should
/// not; in that case nothing is returned.
pub fn compute_diff<E: Encoding>(
    input: &Value,
    output: &Value,
    options: &DiffOptions<'_, E>,
) -> DiffResult<E::Output> {
    let ops = diff_raw(input, output, options)?;
    debug!(raw_ops = ops.len(), strings = options.char_diff.is_some(), "diff computed");
    Ok(options.encoding.optimize(ops))
}

/// The differ's output before optimization.
pub fn diff_raw<E: Encoding>(
    input: &Value,
    output: &Value,
    options: &DiffOptions<'_, E>,
) -> DiffResult<Vec<E::Op>> {
    TreeDiffer::new(&options.encoding, options.char_diff).diff(input, output)
}
