//! Compositional operation type for otdiff.
//!
//! Provides the adapter the compositional encoding builds operations with,
//! a `text-unicode` collaborator for in-place string edits, and an applier
//! for the resulting [`ComposedOp`]s.
//!
//! ```
//! use otdiff_compose::{apply, diff};
//! use serde_json::json;
//!
//! let before = json!({"title": "draft", "tags": ["a", "b"]});
//! let after = json!({"title": "final draft", "tags": ["a"]});
//! let op = diff(&before, &after).unwrap();
//! assert_eq!(apply(&before, &op).unwrap(), after);
//! ```

pub mod apply;
pub mod error;
pub mod op;
pub mod text;

pub use apply::apply;
pub use error::{ComposeError, ComposeResult};
pub use op::{ComposedOp, Edit, EditAction, SequenceAdapter};
pub use text::{apply_text_unicode, TextUnicode, TEXT_UNICODE};

use otdiff_core::{compute_diff, ComposedEncoding, DiffOptions};
use otdiff_types::Value;

/// The compositional encoding with in-place `text-unicode` string edits.
pub fn encoding() -> ComposedEncoding<SequenceAdapter, TextUnicode> {
    ComposedEncoding::new(SequenceAdapter, TextUnicode)
}

/// The compositional encoding; changed strings are replaced whole.
pub fn encoding_without_text() -> ComposedEncoding<SequenceAdapter> {
    ComposedEncoding::without_text(SequenceAdapter)
}

/// Single composed operation turning `input` into `output`, with strings
/// patched by the shared character diff engine.
pub fn diff(input: &Value, output: &Value) -> ComposeResult<ComposedOp> {
    let options = DiffOptions::composed(SequenceAdapter, TextUnicode).with_shared_char_diff();
    Ok(compute_diff(input, output, &options)?)
}
