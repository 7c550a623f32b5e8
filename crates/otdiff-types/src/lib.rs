//! Foundation types for otdiff.
//!
//! Every other otdiff crate depends on `otdiff-types` for the way it
//! addresses nodes inside a JSON document and the way it compares them.
//!
//! # Key Types
//!
//! - [`Path`] / [`PathSegment`] — Location of a node (map key / list index / string offset)
//! - [`ValueKind`] — The six JSON node kinds, with container-kind awareness
//! - [`json_equal`] — Structural equality used by the "nothing changed" short-circuit

pub mod equal;
pub mod kind;
pub mod path;

pub use equal::json_equal;
pub use kind::ValueKind;
pub use path::{Path, PathSegment};

/// The document model: any JSON-compatible value.
pub use serde_json::Value;
