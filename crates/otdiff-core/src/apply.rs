//! Applying flat operations to a document.
//!
//! Follows the consumer semantics the flat encoding is written for: records
//! apply left to right, list inserts splice (clamped to the list length),
//! and a record with both an insert and a delete field replaces in place.
//! The input document is cloned, never modified.

use otdiff_types::{Path, PathSegment, Value, ValueKind};

use crate::encoding::FlatOp;
use crate::error::{DiffError, DiffResult};

/// Apply `ops` to a copy of `doc`.
pub fn apply_flat(doc: &Value, ops: &[FlatOp]) -> DiffResult<Value> {
    let mut doc = doc.clone();
    for op in ops {
        apply_op(&mut doc, op)?;
    }
    Ok(doc)
}

fn apply_op(doc: &mut Value, op: &FlatOp) -> DiffResult<()> {
    if op.is_text() {
        apply_text(doc, op)
    } else if op.is_list() {
        apply_list(doc, op)
    } else if op.is_object() {
        apply_object(doc, op)
    } else {
        Ok(())
    }
}

fn resolve_mut<'v>(doc: &'v mut Value, segments: &[PathSegment], path: &Path) -> DiffResult<&'v mut Value> {
    let mut node = doc;
    for segment in segments {
        let kind = ValueKind::of(node);
        node = match (node, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map
                .get_mut(key)
                .ok_or_else(|| DiffError::apply(path, format!("missing key {key:?}")))?,
            (Value::Array(items), PathSegment::Index(index)) => {
                let len = items.len();
                items.get_mut(*index).ok_or_else(|| {
                    DiffError::apply(path, format!("index {index} out of bounds (len {len})"))
                })?
            }
            _ => {
                return Err(DiffError::apply(
                    path,
                    format!("cannot step into {kind} with segment {segment}"),
                ))
            }
        };
    }
    Ok(node)
}

fn apply_text(doc: &mut Value, op: &FlatOp) -> DiffResult<()> {
    let offset = op
        .p
        .last_index()
        .ok_or_else(|| DiffError::apply(&op.p, "text operation needs a trailing offset"))?;
    let Value::String(text) = resolve_mut(doc, op.p.parent_segments(), &op.p)? else {
        return Err(DiffError::apply(&op.p, "text operation on a non-string"));
    };

    if let Some(deleted) = &op.sd {
        let start = byte_offset(text, offset)
            .ok_or_else(|| DiffError::apply(&op.p, BAD_TEXT_OFFSET))?;
        if !text[start..].starts_with(deleted.as_str()) {
            return Err(DiffError::apply(&op.p, "deleted text does not match"));
        }
        text.replace_range(start..start + deleted.len(), "");
    }
    if let Some(inserted) = &op.si {
        let start = byte_offset(text, offset)
            .ok_or_else(|| DiffError::apply(&op.p, BAD_TEXT_OFFSET))?;
        text.insert_str(start, inserted);
    }
    Ok(())
}

fn apply_list(doc: &mut Value, op: &FlatOp) -> DiffResult<()> {
    let index = op
        .p
        .last_index()
        .ok_or_else(|| DiffError::apply(&op.p, "list operation needs a trailing index"))?;
    let Value::Array(items) = resolve_mut(doc, op.p.parent_segments(), &op.p)? else {
        return Err(DiffError::apply(&op.p, "list operation on a non-list"));
    };

    match (&op.ld, &op.li) {
        (Some(_), Some(inserted)) => {
            let slot = items
                .get_mut(index)
                .ok_or_else(|| DiffError::apply(&op.p, "replace index out of bounds"))?;
            *slot = inserted.clone();
        }
        (Some(_), None) => {
            if index >= items.len() {
                return Err(DiffError::apply(&op.p, "delete index out of bounds"));
            }
            items.remove(index);
        }
        (None, Some(inserted)) => {
            let index = index.min(items.len());
            items.insert(index, inserted.clone());
        }
        (None, None) => {}
    }
    Ok(())
}

fn apply_object(doc: &mut Value, op: &FlatOp) -> DiffResult<()> {
    let Some(PathSegment::Key(key)) = op.p.last() else {
        if op.p.is_empty() {
            // The root slot.
            *doc = op.oi.clone().unwrap_or(Value::Null);
            return Ok(());
        }
        return Err(DiffError::apply(&op.p, "object operation needs a trailing key"));
    };
    let Value::Object(map) = resolve_mut(doc, op.p.parent_segments(), &op.p)? else {
        return Err(DiffError::apply(&op.p, "object operation on a non-map"));
    };

    if op.od.is_some() {
        map.remove(key);
    }
    if let Some(inserted) = &op.oi {
        map.insert(key.clone(), inserted.clone());
    }
    Ok(())
}

/// Byte index of the `chars`-th character; the string length when `chars`
/// is exactly the character count.
const BAD_TEXT_OFFSET: &str = "offset past end of string or inside a surrogate pair";

/// Byte index of UTF-16 offset `units` in `text`; `None` past the end or
/// inside a surrogate pair.
fn byte_offset(text: &str, units: usize) -> Option<usize> {
    let mut seen = 0;
    for (byte, c) in text.char_indices() {
        if seen == units {
            return Some(byte);
        }
        seen += c.len_utf16();
        if seen > units {
            return None;
        }
    }
    (seen == units).then_some(text.len())
}
