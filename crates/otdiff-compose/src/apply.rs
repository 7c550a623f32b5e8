//! Applying composed operations to a document.
//!
//! Edits apply left to right. The container holding the addressed slot
//! decides the meaning: in a list, inserts and removes splice; in a map,
//! they add or drop the key. The root slot holds the whole document.

use tracing::debug;

use otdiff_types::{Path, PathSegment, Value, ValueKind};

use crate::error::{ComposeError, ComposeResult};
use crate::op::{ComposedOp, Edit, EditAction};
use crate::text::{apply_text_unicode, TEXT_UNICODE};

/// Apply `op` to a copy of `doc`.
pub fn apply(doc: &Value, op: &ComposedOp) -> ComposeResult<Value> {
    let mut doc = doc.clone();
    for edit in op.edits() {
        apply_edit(&mut doc, edit)?;
    }
    debug!(edits = op.len(), "applied composed operation");
    Ok(doc)
}

fn apply_edit(doc: &mut Value, edit: &Edit) -> ComposeResult<()> {
    if let EditAction::Text { edit_type, payload } = &edit.action {
        if edit_type != TEXT_UNICODE {
            return Err(ComposeError::UnknownEditType(edit_type.clone()));
        }
        let node = resolve_mut(doc, edit.p.segments(), &edit.p)?;
        let kind = ValueKind::of(node);
        let Value::String(text) = node else {
            return Err(ComposeError::BadContainer {
                path: edit.p.clone(),
                kind,
            });
        };
        *text = apply_text_unicode(text, payload, &edit.p)?;
        return Ok(());
    }

    let Some(slot) = edit.p.last() else {
        return apply_root(doc, edit);
    };
    let parent = resolve_mut(doc, edit.p.parent_segments(), &edit.p)?;
    match (parent, slot) {
        (Value::Array(items), PathSegment::Index(index)) => apply_list(items, *index, edit),
        (Value::Object(map), PathSegment::Key(key)) => {
            match &edit.action {
                EditAction::Insert(value) => {
                    map.insert(key.clone(), value.clone());
                }
                EditAction::Remove(value) | EditAction::Replace { old: value, .. } => {
                    let current = map
                        .get(key)
                        .ok_or_else(|| ComposeError::Missing(edit.p.clone()))?;
                    if current != value {
                        return Err(ComposeError::Mismatch(edit.p.clone()));
                    }
                    match &edit.action {
                        EditAction::Replace { new, .. } => {
                            map.insert(key.clone(), new.clone());
                        }
                        _ => {
                            map.remove(key);
                        }
                    }
                }
                EditAction::Text { .. } => {}
            }
            Ok(())
        }
        (parent, _) => Err(ComposeError::BadContainer {
            path: edit.p.clone(),
            kind: ValueKind::of(parent),
        }),
    }
}

fn apply_root(doc: &mut Value, edit: &Edit) -> ComposeResult<()> {
    match &edit.action {
        EditAction::Insert(value) | EditAction::Replace { new: value, .. } => {
            *doc = value.clone();
        }
        EditAction::Remove(_) => *doc = Value::Null,
        EditAction::Text { .. } => {}
    }
    Ok(())
}

fn apply_list(items: &mut Vec<Value>, index: usize, edit: &Edit) -> ComposeResult<()> {
    let len = items.len();
    let out_of_bounds = || ComposeError::OutOfBounds {
        path: edit.p.clone(),
        index,
        len,
    };
    match &edit.action {
        EditAction::Insert(value) => {
            if index > len {
                return Err(out_of_bounds());
            }
            items.insert(index, value.clone());
        }
        EditAction::Remove(value) => {
            if items.get(index).ok_or_else(out_of_bounds)? != value {
                return Err(ComposeError::Mismatch(edit.p.clone()));
            }
            items.remove(index);
        }
        EditAction::Replace { old, new } => {
            let slot = items.get_mut(index).ok_or_else(out_of_bounds)?;
            if *slot != *old {
                return Err(ComposeError::Mismatch(edit.p.clone()));
            }
            *slot = new.clone();
        }
        EditAction::Text { .. } => {}
    }
    Ok(())
}

fn resolve_mut<'v>(
    doc: &'v mut Value,
    segments: &[PathSegment],
    path: &Path,
) -> ComposeResult<&'v mut Value> {
    let mut node = doc;
    for segment in segments {
        node = match (node, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map
                .get_mut(key)
                .ok_or_else(|| ComposeError::Missing(path.clone()))?,
            (Value::Array(items), PathSegment::Index(index)) => {
                let len = items.len();
                items.get_mut(*index).ok_or_else(|| ComposeError::OutOfBounds {
                    path: path.clone(),
                    index: *index,
                    len,
                })?
            }
            (other, _) => {
                return Err(ComposeError::BadContainer {
                    path: path.clone(),
                    kind: ValueKind::of(other),
                })
            }
        };
    }
    Ok(node)
}
