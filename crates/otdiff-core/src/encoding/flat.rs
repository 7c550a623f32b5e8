//! The flat encoding: one self-contained record per operation.
//!
//! Records carry a path `p` plus payload fields: `oi`/`od` for map entries,
//! `li`/`ld` for list elements, `si`/`sd` for text at a character offset.
//! An insert and a delete field on the same record express a replace.
//! Records apply strictly left to right.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use otdiff_types::{Path, Value};

use crate::encoding::{Encoding, ListStrategy, Target, TextEdit};
use crate::error::DiffResult;
use crate::optimize::cancel_adjacent;

/// A single flat operation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatOp {
    pub p: Path,
    /// Map insert.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub oi: Option<Value>,
    /// Map delete.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub od: Option<Value>,
    /// List insert.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub li: Option<Value>,
    /// List delete.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub ld: Option<Value>,
    /// String insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub si: Option<String>,
    /// String delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sd: Option<String>,
}

/// A field that is present always deserializes to `Some`, even when its
/// value is JSON `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl FlatOp {
    /// An operation at `p` with no payload yet.
    pub fn at(p: Path) -> Self {
        Self {
            p,
            ..Default::default()
        }
    }

    pub fn object_insert(p: Path, value: Value) -> Self {
        Self {
            oi: Some(value),
            ..Self::at(p)
        }
    }

    pub fn object_delete(p: Path, value: Value) -> Self {
        Self {
            od: Some(value),
            ..Self::at(p)
        }
    }

    pub fn object_replace(p: Path, old: Value, new: Value) -> Self {
        Self {
            od: Some(old),
            oi: Some(new),
            ..Self::at(p)
        }
    }

    pub fn list_insert(p: Path, value: Value) -> Self {
        Self {
            li: Some(value),
            ..Self::at(p)
        }
    }

    pub fn list_delete(p: Path, value: Value) -> Self {
        Self {
            ld: Some(value),
            ..Self::at(p)
        }
    }

    pub fn list_replace(p: Path, old: Value, new: Value) -> Self {
        Self {
            ld: Some(old),
            li: Some(new),
            ..Self::at(p)
        }
    }

    pub fn string_insert(p: Path, text: impl Into<String>) -> Self {
        Self {
            si: Some(text.into()),
            ..Self::at(p)
        }
    }

    pub fn string_delete(p: Path, text: impl Into<String>) -> Self {
        Self {
            sd: Some(text.into()),
            ..Self::at(p)
        }
    }

    /// Returns `true` if only the path is left.
    pub fn is_noop(&self) -> bool {
        self.oi.is_none()
            && self.od.is_none()
            && self.li.is_none()
            && self.ld.is_none()
            && self.si.is_none()
            && self.sd.is_none()
    }

    pub fn is_text(&self) -> bool {
        self.si.is_some() || self.sd.is_some()
    }

    pub fn is_list(&self) -> bool {
        self.li.is_some() || self.ld.is_some()
    }

    pub fn is_object(&self) -> bool {
        self.oi.is_some() || self.od.is_some()
    }
}

/// The flat encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlatEncoding;

impl Encoding for FlatEncoding {
    type Op = FlatOp;
    type Output = Vec<FlatOp>;

    fn insert(&self, path: &Path, target: Target, value: &Value) -> FlatOp {
        match target {
            Target::List => FlatOp::list_insert(path.clone(), value.clone()),
            Target::Map | Target::Root => FlatOp::object_insert(path.clone(), value.clone()),
        }
    }

    fn remove(&self, path: &Path, target: Target, value: &Value) -> FlatOp {
        match target {
            Target::List => FlatOp::list_delete(path.clone(), value.clone()),
            Target::Map | Target::Root => FlatOp::object_delete(path.clone(), value.clone()),
        }
    }

    // A root replace is od/oi, never ld/li, even though it carries no key:
    // json0 applies an empty-path object op as a whole-document replace.
    fn replace(&self, path: &Path, target: Target, old: &Value, new: &Value) -> FlatOp {
        match target {
            Target::List => FlatOp::list_replace(path.clone(), old.clone(), new.clone()),
            Target::Map | Target::Root => {
                FlatOp::object_replace(path.clone(), old.clone(), new.clone())
            }
        }
    }

    fn text_edit(&self, path: &Path, edit: TextEdit<'_>) -> DiffResult<FlatOp> {
        Ok(match edit {
            TextEdit::Insert { offset, text, .. } => {
                FlatOp::string_insert(path.child(offset), text)
            }
            TextEdit::Remove { offset, text, .. } => {
                FlatOp::string_delete(path.child(offset), text)
            }
        })
    }

    fn supports_text(&self) -> bool {
        true
    }

    fn list_strategy(&self) -> ListStrategy {
        ListStrategy::Shifted
    }

    fn optimize(&self, ops: Vec<FlatOp>) -> Vec<FlatOp> {
        let before = ops.len();
        let ops = cancel_adjacent(ops);
        debug!(before, after = ops.len(), "flat ops optimized");
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otdiff_types::path;
    use serde_json::json;

    #[test]
    fn serializes_only_present_fields() {
        let op = FlatOp::list_insert(path![0], json!("one"));
        assert_eq!(serde_json::to_value(&op).unwrap(), json!({"p": [0], "li": "one"}));
    }

    #[test]
    fn null_payload_survives_roundtrip() {
        let op = FlatOp::object_insert(path!["k"], Value::Null);
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json, json!({"p": ["k"], "oi": null}));
        let parsed: FlatOp = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, op);
        assert!(!parsed.is_noop());
    }

    #[test]
    fn replace_uses_both_fields() {
        let op = FlatEncoding.replace(&path!["one"], Target::Map, &json!(1), &json!(2));
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"p": ["one"], "od": 1, "oi": 2})
        );
        let op = FlatEncoding.replace(&path![1], Target::List, &json!(2), &json!(3));
        assert_eq!(op, FlatOp::list_replace(path![1], json!(2), json!(3)));
    }

    #[test]
    fn root_replace_is_object_shaped() {
        let op = FlatEncoding.replace(&Path::root(), Target::Root, &json!([]), &json!({}));
        assert!(op.is_object());
        assert!(!op.is_list());
    }

    #[test]
    fn text_edits_append_offset() {
        let op = FlatEncoding
            .text_edit(&path!["one"], TextEdit::Insert { offset: 4, char_offset: 3, text: "xyz" })
            .unwrap();
        assert_eq!(op, FlatOp::string_insert(path!["one", 4], "xyz"));
        assert!(op.is_text());
    }

    #[test]
    fn path_only_is_noop() {
        assert!(FlatOp::at(path![3]).is_noop());
    }
}
