//! Recursive tree comparison.
//!
//! Walks both documents in lock-step by path and decides per node whether to
//! skip, insert, remove, replace, recurse, or hand a pair of strings to the
//! string patcher. Both documents are only ever borrowed.

use tracing::trace;

use otdiff_types::{json_equal, Path, Value};

use crate::char_diff::CharDiff;
use crate::encoding::{Encoding, ListStrategy, Target};
use crate::error::DiffResult;
use crate::string_patch::string_ops;

/// Running address bookkeeping for one shifted list walk.
///
/// `shift` is the net number of pure inserts minus pure deletes emitted so
/// far for direct children of the list; `len` is the list length with those
/// operations applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ListCursor {
    shift: isize,
    len: usize,
}

impl ListCursor {
    pub(crate) fn new(len: usize) -> Self {
        Self { shift: 0, len }
    }

    /// Index at which slot `slot` is found in the partially edited list.
    /// Never past the end, matching splice semantics on the consumer side.
    pub(crate) fn address(&self, slot: usize) -> usize {
        let shifted = (slot as isize + self.shift).max(0) as usize;
        shifted.min(self.len)
    }

    /// Account for the slot just visited.
    pub(crate) fn advance(self, had_input: bool, has_output: bool) -> Self {
        match (had_input, has_output) {
            (false, true) => Self {
                shift: self.shift + 1,
                len: self.len + 1,
            },
            (true, false) => Self {
                shift: self.shift - 1,
                len: self.len - 1,
            },
            _ => self,
        }
    }
}

/// The recursive comparator.
pub struct TreeDiffer<'a, E: Encoding> {
    encoding: &'a E,
    char_diff: Option<&'a dyn CharDiff>,
}

impl<'a, E: Encoding> TreeDiffer<'a, E> {
    pub fn new(encoding: &'a E, char_diff: Option<&'a dyn CharDiff>) -> Self {
        Self {
            encoding,
            char_diff,
        }
    }

    /// Raw operations turning `input` into `output`, before optimization.
    pub fn diff(&self, input: &Value, output: &Value) -> DiffResult<Vec<E::Op>> {
        let mut ops = Vec::new();
        self.diff_node(Some(input), Some(output), &Path::root(), Target::Root, &mut ops)?;
        Ok(ops)
    }

    fn diff_node(
        &self,
        input: Option<&Value>,
        output: Option<&Value>,
        path: &Path,
        target: Target,
        ops: &mut Vec<E::Op>,
    ) -> DiffResult<()> {
        let (input, output) = match (input, output) {
            (Some(input), Some(output)) if json_equal(input, output) => return Ok(()),
            (Some(input), Some(output)) => (input, output),
            (Some(input), None) => {
                trace!(%path, "remove");
                ops.push(self.encoding.remove(path, target, input));
                return Ok(());
            }
            (None, Some(output)) => {
                trace!(%path, "insert");
                ops.push(self.encoding.insert(path, target, output));
                return Ok(());
            }
            (None, None) => return Ok(()),
        };

        match (input, output) {
            (Value::String(old), Value::String(new)) if self.encoding.supports_text() => {
                match self.char_diff {
                    Some(engine) => {
                        trace!(%path, "patch string");
                        ops.extend(string_ops(self.encoding, path, old, new, engine)?);
                    }
                    None => ops.push(self.encoding.replace(path, target, input, output)),
                }
            }
            (Value::Array(old), Value::Array(new)) => match self.encoding.list_strategy() {
                ListStrategy::Shifted => self.diff_list_shifted(old, new, path, ops)?,
                ListStrategy::Positional => self.diff_list_positional(old, new, path, ops)?,
            },
            (Value::Object(old), Value::Object(new)) => {
                for (key, before) in old {
                    let child = path.child(key.as_str());
                    self.diff_node(Some(before), new.get(key), &child, Target::Map, ops)?;
                }
                for (key, after) in new.iter().filter(|(key, _)| !old.contains_key(*key)) {
                    let child = path.child(key.as_str());
                    self.diff_node(None, Some(after), &child, Target::Map, ops)?;
                }
            }
            // Primitives, kind changes, and strings without text support.
            _ => {
                trace!(%path, "replace");
                ops.push(self.encoding.replace(path, target, input, output));
            }
        }
        Ok(())
    }

    fn diff_list_shifted(
        &self,
        old: &[Value],
        new: &[Value],
        path: &Path,
        ops: &mut Vec<E::Op>,
    ) -> DiffResult<()> {
        let slots = old.len().max(new.len());
        (0..slots).try_fold(ListCursor::new(old.len()), |cursor, slot| -> DiffResult<_> {
            let (before, after) = (old.get(slot), new.get(slot));
            let child = path.child(cursor.address(slot));
            self.diff_node(before, after, &child, Target::List, ops)?;
            Ok(cursor.advance(before.is_some(), after.is_some()))
        })?;
        Ok(())
    }

    fn diff_list_positional(
        &self,
        old: &[Value],
        new: &[Value],
        path: &Path,
        ops: &mut Vec<E::Op>,
    ) -> DiffResult<()> {
        let common = old.len().min(new.len());
        for (slot, (before, after)) in old.iter().zip(new).enumerate() {
            self.diff_node(Some(before), Some(after), &path.child(slot), Target::List, ops)?;
        }
        for (slot, after) in new.iter().enumerate().skip(common) {
            ops.push(self.encoding.insert(&path.child(slot), Target::List, after));
        }
        // Every surplus element sits at the boundary once the previous one
        // is gone.
        let boundary = path.child(common);
        for before in old.iter().skip(common) {
            ops.push(self.encoding.remove(&boundary, Target::List, before));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::char_diff::SimilarCharDiff;
    use crate::encoding::{FlatEncoding, FlatOp};
    use otdiff_types::path;
    use serde_json::json;

    fn raw(input: Value, output: Value) -> Vec<FlatOp> {
        TreeDiffer::new(&FlatEncoding, None).diff(&input, &output).unwrap()
    }

    #[test]
    fn cursor_tracks_inserts_and_deletes() {
        let cursor = ListCursor::new(2);
        assert_eq!(cursor.address(1), 1);
        let cursor = cursor.advance(true, false);
        assert_eq!(cursor.address(2), 1);
        let cursor = cursor.advance(true, true);
        assert_eq!(cursor.address(2), 1);
    }

    #[test]
    fn cursor_never_addresses_past_the_end() {
        let cursor = ListCursor::new(0);
        assert_eq!(cursor.address(0), 0);
        let cursor = cursor.advance(false, true);
        assert_eq!(cursor.address(1), 1);
        let cursor = cursor.advance(false, true);
        assert_eq!(cursor.address(2), 2);
    }

    #[test]
    fn equal_documents_produce_nothing() {
        assert!(raw(json!({"a": [1, 2]}), json!({"a": [1, 2]})).is_empty());
    }

    #[test]
    fn list_and_map_are_never_equal() {
        let ops = raw(json!([]), json!({}));
        assert_eq!(ops, vec![FlatOp::object_replace(Path::root(), json!([]), json!({}))]);
    }

    #[test]
    fn tail_inserts_get_consecutive_indices() {
        let ops = raw(json!([]), json!(["a", "b", "c"]));
        assert_eq!(
            ops,
            vec![
                FlatOp::list_insert(path![0], json!("a")),
                FlatOp::list_insert(path![1], json!("b")),
                FlatOp::list_insert(path![2], json!("c")),
            ]
        );
    }

    #[test]
    fn tail_deletes_share_the_boundary() {
        let ops = raw(json!(["a", "b", "c"]), json!(["x"]));
        assert_eq!(
            ops,
            vec![
                FlatOp::list_replace(path![0], json!("a"), json!("x")),
                FlatOp::list_delete(path![1], json!("b")),
                FlatOp::list_delete(path![1], json!("c")),
            ]
        );
    }

    #[test]
    fn map_keys_before_then_after_only() {
        let ops = raw(json!({"a": 1, "b": 2}), json!({"b": 3, "c": 4}));
        assert_eq!(
            ops,
            vec![
                FlatOp::object_delete(path!["a"], json!(1)),
                FlatOp::object_replace(path!["b"], json!(2), json!(3)),
                FlatOp::object_insert(path!["c"], json!(4)),
            ]
        );
    }

    #[test]
    fn list_versus_map_child_is_replaced_whole() {
        let ops = raw(json!({"k": [1]}), json!({"k": {"0": 1}}));
        assert_eq!(
            ops,
            vec![FlatOp::object_replace(path!["k"], json!([1]), json!({"0": 1}))]
        );
    }

    #[test]
    fn null_is_a_primitive() {
        let ops = raw(json!([null]), json!([{"a": 1}]));
        assert_eq!(ops, vec![FlatOp::list_replace(path![0], json!(null), json!({"a": 1}))]);
    }

    #[test]
    fn strings_without_engine_are_replaced() {
        let ops = raw(json!({"s": "one"}), json!({"s": "two"}));
        assert_eq!(ops, vec![FlatOp::object_replace(path!["s"], json!("one"), json!("two"))]);
    }

    #[test]
    fn strings_with_engine_are_patched() {
        let engine = SimilarCharDiff::default();
        let ops = TreeDiffer::new(&FlatEncoding, Some(&engine))
            .diff(&json!({"s": "1234"}), &json!({"s": "1234xyz"}))
            .unwrap();
        assert_eq!(ops, vec![FlatOp::string_insert(path!["s", 4], "xyz")]);
    }

    #[test]
    fn string_against_number_is_replaced() {
        let engine = SimilarCharDiff::default();
        let ops = TreeDiffer::new(&FlatEncoding, Some(&engine))
            .diff(&json!(["1"]), &json!([1]))
            .unwrap();
        assert_eq!(ops, vec![FlatOp::list_replace(path![0], json!("1"), json!(1))]);
    }

    #[test]
    fn nested_paths_accumulate() {
        let ops = raw(json!({"a": [{"b": true}]}), json!({"a": [{"b": false}]}));
        assert_eq!(
            ops,
            vec![FlatOp::object_replace(path!["a", 0, "b"], json!(true), json!(false))]
        );
    }
}
