//! Turn the patches of a character diff into text operations.

use otdiff_types::Path;

use crate::char_diff::{CharDiff, HunkTag};
use crate::encoding::{Encoding, TextEdit};
use crate::error::{DiffError, DiffResult};

/// Text operations that turn the string at `path` from `old` into `new`.
///
/// Within a patch the offset starts at the patch start. A delete leaves it
/// where it is, an insert and an equal run both move it past their text.
/// Offsets are UTF-16 units into the partially patched string; the matching
/// code point offset is derived from the same working copy.
/// An unknown hunk code aborts with no partial result.
pub fn string_ops<E: Encoding>(
    encoding: &E,
    path: &Path,
    old: &str,
    new: &str,
    engine: &dyn CharDiff,
) -> DiffResult<Vec<E::Op>> {
    let mut ops = Vec::new();
    let mut units: Vec<u16> = old.encode_utf16().collect();

    for patch in engine.make_patches(old, new) {
        let mut offset = patch.start;
        for hunk in &patch.hunks {
            let tag = hunk.tag()?;
            let len = hunk.len_utf16();
            let end = offset + len;
            match tag {
                HunkTag::Delete => {
                    if end > units.len() {
                        return Err(out_of_range(end, &units));
                    }
                    let char_offset = char_offset(&units, offset)?;
                    let edit = TextEdit::Remove { offset, char_offset, text: &hunk.text };
                    ops.push(encoding.text_edit(path, edit)?);
                    units.drain(offset..end);
                }
                HunkTag::Insert => {
                    if offset > units.len() {
                        return Err(out_of_range(offset, &units));
                    }
                    let char_offset = char_offset(&units, offset)?;
                    let edit = TextEdit::Insert { offset, char_offset, text: &hunk.text };
                    ops.push(encoding.text_edit(path, edit)?);
                    units.splice(offset..offset, hunk.text.encode_utf16());
                    offset = end;
                }
                HunkTag::Equal => offset = end,
            }
        }
    }

    Ok(ops)
}

/// Code points before UTF-16 offset `offset` of `units`.
fn char_offset(units: &[u16], offset: usize) -> DiffResult<usize> {
    let prefix = units
        .get(..offset)
        .ok_or_else(|| out_of_range(offset, units))?;
    Ok(char::decode_utf16(prefix.iter().copied()).count())
}

fn out_of_range(offset: usize, units: &[u16]) -> DiffError {
    DiffError::PatchOutOfRange { offset, len: units.len() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::char_diff::{Hunk, Patch};
    use crate::encoding::{FlatEncoding, FlatOp, ListStrategy, Target};
    use otdiff_types::{path, Value};

    /// Returns a fixed list of patches.
    struct Canned(Vec<Patch>);

    impl CharDiff for Canned {
        fn make_patches(&self, _old: &str, _new: &str) -> Vec<Patch> {
            self.0.clone()
        }
    }

    /// Records every text edit it is handed.
    struct Recorder;

    impl Encoding for Recorder {
        type Op = (bool, usize, usize, String);
        type Output = Vec<Self::Op>;

        fn insert(&self, _: &Path, _: Target, _: &Value) -> Self::Op {
            unreachable!()
        }

        fn remove(&self, _: &Path, _: Target, _: &Value) -> Self::Op {
            unreachable!()
        }

        fn replace(&self, _: &Path, _: Target, _: &Value, _: &Value) -> Self::Op {
            unreachable!()
        }

        fn text_edit(&self, _: &Path, edit: TextEdit<'_>) -> DiffResult<Self::Op> {
            Ok(match edit {
                TextEdit::Insert { offset, char_offset, text } => {
                    (true, offset, char_offset, text.to_string())
                }
                TextEdit::Remove { offset, char_offset, text } => {
                    (false, offset, char_offset, text.to_string())
                }
            })
        }

        fn supports_text(&self) -> bool {
            true
        }

        fn list_strategy(&self) -> ListStrategy {
            ListStrategy::Shifted
        }

        fn optimize(&self, ops: Vec<Self::Op>) -> Self::Output {
            ops
        }
    }

    #[test]
    fn offsets_follow_hunks() {
        let engine = Canned(vec![Patch {
            start: 2,
            hunks: vec![
                Hunk::equal("ab"),
                Hunk::delete("cd"),
                Hunk::insert("XYZ"),
                Hunk::equal("e"),
                Hunk::insert("!"),
            ],
        }]);
        let ops = string_ops(&FlatEncoding, &path!["s"], "..abcde", "", &engine).unwrap();
        assert_eq!(
            ops,
            vec![
                FlatOp::string_delete(path!["s", 4], "cd"),
                FlatOp::string_insert(path!["s", 4], "XYZ"),
                FlatOp::string_insert(path!["s", 8], "!"),
            ]
        );
    }

    #[test]
    fn each_patch_restarts_at_its_start() {
        let engine = Canned(vec![
            Patch { start: 0, hunks: vec![Hunk::insert("a")] },
            Patch { start: 10, hunks: vec![Hunk::delete("b")] },
        ]);
        let ops = string_ops(&FlatEncoding, &Path::root(), "123456789b", "", &engine).unwrap();
        assert_eq!(
            ops,
            vec![
                FlatOp::string_insert(path![0], "a"),
                FlatOp::string_delete(path![10], "b"),
            ]
        );
    }

    #[test]
    fn unknown_hunk_aborts_everything() {
        let engine = Canned(vec![Patch {
            start: 0,
            hunks: vec![Hunk::insert("ok"), Hunk { op: 2, text: "?".into() }],
        }]);
        let err = string_ops(&FlatEncoding, &Path::root(), "", "", &engine).unwrap_err();
        assert!(matches!(err, DiffError::UnsupportedHunk(2)));
    }

    #[test]
    fn offsets_count_utf16_units() {
        let engine = Canned(vec![Patch {
            start: 0,
            hunks: vec![Hunk::equal("żółw"), Hunk::insert("!")],
        }]);
        let ops = string_ops(&FlatEncoding, &Path::root(), "żółw", "", &engine).unwrap();
        assert_eq!(ops, vec![FlatOp::string_insert(path![4], "!")]);

        let engine = Canned(vec![Patch {
            start: 0,
            hunks: vec![Hunk::equal("😀a"), Hunk::insert("b")],
        }]);
        let ops = string_ops(&FlatEncoding, &path!["s"], "😀a", "", &engine).unwrap();
        assert_eq!(ops, vec![FlatOp::string_insert(path!["s", 3], "b")]);
    }

    #[test]
    fn char_offsets_track_the_working_copy() {
        let engine = Canned(vec![Patch {
            start: 0,
            hunks: vec![
                Hunk::insert("😀"),
                Hunk::equal("a"),
                Hunk::delete("😀"),
                Hunk::insert("b"),
            ],
        }]);
        let ops = string_ops(&Recorder, &Path::root(), "a😀", "", &engine).unwrap();
        assert_eq!(
            ops,
            vec![
                (true, 0, 0, "😀".to_string()),
                (false, 3, 2, "😀".to_string()),
                (true, 3, 2, "b".to_string()),
            ]
        );
    }

    #[test]
    fn patch_past_the_text_is_rejected() {
        let engine = Canned(vec![Patch { start: 5, hunks: vec![Hunk::delete("x")] }]);
        let err = string_ops(&FlatEncoding, &Path::root(), "abc", "", &engine).unwrap_err();
        assert!(matches!(err, DiffError::PatchOutOfRange { offset: 6, len: 3 }));
    }
}
