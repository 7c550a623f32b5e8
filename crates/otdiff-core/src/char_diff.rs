//! Character-level diffing of string leaves.
//!
//! The differ consumes this through the [`CharDiff`] trait: an ordered list
//! of [`Patch`]es, each a start offset plus tagged hunks. Hunk tags follow
//! the diff-match-patch convention (`-1` delete, `0` equal, `1` insert).
//! Offsets and lengths are UTF-16 code units, the unit flat-encoding
//! consumers index strings in.
//! [`SimilarCharDiff`] is the built-in engine, backed by the `similar` crate.
//! It diffs by `char`, so a hunk never splits a surrogate pair.

use std::sync::OnceLock;

use similar::{ChangeTag, TextDiff};

use crate::config::CharDiffConfig;
use crate::error::{DiffError, DiffResult};

pub const DIFF_DELETE: i8 = -1;
pub const DIFF_EQUAL: i8 = 0;
pub const DIFF_INSERT: i8 = 1;

/// The meaning of a hunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HunkTag {
    Delete,
    Equal,
    Insert,
}

impl TryFrom<i8> for HunkTag {
    type Error = DiffError;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        match code {
            DIFF_DELETE => Ok(Self::Delete),
            DIFF_EQUAL => Ok(Self::Equal),
            DIFF_INSERT => Ok(Self::Insert),
            other => Err(DiffError::UnsupportedHunk(other)),
        }
    }
}

/// One tagged run of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hunk {
    /// Raw hunk code as produced by the engine.
    pub op: i8,
    pub text: String,
}

impl Hunk {
    pub fn delete(text: impl Into<String>) -> Self {
        Self { op: DIFF_DELETE, text: text.into() }
    }

    pub fn equal(text: impl Into<String>) -> Self {
        Self { op: DIFF_EQUAL, text: text.into() }
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Self { op: DIFF_INSERT, text: text.into() }
    }

    /// Decode the hunk code.
    pub fn tag(&self) -> DiffResult<HunkTag> {
        HunkTag::try_from(self.op)
    }

    /// Length of the text in UTF-16 code units.
    pub fn len_utf16(&self) -> usize {
        utf16_len(&self.text)
    }
}

/// A group of hunks anchored at a UTF-16 offset.
///
/// `start` is measured in the text as it looks once every earlier patch of
/// the same list has been applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Patch {
    pub start: usize,
    pub hunks: Vec<Hunk>,
}

/// A character-diff engine.
pub trait CharDiff: Send + Sync {
    /// Compute the ordered patches that turn `old` into `new`.
    fn make_patches(&self, old: &str, new: &str) -> Vec<Patch>;
}

/// Character diff engine built on `similar`.
#[derive(Clone, Debug, Default)]
pub struct SimilarCharDiff {
    config: CharDiffConfig,
}

/// An unchanged run, or a region where `deleted` is replaced by `inserted`.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Equal(String),
    Change { deleted: String, inserted: String },
}

impl SimilarCharDiff {
    pub fn new(config: CharDiffConfig) -> Self {
        Self { config }
    }

    fn segments(&self, old: &str, new: &str) -> Vec<Segment> {
        let mut text_config = TextDiff::configure();
        text_config.algorithm(self.config.algorithm.into());
        if let Some(timeout) = self.config.timeout {
            text_config.timeout(timeout);
        }
        let diff = text_config.diff_chars(old, new);

        let mut segments: Vec<Segment> = Vec::new();
        for op in diff.ops() {
            for change in diff.iter_changes(op) {
                let value = change.value();
                match (change.tag(), segments.last_mut()) {
                    (ChangeTag::Equal, Some(Segment::Equal(text))) => text.push_str(value),
                    (ChangeTag::Equal, _) => segments.push(Segment::Equal(value.to_string())),
                    (ChangeTag::Delete, Some(Segment::Change { deleted, .. })) => {
                        deleted.push_str(value)
                    }
                    (ChangeTag::Insert, Some(Segment::Change { inserted, .. })) => {
                        inserted.push_str(value)
                    }
                    (ChangeTag::Delete, _) => segments.push(Segment::Change {
                        deleted: value.to_string(),
                        inserted: String::new(),
                    }),
                    (ChangeTag::Insert, _) => segments.push(Segment::Change {
                        deleted: String::new(),
                        inserted: value.to_string(),
                    }),
                }
            }
        }

        if self.config.semantic_cleanup {
            cleanup_semantic(&mut segments);
        }
        segments
    }

    fn patches_from(&self, segments: &[Segment]) -> Vec<Patch> {
        let margin = self.config.context;
        let mut patches = Vec::new();
        let mut current: Option<Patch> = None;
        // Position in the partially patched text, in UTF-16 units.
        let mut pos = 0usize;

        for (k, segment) in segments.iter().enumerate() {
            match segment {
                Segment::Equal(text) => {
                    let is_last = k + 1 == segments.len();
                    match current.take() {
                        Some(mut patch) if char_len(text) <= 2 * margin && !is_last => {
                            patch.hunks.push(Hunk::equal(text.as_str()));
                            current = Some(patch);
                        }
                        Some(mut patch) => {
                            let trailing = char_prefix(text, margin);
                            if !trailing.is_empty() {
                                patch.hunks.push(Hunk::equal(trailing));
                            }
                            patches.push(patch);
                        }
                        None => {}
                    }
                    pos += utf16_len(text);
                }
                Segment::Change { deleted, inserted } => {
                    let patch = current.get_or_insert_with(|| {
                        let leading = match k.checked_sub(1).map(|j| &segments[j]) {
                            Some(Segment::Equal(text)) => char_suffix(text, margin),
                            _ => "",
                        };
                        let start = pos - utf16_len(leading);
                        let mut hunks = Vec::new();
                        if !leading.is_empty() {
                            hunks.push(Hunk::equal(leading));
                        }
                        Patch { start, hunks }
                    });
                    if !deleted.is_empty() {
                        patch.hunks.push(Hunk::delete(deleted.as_str()));
                    }
                    if !inserted.is_empty() {
                        patch.hunks.push(Hunk::insert(inserted.as_str()));
                        pos += utf16_len(inserted);
                    }
                }
            }
        }

        if let Some(patch) = current {
            patches.push(patch);
        }
        patches
    }
}

impl CharDiff for SimilarCharDiff {
    fn make_patches(&self, old: &str, new: &str) -> Vec<Patch> {
        if old == new {
            return Vec::new();
        }
        let segments = self.segments(old, new);
        self.patches_from(&segments)
    }
}

/// The process-wide default engine, built on first use.
pub fn shared_char_diff() -> &'static SimilarCharDiff {
    static SHARED: OnceLock<SimilarCharDiff> = OnceLock::new();
    SHARED.get_or_init(SimilarCharDiff::default)
}

/// Fold unchanged runs that are no longer than the edits on both sides of
/// them into a single change region.
fn cleanup_semantic(segments: &mut Vec<Segment>) {
    loop {
        let found = (1..segments.len().saturating_sub(1)).find(|&k| {
            match (&segments[k - 1], &segments[k], &segments[k + 1]) {
                (before @ Segment::Change { .. }, Segment::Equal(text), after @ Segment::Change { .. }) => {
                    let len = char_len(text);
                    len <= change_weight(before) && len <= change_weight(after)
                }
                _ => false,
            }
        });
        let Some(k) = found else { break };

        let merged: Vec<Segment> = segments.drain(k - 1..=k + 1).collect();
        let mut deleted = String::new();
        let mut inserted = String::new();
        for segment in merged {
            match segment {
                Segment::Equal(text) => {
                    deleted.push_str(&text);
                    inserted.push_str(&text);
                }
                Segment::Change { deleted: d, inserted: i } => {
                    deleted.push_str(&d);
                    inserted.push_str(&i);
                }
            }
        }
        segments.insert(k - 1, Segment::Change { deleted, inserted });
    }
}

fn change_weight(segment: &Segment) -> usize {
    match segment {
        Segment::Change { deleted, inserted } => char_len(deleted).max(char_len(inserted)),
        Segment::Equal(_) => 0,
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub(crate) fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn char_prefix(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

fn char_suffix(text: &str, n: usize) -> &str {
    let len = char_len(text);
    if len <= n {
        return text;
    }
    match text.char_indices().nth(len - n) {
        Some((byte, _)) => &text[byte..],
        None => "",
    }
}
