//! Embedded text edits in the `text-unicode` shape.
//!
//! A payload is a list of components walked with a cursor over the string's
//! characters: a number skips that many characters, a string is inserted
//! at the cursor, and `{"d": text}` deletes `text` at the cursor.

use serde_json::json;

use otdiff_core::TextEdits;
use otdiff_types::{Path, Value};

use crate::error::{ComposeError, ComposeResult};

pub const TEXT_UNICODE: &str = "text-unicode";

/// Text collaborator producing `text-unicode` payloads.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextUnicode;

impl TextEdits for TextUnicode {
    fn edit_type(&self) -> &str {
        TEXT_UNICODE
    }

    fn insert(&self, offset: usize, text: &str) -> Value {
        with_skip(offset, json!(text))
    }

    fn remove(&self, offset: usize, text: &str) -> Value {
        with_skip(offset, json!({ "d": text }))
    }
}

fn with_skip(offset: usize, component: Value) -> Value {
    if offset == 0 {
        json!([component])
    } else {
        json!([offset, component])
    }
}

/// Apply a `text-unicode` payload to `text`.
pub fn apply_text_unicode(text: &str, payload: &Value, path: &Path) -> ComposeResult<String> {
    let components = payload
        .as_array()
        .ok_or_else(|| ComposeError::malformed(path, "payload is not a list"))?;
    let mut chars: Vec<char> = text.chars().collect();
    let mut cursor = 0usize;

    for component in components {
        match component {
            Value::Number(n) => {
                let skip = n
                    .as_u64()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| ComposeError::malformed(path, "skip is not a count"))?;
                cursor += skip;
                if cursor > chars.len() {
                    return Err(ComposeError::malformed(path, "skip past end of text"));
                }
            }
            Value::String(inserted) => {
                let inserted: Vec<char> = inserted.chars().collect();
                let len = inserted.len();
                chars.splice(cursor..cursor, inserted);
                cursor += len;
            }
            Value::Object(map) => {
                let Some(Value::String(deleted)) = map.get("d") else {
                    return Err(ComposeError::malformed(path, "delete needs a string under \"d\""));
                };
                let deleted: Vec<char> = deleted.chars().collect();
                let end = cursor + deleted.len();
                if chars.get(cursor..end) != Some(deleted.as_slice()) {
                    return Err(ComposeError::malformed(path, "deleted text does not match"));
                }
                chars.drain(cursor..end);
            }
            other => {
                return Err(ComposeError::malformed(
                    path,
                    format!("unexpected component {other}"),
                ))
            }
        }
    }

    Ok(chars.into_iter().collect())
}
