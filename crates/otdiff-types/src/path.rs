use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a [`Path`].
///
/// A `Key` addresses a map entry. An `Index` addresses a list element, or a
/// text offset (in UTF-16 code units) when the parent node is a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl PathSegment {
    /// The index, if this segment is one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Key(_) => None,
        }
    }

}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => write!(f, "{k}"),
        }
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl From<&str> for PathSegment {
    fn from(k: &str) -> Self {
        Self::Key(k.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(k: String) -> Self {
        Self::Key(k)
    }
}

/// Ordered location of a node inside a document tree.
///
/// Paths grow strictly by appending as the differ descends. Extending a path
/// always produces a new value; a `Path` handed to an operation is never
/// modified afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// The empty path, addressing the document root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment.into());
        Self(segments)
    }

    /// All segments except the last; empty for the root.
    pub fn parent_segments(&self) -> &[PathSegment] {
        match self.0.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// The trailing segment as an index, if there is one.
    pub fn last_index(&self) -> Option<usize> {
        self.last().and_then(PathSegment::as_index)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if both paths share everything but their last segment.
    pub fn is_sibling_of(&self, other: &Path) -> bool {
        !self.is_empty() && !other.is_empty() && self.parent_segments() == other.parent_segments()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build a [`Path`] from a list of keys and indices.
///
/// ```
/// use otdiff_types::{path, PathSegment};
///
/// let p = path!["users", 3, "name"];
/// assert_eq!(p.len(), 3);
/// assert_eq!(p.segments()[1], PathSegment::Index(3));
/// ```
#[macro_export]
macro_rules! path {
    () => { $crate::Path::root() };
    ($($segment:expr),+ $(,)?) => {
        $crate::Path::new(vec![$($crate::PathSegment::from($segment)),+])
    };
}
