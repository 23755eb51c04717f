//! Immutable field paths for addressing values inside a document.
//!
//! A [`Path`] is an ordered list of non-blank segments such as `address.city`
//! or `tags.0`. Purely numeric segments double as array indices.
//!
//! Most paths in practice are one to three segments deep, so the storage is a
//! tagged enum over the segment count. Every representation behaves the same;
//! only the layout differs. Segments are reference counted, which makes
//! `clone()`, `parent()` and `ancestor_of_size()` copy pointers rather than text.
//!
//! # Usage
//!
//! ```rust
//! use tabula::Path;
//!
//! let path = Path::parse("address.city")?;
//! assert_eq!(path.len(), 2);
//! assert_eq!(path.parent(), Path::parse("address")?);
//!
//! // Literal dots are escaped in the textual form
//! let dotted = Path::empty().with("a.b");
//! assert_eq!(dotted.to_string(), r"a\.b");
//! assert_eq!(Path::parse(&dotted.to_string())?, dotted);
//! # Ok::<(), tabula::path::PathError>(())
//! ```

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
    sync::Arc,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::constants::{PATH_DELIMITER, PATH_ESCAPE};

/// Errors raised while building or slicing a [`Path`].
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A segment was empty or whitespace only.
    #[error("Invalid path segment '{segment}': segments must not be blank")]
    InvalidSegment { segment: String },

    /// Requested an ancestor longer than the path itself.
    #[error("Cannot take an ancestor of size {size} from a path of size {len}")]
    AncestorTooLarge { size: usize, len: usize },
}

impl PathError {
    /// Check if this error is due to a blank segment.
    pub fn is_invalid_segment(&self) -> bool {
        matches!(self, PathError::InvalidSegment { .. })
    }

    /// Check if this error is due to an out-of-range ancestor request.
    pub fn is_ancestor_too_large(&self) -> bool {
        matches!(self, PathError::AncestorTooLarge { .. })
    }
}

impl From<PathError> for crate::Error {
    fn from(err: PathError) -> Self {
        crate::Error::Path(err)
    }
}

type Segment = Arc<str>;

/// Storage specialized by segment count.
#[derive(Clone)]
enum Segments {
    Empty,
    Single(Segment),
    Double([Segment; 2]),
    Triple([Segment; 3]),
    Multi(Arc<[Segment]>),
}

impl Segments {
    fn from_vec(segments: Vec<Segment>) -> Self {
        let segments = match <[Segment; 1]>::try_from(segments) {
            Ok([only]) => return Segments::Single(only),
            Err(segments) => segments,
        };
        let segments = match <[Segment; 2]>::try_from(segments) {
            Ok(pair) => return Segments::Double(pair),
            Err(segments) => segments,
        };
        let segments = match <[Segment; 3]>::try_from(segments) {
            Ok(triple) => return Segments::Triple(triple),
            Err(segments) => segments,
        };
        if segments.is_empty() {
            Segments::Empty
        } else {
            Segments::Multi(segments.into())
        }
    }

    fn as_slice(&self) -> &[Segment] {
        match self {
            Segments::Empty => &[],
            Segments::Single(only) => std::slice::from_ref(only),
            Segments::Double(pair) => pair,
            Segments::Triple(triple) => triple,
            Segments::Multi(many) => many,
        }
    }
}

/// An immutable, cheaply clonable field path.
///
/// Equality and hashing are structural. Ordering compares the number of
/// segments first and then the segments lexicographically, so every parent
/// sorts before its children.
#[derive(Clone)]
pub struct Path {
    segments: Segments,
}

fn is_blank(segment: &str) -> bool {
    segment.trim().is_empty()
}

fn validate(segment: &str) -> Result<Segment, PathError> {
    if is_blank(segment) {
        Err(PathError::InvalidSegment {
            segment: segment.to_string(),
        })
    } else {
        Ok(Segment::from(segment))
    }
}

impl Path {
    /// The canonical zero-length path.
    pub const EMPTY: Path = Path {
        segments: Segments::Empty,
    };

    /// Returns the zero-length path.
    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// Build a path from already split segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments
            .into_iter()
            .map(|segment| validate(segment.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            segments: Segments::from_vec(segments),
        })
    }

    /// Build a path under `parent` from one or more further segments.
    pub fn child_of<I, S>(parent: &Path, first: &str, rest: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut segments = parent.as_slice().to_vec();
        segments.push(validate(first)?);
        for segment in rest {
            segments.push(validate(segment.as_ref())?);
        }
        Ok(Self {
            segments: Segments::from_vec(segments),
        })
    }

    /// Parse the dotted textual form, where `\.` stands for a literal dot.
    ///
    /// Every segment must be non-blank, so the empty string is rejected too.
    /// Use [`Path::empty`] for the zero-length path.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                PATH_ESCAPE if chars.peek() == Some(&PATH_DELIMITER) => {
                    current.push(PATH_DELIMITER);
                    chars.next();
                }
                PATH_DELIMITER => segments.push(std::mem::take(&mut current)),
                other => current.push(other),
            }
        }
        segments.push(current);
        Self::from_segments(segments)
    }

    fn as_slice(&self) -> &[Segment] {
        self.segments.as_slice()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// True for the zero-length path.
    pub fn is_empty(&self) -> bool {
        matches!(self.segments, Segments::Empty)
    }

    /// Segment at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.as_slice().get(index).map(|segment| &**segment)
    }

    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&str> {
        self.as_slice().last().map(|segment| &**segment)
    }

    /// Segment at `index` read as an array index.
    pub fn as_index(&self, index: usize) -> Option<usize> {
        self.get(index).and_then(parse_index)
    }

    /// Iterate over the segments in order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.as_slice().iter().map(|segment| &**segment)
    }

    /// A new path with `segment` appended.
    ///
    /// Blank segments are ignored and yield an equal path, so callers can chain
    /// optional parts without checking them first.
    pub fn with(&self, segment: &str) -> Path {
        if is_blank(segment) {
            return self.clone();
        }
        let next = Segment::from(segment);
        let segments = match &self.segments {
            Segments::Empty => Segments::Single(next),
            Segments::Single(a) => Segments::Double([a.clone(), next]),
            Segments::Double([a, b]) => Segments::Triple([a.clone(), b.clone(), next]),
            Segments::Triple(_) | Segments::Multi(_) => {
                let mut all = self.as_slice().to_vec();
                all.push(next);
                Segments::Multi(all.into())
            }
        };
        Path { segments }
    }

    /// All segments but the last. The parent of the empty path is empty.
    pub fn parent(&self) -> Path {
        match self.len() {
            0 => Path::empty(),
            len => self.prefix(len - 1),
        }
    }

    /// The first `size` segments.
    pub fn ancestor_of_size(&self, size: usize) -> Result<Path, PathError> {
        let len = self.len();
        if size > len {
            return Err(PathError::AncestorTooLarge { size, len });
        }
        Ok(self.prefix(size))
    }

    fn prefix(&self, size: usize) -> Path {
        if size == self.len() {
            return self.clone();
        }
        Path {
            segments: Segments::from_vec(self.as_slice()[..size].to_vec()),
        }
    }

    /// True when `other`'s segments are a prefix of this path's.
    pub fn starts_with(&self, other: &Path) -> bool {
        let prefix = other.as_slice();
        self.as_slice().starts_with(prefix)
    }

    /// Copy the segments out as owned strings.
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }
}

/// Parse a segment as a non-negative array index.
pub(crate) fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

impl Default for Path {
    fn default() -> Self {
        Path::empty()
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl Ord for Path {
    fn cmp(&self, other: &Self) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then_with(|| self.as_slice().cmp(other.as_slice()))
    }
}

impl PartialOrd for Path {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "{PATH_DELIMITER}")?;
            }
            for c in segment.chars() {
                if c == PATH_DELIMITER {
                    write!(f, "{PATH_ESCAPE}")?;
                }
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({self})")
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.is_empty() {
            return Ok(Path::empty());
        }
        Path::parse(&text).map_err(serde::de::Error::custom)
    }
}
