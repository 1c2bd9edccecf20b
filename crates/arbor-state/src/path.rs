//! Dot-path algebra over JSON documents.
//!
//! A [`Path`] locates a value inside a snapshot. Paths are sequences of
//! segments: keys for objects, indexes for arrays. The empty path is the
//! root. Resolution is lenient: navigating through a missing or
//! non-navigable segment yields `None`, never an error.

use crate::atom::is_atomic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single segment in a path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seg {
    /// Object key access: `{"key": value}`
    Key(String),
    /// Array index access: `[index]`
    Index(usize),
}

impl Seg {
    /// Create a key segment.
    #[inline]
    pub fn key(k: impl Into<String>) -> Self {
        Seg::Key(k.into())
    }

    /// Create an index segment.
    #[inline]
    pub fn index(i: usize) -> Self {
        Seg::Index(i)
    }
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Key(k) => write!(f, ".{}", k),
            Seg::Index(i) => write!(f, "[{}]", i),
        }
    }
}

impl From<&str> for Seg {
    fn from(s: &str) -> Self {
        Seg::Key(s.to_owned())
    }
}

impl From<String> for Seg {
    fn from(s: String) -> Self {
        Seg::Key(s)
    }
}

impl From<usize> for Seg {
    fn from(i: usize) -> Self {
        Seg::Index(i)
    }
}

/// A complete path into a JSON structure.
///
/// # Examples
///
/// ```
/// use arbor_state::{parse_path, Path};
///
/// let path = parse_path("user.profile.name");
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.to_string(), "$.user.profile.name");
/// assert!(parse_path("").is_root());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Path(Vec<Seg>);

impl Path {
    /// Create an empty path (root).
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from a vector of segments.
    #[inline]
    pub fn from_segments(segments: Vec<Seg>) -> Self {
        Self(segments)
    }

    /// Append a key segment and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Seg::Key(k.into()));
        self
    }

    /// Append an index segment and return self (builder pattern).
    #[inline]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Seg::Index(i));
        self
    }

    /// Push a segment onto the path (mutating).
    #[inline]
    pub fn push(&mut self, seg: Seg) {
        self.0.push(seg);
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    /// Check if this path is the root (no segments).
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of segments in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if this path is empty (alias for [`Path::is_root`]).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the last segment — the pivot assigned during a targeted write.
    #[inline]
    pub fn pivot(&self) -> Option<&Seg> {
        self.0.last()
    }

    /// Get the parent path (path without the pivot segment).
    #[inline]
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            Some(Path(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Append a segment and return a new path (non-mutating).
    #[inline]
    pub fn child(&self, seg: impl Into<Seg>) -> Path {
        let mut result = self.clone();
        result.0.push(seg.into());
        result
    }

    /// Concatenate this path with another.
    #[inline]
    pub fn join(&self, other: &Path) -> Path {
        let mut result = self.clone();
        result.0.extend(other.0.iter().cloned());
        result
    }

    /// Check if this path is a prefix of another path.
    ///
    /// A path is a prefix of itself.
    #[inline]
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Seg> {
        self.0.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for seg in &self.0 {
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl FromIterator<Seg> for Path {
    fn from_iter<I: IntoIterator<Item = Seg>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

/// Construct a [`Path`] from a sequence of segments.
///
/// String literals become key segments, numbers become index segments.
///
/// # Examples
///
/// ```
/// use arbor_state::path;
///
/// let p = path!("users", 0, "name");
/// assert_eq!(p.to_string(), "$.users[0].name");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::Path::root();
        $(
            p.push($crate::Seg::from($seg));
        )+
        p
    }};
}

/// Canonical segment for a string key.
///
/// Keys that round-trip as array indexes (`"0"`, `"42"`, but not `"007"`)
/// become index segments, so a path parsed from a string, a path built with
/// the `path!` macro and a path enumerated out of a snapshot all compare
/// equal for the same location.
pub(crate) fn seg_from_key(key: &str) -> Seg {
    match key.parse::<usize>() {
        Ok(i) if i.to_string() == key => Seg::Index(i),
        _ => Seg::Key(key.to_owned()),
    }
}

/// Parse a dot-separated path string into a [`Path`].
///
/// Numeric segments become index segments so that array elements can be
/// addressed through dynamic paths (`"items.0.name"`). The empty string
/// and bare dots parse to the root.
pub fn parse_path(path: &str) -> Path {
    let mut result = Path::root();
    for segment in path.split('.') {
        if segment.is_empty() {
            continue;
        }
        result.push(seg_from_key(segment));
    }
    result
}

/// Resolve a path against a value, leniently.
///
/// Returns the value itself for the root path and `None` whenever an
/// intermediate segment is missing or the current value cannot be
/// navigated (e.g. a key segment over a number). An index segment over a
/// dictionary reads the stringified key, so numeric-string keys stay
/// addressable through parsed paths. Never errors.
pub fn resolve_path<'a>(value: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = value;
    for seg in path.iter() {
        match seg {
            Seg::Key(key) => current = current.get(key)?,
            Seg::Index(idx) => {
                current = match current {
                    Value::Object(obj) => obj.get(&idx.to_string())?,
                    _ => current.get(*idx)?,
                }
            }
        }
    }
    Some(current)
}

/// Enumerate every descendant path reachable inside a value.
///
/// Recurses into nested dictionaries only: atomic-marked values, arrays and
/// primitives contribute their own path but are not expanded. Paths are
/// relative to `value`; the result never contains the root.
pub fn descendant_paths(value: &Value) -> Vec<Path> {
    let mut paths = Vec::new();
    collect_descendants(value, &Path::root(), &mut paths);
    paths
}

fn collect_descendants(value: &Value, prefix: &Path, out: &mut Vec<Path>) {
    let Some(obj) = value.as_object() else {
        return;
    };
    if is_atomic(value) {
        return;
    }
    for (key, child) in obj {
        if crate::atom::is_marker_key(key) {
            continue;
        }
        let child_path = prefix.child(seg_from_key(key));
        out.push(child_path.clone());
        collect_descendants(child, &child_path, out);
    }
}

/// Enumerate the ancestor prefixes of a path, including the path itself.
///
/// The root is not included — root subscribers are handled separately by
/// the notification protocol. `$.a.b.c` yields `[$.a, $.a.b, $.a.b.c]`.
pub fn path_components(path: &Path) -> Vec<Path> {
    let mut components = Vec::with_capacity(path.len());
    let mut current = Path::root();
    for seg in path.iter() {
        current = current.child(seg.clone());
        components.push(current.clone());
    }
    components
}
