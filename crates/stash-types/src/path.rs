//! Absolute path and local identifier grammar.
//!
//! An absolute path:
//! - starts with `/`
//! - is made of one or more segments separated by a single `/`
//! - has segments drawn from `[A-Za-z0-9_]` only
//! - does not end with `/`
//!
//! Because `.` is not a segment character and empty segments are rejected,
//! a valid path is always already in normalized form: there is no `.`, `..`
//! or `//` for normalization to remove.
//!
//! A local identifier is a single segment: one or more of `[A-Za-z0-9_]`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WispError};

/// Separator between path segments.
pub const SEPARATOR: char = '/';

fn is_segment_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Returns `true` if `id` is a valid local identifier.
///
/// ```
/// use stash_types::is_valid_local_id;
///
/// assert!(is_valid_local_id("intro"));
/// assert!(is_valid_local_id("chapter_2"));
/// assert!(!is_valid_local_id(""));
/// assert!(!is_valid_local_id("a/b"));
/// ```
pub fn is_valid_local_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(is_segment_char)
}

/// Returns `true` if `path` is a valid, normalized absolute path.
///
/// ```
/// use stash_types::is_valid_path;
///
/// assert!(is_valid_path("/docs"));
/// assert!(is_valid_path("/docs/intro"));
/// assert!(!is_valid_path("/"));
/// assert!(!is_valid_path("/docs/"));
/// assert!(!is_valid_path("/docs//intro"));
/// assert!(!is_valid_path("/docs/../etc"));
/// ```
pub fn is_valid_path(path: &str) -> bool {
    match path.strip_prefix(SEPARATOR) {
        // Empty segments cover "/", trailing "/" and duplicate separators.
        Some(rest) => rest.split(SEPARATOR).all(is_valid_local_id),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// WispPath
// ---------------------------------------------------------------------------

/// A validated absolute path uniquely identifying a Wisp.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WispPath(String);

impl WispPath {
    /// Parse and validate an absolute path.
    pub fn parse(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if is_valid_path(&path) {
            Ok(Self(path))
        } else {
            Err(WispError::path(path))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments, root first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0[1..].split(SEPARATOR)
    }

    /// Number of segments (`/a` has depth 1).
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The final segment, which is this Wisp's id inside its parent group.
    pub fn local_id(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// The enclosing group path, or `None` for a top-level path.
    pub fn parent(&self) -> Option<WispPath> {
        match self.0.rfind(SEPARATOR) {
            Some(0) | None => None,
            Some(idx) => Some(Self(self.0[..idx].to_string())),
        }
    }

    /// Address of the child `id` of this group.
    pub fn child(&self, id: &LocalId) -> WispPath {
        Self(format!("{}{}{}", self.0, SEPARATOR, id.as_str()))
    }

    /// Returns `true` if `other` lies strictly beneath this path.
    ///
    /// Segment-aware: `/a` is an ancestor of `/a/b` but not of `/ab`.
    pub fn is_ancestor_of(&self, other: &WispPath) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0[self.0.len()..].starts_with(SEPARATOR)
    }

    /// Returns `true` if the two paths are equal or one contains the other.
    pub fn is_related(&self, other: &WispPath) -> bool {
        self == other || self.is_ancestor_of(other) || other.is_ancestor_of(self)
    }
}

impl fmt::Debug for WispPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WispPath({})", self.0)
    }
}

impl fmt::Display for WispPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WispPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for WispPath {
    type Error = WispError;

    fn try_from(path: String) -> Result<Self> {
        Self::parse(path)
    }
}

impl TryFrom<&str> for WispPath {
    type Error = WispError;

    fn try_from(path: &str) -> Result<Self> {
        Self::parse(path)
    }
}

impl FromStr for WispPath {
    type Err = WispError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<WispPath> for String {
    fn from(path: WispPath) -> Self {
        path.0
    }
}

// ---------------------------------------------------------------------------
// LocalId
// ---------------------------------------------------------------------------

/// A validated local identifier: one element of a group's content.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocalId(String);

impl LocalId {
    /// Parse and validate a local identifier.
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if is_valid_local_id(&id) {
            Ok(Self(id))
        } else {
            Err(WispError::MalformedWisp(format!("invalid local id {id:?}")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalId({})", self.0)
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LocalId {
    type Error = WispError;

    fn try_from(id: String) -> Result<Self> {
        Self::parse(id)
    }
}

impl TryFrom<&str> for LocalId {
    type Error = WispError;

    fn try_from(id: &str) -> Result<Self> {
        Self::parse(id)
    }
}

impl From<LocalId> for String {
    fn from(id: LocalId) -> Self {
        id.0
    }
}
