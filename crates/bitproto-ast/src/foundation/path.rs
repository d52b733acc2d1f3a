//! Dotted reference paths.
//!
//! References in bitproto source are dot-separated identifier chains:
//! `Color`, `Outer.Inner.Flag`, `shared.Timestamp`. The first segment may
//! name an import alias, a sibling definition, or a definition in an
//! enclosing scope; resolution walks the scope chain outward.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dot-separated identifier chain, as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn parse(s: &str) -> Self {
        Self {
            segments: s.split('.').map(String::from).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First segment, the one scope lookup starts from.
    pub fn head(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Remaining segments after the head.
    pub fn tail(&self) -> &[String] {
        if self.segments.is_empty() {
            &[]
        } else {
            &self.segments[1..]
        }
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn is_dotted(&self) -> bool {
        self.segments.len() > 1
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}
