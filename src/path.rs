//! Image paths
//!
//! Slash-delimited paths used to address entries inside an image. A path is an
//! ordered list of non-empty segments; separators are never stored, so
//! `"//a///b/"` and `"a/b"` parse to the same value. `.` and `..` are ordinary
//! segments.

use serde::Serialize;
use std::convert::Infallible;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign};
use std::str::FromStr;

/// Segment separator.
pub const SEPARATOR: char = '/';

/// Path into an image, stored as its segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ImagePath {
    segments: Vec<String>,
}

impl ImagePath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a slash-delimited string, dropping empty runs.
    pub fn parse(input: &str) -> Self {
        let mut path = Self::new();
        path.extend_parsed(input);
        path
    }

    fn extend_parsed(&mut self, input: &str) {
        self.segments.extend(
            input
                .split(SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.segments.iter()
    }

    /// True when dropping the last segment still leaves a non-empty path.
    pub fn has_parent(&self) -> bool {
        self.segments.len() >= 2
    }

    pub fn has_extension(&self) -> bool {
        self.segments
            .last()
            .map(|last| last.contains('.'))
            .unwrap_or(false)
    }

    /// Last segment, or `""` for an empty path.
    pub fn filename(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Last segment up to its final `.`.
    pub fn stem(&self) -> &str {
        let name = self.filename();
        match name.rfind('.') {
            Some(dot) => &name[..dot],
            None => name,
        }
    }

    /// Last segment from its final `.` onward, dot included.
    pub fn extension(&self) -> &str {
        let name = self.filename();
        match name.rfind('.') {
            Some(dot) => &name[dot..],
            None => "",
        }
    }

    /// Path without its last segment; unchanged when it has one segment or none.
    pub fn parent(&self) -> ImagePath {
        if !self.has_parent() {
            return self.clone();
        }
        let mut parent = self.clone();
        parent.segments.pop();
        parent
    }

    /// Append one segment. `segment` must be non-empty and free of `/`;
    /// use `/` (or [`ImagePath::parse`]) for text that may hold several.
    pub fn push(&mut self, segment: impl Into<String>) {
        let segment = segment.into();
        debug_assert!(
            !segment.is_empty() && !segment.contains(SEPARATOR),
            "invalid path segment {segment:?}"
        );
        self.segments.push(segment);
    }

    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// Render the path. Absolute form prefixes every segment with `/` (and is
    /// empty for the empty path); relative form joins segments with `/`.
    pub fn string(&self, relative: bool) -> String {
        if relative {
            return self.segments.join("/");
        }
        let mut out = String::new();
        for segment in &self.segments {
            out.push(SEPARATOR);
            out.push_str(segment);
        }
        out
    }
}

impl fmt::Display for ImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("/");
        }
        f.write_str(&self.string(false))
    }
}

impl FromStr for ImagePath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for ImagePath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for ImagePath {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl<'a> IntoIterator for &'a ImagePath {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Appends text to the last segment as if concatenated onto the rendered
/// path; any `/` in the text starts a new segment.
impl AddAssign<&str> for ImagePath {
    fn add_assign(&mut self, rhs: &str) {
        let (head, rest) = match rhs.split_once(SEPARATOR) {
            Some((head, rest)) => (head, Some(rest)),
            None => (rhs, None),
        };
        match self.segments.last_mut() {
            Some(last) => last.push_str(head),
            None if !head.is_empty() => self.segments.push(head.to_string()),
            None => {}
        }
        if let Some(rest) = rest {
            self.extend_parsed(rest);
        }
    }
}

impl Add<&str> for &ImagePath {
    type Output = ImagePath;

    fn add(self, rhs: &str) -> ImagePath {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Add<&str> for ImagePath {
    type Output = ImagePath;

    fn add(mut self, rhs: &str) -> ImagePath {
        self += rhs;
        self
    }
}

/// Appends the segments of a parsed sub-path.
impl DivAssign<&str> for ImagePath {
    fn div_assign(&mut self, rhs: &str) {
        self.extend_parsed(rhs);
    }
}

impl DivAssign<&ImagePath> for ImagePath {
    fn div_assign(&mut self, rhs: &ImagePath) {
        self.segments.extend(rhs.segments.iter().cloned());
    }
}

impl Div<&str> for &ImagePath {
    type Output = ImagePath;

    fn div(self, rhs: &str) -> ImagePath {
        let mut out = self.clone();
        out /= rhs;
        out
    }
}

impl Div<&str> for ImagePath {
    type Output = ImagePath;

    fn div(mut self, rhs: &str) -> ImagePath {
        self /= rhs;
        self
    }
}

impl Div<&ImagePath> for &ImagePath {
    type Output = ImagePath;

    fn div(self, rhs: &ImagePath) -> ImagePath {
        let mut out = self.clone();
        out /= rhs;
        out
    }
}

impl Div<&ImagePath> for ImagePath {
    type Output = ImagePath;

    fn div(mut self, rhs: &ImagePath) -> ImagePath {
        self /= rhs;
        self
    }
}
