//! Dependency paths for addressing fields across a form tree
//!
//! Provides [`FieldPath`], a relative address made of `/`-delimited segments.
//! The segment `..` steps to the parent node; any other segment names a child
//! by field name or list identity.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Segment that moves resolution to the parent node
pub const PARENT_SEGMENT: &str = "..";

/// Separator between path segments
pub const SEPARATOR: char = '/';

/// Relative path to a field
///
/// # Examples
/// - `behaviour/numCardsToUse` → child `behaviour`, then its child `numCardsToUse`
/// - `../cards` → sibling `cards` of the starting node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Create path from segments
    ///
    /// # Errors
    /// Returns error if there are no segments or a segment is empty
    pub fn new(segments: Vec<String>) -> Result<Self, PathError> {
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        if segments.iter().any(String::is_empty) {
            return Err(PathError::EmptySegment);
        }
        Ok(Self(segments))
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed path; kept for slice-like symmetry
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get first segment
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Get last segment
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Iterator over segments in resolution order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.0 {
            if !first {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(seg)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        if !s.is_ascii() {
            return Err(PathError::NonAscii(s.to_string()));
        }

        let segments: Vec<String> = s.split(SEPARATOR).map(str::to_string).collect();
        Self::new(segments)
    }
}

impl TryFrom<&str> for FieldPath {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Errors related to dependency paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path has no segments
    #[error("path is empty")]
    Empty,

    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Path contains non-ASCII characters
    #[error("path must be ASCII: {0}")]
    NonAscii(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn path_from_str_nested() {
        let path: FieldPath = "behaviour/numCardsToUse".parse().unwrap();
        assert_eq!(path.segments(), &["behaviour", "numCardsToUse"]);
        assert_eq!(path.len(), 2);
        assert_eq!(path.first(), Some("behaviour"));
        assert_eq!(path.last(), Some("numCardsToUse"));
    }

    #[test]
    fn path_from_str_empty() {
        let result: Result<FieldPath, _> = "".parse();
        assert_eq!(result, Err(PathError::Empty));
    }

    #[test]
    fn path_from_str_empty_segment() {
        let result: Result<FieldPath, _> = "behaviour//numCardsToUse".parse();
        assert_eq!(result, Err(PathError::EmptySegment));

        let result: Result<FieldPath, _> = "cards/".parse();
        assert_eq!(result, Err(PathError::EmptySegment));
    }

    #[test]
    fn path_from_str_non_ascii() {
        let result: Result<FieldPath, _> = "kärtchen".parse();
        assert!(matches!(result, Err(PathError::NonAscii(_))));
    }

    #[test]
    fn path_new_rejects_empty() {
        assert_eq!(FieldPath::new(Vec::new()), Err(PathError::Empty));
    }

    #[test]
    fn path_display() {
        let path: FieldPath = "../behaviour/numCardsToUse".parse().unwrap();
        assert_eq!(path.to_string(), "../behaviour/numCardsToUse");
    }

    #[test]
    fn path_try_from() {
        let path = FieldPath::try_from("cards").unwrap();
        assert_eq!(path.iter().collect::<Vec<_>>(), vec!["cards"]);
    }

    proptest! {
        #[test]
        fn prop_display_parses_back(segments in prop::collection::vec("[a-zA-Z_]{1,8}|\\.\\.", 1..6)) {
            let path = FieldPath::new(segments.clone()).unwrap();
            let reparsed: FieldPath = path.to_string().parse().unwrap();
            prop_assert_eq!(reparsed.segments(), segments.as_slice());
        }
    }
}
