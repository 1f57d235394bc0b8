//! Validated nested-attribute paths

use std::fmt;

use super::classify::PATH_SEPARATOR;
use super::reflect::PropertyError;

/// A non-empty sequence of non-empty field names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropPath {
    segments: Vec<String>,
}

impl PropPath {
    /// Validate already-split segments
    pub fn new(segments: &[String]) -> Result<Self, PropertyError> {
        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return Err(PropertyError::MalformedPath(segments.join("-")));
        }
        Ok(Self {
            segments: segments.to_vec(),
        })
    }

    /// Parse a dashed key
    pub fn parse(key: &str) -> Result<Self, PropertyError> {
        let segments: Vec<String> = key.split(PATH_SEPARATOR).map(str::to_string).collect();
        Self::new(&segments)
    }

    /// All segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment (the field written when the deepest value is atomic)
    pub fn last(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Every segment except the last
    pub fn parents(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }
}

impl fmt::Display for PropPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let path = PropPath::parse("material-color").unwrap();
        assert_eq!(path.segments(), ["material", "color"]);
        assert_eq!(path.last(), "color");
        assert_eq!(path.parents(), ["material"]);
        assert_eq!(path.to_string(), "material-color");
    }

    #[test]
    fn test_empty_segments_rejected() {
        for key in ["-x", "position-", "a--b", ""] {
            assert!(
                matches!(PropPath::parse(key), Err(PropertyError::MalformedPath(_))),
                "{key}"
            );
        }
    }
}
