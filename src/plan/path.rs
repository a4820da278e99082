//! Dotted/indexed attribute paths.
//!
//! Accepted forms: `a.b.c`, `a[0].b`, `a.0.b`, `a[0][1]`.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// One step of an attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Mapping key.
    Key(String),
    /// Sequence position.
    Index(usize),
}

/// A parsed attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl AttributePath {
    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the path as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for AttributePath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(ConfigError::invalid_path(s, "path is empty"));
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            parse_part(raw, part, &mut segments)?;
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }
}

fn parse_part(raw: &str, part: &str, segments: &mut Vec<PathSegment>) -> Result<(), ConfigError> {
    if part.is_empty() {
        return Err(ConfigError::invalid_path(raw, "empty segment"));
    }

    if part.bytes().all(|b| b.is_ascii_digit()) {
        let index = parse_index(raw, part)?;
        segments.push(PathSegment::Index(index));
        return Ok(());
    }

    let (name, mut rest) = part.find('[').map_or((part, ""), |pos| part.split_at(pos));
    if name.contains(']') {
        return Err(ConfigError::invalid_path(raw, format!("unexpected ']' in '{part}'")));
    }
    if !name.is_empty() {
        segments.push(PathSegment::Key(name.to_string()));
    }

    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return Err(ConfigError::invalid_path(raw, format!("unexpected text after index in '{part}'")));
        };
        let Some(close) = inner.find(']') else {
            return Err(ConfigError::invalid_path(raw, format!("unclosed '[' in '{part}'")));
        };
        segments.push(PathSegment::Index(parse_index(raw, &inner[..close])?));
        rest = &inner[close + 1..];
    }

    Ok(())
}

fn parse_index(raw: &str, digits: &str) -> Result<usize, ConfigError> {
    digits
        .parse()
        .map_err(|_| ConfigError::invalid_path(raw, format!("'{digits}' is not a valid index")))
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> PathSegment {
        PathSegment::Key(s.to_string())
    }

    #[test]
    fn test_parse_dotted() {
        let path: AttributePath = "versioning_configuration.status".parse().unwrap();
        assert_eq!(path.segments(), &[key("versioning_configuration"), key("status")]);
    }

    #[test]
    fn test_parse_indexed_forms_agree() {
        let bracketed: AttributePath = "rule[0].sse_algorithm".parse().unwrap();
        let dotted: AttributePath = "rule.0.sse_algorithm".parse().unwrap();
        assert_eq!(bracketed.segments(), dotted.segments());
        assert_eq!(bracketed.segments()[1], PathSegment::Index(0));
    }

    #[test]
    fn test_parse_chained_indices() {
        let path: AttributePath = "matrix[1][2]".parse().unwrap();
        assert_eq!(
            path.segments(),
            &[key("matrix"), PathSegment::Index(1), PathSegment::Index(2)]
        );
        assert_eq!(path.to_string(), "matrix[1][2]");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "a..b", "a.", "a[", "a[x]", "a[0]b", "a]"] {
            let result = bad.parse::<AttributePath>();
            assert!(
                matches!(result, Err(ConfigError::InvalidPath { .. })),
                "expected '{bad}' to be rejected"
            );
        }
    }
}
