//! Stylesheet parsing error types

use std::fmt;
use thiserror::Error;

/// Stylesheet parsing result type
pub type CssResult<T> = Result<T, CssError>;

/// Source location in a stylesheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset from start
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// Location of the first byte of a document
    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Stylesheet parsing errors
#[derive(Debug, Error)]
pub enum CssError {
    #[error("Unexpected end of file at {location}")]
    UnexpectedEof {
        location: SourceLocation,
    },

    #[error("Expected {expected}, found '{found}' at {location}")]
    Expected {
        expected: &'static str,
        found: String,
        location: SourceLocation,
    },

    #[error("Invalid selector '{selector}' at {location}")]
    InvalidSelector {
        selector: String,
        location: SourceLocation,
    },

    #[error("Empty value for property '{property}' at {location}")]
    EmptyValue {
        property: String,
        location: SourceLocation,
    },

    #[error("Unsupported at-rule '@{name}' at {location}")]
    UnsupportedAtRule {
        name: String,
        location: SourceLocation,
    },

    #[error("Unterminated string at {location}")]
    UnterminatedString {
        location: SourceLocation,
    },

    #[error("Unterminated comment at {location}")]
    UnterminatedComment {
        location: SourceLocation,
    },

    #[error("Invalid number '{number}' at {location}")]
    InvalidNumber {
        number: String,
        location: SourceLocation,
    },

    #[error("Parse error: {message} at {location}")]
    ParseError {
        message: String,
        location: SourceLocation,
    },
}

impl CssError {
    /// Get the source location of this error
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::UnexpectedEof { location }
            | Self::UnterminatedString { location }
            | Self::UnterminatedComment { location } => *location,
            Self::Expected { location, .. }
            | Self::InvalidSelector { location, .. }
            | Self::EmptyValue { location, .. }
            | Self::UnsupportedAtRule { location, .. }
            | Self::InvalidNumber { location, .. }
            | Self::ParseError { location, .. } => *location,
        }
    }

    pub fn unexpected_eof(location: SourceLocation) -> Self {
        Self::UnexpectedEof { location }
    }

    pub fn expected(expected: &'static str, found: impl Into<String>, location: SourceLocation) -> Self {
        Self::Expected { expected, found: found.into(), location }
    }

    pub fn invalid_selector(selector: impl Into<String>, location: SourceLocation) -> Self {
        Self::InvalidSelector { selector: selector.into(), location }
    }

    pub fn parse_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::ParseError { message: message.into(), location }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::new(10, 5, 100);
        assert_eq!(format!("{}", loc), "10:5");
    }

    #[test]
    fn test_error_display() {
        let loc = SourceLocation::new(1, 10, 9);
        let err = CssError::expected("':'", "}", loc);
        assert_eq!(format!("{}", err), "Expected ':', found '}' at 1:10");
        assert_eq!(err.location(), loc);
    }

    #[test]
    fn test_unsupported_at_rule_display() {
        let err = CssError::UnsupportedAtRule {
            name: "media".to_string(),
            location: SourceLocation::new(3, 1, 40),
        };
        assert_eq!(err.to_string(), "Unsupported at-rule '@media' at 3:1");
    }
}
