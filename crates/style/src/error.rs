//! Style engine error types

use thiserror::Error;

/// Style engine result type
pub type StyleResult<T> = Result<T, StyleError>;

/// Constructs the style index cannot represent, and wire encoding failures
#[derive(Debug, Error)]
pub enum StyleError {
    #[error("Unknown pseudo-class ':{0}'")]
    UnknownPseudoClass(String),

    #[error("Unsupported pseudo-element '::{0}'")]
    UnsupportedPseudoElement(String),

    #[error("Unsupported combinator '{0}'")]
    UnsupportedCombinator(String),

    #[error("Invalid nth-child argument '{0}'")]
    InvalidNthChild(String),

    #[error("Pseudo-class ':{name}' {problem}")]
    InvalidPseudoArgument { name: String, problem: &'static str },

    #[error("Unsupported attribute selector '[{attribute}{op}]': only '=' is supported")]
    UnsupportedAttributeSelector { attribute: String, op: String },

    #[error("Selector '{selector}' has more than one {what}")]
    ConflictingPredicate { selector: String, what: &'static str },

    #[error("Wire encoding failed: {0}")]
    Encode(#[from] bincode::Error),

    #[error("JSON rendering failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_token() {
        let err = StyleError::UnknownPseudoClass("hover".to_string());
        assert_eq!(err.to_string(), "Unknown pseudo-class ':hover'");

        let err = StyleError::UnsupportedAttributeSelector {
            attribute: "href".to_string(),
            op: "^=".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported attribute selector '[href^=]': only '=' is supported"
        );
    }
}
