//! Element tree error types

use thiserror::Error;

/// Element tree operation result type
pub type DomResult<T> = Result<T, DomError>;

/// Element tree errors
#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Node {child} already has parent {parent}")]
    AlreadyAttached { child: u32, parent: u32 },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}
