//! Compilation error types

use std::path::PathBuf;

use stylec_css::CssError;
use stylec_style::StyleError;
use thiserror::Error;

/// Compilation result type
pub type CompileResult<T> = Result<T, CompileError>;

/// Compilation errors. Every error raised while handling a file names that file.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{}: {source}", path.display())]
    Css {
        path: PathBuf,
        #[source]
        source: CssError,
    },

    #[error("{}: {source}", path.display())]
    Style {
        path: PathBuf,
        #[source]
        source: StyleError,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cyclic import: {}", format_chain(chain))]
    CyclicImport { chain: Vec<PathBuf> },

    #[error("{}: preprocessing failed: {message}", path.display())]
    Preprocess { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Encoding failed: {0}")]
    Encode(#[source] StyleError),
}

impl CompileError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Io { path: path.into(), source }
    }

    /// File the error was raised for, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            CompileError::Css { path, .. }
            | CompileError::Style { path, .. }
            | CompileError::Io { path, .. }
            | CompileError::Preprocess { path, .. } => Some(path),
            CompileError::CyclicImport { chain } => chain.last(),
            CompileError::Config(_) | CompileError::Encode(_) => None,
        }
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
