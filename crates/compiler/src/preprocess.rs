//! Preprocessing
//!
//! Hook for turning a source dialect into plain stylesheet text before it
//! is parsed.

use std::path::{Path, PathBuf};

/// Output of a preprocessor run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    pub css: String,
    /// Extra files the preprocessor read, reported as dependencies
    pub files_read: Vec<PathBuf>,
}

/// Turns loaded source text into plain stylesheet text
pub trait Preprocessor {
    /// On failure, returns a message describing the problem
    fn preprocess(&self, path: &Path, source: String) -> Result<Preprocessed, String>;
}

/// Passes plain stylesheets through unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainCss;

impl Preprocessor for PlainCss {
    fn preprocess(&self, _path: &Path, source: String) -> Result<Preprocessed, String> {
        Ok(Preprocessed { css: source, files_read: Vec::new() })
    }
}
