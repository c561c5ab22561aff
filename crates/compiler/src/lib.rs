//! Stylec Compiler
//!
//! Follows imports from an entry stylesheet and compiles the result into a
//! style tree and its encoded form.

mod classes;
mod compiler;
mod error;
mod loader;
mod options;
mod preprocess;

pub use classes::ClassExportMap;
pub use compiler::{CompileOutput, Compiler};
pub use error::{CompileError, CompileResult};
pub use loader::{normalize, FsLoader, MemoryLoader, SourceLoader};
pub use options::CompileOptions;
pub use preprocess::{PlainCss, Preprocessed, Preprocessor};
