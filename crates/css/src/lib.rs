//! Stylec CSS Parser
//!
//! Tokenizer, selector grammar and stylesheet parser for UI stylesheets.

pub mod error;
pub mod parser;
pub mod selector;
pub mod tokenizer;

pub use error::{CssError, CssResult, SourceLocation};
pub use parser::{CssParser, Declaration, ImportRule, StyleRule, Stylesheet};
pub use selector::{AttributeOp, Combinator, Selector, SelectorPart, Specificity};
pub use tokenizer::{HashType, RawText, Span, Token, Tokenizer};
