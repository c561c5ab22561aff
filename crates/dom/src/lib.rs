//! Stylec DOM - UI element tree
//!
//! The element tree that style resolution matches selectors against: tag,
//! id, classes, attributes and an ordered list of children per element.

mod error;
mod node;
mod tree;

pub use error::{DomError, DomResult};
pub use node::{ElementData, Node, NodeId};
pub use tree::ElementTree;
