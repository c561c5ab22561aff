//! Stylec Style Engine
//!
//! Selector canonicalization, the cascade index and its resolvers, and the
//! wire form of the index.

pub mod cascade;
pub mod declaration;
pub mod error;
pub mod properties;
pub mod resolver;
pub mod term;
pub mod tree;
pub mod wire;

pub use cascade::{matches, Cascade, CascadeRule, CascadeSelector, MatchedRule};
pub use declaration::{Declaration, OrderCounter};
pub use error::{StyleError, StyleResult};
pub use properties::{
    camel_case, AttributeKind, AttributeRegistry, AttributeValue, InheritedProperties, NameValue,
    DEFAULT_INHERITED,
};
pub use resolver::StyleResolver;
pub use term::{AttributePredicate, Comparison, NthChild, ParentLink, SelectorTerm};
pub use tree::{NodeIndex, StyleNode, StyleTree};
pub use wire::{
    decode, encode, encode_value, to_json, WireAttribute, WireAttributeRule, WireComparison,
    WireDeclaration, WireNamedRule, WireNthChildRule, WireRuleIndex, WireStyleNode, WireValue,
};
