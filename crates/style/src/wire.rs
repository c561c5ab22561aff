//! Wire Format
//!
//! Serializable mirror of the style tree. Every map is written as a list
//! sorted by key, so identical input always encodes to identical bytes.

use serde::{Deserialize, Serialize};

use crate::declaration::Declaration;
use crate::error::StyleResult;
use crate::properties::AttributeValue;
use crate::term::Comparison;
use crate::tree::{NodeIndex, StyleNode, StyleTree};

/// A node of the serialized index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireStyleNode {
    /// Unset when the node has no children
    pub rule_index: Option<Box<WireRuleIndex>>,
    pub styles: Vec<WireDeclaration>,
}

/// Children of a node, grouped by predicate kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireRuleIndex {
    pub id_rules: Vec<WireNamedRule>,
    pub class_rules: Vec<WireNamedRule>,
    pub tag_rules: Vec<WireNamedRule>,
    pub attribute_rules: Vec<WireAttributeRule>,
    pub first_child_rule: Option<Box<WireStyleNode>>,
    pub last_child_rule: Option<Box<WireStyleNode>>,
    pub nth_child_rules: Vec<WireNthChildRule>,
    pub direct_parent_rules: Option<Box<WireStyleNode>>,
    pub ancestor_rules: Option<Box<WireStyleNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNamedRule {
    pub name: String,
    pub node: WireStyleNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireComparison {
    Equals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireAttributeRule {
    pub attribute: String,
    pub value: String,
    pub kind: WireComparison,
    pub node: WireStyleNode,
}

/// Zero `n` or `offset` is written as unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNthChildRule {
    pub n: Option<i32>,
    pub offset: Option<i32>,
    pub node: WireStyleNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireValue {
    String(String),
    Int(i32),
    Double(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireAttribute {
    pub name: String,
    pub value: WireValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireDeclaration {
    pub attribute: WireAttribute,
    pub priority: i32,
    pub order: i32,
    pub id: i32,
}

/// Pick the wire variant of a value: a non-empty string, else a non-zero
/// int, else the double. An int or double of zero both come out as `Double(0.0)`.
pub fn encode_value(value: &AttributeValue) -> WireValue {
    if !value.string_value.is_empty() {
        WireValue::String(value.string_value.clone())
    } else if value.int_value != 0 {
        WireValue::Int(value.int_value)
    } else {
        WireValue::Double(value.double_value)
    }
}

fn non_zero(value: i32) -> Option<i32> {
    (value != 0).then_some(value)
}

impl From<&Declaration> for WireDeclaration {
    fn from(declaration: &Declaration) -> Self {
        Self {
            attribute: WireAttribute {
                name: declaration.attribute.name.clone(),
                value: encode_value(&declaration.attribute.value),
            },
            priority: declaration.priority,
            order: declaration.order,
            id: declaration.id,
        }
    }
}

impl StyleTree {
    /// Convert the whole index into its wire form
    pub fn to_wire(&self) -> WireStyleNode {
        self.node_to_wire(self.root())
    }

    fn child_to_wire(&self, index: NodeIndex) -> WireStyleNode {
        match self.get(index) {
            Some(node) => self.node_to_wire(node),
            None => WireStyleNode::default(),
        }
    }

    fn named_to_wire<'a>(&self, rules: impl Iterator<Item = (&'a String, &'a NodeIndex)>) -> Vec<WireNamedRule> {
        let mut named: Vec<_> = rules
            .map(|(name, index)| WireNamedRule {
                name: name.clone(),
                node: self.child_to_wire(*index),
            })
            .collect();
        named.sort_by(|a, b| a.name.cmp(&b.name));
        named
    }

    fn node_to_wire(&self, node: &StyleNode) -> WireStyleNode {
        let styles = node.declarations.iter().map(WireDeclaration::from).collect();
        if node.is_leaf() {
            return WireStyleNode { rule_index: None, styles };
        }

        let mut attribute_rules: Vec<_> = node
            .attribute_rules
            .iter()
            .map(|(predicate, index)| {
                (
                    predicate,
                    WireAttributeRule {
                        attribute: predicate.attribute.clone(),
                        value: predicate.value.clone(),
                        kind: match predicate.comparison {
                            Comparison::Equals => WireComparison::Equals,
                        },
                        node: self.child_to_wire(*index),
                    },
                )
            })
            .collect();
        attribute_rules.sort_by(|a, b| a.0.cmp(b.0));

        let mut nth_child_rules: Vec<_> = node.nth_child_rules.iter().collect();
        nth_child_rules.sort_by_key(|(nth, _)| *nth);

        let boxed = |index: Option<NodeIndex>| index.map(|i| Box::new(self.child_to_wire(i)));

        let rule_index = WireRuleIndex {
            id_rules: self.named_to_wire(node.id_rules.iter()),
            class_rules: self.named_to_wire(node.class_rules.iter()),
            tag_rules: self.named_to_wire(node.tag_rules.iter()),
            attribute_rules: attribute_rules.into_iter().map(|(_, rule)| rule).collect(),
            first_child_rule: boxed(node.first_child_rule),
            last_child_rule: boxed(node.last_child_rule),
            nth_child_rules: nth_child_rules
                .into_iter()
                .map(|(nth, index)| WireNthChildRule {
                    n: non_zero(nth.step),
                    offset: non_zero(nth.offset),
                    node: self.child_to_wire(*index),
                })
                .collect(),
            direct_parent_rules: boxed(node.direct_parent_rule),
            ancestor_rules: boxed(node.ancestor_rule),
        };

        WireStyleNode {
            rule_index: Some(Box::new(rule_index)),
            styles,
        }
    }
}

impl WireStyleNode {
    /// Number of declarations in this node and below
    pub fn declaration_count(&self) -> usize {
        let children = match &self.rule_index {
            Some(index) => index.children().map(|c| c.declaration_count()).sum(),
            None => 0,
        };
        self.styles.len() + children
    }
}

impl WireRuleIndex {
    /// All child nodes in serialization order
    pub fn children(&self) -> impl Iterator<Item = &WireStyleNode> {
        self.id_rules
            .iter()
            .chain(&self.class_rules)
            .chain(&self.tag_rules)
            .map(|r| &r.node)
            .chain(self.attribute_rules.iter().map(|r| &r.node))
            .chain(self.first_child_rule.as_deref())
            .chain(self.last_child_rule.as_deref())
            .chain(self.nth_child_rules.iter().map(|r| &r.node))
            .chain(self.direct_parent_rules.as_deref())
            .chain(self.ancestor_rules.as_deref())
    }
}

/// Encode a wire tree into its binary form
pub fn encode(node: &WireStyleNode) -> StyleResult<Vec<u8>> {
    Ok(bincode::serialize(node)?)
}

/// Decode a binary wire tree
pub fn decode(bytes: &[u8]) -> StyleResult<WireStyleNode> {
    Ok(bincode::deserialize(bytes)?)
}

/// Pretty JSON rendering of a wire tree
pub fn to_json(node: &WireStyleNode) -> StyleResult<String> {
    Ok(serde_json::to_string_pretty(node)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::OrderCounter;
    use crate::properties::AttributeRegistry;
    use stylec_css::Stylesheet;

    fn wire(css: &str) -> WireStyleNode {
        let mut tree = StyleTree::new();
        tree.add_stylesheet(
            &Stylesheet::parse(css).unwrap(),
            &AttributeRegistry::default(),
            &mut OrderCounter::new(),
        )
        .unwrap();
        tree.to_wire()
    }

    #[test]
    fn test_value_encoding() {
        assert_eq!(encode_value(&AttributeValue::string("red")), WireValue::String("red".to_string()));
        assert_eq!(encode_value(&AttributeValue::int(3)), WireValue::Int(3));
        assert_eq!(encode_value(&AttributeValue::double(0.5)), WireValue::Double(0.5));
        // Zero is indistinguishable from absent
        assert_eq!(encode_value(&AttributeValue::int(0)), WireValue::Double(0.0));
    }

    #[test]
    fn test_keys_are_sorted() {
        let node = wire(".zeta { a: 1; } .alpha { a: 2; } .mid { a: 3; } [k=b] { a: 4; } [k=a] { a: 5; } [a=z] { a: 6; }");
        let index = node.rule_index.unwrap();

        let classes: Vec<_> = index.class_rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(classes, vec!["alpha", "mid", "zeta"]);
        let attributes: Vec<_> = index
            .attribute_rules
            .iter()
            .map(|r| (r.attribute.as_str(), r.value.as_str()))
            .collect();
        assert_eq!(attributes, vec![("a", "z"), ("k", "a"), ("k", "b")]);
    }

    #[test]
    fn test_nth_child_rules() {
        let node = wire(":nth-child(3) { a: 1; } :nth-child(2n) { a: 2; } :nth-child(-n+3) { a: 3; }");
        let index = node.rule_index.unwrap();
        let rules: Vec<_> = index.nth_child_rules.iter().map(|r| (r.n, r.offset)).collect();
        assert_eq!(rules, vec![(Some(-1), Some(3)), (None, Some(3)), (Some(2), None)]);
    }

    #[test]
    fn test_unused_fields_are_unset() {
        let node = wire(".a { color: red; }");
        let index = node.rule_index.as_ref().unwrap();
        assert!(node.styles.is_empty());
        assert!(index.id_rules.is_empty() && index.tag_rules.is_empty());
        assert!(index.first_child_rule.is_none() && index.ancestor_rules.is_none());

        let leaf = &index.class_rules[0].node;
        assert!(leaf.rule_index.is_none());
        assert_eq!(leaf.styles[0].attribute.value, WireValue::String("red".to_string()));
        assert_eq!(leaf.styles[0].id, leaf.styles[0].order);
    }

    #[test]
    fn test_combinator_nodes() {
        let node = wire("#id > .xyz.abc { rule1: val1; } View Label { rule2: val2; }");
        let index = node.rule_index.as_ref().unwrap();

        let abc = index.class_rules[0].node.rule_index.as_ref().unwrap();
        let xyz = abc.class_rules[0].node.rule_index.as_ref().unwrap();
        let parent = xyz.direct_parent_rules.as_ref().unwrap();
        let id = &parent.rule_index.as_ref().unwrap().id_rules[0];
        assert_eq!(id.name, "id");
        assert_eq!(id.node.styles[0].attribute.name, "rule1");

        let label = index.tag_rules[0].node.rule_index.as_ref().unwrap();
        assert!(label.ancestor_rules.is_some());
        assert_eq!(node.declaration_count(), 2);
    }

    #[test]
    fn test_deterministic_bytes() {
        let css = ".b.a { x: 1; } .c, #d, Label { y: 2; } [k=v] .e > :first-child { z: 3; } .f:nth-child(odd) { w: 4; }";
        let first = encode(&wire(css)).unwrap();
        let second = encode(&wire(css)).unwrap();
        assert_eq!(first, second);
        assert_eq!(decode(&first).unwrap(), wire(css));
    }

    #[test]
    fn test_json_rendering() {
        let json = to_json(&wire("Label { z-index: 2; }")).unwrap();
        assert!(json.contains("\"zIndex\""));
        assert!(json.contains("\"Int\": 2"));
    }
}
