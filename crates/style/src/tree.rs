//! Style Tree
//!
//! The cascade index. Every selector is indexed as a path of predicates
//! from the root, innermost compound first, so a lookup can start from the
//! element's own id, classes and tag and walk outward to its ancestors.
//!
//! Nodes live in an arena and refer to their children by [`NodeIndex`].

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use stylec_css::{Specificity, StyleRule, Stylesheet};
use stylec_dom::{ElementTree, NodeId};

use crate::declaration::{merge_winner, Declaration, OrderCounter};
use crate::error::StyleResult;
use crate::properties::{AttributeRegistry, NameValue};
use crate::resolver::StyleResolver;
use crate::term::{AttributePredicate, NthChild, SelectorTerm};

/// Index of a node in the style tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex(u32);

impl NodeIndex {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of the cascade index
#[derive(Debug, Clone, Default)]
pub struct StyleNode {
    /// Declarations of selectors whose path ends here, in insertion order
    pub declarations: Vec<Declaration>,
    pub id_rules: FxHashMap<String, NodeIndex>,
    pub class_rules: FxHashMap<String, NodeIndex>,
    pub tag_rules: FxHashMap<String, NodeIndex>,
    pub attribute_rules: Vec<(AttributePredicate, NodeIndex)>,
    pub first_child_rule: Option<NodeIndex>,
    pub last_child_rule: Option<NodeIndex>,
    pub nth_child_rules: Vec<(NthChild, NodeIndex)>,
    /// Continue matching against the parent element
    pub direct_parent_rule: Option<NodeIndex>,
    /// Continue matching against every ancestor
    pub ancestor_rule: Option<NodeIndex>,
}

impl StyleNode {
    /// True when no predicate leads out of this node
    pub fn is_leaf(&self) -> bool {
        self.id_rules.is_empty()
            && self.class_rules.is_empty()
            && self.tag_rules.is_empty()
            && self.attribute_rules.is_empty()
            && self.first_child_rule.is_none()
            && self.last_child_rule.is_none()
            && self.nth_child_rules.is_empty()
            && self.direct_parent_rule.is_none()
            && self.ancestor_rule.is_none()
    }
}

/// Edge between a node and one of its children
enum Edge<'a> {
    Id(&'a str),
    Class(&'a str),
    Tag(&'a str),
    Attribute(&'a AttributePredicate),
    FirstChild,
    LastChild,
    NthChild(NthChild),
    DirectParent,
    Ancestor,
}

/// The cascade index of one compile
#[derive(Debug, Clone)]
pub struct StyleTree {
    nodes: Vec<StyleNode>,
}

impl StyleTree {
    pub const ROOT: NodeIndex = NodeIndex(0);

    /// Create a tree holding only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![StyleNode::default()],
        }
    }

    pub fn root(&self) -> &StyleNode {
        &self.nodes[Self::ROOT.index()]
    }

    /// Get a node by index
    pub fn get(&self, index: NodeIndex) -> Option<&StyleNode> {
        self.nodes.get(index.index())
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].declarations.is_empty()
    }

    /// Number of indexed declarations
    pub fn declaration_count(&self) -> usize {
        self.nodes.iter().map(|n| n.declarations.len()).sum()
    }

    fn edge_target(&self, parent: NodeIndex, edge: &Edge<'_>) -> Option<NodeIndex> {
        let node = &self.nodes[parent.index()];
        match edge {
            Edge::Id(name) => node.id_rules.get(*name).copied(),
            Edge::Class(name) => node.class_rules.get(*name).copied(),
            Edge::Tag(name) => node.tag_rules.get(*name).copied(),
            Edge::Attribute(predicate) => node
                .attribute_rules
                .iter()
                .find(|(existing, _)| existing == *predicate)
                .map(|(_, child)| *child),
            Edge::FirstChild => node.first_child_rule,
            Edge::LastChild => node.last_child_rule,
            Edge::NthChild(nth) => node
                .nth_child_rules
                .iter()
                .find(|(existing, _)| existing == nth)
                .map(|(_, child)| *child),
            Edge::DirectParent => node.direct_parent_rule,
            Edge::Ancestor => node.ancestor_rule,
        }
    }

    fn set_edge(&mut self, parent: NodeIndex, edge: Edge<'_>, child: NodeIndex) {
        let node = &mut self.nodes[parent.index()];
        match edge {
            Edge::Id(name) => {
                node.id_rules.insert(name.to_string(), child);
            }
            Edge::Class(name) => {
                node.class_rules.insert(name.to_string(), child);
            }
            Edge::Tag(name) => {
                node.tag_rules.insert(name.to_string(), child);
            }
            Edge::Attribute(predicate) => node.attribute_rules.push((predicate.clone(), child)),
            Edge::FirstChild => node.first_child_rule = Some(child),
            Edge::LastChild => node.last_child_rule = Some(child),
            Edge::NthChild(nth) => node.nth_child_rules.push((nth, child)),
            Edge::DirectParent => node.direct_parent_rule = Some(child),
            Edge::Ancestor => node.ancestor_rule = Some(child),
        }
    }

    /// Follow an edge, creating the child on first use
    fn child(&mut self, parent: NodeIndex, edge: Edge<'_>) -> NodeIndex {
        if let Some(existing) = self.edge_target(parent, &edge) {
            return existing;
        }
        let child = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(StyleNode::default());
        self.set_edge(parent, edge, child);
        child
    }

    /// Descend through one compound's predicates in canonical order
    fn descend(&mut self, mut node: NodeIndex, term: &SelectorTerm) -> NodeIndex {
        for id in &term.ids {
            node = self.child(node, Edge::Id(id));
        }
        for class in &term.classes {
            node = self.child(node, Edge::Class(class));
        }
        if let Some(tag) = &term.tag {
            node = self.child(node, Edge::Tag(tag));
        }
        for attribute in &term.attributes {
            node = self.child(node, Edge::Attribute(attribute));
        }
        if term.first_child {
            node = self.child(node, Edge::FirstChild);
        }
        if term.last_child {
            node = self.child(node, Edge::LastChild);
        }
        for nth in &term.nth_child {
            node = self.child(node, Edge::NthChild(*nth));
        }
        node
    }

    /// Index declarations under a selector term
    pub fn insert(
        &mut self,
        declarations: &[NameValue],
        term: &SelectorTerm,
        specificity: Specificity,
        counter: &mut OrderCounter,
    ) {
        let mut node = Self::ROOT;
        let mut current = term;

        loop {
            node = self.descend(node, current);
            match &current.parent {
                Some(link) => {
                    let edge = if link.direct_child { Edge::DirectParent } else { Edge::Ancestor };
                    node = self.child(node, edge);
                    current = link.term.as_ref();
                }
                None => break,
            }
        }

        let priority = specificity.priority();
        log::trace!(
            "Indexing {} declaration(s) under '{}' with priority {:#x}",
            declarations.len(),
            term,
            priority
        );

        let target = &mut self.nodes[node.index()];
        for attribute in declarations {
            target
                .declarations
                .push(Declaration::new(attribute.clone(), priority, counter.next()));
        }
    }

    /// Index every selector of a rule. All selectors are canonicalized
    /// before anything is inserted, so a failing rule leaves the tree as it was.
    pub fn add_rule(
        &mut self,
        rule: &StyleRule,
        registry: &AttributeRegistry,
        counter: &mut OrderCounter,
    ) -> StyleResult<Vec<SelectorTerm>> {
        let terms = rule
            .selectors
            .iter()
            .map(SelectorTerm::canonicalize)
            .collect::<StyleResult<Vec<_>>>()?;
        let declarations = registry.convert(&rule.declarations);

        for term in &terms {
            self.insert(&declarations, term, term.specificity(), counter);
        }
        Ok(terms)
    }

    /// Index every rule of a stylesheet, in source order
    pub fn add_stylesheet(
        &mut self,
        stylesheet: &Stylesheet,
        registry: &AttributeRegistry,
        counter: &mut OrderCounter,
    ) -> StyleResult<Vec<SelectorTerm>> {
        let mut terms = Vec::new();
        for rule in &stylesheet.rules {
            terms.extend(self.add_rule(rule, registry, counter)?);
        }
        Ok(terms)
    }

    fn collect(
        &self,
        index: NodeIndex,
        elements: &ElementTree,
        element: NodeId,
        styles: &mut BTreeMap<String, Declaration>,
    ) {
        let node = &self.nodes[index.index()];
        for declaration in &node.declarations {
            merge_winner(styles, declaration);
        }

        let data = match elements.element(element) {
            Some(data) => data,
            None => return,
        };

        if let Some(id) = &data.id {
            if let Some(&child) = node.id_rules.get(id) {
                self.collect(child, elements, element, styles);
            }
        }
        for class in &data.classes {
            if let Some(&child) = node.class_rules.get(class) {
                self.collect(child, elements, element, styles);
            }
        }
        if let Some(&child) = node.tag_rules.get(&data.tag_name) {
            self.collect(child, elements, element, styles);
        }
        for (predicate, child) in &node.attribute_rules {
            if predicate.matches(data) {
                self.collect(*child, elements, element, styles);
            }
        }

        let position = elements.index_among_siblings(element);
        let count = elements.sibling_count(element);
        if let (Some(child), Some(0)) = (node.first_child_rule, position) {
            self.collect(child, elements, element, styles);
        }
        if let (Some(child), Some(position)) = (node.last_child_rule, position) {
            if position + 1 == count {
                self.collect(child, elements, element, styles);
            }
        }
        if let Some(position) = position {
            for (nth, child) in &node.nth_child_rules {
                if nth.matches_index(position) {
                    self.collect(*child, elements, element, styles);
                }
            }
        }

        if let Some(child) = node.direct_parent_rule {
            if let Some(parent) = elements.parent(element) {
                self.collect(child, elements, parent, styles);
            }
        }
        if let Some(child) = node.ancestor_rule {
            for ancestor in elements.ancestors(element) {
                self.collect(child, elements, ancestor, styles);
            }
        }
    }
}

impl StyleResolver for StyleTree {
    fn matched_styles(&self, elements: &ElementTree, element: NodeId) -> BTreeMap<String, Declaration> {
        let mut styles = BTreeMap::new();
        self.collect(Self::ROOT, elements, element, &mut styles);
        styles
    }
}

impl Default for StyleTree {
    fn default() -> Self {
        Self::new()
    }
}
