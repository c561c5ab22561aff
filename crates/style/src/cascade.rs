//! Cascade
//!
//! Direct resolution against a flat list of rules, testing every selector
//! against the element without going through the index. Declarations are
//! stamped the same way the index stamps them, so both resolvers agree on
//! every winner.

use std::collections::BTreeMap;

use stylec_css::{StyleRule, Stylesheet};
use stylec_dom::{ElementData, ElementTree, NodeId};

use crate::declaration::{merge_winner, Declaration, OrderCounter};
use crate::error::StyleResult;
use crate::properties::AttributeRegistry;
use crate::resolver::StyleResolver;
use crate::term::SelectorTerm;

/// One selector of a rule with the declarations stamped for it
#[derive(Debug, Clone)]
pub struct CascadeSelector {
    pub term: SelectorTerm,
    pub priority: i32,
    pub declarations: Vec<Declaration>,
}

/// A canonicalized rule
#[derive(Debug, Clone)]
pub struct CascadeRule {
    pub selectors: Vec<CascadeSelector>,
}

/// A rule matching an element, with its strongest matching selector
#[derive(Debug, Clone, Copy)]
pub struct MatchedRule<'a> {
    /// Position of the rule in source order
    pub index: usize,
    pub rule: &'a CascadeRule,
    pub selector: &'a CascadeSelector,
}

impl MatchedRule<'_> {
    /// Greatest specificity among the rule's matching selectors
    pub fn priority(&self) -> i32 {
        self.selector.priority
    }
}

/// Flat rule list with its own order counter
#[derive(Debug, Default)]
pub struct Cascade {
    rules: Vec<CascadeRule>,
    counter: OrderCounter,
}

impl Cascade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. Nothing is added if any of its selectors is unsupported.
    pub fn add_rule(&mut self, rule: &StyleRule, registry: &AttributeRegistry) -> StyleResult<()> {
        let terms = rule
            .selectors
            .iter()
            .map(SelectorTerm::canonicalize)
            .collect::<StyleResult<Vec<_>>>()?;
        let attributes = registry.convert(&rule.declarations);

        let selectors = terms
            .into_iter()
            .map(|term| {
                let priority = term.specificity().priority();
                let declarations = attributes
                    .iter()
                    .map(|attribute| Declaration::new(attribute.clone(), priority, self.counter.next()))
                    .collect();
                CascadeSelector { term, priority, declarations }
            })
            .collect();

        self.rules.push(CascadeRule { selectors });
        Ok(())
    }

    /// Add every rule of a stylesheet
    pub fn add_stylesheet(&mut self, stylesheet: &Stylesheet, registry: &AttributeRegistry) -> StyleResult<()> {
        for rule in &stylesheet.rules {
            self.add_rule(rule, registry)?;
        }
        Ok(())
    }

    pub fn rules(&self) -> &[CascadeRule] {
        &self.rules
    }

    /// Rules with at least one selector matching the element, in source order
    pub fn rules_for_element(&self, elements: &ElementTree, element: NodeId) -> Vec<MatchedRule<'_>> {
        let mut matched = Vec::new();

        for (index, rule) in self.rules.iter().enumerate() {
            let mut best: Option<&CascadeSelector> = None;
            for selector in &rule.selectors {
                if !matches(&selector.term, elements, element) {
                    continue;
                }
                // Later selectors win ties, as their declarations come later
                match best {
                    Some(current) if selector.priority < current.priority => {}
                    _ => best = Some(selector),
                }
            }

            if let Some(selector) = best {
                matched.push(MatchedRule { index, rule, selector });
            }
        }

        matched
    }
}

impl StyleResolver for Cascade {
    fn matched_styles(&self, elements: &ElementTree, element: NodeId) -> BTreeMap<String, Declaration> {
        let mut styles = BTreeMap::new();
        for matched in self.rules_for_element(elements, element) {
            for declaration in &matched.selector.declarations {
                merge_winner(&mut styles, declaration);
            }
        }
        styles
    }
}

/// Check if a selector term matches an element
pub fn matches(term: &SelectorTerm, elements: &ElementTree, element: NodeId) -> bool {
    let data = match elements.element(element) {
        Some(data) => data,
        None => return false,
    };

    if !matches_compound(term, data, elements, element) {
        return false;
    }

    match &term.parent {
        None => true,
        Some(link) if link.direct_child => elements
            .parent(element)
            .map(|parent| matches(&link.term, elements, parent))
            .unwrap_or(false),
        Some(link) => elements
            .ancestors(element)
            .into_iter()
            .any(|ancestor| matches(&link.term, elements, ancestor)),
    }
}

/// Match one compound's own predicates
fn matches_compound(term: &SelectorTerm, data: &ElementData, elements: &ElementTree, element: NodeId) -> bool {
    if !term.ids.iter().all(|id| data.id.as_deref() == Some(id.as_str())) {
        return false;
    }
    if !term.classes.iter().all(|class| data.has_class(class)) {
        return false;
    }
    if let Some(tag) = &term.tag {
        if data.tag_name != *tag {
            return false;
        }
    }
    if !term.attributes.iter().all(|predicate| predicate.matches(data)) {
        return false;
    }

    if term.first_child || term.last_child || !term.nth_child.is_empty() {
        let position = match elements.index_among_siblings(element) {
            Some(position) => position,
            None => return false,
        };
        if term.first_child && position != 0 {
            return false;
        }
        if term.last_child && position + 1 != elements.sibling_count(element) {
            return false;
        }
        if !term.nth_child.iter().all(|nth| nth.matches_index(position)) {
            return false;
        }
    }

    true
}
