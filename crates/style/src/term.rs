//! Selector Canonicalization
//!
//! Turns a parsed selector into a chain of [`SelectorTerm`]s, one per
//! compound selector, with predicates kept in a fixed order so that
//! selectors differing only in how they were written (`.b.a` and `.a.b`)
//! produce equal terms.

use std::collections::BTreeSet;
use std::fmt;

use stylec_css::{AttributeOp, Combinator, Selector, SelectorPart, Specificity};
use stylec_dom::ElementData;

use crate::error::{StyleError, StyleResult};

/// Attribute comparison kinds the index can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Comparison {
    Equals,
}

/// `[attribute=value]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributePredicate {
    pub attribute: String,
    pub value: String,
    pub comparison: Comparison,
}

impl AttributePredicate {
    pub fn equals(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
            comparison: Comparison::Equals,
        }
    }

    /// Check the predicate against an element's attributes
    pub fn matches(&self, element: &ElementData) -> bool {
        match self.comparison {
            Comparison::Equals => element.get_attribute(&self.attribute) == Some(self.value.as_str()),
        }
    }
}

/// `:nth-child(step n + offset)`. Positions are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NthChild {
    pub step: i32,
    pub offset: i32,
}

impl NthChild {
    pub fn new(step: i32, offset: i32) -> Self {
        Self { step, offset }
    }

    /// Parse an nth-child argument: `even`, `odd`, `an+b` or a bare integer
    pub fn parse(argument: &str) -> StyleResult<Self> {
        let invalid = || StyleError::InvalidNthChild(argument.trim().to_string());
        let compact: String = argument
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match compact.as_str() {
            "even" => return Ok(Self::new(2, 0)),
            "odd" => return Ok(Self::new(2, 1)),
            "" => return Err(invalid()),
            _ => {}
        }

        let (coefficient, constant) = match compact.split_once('n') {
            Some(split) => split,
            None => return compact.parse::<i32>().map(|k| Self::new(0, k)).map_err(|_| invalid()),
        };

        let step = match coefficient {
            "" | "+" => 1,
            "-" => -1,
            a => a.parse::<i32>().map_err(|_| invalid())?,
        };

        let offset = if constant.is_empty() {
            0
        } else if constant.starts_with('+') || constant.starts_with('-') {
            constant.parse::<i32>().map_err(|_| invalid())?
        } else {
            return Err(invalid());
        };

        Ok(Self::new(step, offset))
    }

    /// Whether the child at 0-based `index` is selected
    pub fn matches_index(&self, index: usize) -> bool {
        let position = index as i64 + 1;
        let step = i64::from(self.step);
        let offset = i64::from(self.offset);

        if step == 0 {
            return position == offset;
        }
        let distance = position - offset;
        distance % step == 0 && distance / step >= 0
    }
}

impl fmt::Display for NthChild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            0 => return write!(f, "{}", self.offset),
            1 => f.write_str("n")?,
            -1 => f.write_str("-n")?,
            step => write!(f, "{}n", step)?,
        }
        match self.offset {
            0 => Ok(()),
            offset if offset > 0 => write!(f, "+{}", offset),
            offset => write!(f, "{}", offset),
        }
    }
}

/// Link from a compound selector to the one left of its combinator
#[derive(Debug, Clone, PartialEq)]
pub struct ParentLink {
    pub term: Box<SelectorTerm>,
    /// `>` when true, descendant otherwise
    pub direct_child: bool,
}

/// One compound selector with its predicates in canonical order.
/// A term without predicates is the universal selector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorTerm {
    /// More than one id never matches, but is still indexed
    pub ids: BTreeSet<String>,
    pub classes: BTreeSet<String>,
    pub tag: Option<String>,
    /// Sorted by attribute, then value
    pub attributes: Vec<AttributePredicate>,
    pub first_child: bool,
    pub last_child: bool,
    /// Sorted by (step, offset)
    pub nth_child: Vec<NthChild>,
    pub parent: Option<ParentLink>,
}

impl SelectorTerm {
    /// Canonicalize a parsed selector. The rightmost compound selector is
    /// the returned term; compounds to its left hang off `parent`.
    pub fn canonicalize(selector: &Selector) -> StyleResult<Self> {
        let mut current = SelectorTerm::default();

        for part in &selector.parts {
            match part {
                SelectorPart::Combinator(combinator) => {
                    let direct_child = match combinator {
                        Combinator::Child => true,
                        Combinator::Descendant => false,
                        other => return Err(StyleError::UnsupportedCombinator(other.to_string())),
                    };
                    let parent = std::mem::take(&mut current);
                    current.parent = Some(ParentLink {
                        term: Box::new(parent),
                        direct_child,
                    });
                }
                simple => current.add_predicate(simple, &selector.text)?,
            }
        }

        Ok(current)
    }

    fn add_predicate(&mut self, part: &SelectorPart, selector: &str) -> StyleResult<()> {
        let conflict = |what| StyleError::ConflictingPredicate {
            selector: selector.to_string(),
            what,
        };

        match part {
            SelectorPart::Universal => {}
            SelectorPart::Type(tag) => match &self.tag {
                Some(existing) if existing != tag => return Err(conflict("tag")),
                _ => self.tag = Some(tag.clone()),
            },
            SelectorPart::Id(id) => {
                self.ids.insert(id.clone());
            }
            SelectorPart::Class(class) => {
                self.classes.insert(class.clone());
            }
            SelectorPart::Attribute { name, op, value } => {
                let predicate = match (op, value) {
                    (Some(AttributeOp::Equals), Some(value)) => AttributePredicate::equals(name, value),
                    (op, _) => {
                        return Err(StyleError::UnsupportedAttributeSelector {
                            attribute: name.clone(),
                            op: op.map(|op| op.as_str().to_string()).unwrap_or_default(),
                        })
                    }
                };
                if let Err(pos) = self.attributes.binary_search(&predicate) {
                    self.attributes.insert(pos, predicate);
                }
            }
            SelectorPart::PseudoClass { name, args } => match (name.as_str(), args) {
                ("first-child", None) => self.first_child = true,
                ("last-child", None) => self.last_child = true,
                ("nth-child", Some(argument)) => {
                    let nth = NthChild::parse(argument)?;
                    if let Err(pos) = self.nth_child.binary_search(&nth) {
                        self.nth_child.insert(pos, nth);
                    }
                }
                ("first-child" | "last-child", Some(_)) => {
                    return Err(StyleError::InvalidPseudoArgument {
                        name: name.clone(),
                        problem: "takes no argument",
                    })
                }
                ("nth-child", None) => {
                    return Err(StyleError::InvalidPseudoArgument {
                        name: name.clone(),
                        problem: "requires an argument",
                    })
                }
                _ => return Err(StyleError::UnknownPseudoClass(name.clone())),
            },
            SelectorPart::PseudoElement(name) => {
                return Err(StyleError::UnsupportedPseudoElement(name.clone()))
            }
            // Handled by canonicalize
            SelectorPart::Combinator(_) => {}
        }

        Ok(())
    }

    /// True when this compound has no predicates of its own
    pub fn is_universal(&self) -> bool {
        self.ids.is_empty()
            && self.classes.is_empty()
            && self.tag.is_none()
            && self.attributes.is_empty()
            && !self.first_child
            && !self.last_child
            && self.nth_child.is_empty()
    }

    /// Specificity summed over the whole chain
    pub fn specificity(&self) -> Specificity {
        let mut specificity = Specificity::new(
            self.ids.len() as u32,
            (self.classes.len()
                + self.attributes.len()
                + self.nth_child.len()
                + usize::from(self.first_child)
                + usize::from(self.last_child)) as u32,
            u32::from(self.tag.is_some()),
        );
        if let Some(link) = &self.parent {
            specificity.add(&link.term.specificity());
        }
        specificity
    }

    /// Every class name used anywhere in the chain
    pub fn all_classes(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = self.classes.iter().map(|c| c.as_str()).collect();
        if let Some(link) = &self.parent {
            classes.extend(link.term.all_classes());
        }
        classes
    }

    fn fmt_compound(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_universal() {
            return f.write_str("*");
        }
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
        }
        for id in &self.ids {
            write!(f, "#{}", id)?;
        }
        for class in &self.classes {
            write!(f, ".{}", class)?;
        }
        for attribute in &self.attributes {
            write!(f, "[{}=\"{}\"]", attribute.attribute, attribute.value)?;
        }
        if self.first_child {
            f.write_str(":first-child")?;
        }
        if self.last_child {
            f.write_str(":last-child")?;
        }
        for nth in &self.nth_child {
            write!(f, ":nth-child({})", nth)?;
        }
        Ok(())
    }
}

/// Canonical selector text
impl fmt::Display for SelectorTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(link) = &self.parent {
            write!(f, "{}{}", link.term, if link.direct_child { " > " } else { " " })?;
        }
        self.fmt_compound(f)
    }
}
