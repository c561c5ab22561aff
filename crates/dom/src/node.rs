//! Element node representation

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;

/// Unique identifier for a node in the element tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node ID
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Element-specific data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementData {
    /// Tag name, case preserved (`Label`, `View`, ...)
    pub tag_name: String,
    /// Element id
    pub id: Option<String>,
    /// Classes in the order they were given, without duplicates
    pub classes: SmallVec<[String; 4]>,
    /// Other attributes
    pub attributes: FxHashMap<String, String>,
}

impl ElementData {
    /// Create a new element with the given tag name
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Default::default()
        }
    }

    /// Create an element from a whitespace separated class string
    pub fn from_class_attr(tag_name: impl Into<String>, classes: &str) -> Self {
        let mut element = Self::new(tag_name);
        element.set_class_attr(classes);
        element
    }

    /// Builder: set the id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder: add a class
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    /// Builder: set an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Replace the class list with the classes of a whitespace separated string
    pub fn set_class_attr(&mut self, classes: &str) {
        self.classes.clear();
        for class in classes.split_whitespace() {
            self.add_class(class);
        }
    }

    /// Add a class if not already present
    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !class.is_empty() && !self.has_class(&class) {
            self.classes.push(class);
        }
    }

    /// Check if the element has a class
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Get an attribute value
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Set an attribute value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Remove an attribute
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }
}

impl fmt::Display for ElementData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag_name)?;
        if let Some(id) = &self.id {
            write!(f, "#{}", id)?;
        }
        for class in &self.classes {
            write!(f, ".{}", class)?;
        }
        let mut attrs: Vec<_> = self.attributes.iter().collect();
        attrs.sort();
        for (name, value) in attrs {
            write!(f, "[{}=\"{}\"]", name, value)?;
        }
        Ok(())
    }
}

/// A node in the element tree
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,
    /// Element data
    pub element: ElementData,
    /// Parent node ID (None for root or detached nodes)
    pub parent: Option<NodeId>,
    /// Child node IDs in document order
    pub children: SmallVec<[NodeId; 8]>,
}

impl Node {
    /// Create a new detached node
    pub fn new(id: NodeId, element: ElementData) -> Self {
        Self {
            id,
            element,
            parent: None,
            children: SmallVec::new(),
        }
    }

    /// Get the tag name
    pub fn tag_name(&self) -> &str {
        &self.element.tag_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_class_attr() {
        let element = ElementData::from_class_attr("View", "  nav  active nav ");
        assert_eq!(element.classes.as_slice(), &["nav".to_string(), "active".to_string()]);
        assert!(element.has_class("active"));
        assert!(!element.has_class("act"));
    }

    #[test]
    fn test_tag_case_is_preserved() {
        let element = ElementData::new("Label");
        assert_eq!(element.tag_name, "Label");
    }

    #[test]
    fn test_display() {
        let element = ElementData::new("Label")
            .with_id("title")
            .with_class("a")
            .with_attribute("kind", "primary");
        assert_eq!(element.to_string(), "Label#title.a[kind=\"primary\"]");
    }
}
