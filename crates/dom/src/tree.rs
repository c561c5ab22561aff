//! Element tree structure

use rustc_hash::FxHashMap;

use crate::error::{DomError, DomResult};
use crate::node::{ElementData, Node, NodeId};

/// Element tree that owns all nodes
#[derive(Debug)]
pub struct ElementTree {
    /// All nodes in the tree, attached or not
    nodes: FxHashMap<NodeId, Node>,
    /// Next available node ID
    next_id: u32,
    /// Root element
    root_id: NodeId,
}

impl ElementTree {
    /// Create a tree holding a single root element
    pub fn new(root: ElementData) -> Self {
        let root_id = NodeId::new(0);
        let mut nodes = FxHashMap::default();
        nodes.insert(root_id, Node::new(root_id, root));

        Self {
            nodes,
            next_id: 1,
            root_id,
        }
    }

    /// Get the root node ID
    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Get the element data of a node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).map(|n| &n.element)
    }

    /// Create a new detached element node
    pub fn create_element(&mut self, element: ElementData) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(id, element));
        id
    }

    /// Create an element and append it to `parent_id`
    pub fn append_element(&mut self, parent_id: NodeId, element: ElementData) -> DomResult<NodeId> {
        if !self.nodes.contains_key(&parent_id) {
            return Err(DomError::NodeNotFound(parent_id.0));
        }
        let id = self.create_element(element);
        self.append_child(parent_id, id)?;
        Ok(id)
    }

    /// Append a detached node as the last child of a parent
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) -> DomResult<()> {
        if !self.nodes.contains_key(&parent_id) {
            return Err(DomError::NodeNotFound(parent_id.0));
        }
        if child_id == self.root_id || child_id == parent_id || self.ancestors(parent_id).contains(&child_id) {
            return Err(DomError::InvalidOperation(format!(
                "cannot append {} under {}",
                child_id, parent_id
            )));
        }

        {
            let child = self.get_mut(child_id).ok_or(DomError::NodeNotFound(child_id.0))?;
            if let Some(parent) = child.parent {
                return Err(DomError::AlreadyAttached { child: child_id.0, parent: parent.0 });
            }
            child.parent = Some(parent_id);
        }

        let parent = self.get_mut(parent_id).ok_or(DomError::NodeNotFound(parent_id.0))?;
        parent.children.push(child_id);
        Ok(())
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .map(|n| n.children.to_vec())
            .unwrap_or_default()
    }

    /// Ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            result.push(ancestor);
            current = self.parent(ancestor);
        }
        result
    }

    /// 0-based position of a node among its parent's children.
    /// A node without parent is the only child of itself.
    pub fn index_among_siblings(&self, id: NodeId) -> Option<usize> {
        let node = self.get(id)?;
        match node.parent {
            Some(parent) => self.get(parent)?.children.iter().position(|c| *c == id),
            None => Some(0),
        }
    }

    /// Number of children of the node's parent, the node included
    pub fn sibling_count(&self, id: NodeId) -> usize {
        match self.parent(id) {
            Some(parent) => self.get(parent).map(|p| p.children.len()).unwrap_or(0),
            None => usize::from(self.nodes.contains_key(&id)),
        }
    }

    /// Get the number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree only holds its root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (ElementTree, NodeId, Vec<NodeId>) {
        let mut tree = ElementTree::new(ElementData::new("View"));
        let list = tree.append_element(tree.root_id(), ElementData::new("ScrollView")).unwrap();
        let items = (0..3)
            .map(|_| tree.append_element(list, ElementData::new("Label")).unwrap())
            .collect();
        (tree, list, items)
    }

    #[test]
    fn test_structure() {
        let (tree, list, items) = sample();

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.children(list), items);
        assert_eq!(tree.parent(items[0]), Some(list));
        assert_eq!(tree.ancestors(items[2]), vec![list, tree.root_id()]);
    }

    #[test]
    fn test_sibling_positions() {
        let (tree, _, items) = sample();

        assert_eq!(tree.index_among_siblings(items[0]), Some(0));
        assert_eq!(tree.index_among_siblings(items[2]), Some(2));
        assert_eq!(tree.sibling_count(items[1]), 3);
        assert_eq!(tree.index_among_siblings(tree.root_id()), Some(0));
        assert_eq!(tree.sibling_count(tree.root_id()), 1);
    }

    #[test]
    fn test_invalid_appends() {
        let (mut tree, list, items) = sample();

        assert!(matches!(
            tree.append_child(tree.root_id(), items[0]),
            Err(DomError::AlreadyAttached { .. })
        ));
        assert!(matches!(tree.append_child(items[0], list), Err(DomError::InvalidOperation(_))));
        assert!(matches!(tree.append_child(NodeId(99), items[0]), Err(DomError::NodeNotFound(99))));
    }
}
