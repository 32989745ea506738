use crate::node::{Bindings, NodeId};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Bookkeeping for one mounted node. The element itself is found through
/// its marker attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedNode {
    pub bindings: Bindings,
    pub parent: Option<NodeId>,
    pub children: SmallVec<[NodeId; 4]>,
}

/// Mounted nodes by id
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: HashMap<NodeId, MountedNode>,
    /// Roots in mount order
    roots: Vec<NodeId>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
        }
    }

    /// Register a node below `parent`, or as a root
    pub fn insert(&mut self, id: NodeId, parent: Option<NodeId>, bindings: Bindings) {
        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent_node) => parent_node.children.push(id),
            None => self.roots.push(id),
        }
        self.nodes.insert(
            id,
            MountedNode {
                bindings,
                parent,
                children: SmallVec::new(),
            },
        );
    }

    pub fn get(&self, id: NodeId) -> Option<&MountedNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove a node and all of its descendants, returning them parent first
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<(NodeId, MountedNode)> {
        let Some(node) = self.nodes.get(&id) else {
            return Vec::new();
        };

        match node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent) => parent.children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }

        let mut removed = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                pending.extend(node.children.iter().rev().copied());
                removed.push((next, node));
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Binding;

    #[test]
    fn test_insert_links_parent_and_child() {
        let mut registry = NodeRegistry::new();
        let (root, child) = (NodeId::generate(), NodeId::generate());
        registry.insert(root, None, Bindings::new());
        registry.insert(child, Some(root), [Binding::text("firstName")].into_iter().collect());

        assert_eq!(registry.roots(), &[root]);
        assert_eq!(registry.get(root).unwrap().children.as_slice(), &[child]);
        assert_eq!(registry.get(child).unwrap().parent, Some(root));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_subtree() {
        let mut registry = NodeRegistry::new();
        let ids: Vec<NodeId> = (0..4).map(|_| NodeId::generate()).collect();
        registry.insert(ids[0], None, Bindings::new());
        registry.insert(ids[1], Some(ids[0]), Bindings::new());
        registry.insert(ids[2], Some(ids[1]), Bindings::new());
        registry.insert(ids[3], Some(ids[0]), Bindings::new());

        let removed: Vec<NodeId> = registry.remove_subtree(ids[1]).into_iter().map(|(id, _)| id).collect();
        assert_eq!(removed, vec![ids[1], ids[2]]);
        assert_eq!(registry.get(ids[0]).unwrap().children.as_slice(), &[ids[3]]);
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.remove_subtree(ids[0]).len(), 2);
        assert!(registry.is_empty());
        assert!(registry.roots().is_empty());
    }
}
