use crate::node::NodeId;
use smallvec::SmallVec;
use smartstring::alias::String as SmartString;
use std::collections::HashMap;

/// Reverse index from state key to the mounted nodes that read it
#[derive(Debug, Default)]
pub struct DependencyIndex {
    /// Nodes per key, in mount order
    dependents: HashMap<SmartString, SmallVec<[NodeId; 4]>>,
}

impl DependencyIndex {
    pub fn new() -> Self {
        Self {
            dependents: HashMap::new(),
        }
    }

    /// Record that `node` reads `key`
    pub fn subscribe(&mut self, key: &str, node: NodeId) {
        let nodes = self.dependents.entry(key.into()).or_default();

        // A node binding the same key twice is refreshed once
        if !nodes.contains(&node) {
            nodes.push(node);
        }
    }

    /// Drop `node` from the lists of the given keys
    pub fn unsubscribe<'a>(&mut self, node: NodeId, keys: impl IntoIterator<Item = &'a str>) {
        for key in keys {
            if let Some(nodes) = self.dependents.get_mut(key) {
                nodes.retain(|n| *n != node);
                if nodes.is_empty() {
                    self.dependents.remove(key);
                }
            }
        }
    }

    pub fn dependents(&self, key: &str) -> &[NodeId] {
        self.dependents.get(key).map(|nodes| nodes.as_slice()).unwrap_or(&[])
    }

    /// Dependents of every key in order, each node listed once
    pub fn collect<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = Vec::new();
        for key in keys {
            for node in self.dependents(key) {
                if !out.contains(node) {
                    out.push(*node);
                }
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }

    pub fn clear(&mut self) {
        self.dependents.clear();
    }
}
