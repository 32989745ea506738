mod graph;
mod registry;

pub use graph::DependencyIndex;
pub use registry::{MountedNode, NodeRegistry};

use crate::config::UiConfig;
use crate::document::{Document, DocumentError};
use crate::node::{apply_value, Binding, BindingKind, BuildError, Builder, NodeId, RenderNode};
use crate::state::{State, StateError, StatePatch, StateRef};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    #[error("Node was already mounted")]
    NodeReused,

    #[error("No mounted node with id {0}")]
    UnknownNode(NodeId),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// A stateful view: the state container plus everything mounted from it.
///
/// Mounting tags each element with the marker attribute and records which
/// state keys each node reads. `set_state` then refreshes only the nodes
/// bound to the keys that changed.
pub struct Component<D: Document> {
    document: D,
    builder: Builder<D>,
    config: UiConfig,
    state: State,
    registry: NodeRegistry,
    index: DependencyIndex,
}

impl<D: Document> Component<D> {
    pub fn new(document: D, state: State) -> Self {
        Self::with_config(document, state, UiConfig::default())
    }

    pub fn with_config(document: D, state: State, config: UiConfig) -> Self {
        Self {
            builder: Builder::with_config(document.clone(), &config),
            document,
            config,
            state,
            registry: NodeRegistry::new(),
            index: DependencyIndex::new(),
        }
    }

    /// Create a component and run its initial render once
    pub fn with_render<F>(document: D, state: State, render: F) -> Result<Self, ComponentError>
    where
        F: FnOnce(&mut Self) -> Result<(), ComponentError>,
    {
        let mut component = Self::new(document, state);
        render(&mut component)?;
        Ok(component)
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn builder(&self) -> &Builder<D> {
        &self.builder
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Read a key as a reference that binds whatever it is passed to
    pub fn read(&self, key: &str) -> Result<StateRef, StateError> {
        self.state.read(key)
    }

    /// Mount a tree at the document root
    pub fn mount(&mut self, node: RenderNode<D::Element>) -> Result<NodeId, ComponentError> {
        let root = self.document.root();
        self.mount_into(node, &root)
    }

    /// Mount a tree as the last child of `parent`.
    ///
    /// The whole tree is validated before anything is written, so a rejected
    /// tree leaves the document and the component untouched.
    pub fn mount_into(&mut self, node: RenderNode<D::Element>, parent: &D::Element) -> Result<NodeId, ComponentError> {
        if !self.document.owns(parent) {
            return Err(ComponentError::InvalidNode(
                "parent element belongs to another document".into(),
            ));
        }
        let mut seen = Vec::with_capacity(node.node_count());
        self.validate(&node, &mut seen)?;

        let count = seen.len();
        let id = self.attach(node, parent, None)?;
        tracing::debug!("mounted {} nodes under {}", count, id);
        Ok(id)
    }

    /// Build a tree with `constructor` and mount it at the root
    pub fn mount_with<F>(&mut self, constructor: F) -> Result<NodeId, ComponentError>
    where
        F: FnOnce(&Self) -> Result<RenderNode<D::Element>, ComponentError>,
    {
        let node = constructor(self)?;
        self.mount(node)
    }

    /// Apply a patch and refresh every node bound to a key whose value changed.
    ///
    /// Returns the refreshed nodes in key order, each once.
    pub fn set_state(&mut self, patch: StatePatch) -> Result<Vec<NodeId>, ComponentError> {
        let changed = self.state.apply(patch)?;
        let ids = self.index.collect(changed.iter().map(|key| key.as_str()));
        for id in &ids {
            self.refresh(*id)?;
        }
        Ok(ids)
    }

    /// Re-apply a node's bindings from the current state
    pub fn refresh(&self, id: NodeId) -> Result<(), ComponentError> {
        let node = self.registry.get(id).ok_or(ComponentError::UnknownNode(id))?;
        let Some(element) = self.element(id) else {
            tracing::warn!("node {} is registered but its element left the document", id);
            return Ok(());
        };

        for binding in &node.bindings {
            if binding.kind == BindingKind::Event {
                continue;
            }
            match self.state.get(&binding.state_key) {
                Some(value) => apply_value(&self.document, &element, binding.kind, &binding.target, value)?,
                None => tracing::warn!("node {} is bound to unknown state key '{}'", id, binding.state_key),
            }
        }
        tracing::trace!("refreshed node {}", id);
        Ok(())
    }

    /// Remove every mounted element and forget the state
    pub fn reset(&mut self) -> Result<(), ComponentError> {
        self.remove_elements()?;
        self.state.clear();
        Ok(())
    }

    /// Reset, then start over with a new key set
    pub fn reinitialize(&mut self, state: State) -> Result<(), ComponentError> {
        self.reset()?;
        self.state = state;
        Ok(())
    }

    /// Remove every mounted element, keeping the state
    pub fn remove_elements(&mut self) -> Result<(), ComponentError> {
        let elements = self
            .document
            .query_by_attribute(&self.config.marker_attribute, None);
        for element in &elements {
            self.document.remove(element)?;
        }
        self.registry.clear();
        self.index.clear();
        tracing::debug!("removed {} mounted elements", elements.len());
        Ok(())
    }

    /// Remove one mounted node and its descendants
    pub fn unmount(&mut self, id: NodeId) -> Result<(), ComponentError> {
        if !self.registry.contains(id) {
            return Err(ComponentError::UnknownNode(id));
        }
        if let Some(element) = self.element(id) {
            self.document.remove(&element)?;
        }
        for (removed, node) in self.registry.remove_subtree(id) {
            self.index
                .unsubscribe(removed, node.bindings.iter().map(|b| b.state_key.as_str()));
        }
        Ok(())
    }

    /// Nodes refreshed when `key` changes
    pub fn dependents(&self, key: &str) -> &[NodeId] {
        self.index.dependents(key)
    }

    pub fn bindings(&self, id: NodeId) -> Option<&[Binding]> {
        self.registry.get(id).map(|node| node.bindings.as_slice())
    }

    pub fn mounted(&self, id: NodeId) -> Option<&MountedNode> {
        self.registry.get(id)
    }

    pub fn is_mounted(&self, id: NodeId) -> bool {
        self.registry.contains(id)
    }

    pub fn mounted_count(&self) -> usize {
        self.registry.len()
    }

    /// Roots mounted by this component, in mount order
    pub fn roots(&self) -> &[NodeId] {
        self.registry.roots()
    }

    /// The element currently carrying `id` in its marker attribute
    pub fn element(&self, id: NodeId) -> Option<D::Element> {
        self.document
            .query_by_attribute(&self.config.marker_attribute, Some(&id.to_string()))
            .into_iter()
            .next()
    }

    fn validate(&self, node: &RenderNode<D::Element>, seen: &mut Vec<D::Element>) -> Result<(), ComponentError> {
        let element = node.element();
        if !self.document.owns(element) {
            return Err(ComponentError::InvalidNode(
                "element belongs to another document".into(),
            ));
        }
        if let Some(reason) = node.bindings().iter().find_map(|b| b.shape_error()) {
            return Err(ComponentError::InvalidNode(reason));
        }
        if seen.contains(element)
            || self
                .document
                .get_attribute(element, &self.config.marker_attribute)
                .is_some()
        {
            return Err(ComponentError::NodeReused);
        }
        seen.push(element.clone());

        for child in node.children() {
            self.validate(child, seen)?;
        }
        Ok(())
    }

    fn attach(
        &mut self,
        node: RenderNode<D::Element>,
        parent: &D::Element,
        parent_id: Option<NodeId>,
    ) -> Result<NodeId, ComponentError> {
        let (element, children, bindings) = node.into_parts();
        let id = NodeId::generate();

        self.document
            .set_attribute(&element, &self.config.marker_attribute, &id.to_string())?;
        for binding in &bindings {
            self.index.subscribe(&binding.state_key, id);
        }
        self.registry.insert(id, parent_id, bindings);

        for child in children {
            self.attach(child, &element, Some(id))?;
        }
        self.document.append_child(parent, &element)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::VirtualDocument;
    use crate::node::{Binding, Child, Props};
    use crate::state::StateValue;

    fn component(state: State) -> (VirtualDocument, Component<VirtualDocument>) {
        let doc = VirtualDocument::new();
        (doc.clone(), Component::new(doc, state))
    }

    #[test]
    fn test_mount_tags_and_registers_every_node() {
        let (doc, mut c) = component(State::from_iter([("firstName", "Manuja")]));
        let name = c.read("firstName").unwrap();
        let node = c.builder().h("p", Props::new(), [Child::from("Hi "), Child::from(name)]).unwrap();
        let p = *node.element();

        let id = c.mount(node).unwrap();

        assert_eq!(c.mounted_count(), 3);
        assert_eq!(c.roots(), &[id]);
        assert_eq!(doc.get_attribute(&p, "data-lantern-id"), Some(id.to_string()));
        assert_eq!(doc.parent(p), Some(doc.root()));
        assert_eq!(doc.text_content(p), "Hi Manuja");

        let carrier = c.dependents("firstName")[0];
        assert_eq!(c.bindings(carrier), Some(&[Binding::text("firstName")][..]));
        assert_eq!(c.mounted(carrier).unwrap().parent, Some(id));
    }

    #[test]
    fn test_mount_rejects_reused_and_foreign_nodes() {
        let (doc, mut c) = component(State::new());
        let span = doc.create_element("span").unwrap();
        c.mount(RenderNode::from_parts(span, Vec::new(), [])).unwrap();

        let again = RenderNode::from_parts(span, Vec::new(), []);
        assert_eq!(c.mount(again), Err(ComponentError::NodeReused));

        let other = VirtualDocument::new();
        let foreign = other.create_element("div").unwrap();
        let err = c.mount(RenderNode::from_parts(foreign, Vec::new(), [])).unwrap_err();
        assert!(matches!(err, ComponentError::InvalidNode(_)));
    }

    #[test]
    fn test_invalid_tree_is_rejected_before_any_write() {
        let (doc, mut c) = component(State::new());
        let div = doc.create_element("div").unwrap();
        let span = doc.create_element("span").unwrap();
        let bad = RenderNode::from_parts(span, Vec::new(), [Binding::new(BindingKind::Text, "x", "k")]);
        doc.clear_mutations();

        let err = c.mount(RenderNode::from_parts(div, vec![bad], [])).unwrap_err();
        assert!(matches!(err, ComponentError::InvalidNode(_)));
        assert!(doc.mutations().is_empty());
        assert_eq!(c.mounted_count(), 0);
    }

    #[test]
    fn test_refresh_unknown_and_detached_nodes() {
        let (doc, mut c) = component(State::from_iter([("style", "color: red;")]));
        let style = c.read("style").unwrap();
        let node = c.builder().h("div", Props::new().with("style", style), []).unwrap();
        let div = *node.element();
        let id = c.mount(node).unwrap();

        let stranger = NodeId::generate();
        assert_eq!(c.refresh(stranger), Err(ComponentError::UnknownNode(stranger)));

        doc.remove(&div).unwrap();
        doc.clear_mutations();
        assert_eq!(c.refresh(id), Ok(()));
        assert!(doc.mutations().is_empty());
    }

    #[test]
    fn test_set_state_skips_unchanged_values() {
        let (_, mut c) = component(State::from_iter([("firstName", "Manuja")]));
        let name = c.read("firstName").unwrap();
        c.mount_with(|c| Ok(c.builder().h("p", Props::new(), [Child::from(name)])?))
            .unwrap();

        let refreshed = c.set_state(StatePatch::new().set("firstName", "Manuja")).unwrap();
        assert!(refreshed.is_empty());
    }

    #[test]
    fn test_unmount_purges_descendants() {
        let (doc, mut c) = component(State::from_iter([("a", "1"), ("b", "2")]));
        let (a, b) = (c.read("a").unwrap(), c.read("b").unwrap());
        let inner = c.builder().h("em", Props::new(), [Child::from(b)]).unwrap();
        let outer = c.builder().h("p", Props::new(), [Child::from(a), Child::from(inner)]).unwrap();
        let p = *outer.element();
        let id = c.mount(outer).unwrap();

        c.unmount(id).unwrap();

        assert!(!doc.is_connected(p));
        assert_eq!(c.mounted_count(), 0);
        assert!(c.dependents("a").is_empty());
        assert!(c.dependents("b").is_empty());
        assert_eq!(c.unmount(id), Err(ComponentError::UnknownNode(id)));
    }

    #[test]
    fn test_reinitialize_replaces_key_set() {
        let (doc, mut c) = component(State::from_iter([("old", 1)]));
        let node = c.builder().text("x").unwrap();
        c.mount(node).unwrap();

        c.reinitialize(State::from_iter([("count", 0)])).unwrap();
        assert_eq!(doc.connected_count(), 0);
        assert!(c.read("old").is_err());
        assert_eq!(c.read("count").unwrap().value(), &StateValue::Int(0));
    }

    #[test]
    fn test_with_render_and_custom_marker() {
        let doc = VirtualDocument::new();
        let config = UiConfig::default().with_marker_attribute("data-view");
        let mut c = Component::with_config(doc.clone(), State::new(), config);
        let node = c.builder().text("static").unwrap();
        let span = *node.element();
        c.mount(node).unwrap();
        assert!(doc.get_attribute(&span, "data-view").is_some());
        assert!(doc.get_attribute(&span, "data-lantern-id").is_none());

        let rendered = Component::with_render(VirtualDocument::new(), State::new(), |c| {
            let node = c.builder().h("main", Props::new(), [])?;
            c.mount(node)?;
            Ok(())
        })
        .unwrap();
        assert_eq!(rendered.mounted_count(), 1);
    }
}
