use super::binding::{Binding, PropKind};
use super::children::Child;
use super::props::{apply_value, attach_listener, PropValue, Props};
use super::types::{Bindings, RenderNode};
use crate::config::UiConfig;
use crate::document::{Document, DocumentError};
use smartstring::alias::String as SmartString;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("'{0}' is not a valid element tag")]
    InvalidTag(SmartString),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// A functional component: receives the builder and its props (children
/// included) and returns the node it renders to.
pub type ComponentFn<D> = Rc<
    dyn Fn(&Builder<D>, Props<<D as Document>::Element>) -> Result<RenderNode<<D as Document>::Element>, BuildError>,
>;

pub enum NodeType<D: Document> {
    Tag(SmartString),
    Component(ComponentFn<D>),
}

impl<D: Document> NodeType<D> {
    pub fn component<F>(f: F) -> Self
    where
        F: Fn(&Builder<D>, Props<D::Element>) -> Result<RenderNode<D::Element>, BuildError> + 'static,
    {
        NodeType::Component(Rc::new(f))
    }
}

impl<D: Document> Clone for NodeType<D> {
    fn clone(&self) -> Self {
        match self {
            NodeType::Tag(tag) => NodeType::Tag(tag.clone()),
            NodeType::Component(f) => NodeType::Component(Rc::clone(f)),
        }
    }
}

impl<D: Document> fmt::Debug for NodeType<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
            NodeType::Component(_) => f.write_str("Component"),
        }
    }
}

impl<D: Document> From<&str> for NodeType<D> {
    fn from(tag: &str) -> Self {
        NodeType::Tag(tag.into())
    }
}

impl<D: Document> From<String> for NodeType<D> {
    fn from(tag: String) -> Self {
        NodeType::Tag(tag.into())
    }
}

impl<D: Document> From<SmartString> for NodeType<D> {
    fn from(tag: SmartString) -> Self {
        NodeType::Tag(tag)
    }
}

/// Creates elements in a document and records which state keys they read.
///
/// Building never touches state: a [`StateRef`](crate::state::StateRef)
/// already carries the value to render, and its key becomes a binding on
/// the node it was passed to.
#[derive(Clone)]
pub struct Builder<D: Document> {
    document: D,
    text_tag: SmartString,
}

impl<D: Document> Builder<D> {
    pub fn new(document: D) -> Self {
        Self::with_config(document, &UiConfig::default())
    }

    pub fn with_config(document: D, config: &UiConfig) -> Self {
        Self {
            document,
            text_tag: config.text_tag.clone(),
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Build a node from a tag or a component
    pub fn h<C>(
        &self,
        ty: impl Into<NodeType<D>>,
        mut props: Props<D::Element>,
        children: C,
    ) -> Result<RenderNode<D::Element>, BuildError>
    where
        C: IntoIterator<Item = Child<D::Element>>,
    {
        match ty.into() {
            NodeType::Component(component) => {
                props.set_children(children.into_iter().collect());
                component(self, props)
            }
            NodeType::Tag(tag) => self.element(&tag, props, children),
        }
    }

    /// Build a plain element
    pub fn element<C>(
        &self,
        tag: &str,
        props: Props<D::Element>,
        children: C,
    ) -> Result<RenderNode<D::Element>, BuildError>
    where
        C: IntoIterator<Item = Child<D::Element>>,
    {
        if !is_valid_tag(tag) {
            return Err(BuildError::InvalidTag(tag.into()));
        }

        let element = self.document.create_element(tag)?;
        let mut bindings = Bindings::new();

        for (name, value) in props.into_entries() {
            let kind = PropKind::classify(&name);
            match value {
                PropValue::Static(value) => {
                    apply_value(&self.document, &element, kind.into(), &name, &value)?;
                }
                PropValue::State(reference) => {
                    let (state_key, value) = reference.into_parts();
                    apply_value(&self.document, &element, kind.into(), &name, &value)?;
                    bindings.push(Binding::new(kind.into(), name, state_key));
                }
                PropValue::Listener(listener) => {
                    attach_listener(&self.document, &element, kind, &name, listener)?;
                }
            }
        }

        let mut nodes = Vec::new();
        self.collect_children(children, &mut nodes)?;

        tracing::trace!(
            "built <{}> with {} bindings and {} children",
            tag,
            bindings.len(),
            nodes.len()
        );
        Ok(RenderNode::from_parts(element, nodes, bindings))
    }

    /// Wrap `text` in a text carrier
    pub fn text(&self, text: &str) -> Result<RenderNode<D::Element>, BuildError> {
        self.text_carrier(text, None)
    }

    fn collect_children<C>(&self, children: C, out: &mut Vec<RenderNode<D::Element>>) -> Result<(), BuildError>
    where
        C: IntoIterator<Item = Child<D::Element>>,
    {
        for child in children {
            match child {
                Child::Text(text) => out.push(self.text_carrier(&text, None)?),
                Child::State(reference) => {
                    let (key, value) = reference.into_parts();
                    let text = value.to_string();
                    out.push(self.text_carrier(&text, Some(Binding::text(key)))?);
                }
                Child::Node(node) => out.push(node),
                Child::List(list) => self.collect_children(list, out)?,
            }
        }
        Ok(())
    }

    fn text_carrier(&self, text: &str, binding: Option<Binding>) -> Result<RenderNode<D::Element>, BuildError> {
        let element = self.document.create_element(&self.text_tag)?;
        self.document.set_text_content(&element, text)?;
        Ok(RenderNode::from_parts(element, Vec::new(), binding))
    }
}

impl<D: Document + fmt::Debug> fmt::Debug for Builder<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("document", &self.document)
            .field("text_tag", &self.text_tag)
            .finish()
    }
}

fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        _ => false,
    }
}
