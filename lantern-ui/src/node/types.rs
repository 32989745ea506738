use super::binding::Binding;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identity of a mounted node; its string form is the marker attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Uuid);

impl NodeId {
    pub(crate) fn generate() -> Self {
        NodeId(Uuid::new_v4())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(NodeId)
    }
}

pub type Bindings = SmallVec<[Binding; 2]>;

/// One constructed element: its document handle, its children in document
/// order, and the state bindings of the element itself.
///
/// Bindings are fixed once the node is built. Mounting consumes the node.
#[derive(Debug)]
pub struct RenderNode<E> {
    element: E,
    children: Vec<RenderNode<E>>,
    bindings: Bindings,
}

impl<E> RenderNode<E> {
    /// Assemble a node by hand. The shape is checked when it is mounted.
    pub fn from_parts(element: E, children: Vec<RenderNode<E>>, bindings: impl IntoIterator<Item = Binding>) -> Self {
        Self {
            element,
            children,
            bindings: bindings.into_iter().collect(),
        }
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn children(&self) -> &[RenderNode<E>] {
        &self.children
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Number of nodes in this tree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(RenderNode::node_count).sum::<usize>()
    }

    pub fn into_parts(self) -> (E, Vec<RenderNode<E>>, Bindings) {
        (self.element, self.children, self.bindings)
    }
}
