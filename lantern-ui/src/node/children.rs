use super::types::RenderNode;
use crate::state::StateRef;
use smartstring::alias::String as SmartString;

/// A child argument, classified once when it is created
#[derive(Debug)]
pub enum Child<E> {
    /// Plain text, wrapped in an unbound text carrier
    Text(SmartString),
    /// Live text, wrapped in a text carrier bound to the key
    State(StateRef),
    /// An already built node, used as-is
    Node(RenderNode<E>),
    /// Children forwarded through a component, spliced in place
    List(Vec<Child<E>>),
}

impl<E> From<&str> for Child<E> {
    fn from(text: &str) -> Self {
        Child::Text(text.into())
    }
}

impl<E> From<String> for Child<E> {
    fn from(text: String) -> Self {
        Child::Text(text.into())
    }
}

impl<E> From<StateRef> for Child<E> {
    fn from(reference: StateRef) -> Self {
        Child::State(reference)
    }
}

impl<E> From<RenderNode<E>> for Child<E> {
    fn from(node: RenderNode<E>) -> Self {
        Child::Node(node)
    }
}

impl<E> From<Vec<Child<E>>> for Child<E> {
    fn from(children: Vec<Child<E>>) -> Self {
        Child::List(children)
    }
}
