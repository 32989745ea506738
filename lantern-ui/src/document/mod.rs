mod virtual_dom;

pub use virtual_dom::{DomMutation, ElementId, VirtualDocument};

use crate::state::StateValue;
use smartstring::alias::String as SmartString;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Element is not part of this document")]
    UnknownElement,

    #[error("{operation} failed: {message}")]
    Operation {
        operation: &'static str,
        message: String,
    },
}

impl DocumentError {
    pub fn operation(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Operation {
            operation,
            message: message.into(),
        }
    }
}

/// Event delivered to a listener registered through [`Document::add_event_listener`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: SmartString,
}

impl Event {
    pub fn new(name: impl Into<SmartString>) -> Self {
        Self { name: name.into() }
    }
}

/// Callback attached to an element event
pub type Listener = Rc<dyn Fn(&Event)>;

/// Document capability the runtime renders through.
///
/// Implementations behave like browser DOM handles: methods take `&self`,
/// element handles are cheap to clone, and mutation happens behind the
/// handle. The runtime never reaches the document any other way, so a
/// headless implementation is enough to drive it.
pub trait Document: Clone + 'static {
    type Element: Clone + PartialEq + fmt::Debug + 'static;

    /// Default parent for mounted trees (the `body`)
    fn root(&self) -> Self::Element;

    /// Whether `element` was created by this document
    fn owns(&self, element: &Self::Element) -> bool;

    fn create_element(&self, tag: &str) -> Result<Self::Element, DocumentError>;

    fn set_attribute(
        &self,
        element: &Self::Element,
        name: &str,
        value: &str,
    ) -> Result<(), DocumentError>;

    fn get_attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    fn set_property(
        &self,
        element: &Self::Element,
        name: &str,
        value: &StateValue,
    ) -> Result<(), DocumentError>;

    fn remove_property(&self, element: &Self::Element, name: &str) -> Result<(), DocumentError>;

    /// Replace the element's content with a single run of text
    fn set_text_content(&self, element: &Self::Element, text: &str) -> Result<(), DocumentError>;

    fn add_event_listener(
        &self,
        element: &Self::Element,
        event: &str,
        listener: Listener,
    ) -> Result<(), DocumentError>;

    fn append_child(
        &self,
        parent: &Self::Element,
        child: &Self::Element,
    ) -> Result<(), DocumentError>;

    /// Detach the element (and its subtree) from the document
    fn remove(&self, element: &Self::Element) -> Result<(), DocumentError>;

    /// Connected elements carrying attribute `name`, restricted to those whose
    /// value equals `value` when one is given. Document order.
    fn query_by_attribute(&self, name: &str, value: Option<&str>) -> Vec<Self::Element>;
}
