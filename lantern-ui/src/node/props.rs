use super::binding::{event_name, BindingKind, PropKind};
use super::children::Child;
use crate::document::{Document, DocumentError, Event, Listener};
use crate::state::{StateRef, StateValue};
use smartstring::alias::String as SmartString;
use std::fmt;
use std::rc::Rc;

/// A prop as handed to the builder
#[derive(Clone)]
pub enum PropValue {
    Static(StateValue),
    State(StateRef),
    Listener(Listener),
}

impl PropValue {
    pub fn listener(f: impl Fn(&Event) + 'static) -> Self {
        PropValue::Listener(Rc::new(f))
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Static(value) => f.debug_tuple("Static").field(value).finish(),
            PropValue::State(reference) => f.debug_tuple("State").field(reference).finish(),
            PropValue::Listener(_) => f.write_str("Listener"),
        }
    }
}

impl From<StateRef> for PropValue {
    fn from(reference: StateRef) -> Self {
        PropValue::State(reference)
    }
}

impl From<Listener> for PropValue {
    fn from(listener: Listener) -> Self {
        PropValue::Listener(listener)
    }
}

impl From<StateValue> for PropValue {
    fn from(value: StateValue) -> Self {
        PropValue::Static(value)
    }
}

macro_rules! static_prop_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PropValue {
                fn from(value: $ty) -> Self {
                    PropValue::Static(value.into())
                }
            }
        )*
    };
}

static_prop_from!(bool, i32, i64, f64, &str, String);

/// Props passed to an element or component, in insertion order.
///
/// Components additionally receive the children they were called with.
pub struct Props<E> {
    entries: Vec<(SmartString, PropValue)>,
    children: Vec<Child<E>>,
}

impl<E> Props<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a prop; a repeated name replaces the earlier value in place
    pub fn with(mut self, name: impl Into<SmartString>, value: impl Into<PropValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<SmartString>, value: impl Into<PropValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn take(&mut self, name: &str) -> Option<PropValue> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Take a prop to forward it as a child: plain values become text, state
    /// references stay bound. Listeners cannot be children.
    pub fn child(&mut self, name: &str) -> Option<Child<E>> {
        match self.take(name)? {
            PropValue::Static(value) => Some(Child::Text(value.to_string().into())),
            PropValue::State(reference) => Some(Child::State(reference)),
            PropValue::Listener(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn children(&self) -> &[Child<E>] {
        &self.children
    }

    /// Take the forwarded children, typically to place them in the body
    pub fn take_children(&mut self) -> Vec<Child<E>> {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn set_children(&mut self, children: Vec<Child<E>>) {
        self.children = children;
    }

    pub(crate) fn into_entries(self) -> Vec<(SmartString, PropValue)> {
        self.entries
    }
}

impl<E> Default for Props<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: fmt::Debug> fmt::Debug for Props<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("entries", &self.entries)
            .field("children", &self.children)
            .finish()
    }
}

/// Write a data value to an element with the effect for `kind`.
///
/// Used for the initial render and for every refresh, so both paths apply
/// the same policy: properties take any value, attributes only values that
/// have a text form, text takes the display form. Data values on event props
/// are ignored.
pub(crate) fn apply_value<D: Document>(
    document: &D,
    element: &D::Element,
    kind: BindingKind,
    name: &str,
    value: &StateValue,
) -> Result<(), DocumentError> {
    match kind {
        BindingKind::Property => document.set_property(element, name, value),
        BindingKind::Attribute => match value.as_attribute() {
            Some(text) => document.set_attribute(element, name, &text),
            None => {
                tracing::debug!(
                    "dropping {} value for attribute '{}'",
                    value.type_name(),
                    name
                );
                Ok(())
            }
        },
        BindingKind::Text => document.set_text_content(element, &value.to_string()),
        BindingKind::Event => {
            tracing::debug!("ignoring {} value for event prop '{}'", value.type_name(), name);
            Ok(())
        }
    }
}

pub(crate) fn attach_listener<D: Document>(
    document: &D,
    element: &D::Element,
    kind: PropKind,
    name: &str,
    listener: Listener,
) -> Result<(), DocumentError> {
    match (kind, event_name(name)) {
        (PropKind::Event, Some(event)) => document.add_event_listener(element, event, listener),
        _ => {
            tracing::debug!("dropping listener for non-event prop '{}'", name);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ElementId, VirtualDocument};

    #[test]
    fn test_props_keep_insertion_order_and_replace_in_place() {
        let props: Props<ElementId> = Props::new()
            .with("class", "a")
            .with("style", "color: red;")
            .with("class", "b");

        let names: Vec<&str> = props.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["class", "style"]);
        assert!(matches!(props.get("class"), Some(PropValue::Static(v)) if v.as_str() == Some("b")));
    }

    #[test]
    fn test_prop_to_child() {
        let mut props: Props<ElementId> = Props::new()
            .with("text", "hello")
            .with("name", StateRef::new("firstName", "Manuja".into()))
            .with("onclick", PropValue::listener(|_: &Event| {}));

        assert!(matches!(props.child("text"), Some(Child::Text(t)) if t == "hello"));
        assert!(matches!(props.child("name"), Some(Child::State(r)) if r.key() == "firstName"));
        assert!(props.child("onclick").is_none());
        assert!(props.child("missing").is_none());
        assert!(props.is_empty());
    }

    #[test]
    fn test_apply_value_policies() {
        let doc = VirtualDocument::new();
        let el = doc.create_element("video").unwrap();

        apply_value(&doc, &el, BindingKind::Attribute, "title", &StateValue::Nil).unwrap();
        assert!(doc.get_attribute(&el, "title").is_none());

        apply_value(&doc, &el, BindingKind::Attribute, "muted", &StateValue::Bool(true)).unwrap();
        assert_eq!(doc.get_attribute(&el, "muted").as_deref(), Some("true"));

        let stream = StateValue::object(42u8);
        apply_value(&doc, &el, BindingKind::Property, "srcObject", &stream).unwrap();
        assert_eq!(doc.property(el, "srcObject"), Some(stream));

        apply_value(&doc, &el, BindingKind::Text, "", &StateValue::Int(3)).unwrap();
        assert_eq!(doc.text_content(el), "3");
    }
}
