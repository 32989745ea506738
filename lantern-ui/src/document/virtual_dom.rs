use super::{Document, DocumentError, Event, Listener};
use crate::state::StateValue;
use smartstring::alias::String as SmartString;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_DOCUMENT: AtomicU32 = AtomicU32::new(0);

/// Handle to an element of a [`VirtualDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    document: u32,
    index: u32,
}

/// One write performed against a [`VirtualDocument`], in call order
#[derive(Debug, Clone, PartialEq)]
pub enum DomMutation {
    Create {
        element: ElementId,
        tag: SmartString,
    },
    SetAttribute {
        element: ElementId,
        name: SmartString,
        value: String,
    },
    SetProperty {
        element: ElementId,
        name: SmartString,
        value: StateValue,
    },
    RemoveProperty {
        element: ElementId,
        name: SmartString,
    },
    SetText {
        element: ElementId,
        text: String,
    },
    AddListener {
        element: ElementId,
        event: SmartString,
    },
    Append {
        parent: ElementId,
        child: ElementId,
    },
    Remove {
        element: ElementId,
    },
}

impl DomMutation {
    /// Element written to by this mutation (the child for appends)
    pub fn element(&self) -> ElementId {
        match self {
            DomMutation::Create { element, .. }
            | DomMutation::SetAttribute { element, .. }
            | DomMutation::SetProperty { element, .. }
            | DomMutation::RemoveProperty { element, .. }
            | DomMutation::SetText { element, .. }
            | DomMutation::AddListener { element, .. }
            | DomMutation::Remove { element } => *element,
            DomMutation::Append { child, .. } => *child,
        }
    }
}

struct ElementData {
    tag: SmartString,
    attributes: Vec<(SmartString, String)>,
    properties: HashMap<SmartString, StateValue>,
    text: String,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
    listeners: Vec<(SmartString, Listener)>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            properties: HashMap::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
            listeners: Vec::new(),
        }
    }
}

struct DomTree {
    id: u32,
    elements: Vec<ElementData>,
    root: ElementId,
    mutations: Vec<DomMutation>,
}

impl DomTree {
    fn element(&self, id: ElementId) -> Result<&ElementData, DocumentError> {
        if id.document != self.id {
            return Err(DocumentError::UnknownElement);
        }
        self.elements
            .get(id.index as usize)
            .ok_or(DocumentError::UnknownElement)
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut ElementData, DocumentError> {
        if id.document != self.id {
            return Err(DocumentError::UnknownElement);
        }
        self.elements
            .get_mut(id.index as usize)
            .ok_or(DocumentError::UnknownElement)
    }

    fn detach(&mut self, id: ElementId) -> Result<(), DocumentError> {
        let parent = self.element_mut(id)?.parent.take();
        if let Some(parent) = parent {
            self.element_mut(parent)?.children.retain(|child| *child != id);
        }
        Ok(())
    }

    fn is_ancestor(&self, ancestor: ElementId, mut node: ElementId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.element(node).ok().and_then(|data| data.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn collect_text(&self, id: ElementId, out: &mut String) {
        if let Ok(data) = self.element(id) {
            out.push_str(&data.text);
            for child in &data.children {
                self.collect_text(*child, out);
            }
        }
    }

    fn walk(&self, id: ElementId, visit: &mut impl FnMut(ElementId, &ElementData)) {
        if let Ok(data) = self.element(id) {
            visit(id, data);
            for child in &data.children {
                self.walk(*child, visit);
            }
        }
    }
}

/// Headless in-memory document.
///
/// Elements live in an arena rooted at a `body` element. Every write is
/// recorded as a [`DomMutation`] so tests can check exactly which elements a
/// state change touched.
#[derive(Clone)]
pub struct VirtualDocument {
    tree: Rc<RefCell<DomTree>>,
}

impl VirtualDocument {
    pub fn new() -> Self {
        let id = NEXT_DOCUMENT.fetch_add(1, Ordering::Relaxed);
        let root = ElementId {
            document: id,
            index: 0,
        };
        Self {
            tree: Rc::new(RefCell::new(DomTree {
                id,
                elements: vec![ElementData::new("body")],
                root,
                mutations: Vec::new(),
            })),
        }
    }

    pub fn tag(&self, element: ElementId) -> Option<SmartString> {
        let tree = self.tree.borrow();
        tree.element(element).ok().map(|data| data.tag.clone())
    }

    pub fn property(&self, element: ElementId, name: &str) -> Option<StateValue> {
        let tree = self.tree.borrow();
        tree.element(element)
            .ok()
            .and_then(|data| data.properties.get(name).cloned())
    }

    pub fn attributes(&self, element: ElementId) -> Vec<(SmartString, String)> {
        let tree = self.tree.borrow();
        tree.element(element)
            .map(|data| data.attributes.clone())
            .unwrap_or_default()
    }

    /// Concatenated text of the element and its descendants
    pub fn text_content(&self, element: ElementId) -> String {
        let tree = self.tree.borrow();
        let mut out = String::new();
        tree.collect_text(element, &mut out);
        out
    }

    pub fn children(&self, element: ElementId) -> Vec<ElementId> {
        let tree = self.tree.borrow();
        tree.element(element)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        let tree = self.tree.borrow();
        tree.element(element).ok().and_then(|data| data.parent)
    }

    /// Whether the element is reachable from the root
    pub fn is_connected(&self, element: ElementId) -> bool {
        let tree = self.tree.borrow();
        tree.element(element).is_ok() && tree.is_ancestor(tree.root, element)
    }

    /// Number of elements attached below the root
    pub fn connected_count(&self) -> usize {
        let tree = self.tree.borrow();
        let mut count = 0;
        tree.walk(tree.root, &mut |_, _| count += 1);
        count - 1
    }

    /// Fire `event` on `element`; returns how many listeners ran
    pub fn dispatch(&self, element: ElementId, event: &str) -> usize {
        let listeners: Vec<Listener> = {
            let tree = self.tree.borrow();
            match tree.element(element) {
                Ok(data) => data
                    .listeners
                    .iter()
                    .filter(|(name, _)| name == event)
                    .map(|(_, listener)| Rc::clone(listener))
                    .collect(),
                Err(_) => Vec::new(),
            }
        };

        let event = Event::new(event);
        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }

    pub fn mutations(&self) -> Vec<DomMutation> {
        self.tree.borrow().mutations.clone()
    }

    pub fn take_mutations(&self) -> Vec<DomMutation> {
        std::mem::take(&mut self.tree.borrow_mut().mutations)
    }

    pub fn clear_mutations(&self) {
        self.tree.borrow_mut().mutations.clear();
    }

    fn record(&self, mutation: DomMutation) {
        self.tree.borrow_mut().mutations.push(mutation);
    }
}

impl Default for VirtualDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VirtualDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree.borrow();
        f.debug_struct("VirtualDocument")
            .field("id", &tree.id)
            .field("elements", &tree.elements.len())
            .finish()
    }
}

impl Document for VirtualDocument {
    type Element = ElementId;

    fn root(&self) -> ElementId {
        self.tree.borrow().root
    }

    fn owns(&self, element: &ElementId) -> bool {
        self.tree.borrow().element(*element).is_ok()
    }

    fn create_element(&self, tag: &str) -> Result<ElementId, DocumentError> {
        let element = {
            let mut tree = self.tree.borrow_mut();
            let element = ElementId {
                document: tree.id,
                index: tree.elements.len() as u32,
            };
            tree.elements.push(ElementData::new(tag));
            element
        };
        self.record(DomMutation::Create {
            element,
            tag: tag.into(),
        });
        Ok(element)
    }

    fn set_attribute(&self, element: &ElementId, name: &str, value: &str) -> Result<(), DocumentError> {
        {
            let mut tree = self.tree.borrow_mut();
            let data = tree.element_mut(*element)?;
            match data.attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, slot)) => *slot = value.to_string(),
                None => data.attributes.push((name.into(), value.to_string())),
            }
        }
        self.record(DomMutation::SetAttribute {
            element: *element,
            name: name.into(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn get_attribute(&self, element: &ElementId, name: &str) -> Option<String> {
        let tree = self.tree.borrow();
        let data = tree.element(*element).ok()?;
        data.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    fn set_property(&self, element: &ElementId, name: &str, value: &StateValue) -> Result<(), DocumentError> {
        self.tree
            .borrow_mut()
            .element_mut(*element)?
            .properties
            .insert(name.into(), value.clone());
        self.record(DomMutation::SetProperty {
            element: *element,
            name: name.into(),
            value: value.clone(),
        });
        Ok(())
    }

    fn remove_property(&self, element: &ElementId, name: &str) -> Result<(), DocumentError> {
        self.tree
            .borrow_mut()
            .element_mut(*element)?
            .properties
            .remove(name);
        self.record(DomMutation::RemoveProperty {
            element: *element,
            name: name.into(),
        });
        Ok(())
    }

    fn set_text_content(&self, element: &ElementId, text: &str) -> Result<(), DocumentError> {
        {
            let mut tree = self.tree.borrow_mut();
            let children = std::mem::take(&mut tree.element_mut(*element)?.children);
            for child in children {
                tree.element_mut(child)?.parent = None;
            }
            tree.element_mut(*element)?.text = text.to_string();
        }
        self.record(DomMutation::SetText {
            element: *element,
            text: text.to_string(),
        });
        Ok(())
    }

    fn add_event_listener(&self, element: &ElementId, event: &str, listener: Listener) -> Result<(), DocumentError> {
        self.tree
            .borrow_mut()
            .element_mut(*element)?
            .listeners
            .push((event.into(), listener));
        self.record(DomMutation::AddListener {
            element: *element,
            event: event.into(),
        });
        Ok(())
    }

    fn append_child(&self, parent: &ElementId, child: &ElementId) -> Result<(), DocumentError> {
        {
            let mut tree = self.tree.borrow_mut();
            tree.element(*parent)?;
            tree.element(*child)?;
            if tree.is_ancestor(*child, *parent) {
                return Err(DocumentError::operation(
                    "append_child",
                    "the new child is an ancestor of the parent",
                ));
            }
            tree.detach(*child)?;
            tree.element_mut(*child)?.parent = Some(*parent);
            tree.element_mut(*parent)?.children.push(*child);
        }
        self.record(DomMutation::Append {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }

    fn remove(&self, element: &ElementId) -> Result<(), DocumentError> {
        self.tree.borrow_mut().detach(*element)?;
        self.record(DomMutation::Remove { element: *element });
        Ok(())
    }

    fn query_by_attribute(&self, name: &str, value: Option<&str>) -> Vec<ElementId> {
        let tree = self.tree.borrow();
        let mut found = Vec::new();
        tree.walk(tree.root, &mut |id, data| {
            let matches = data
                .attributes
                .iter()
                .any(|(key, current)| key == name && value.map_or(true, |v| v == current));
            if matches {
                found.push(id);
            }
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_append_and_text_content() {
        let doc = VirtualDocument::new();
        let p = doc.create_element("p").unwrap();
        let strong = doc.create_element("strong").unwrap();
        doc.set_text_content(&p, "Technical Work - ").unwrap();
        doc.set_text_content(&strong, "Manuja DeSilva").unwrap();
        doc.append_child(&p, &strong).unwrap();
        doc.append_child(&doc.root(), &p).unwrap();

        assert_eq!(doc.text_content(p), "Technical Work - Manuja DeSilva");
        assert_eq!(doc.children(doc.root()), vec![p]);
        assert_eq!(doc.connected_count(), 2);
        assert!(doc.is_connected(strong));
    }

    #[test]
    fn test_append_moves_existing_child() {
        let doc = VirtualDocument::new();
        let a = doc.create_element("div").unwrap();
        let b = doc.create_element("div").unwrap();
        let child = doc.create_element("span").unwrap();
        doc.append_child(&a, &child).unwrap();
        doc.append_child(&b, &child).unwrap();

        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), vec![child]);
        assert_eq!(doc.parent(child), Some(b));
    }

    #[test]
    fn test_append_rejects_cycles() {
        let doc = VirtualDocument::new();
        let outer = doc.create_element("div").unwrap();
        let inner = doc.create_element("div").unwrap();
        doc.append_child(&outer, &inner).unwrap();

        assert!(doc.append_child(&inner, &outer).is_err());
    }

    #[test]
    fn test_query_only_sees_connected_elements() {
        let doc = VirtualDocument::new();
        let attached = doc.create_element("div").unwrap();
        let detached = doc.create_element("div").unwrap();
        doc.set_attribute(&attached, "data-test", "1").unwrap();
        doc.set_attribute(&detached, "data-test", "2").unwrap();
        doc.append_child(&doc.root(), &attached).unwrap();

        assert_eq!(doc.query_by_attribute("data-test", None), vec![attached]);
        assert_eq!(doc.query_by_attribute("data-test", Some("1")), vec![attached]);
        assert!(doc.query_by_attribute("data-test", Some("2")).is_empty());

        doc.remove(&attached).unwrap();
        assert!(doc.query_by_attribute("data-test", None).is_empty());
    }

    #[test]
    fn test_foreign_elements_are_rejected() {
        let doc = VirtualDocument::new();
        let other = VirtualDocument::new();
        let foreign = other.create_element("div").unwrap();

        assert!(!doc.owns(&foreign));
        assert_eq!(
            doc.set_attribute(&foreign, "class", "x"),
            Err(DocumentError::UnknownElement)
        );
    }

    #[test]
    fn test_dispatch_runs_matching_listeners() {
        let doc = VirtualDocument::new();
        let button = doc.create_element("button").unwrap();
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        doc.add_event_listener(&button, "click", Rc::new(move |_: &Event| counter.set(counter.get() + 1)))
            .unwrap();

        assert_eq!(doc.dispatch(button, "click"), 1);
        assert_eq!(doc.dispatch(button, "keydown"), 0);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_mutation_log() {
        let doc = VirtualDocument::new();
        let video = doc.create_element("video").unwrap();
        doc.set_property(&video, "muted", &StateValue::Bool(true)).unwrap();
        doc.remove_property(&video, "muted").unwrap();

        let mutations = doc.take_mutations();
        assert_eq!(mutations.len(), 3);
        assert!(matches!(mutations[1], DomMutation::SetProperty { .. }));
        assert!(doc.mutations().is_empty());
        assert!(doc.property(video, "muted").is_none());
    }
}
