use lantern_ui::document::{Document, DocumentError, Event, Listener};
use lantern_ui::state::StateValue;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

/// [`Document`] backed by the browser DOM
#[derive(Clone)]
pub struct WebDocument {
    document: web_sys::Document,
    root: Element,
}

impl WebDocument {
    /// Wrap `document`, mounting into its `body`
    pub fn new(document: web_sys::Document) -> Result<Self, JsValue> {
        let root: Element = document.body().ok_or("document has no body")?.into();
        Ok(Self { document, root })
    }

    /// Wrap `document`, mounting into `root`
    pub fn with_root(document: web_sys::Document, root: Element) -> Self {
        Self { document, root }
    }

    /// The window's document
    pub fn from_window() -> Result<Self, JsValue> {
        let document = web_sys::window()
            .ok_or("no window")?
            .document()
            .ok_or("no document")?;
        Self::new(document)
    }

    pub fn inner(&self) -> &web_sys::Document {
        &self.document
    }
}

fn js_error(operation: &'static str, err: JsValue) -> DocumentError {
    DocumentError::operation(operation, format!("{:?}", err))
}

/// JavaScript form of a value assigned as a property
fn to_js(value: &StateValue) -> JsValue {
    match value {
        StateValue::Nil => JsValue::UNDEFINED,
        StateValue::Bool(b) => JsValue::from_bool(*b),
        StateValue::Int(i) => JsValue::from_f64(*i as f64),
        StateValue::Float(n) => JsValue::from_f64(*n),
        StateValue::String(s) => JsValue::from_str(s),
        StateValue::Object(_) => value
            .downcast_ref::<JsValue>()
            .cloned()
            .unwrap_or(JsValue::UNDEFINED),
    }
}

/// Attribute selector with the value quoted for CSS
fn attribute_selector(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!(
            "[{}=\"{}\"]",
            name,
            value.replace('\\', "\\\\").replace('"', "\\\"")
        ),
        None => format!("[{}]", name),
    }
}

impl Document for WebDocument {
    type Element = Element;

    fn root(&self) -> Element {
        self.root.clone()
    }

    fn owns(&self, element: &Element) -> bool {
        element.owner_document().as_ref() == Some(&self.document)
    }

    fn create_element(&self, tag: &str) -> Result<Element, DocumentError> {
        self.document
            .create_element(tag)
            .map_err(|e| js_error("create_element", e))
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) -> Result<(), DocumentError> {
        element
            .set_attribute(name, value)
            .map_err(|e| js_error("set_attribute", e))
    }

    fn get_attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_property(&self, element: &Element, name: &str, value: &StateValue) -> Result<(), DocumentError> {
        js_sys::Reflect::set(element.as_ref(), &JsValue::from_str(name), &to_js(value))
            .map(|_| ())
            .map_err(|e| js_error("set_property", e))
    }

    fn remove_property(&self, element: &Element, name: &str) -> Result<(), DocumentError> {
        js_sys::Reflect::delete_property(element.unchecked_ref::<js_sys::Object>(), &JsValue::from_str(name))
            .map(|_| ())
            .map_err(|e| js_error("remove_property", e))
    }

    fn set_text_content(&self, element: &Element, text: &str) -> Result<(), DocumentError> {
        element.set_text_content(Some(text));
        Ok(())
    }

    fn add_event_listener(&self, element: &Element, event: &str, listener: Listener) -> Result<(), DocumentError> {
        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
            listener(&Event::new(event.type_()));
        }) as Box<dyn FnMut(_)>);

        element
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| js_error("add_event_listener", e))?;
        // Listeners live as long as the element; there is no removal path
        closure.forget();
        Ok(())
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<(), DocumentError> {
        parent
            .append_child(child)
            .map(|_| ())
            .map_err(|e| js_error("append_child", e))
    }

    fn remove(&self, element: &Element) -> Result<(), DocumentError> {
        element.remove();
        Ok(())
    }

    fn query_by_attribute(&self, name: &str, value: Option<&str>) -> Vec<Element> {
        let selector = attribute_selector(name, value);
        let nodes = match self.document.query_selector_all(&selector) {
            Ok(nodes) => nodes,
            Err(err) => {
                tracing::warn!("query {} failed: {:?}", selector, err);
                return Vec::new();
            }
        };

        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_selector_quotes_values() {
        assert_eq!(attribute_selector("data-lantern-id", None), "[data-lantern-id]");
        assert_eq!(
            attribute_selector("data-lantern-id", Some("a\"b")),
            "[data-lantern-id=\"a\\\"b\"]"
        );
    }
}
