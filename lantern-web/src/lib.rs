use lantern_ui::{App, State};
use wasm_bindgen::prelude::*;

pub mod document;

pub use document::WebDocument;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Run a Lua app in the browser
///
/// # Arguments
/// * `lua_code` - Lua source that defines `lantern.render`
/// * `container_id` - DOM element ID to mount the app into
///
/// The app is leaked so its listeners stay alive with the page.
#[wasm_bindgen]
pub fn run_app(lua_code: &str, container_id: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or("container not found")?;

    let app = App::new(WebDocument::with_root(document, container), State::new())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    app.run_script(lua_code)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    app.render().map_err(|e| JsValue::from_str(&e.to_string()))?;

    std::mem::forget(app);
    Ok(())
}
