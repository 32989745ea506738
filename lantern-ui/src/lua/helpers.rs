use crate::component::Component;
use crate::document::Document;
use crate::SharedComponent;
use mlua::{Lua, Result};
use std::rc::Rc;

/// Get the component from Lua app_data
pub fn get_component<D: Document>(lua: &Lua) -> Result<SharedComponent<D>> {
    lua.app_data_ref::<SharedComponent<D>>()
        .map(|component| Rc::clone(&component))
        .ok_or_else(|| mlua::Error::RuntimeError("Component not initialized".into()))
}

pub fn with_component<D: Document, R>(lua: &Lua, f: impl FnOnce(&Component<D>) -> R) -> Result<R> {
    let component = get_component::<D>(lua)?;
    let guard = component
        .try_borrow()
        .map_err(|_| mlua::Error::RuntimeError("Component is being updated".into()))?;
    Ok(f(&guard))
}

pub fn with_component_mut<D: Document, R>(lua: &Lua, f: impl FnOnce(&mut Component<D>) -> R) -> Result<R> {
    let component = get_component::<D>(lua)?;
    let mut guard = component
        .try_borrow_mut()
        .map_err(|_| mlua::Error::RuntimeError("Component is being updated".into()))?;
    Ok(f(&mut guard))
}
