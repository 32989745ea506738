pub mod convert;
pub mod helpers;
pub mod node;
pub mod state;

use crate::document::Document;
use crate::node::{Child, NodeId};
use convert::{child_from_lua, patch_from_lua, props_from_lua};
use helpers::{with_component, with_component_mut};
use mlua::{AnyUserData, Lua, Result, Table, Value, Variadic};
use node::{take_node, LuaNode};
use state::{LuaState, LuaStateRef};

fn parse_id(id: &str) -> Result<NodeId> {
    id.parse()
        .map_err(|_| mlua::Error::RuntimeError(format!("'{}' is not a node id", id)))
}

/// Register the UI module with Lua (lantern.h, lantern.state, lantern.mount, etc.)
pub fn register_ui_module<D: Document>(lua: &Lua, lantern_table: &Table) -> Result<()> {
    // lantern.h(tag_or_component, props, ...children)
    let h_fn = lua.create_function(
        |lua, (ty, props, children): (Value, Option<Table>, Variadic<Value>)| match ty {
            Value::Function(component) => {
                let component_props = lua.create_table()?;
                if let Some(props) = props {
                    for pair in props.pairs::<Value, Value>() {
                        let (key, value) = pair?;
                        component_props.raw_set(key, value)?;
                    }
                }
                let forwarded = children.into_iter().filter(|child| !child.is_nil());
                component_props.raw_set("children", lua.create_sequence_from(forwarded)?)?;
                component.call::<Value>(component_props)
            }
            Value::String(tag) => {
                let tag = tag.to_str()?.to_string();
                let props = props_from_lua(lua, props)?;
                let mut nodes: Vec<Child<D::Element>> = Vec::with_capacity(children.len());
                for child in children.into_iter() {
                    if let Some(child) = child_from_lua(child)? {
                        nodes.push(child);
                    }
                }

                let builder = with_component::<D, _>(lua, |c| c.builder().clone())?;
                let node = builder
                    .element(&tag, props, nodes)
                    .map_err(mlua::Error::external)?;
                Ok(Value::UserData(lua.create_userdata(LuaNode::new(node))?))
            }
            other => Err(mlua::Error::RuntimeError(format!(
                "h expects a tag name or a component function, got {}",
                other.type_name()
            ))),
        },
    )?;
    lantern_table.set("h", h_fn)?;

    // lantern.state.<key> - state reference proxy
    lantern_table.set("state", LuaState::<D>::new())?;

    // lantern.init(table) - unmount everything and start over with these keys
    let init_fn = lua.create_function(|lua, table: Table| {
        let state = patch_from_lua(lua, table)?.into_state();
        with_component_mut::<D, _>(lua, |c| c.reinitialize(state))?.map_err(mlua::Error::external)
    })?;
    lantern_table.set("init", init_fn)?;

    // lantern.read(key)
    let read_fn = lua.create_function(|lua, key: String| {
        let reference = with_component::<D, _>(lua, |c| c.read(&key))?.map_err(mlua::Error::external)?;
        Ok(LuaStateRef(reference))
    })?;
    lantern_table.set("read", read_fn)?;

    // lantern.mount(node) - returns the root id
    let mount_fn = lua.create_function(|lua, node: AnyUserData| {
        let node = take_node::<D::Element>(&node)?;
        let id = with_component_mut::<D, _>(lua, |c| c.mount(node))?.map_err(mlua::Error::external)?;
        Ok(id.to_string())
    })?;
    lantern_table.set("mount", mount_fn)?;

    // lantern.set_state(patch) - returns the refreshed ids
    let set_state_fn = lua.create_function(|lua, patch: Table| {
        let patch = patch_from_lua(lua, patch)?;
        let ids = with_component_mut::<D, _>(lua, |c| c.set_state(patch))?.map_err(mlua::Error::external)?;
        Ok(ids.iter().map(NodeId::to_string).collect::<Vec<_>>())
    })?;
    lantern_table.set("set_state", set_state_fn)?;

    let refresh_fn = lua.create_function(|lua, id: String| {
        let id = parse_id(&id)?;
        with_component::<D, _>(lua, |c| c.refresh(id))?.map_err(mlua::Error::external)
    })?;
    lantern_table.set("refresh", refresh_fn)?;

    let reset_fn = lua.create_function(|lua, ()| {
        with_component_mut::<D, _>(lua, |c| c.reset())?.map_err(mlua::Error::external)
    })?;
    lantern_table.set("reset", reset_fn)?;

    let remove_elements_fn = lua.create_function(|lua, ()| {
        with_component_mut::<D, _>(lua, |c| c.remove_elements())?.map_err(mlua::Error::external)
    })?;
    lantern_table.set("remove_elements", remove_elements_fn)?;

    let unmount_fn = lua.create_function(|lua, id: String| {
        let id = parse_id(&id)?;
        with_component_mut::<D, _>(lua, |c| c.unmount(id))?.map_err(mlua::Error::external)
    })?;
    lantern_table.set("unmount", unmount_fn)?;

    // Note: lantern.render() is NOT registered here - scripts define their own
    // and App::render mounts what it returns

    Ok(())
}
