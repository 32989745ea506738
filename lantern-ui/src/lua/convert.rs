use super::node::{take_node, LuaNode};
use super::state::LuaStateRef;
use crate::document::{Event, Listener};
use crate::node::{Child, PropValue, Props};
use crate::state::{StatePatch, StateValue};
use mlua::{AnyUserData, FromLua, Function, IntoLua, Lua, RegistryKey, Result, Table, Value};
use std::rc::Rc;

impl FromLua for StateValue {
    fn from_lua(value: Value, lua: &Lua) -> Result<Self> {
        match value {
            Value::Nil => Ok(StateValue::Nil),
            Value::Boolean(b) => Ok(StateValue::Bool(b)),
            Value::Integer(i) => Ok(StateValue::Int(i)),
            Value::Number(n) => Ok(StateValue::Float(n)),
            Value::String(s) => Ok(StateValue::String(s.to_str()?.to_string().into())),
            Value::Table(t) => Ok(StateValue::object(lua.create_registry_value(t)?)),
            _ => Err(mlua::Error::FromLuaConversionError {
                from: value.type_name(),
                to: "StateValue".to_string(),
                message: Some("Unsupported value type for state".to_string()),
            }),
        }
    }
}

impl IntoLua for StateValue {
    fn into_lua(self, lua: &Lua) -> Result<Value> {
        match self {
            StateValue::Nil => Ok(Value::Nil),
            StateValue::Bool(b) => Ok(Value::Boolean(b)),
            StateValue::Int(i) => Ok(Value::Integer(i)),
            StateValue::Float(n) => Ok(Value::Number(n)),
            StateValue::String(s) => Ok(Value::String(lua.create_string(s.as_str())?)),
            StateValue::Object(object) => match object.downcast_ref::<RegistryKey>() {
                Some(key) => lua.registry_value::<Value>(key),
                // Host objects have no Lua form
                None => Ok(Value::Nil),
            },
        }
    }
}

/// Props table to [`Props`]. Names are applied in sorted order since table
/// iteration order is unspecified.
pub fn props_from_lua<E>(lua: &Lua, table: Option<Table>) -> Result<Props<E>> {
    let mut props = Props::new();
    let Some(table) = table else {
        return Ok(props);
    };

    let mut entries = table
        .pairs::<String, Value>()
        .collect::<Result<Vec<_>>>()?;
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    for (name, value) in entries {
        let value = match value {
            Value::Function(f) => PropValue::Listener(lua_listener(&name, f)),
            Value::UserData(ud) if ud.is::<LuaStateRef>() => {
                PropValue::State(ud.borrow::<LuaStateRef>()?.0.clone())
            }
            other => PropValue::Static(StateValue::from_lua(other, lua)?),
        };
        props.insert(name, value);
    }
    Ok(props)
}

/// One child argument of `h`. Nil and booleans render nothing.
pub fn child_from_lua<E: 'static>(value: Value) -> Result<Option<Child<E>>> {
    let child = match value {
        Value::Nil | Value::Boolean(_) => return Ok(None),
        Value::String(s) => Child::from(s.to_str()?.to_string()),
        Value::Integer(i) => Child::from(i.to_string()),
        Value::Number(n) => Child::from(StateValue::Float(n).to_string()),
        Value::Table(t) => {
            let mut list = Vec::new();
            for item in t.sequence_values::<Value>() {
                if let Some(child) = child_from_lua(item?)? {
                    list.push(child);
                }
            }
            Child::List(list)
        }
        Value::UserData(ud) => userdata_child(&ud)?,
        other => {
            return Err(mlua::Error::FromLuaConversionError {
                from: other.type_name(),
                to: "Child".to_string(),
                message: Some("expected text, number, state reference, node or list".to_string()),
            });
        }
    };
    Ok(Some(child))
}

fn userdata_child<E: 'static>(ud: &AnyUserData) -> Result<Child<E>> {
    if ud.is::<LuaStateRef>() {
        Ok(Child::State(ud.borrow::<LuaStateRef>()?.0.clone()))
    } else if ud.is::<LuaNode<E>>() {
        Ok(Child::Node(take_node(ud)?))
    } else {
        Err(mlua::Error::FromLuaConversionError {
            from: "userdata",
            to: "Child".to_string(),
            message: Some("expected a node or state reference".to_string()),
        })
    }
}

pub fn patch_from_lua(lua: &Lua, table: Table) -> Result<StatePatch> {
    let mut entries = table
        .pairs::<String, Value>()
        .collect::<Result<Vec<_>>>()?;
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    entries
        .into_iter()
        .map(|(key, value)| -> Result<(String, StateValue)> {
            Ok((key, StateValue::from_lua(value, lua)?))
        })
        .collect()
}

fn lua_listener(prop: &str, function: Function) -> Listener {
    let prop = prop.to_string();
    Rc::new(move |event: &Event| {
        if let Err(err) = function.call::<()>(event.name.as_str()) {
            tracing::error!("Lua listener '{}' failed: {}", prop, err);
        }
    })
}
