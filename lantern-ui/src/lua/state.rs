use crate::document::Document;
use crate::state::StateRef;
use mlua::{IntoLua, MetaMethod, UserData, UserDataFields, UserDataMethods};
use std::marker::PhantomData;

/// Lua userdata for a state reference
#[derive(Debug, Clone)]
pub struct LuaStateRef(pub StateRef);

impl UserData for LuaStateRef {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("key", |_, this| Ok(this.0.key().to_string()));
        fields.add_field_method_get("value", |lua, this| this.0.value().clone().into_lua(lua));
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| Ok(this.0.value().to_string()));
    }
}

/// `lantern.state`: indexing it reads a key as a [`LuaStateRef`]
pub struct LuaState<D> {
    _document: PhantomData<fn() -> D>,
}

impl<D> LuaState<D> {
    pub fn new() -> Self {
        Self {
            _document: PhantomData,
        }
    }
}

impl<D: Document> UserData for LuaState<D> {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::Index, |lua, _, key: String| {
            let reference = super::helpers::with_component::<D, _>(lua, |c| c.read(&key))?
                .map_err(mlua::Error::external)?;
            Ok(LuaStateRef(reference))
        });

        methods.add_meta_method(MetaMethod::NewIndex, |_, _, (key, _): (String, mlua::Value)| {
            Err::<(), _>(mlua::Error::RuntimeError(format!(
                "Cannot assign state.{} directly, use lantern.set_state",
                key
            )))
        });
    }
}
