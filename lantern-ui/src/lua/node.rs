use crate::component::ComponentError;
use crate::node::RenderNode;
use mlua::{AnyUserData, MetaMethod, UserData, UserDataFields, UserDataMethods};

/// Lua handle to a built node. Mounting or nesting it moves the node out.
pub struct LuaNode<E> {
    node: Option<RenderNode<E>>,
}

impl<E> LuaNode<E> {
    pub fn new(node: RenderNode<E>) -> Self {
        Self { node: Some(node) }
    }

    pub fn take(&mut self) -> Option<RenderNode<E>> {
        self.node.take()
    }
}

/// Move the node out of a `LuaNode` userdata
pub fn take_node<E: 'static>(ud: &AnyUserData) -> mlua::Result<RenderNode<E>> {
    let mut node = ud.borrow_mut::<LuaNode<E>>()?;
    node.take()
        .ok_or_else(|| mlua::Error::external(ComponentError::NodeReused))
}

impl<E: 'static> UserData for LuaNode<E> {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("consumed", |_, this| Ok(this.node.is_none()));
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(match &this.node {
                Some(node) => format!("Node({} nodes)", node.node_count()),
                None => "Node(consumed)".to_string(),
            })
        });
    }
}
