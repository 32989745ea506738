use crate::component::{Component, ComponentError};
use crate::config::UiConfig;
use crate::document::Document;
use crate::lua::node::take_node;
use crate::node::NodeId;
use crate::state::{State, StatePatch};
use crate::SharedComponent;
use mlua::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Lua host for a component: owns the interpreter and exposes the
/// component to scripts as the global `lantern` table.
pub struct App<D: Document> {
    /// Lua interpreter (owned)
    lua: Lua,
    /// Component (shared with Lua app_data)
    component: SharedComponent<D>,
}

impl<D: Document> App<D> {
    pub fn new(document: D, state: State) -> LuaResult<Self> {
        Self::with_config(document, state, UiConfig::default())
    }

    pub fn with_config(document: D, state: State, config: UiConfig) -> LuaResult<Self> {
        let lua = Lua::new();
        let component: SharedComponent<D> = Rc::new(RefCell::new(Component::with_config(document, state, config)));

        // Store the component in Lua app_data for access from Lua
        lua.set_app_data(Rc::clone(&component));

        let lantern_table = lua.create_table()?;
        crate::register_ui_module::<D>(&lua, &lantern_table)?;
        lua.globals().set("lantern", lantern_table)?;

        Ok(Self { lua, component })
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    pub fn component(&self) -> &SharedComponent<D> {
        &self.component
    }

    pub fn document(&self) -> D {
        self.component.borrow().document().clone()
    }

    /// Run a Lua script
    pub fn run_script(&self, script: &str) -> LuaResult<()> {
        self.lua.load(script).exec()
    }

    /// Mount the tree returned by `lantern.render()`, if the script defined one
    pub fn render(&self) -> LuaResult<Option<NodeId>> {
        let lantern_table: LuaTable = self.lua.globals().get("lantern")?;
        let render_fn: Option<LuaFunction> = lantern_table.get("render")?;
        let Some(render_fn) = render_fn else {
            tracing::debug!("lantern.render is not defined, nothing to mount");
            return Ok(None);
        };

        let root: LuaAnyUserData = render_fn.call(())?;
        let node = take_node::<D::Element>(&root)?;
        let id = self
            .component
            .borrow_mut()
            .mount(node)
            .map_err(LuaError::external)?;
        Ok(Some(id))
    }

    pub fn set_state(&self, patch: StatePatch) -> Result<Vec<NodeId>, ComponentError> {
        self.component.borrow_mut().set_state(patch)
    }
}
