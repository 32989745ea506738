pub mod app;
pub mod component;
pub mod config;
pub mod document;
pub mod lua;
pub mod node;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

// Re-export key types
pub use app::App;
pub use component::{Component, ComponentError};
pub use config::UiConfig;
pub use document::{Document, DocumentError, Event, Listener, VirtualDocument};
pub use lua::register_ui_module;
pub use node::{BuildError, Builder, Child, NodeId, NodeType, PropValue, Props, RenderNode};
pub use state::{State, StateError, StatePatch, StateRef, StateValue};

/// Shared handle to a component (the Lua host and listeners hold clones)
pub type SharedComponent<D> = Rc<RefCell<Component<D>>>;
