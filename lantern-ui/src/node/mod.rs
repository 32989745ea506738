mod binding;
mod builder;
mod children;
mod props;
mod types;

pub use binding::{event_name, Binding, BindingKind, PropKind};
pub use builder::{BuildError, Builder, ComponentFn, NodeType};
pub use children::Child;
pub use props::{PropValue, Props};
pub(crate) use props::apply_value;
pub use types::{Bindings, NodeId, RenderNode};
