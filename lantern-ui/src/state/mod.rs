mod container;
mod value;

pub use container::{State, StateError, StatePatch};
pub use value::{StateRef, StateValue};
