use smartstring::alias::String as SmartString;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

/// StateValue represents a value stored in component state or passed as a prop
#[derive(Clone, Default)]
pub enum StateValue {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(SmartString),
    /// Host object (media stream, Lua table, JS value...). Compared by reference.
    Object(Rc<dyn Any>),
}

impl StateValue {
    pub fn object<T: Any>(value: T) -> Self {
        StateValue::Object(Rc::new(value))
    }

    /// Compare values for change detection
    /// Objects compare by reference only
    pub fn eq_value(&self, other: &Self) -> bool {
        match (self, other) {
            (StateValue::Nil, StateValue::Nil) => true,
            (StateValue::Bool(a), StateValue::Bool(b)) => a == b,
            (StateValue::Int(a), StateValue::Int(b)) => a == b,
            (StateValue::Float(a), StateValue::Float(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (StateValue::String(a), StateValue::String(b)) => a == b,
            (StateValue::Object(a), StateValue::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Text written when this value is applied as an attribute.
    ///
    /// Only textual, numeric and boolean values are stringifiable; nil and host
    /// objects have no attribute form.
    pub fn as_attribute(&self) -> Option<Cow<'_, str>> {
        match self {
            StateValue::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            StateValue::Int(i) => Some(Cow::Owned(i.to_string())),
            StateValue::Float(f) => Some(Cow::Owned(f.to_string())),
            StateValue::String(s) => Some(Cow::Borrowed(s.as_str())),
            StateValue::Nil | StateValue::Object(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            StateValue::Object(obj) => obj.downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            StateValue::Nil => "nil",
            StateValue::Bool(_) => "bool",
            StateValue::Int(_) => "int",
            StateValue::Float(_) => "float",
            StateValue::String(_) => "string",
            StateValue::Object(_) => "object",
        }
    }
}

impl PartialEq for StateValue {
    fn eq(&self, other: &Self) -> bool {
        self.eq_value(other)
    }
}

/// Text content form of the value
impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Nil => Ok(()),
            StateValue::Bool(b) => write!(f, "{}", b),
            StateValue::Int(i) => write!(f, "{}", i),
            StateValue::Float(n) => write!(f, "{}", n),
            StateValue::String(s) => f.write_str(s),
            StateValue::Object(_) => f.write_str("[object]"),
        }
    }
}

impl fmt::Debug for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Nil => f.write_str("Nil"),
            StateValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            StateValue::Int(i) => f.debug_tuple("Int").field(i).finish(),
            StateValue::Float(n) => f.debug_tuple("Float").field(n).finish(),
            StateValue::String(s) => f.debug_tuple("String").field(s).finish(),
            StateValue::Object(obj) => write!(f, "Object({:p})", Rc::as_ptr(obj)),
        }
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Bool(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        StateValue::Int(value)
    }
}

impl From<i32> for StateValue {
    fn from(value: i32) -> Self {
        StateValue::Int(value.into())
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        StateValue::Float(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::String(value.into())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::String(value.into())
    }
}

impl From<SmartString> for StateValue {
    fn from(value: SmartString) -> Self {
        StateValue::String(value)
    }
}

impl<T: Into<StateValue>> From<Option<T>> for StateValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(StateValue::Nil, Into::into)
    }
}

/// A live reference to a state key, carrying the value it had when it was read.
///
/// Passing a `StateRef` as a prop or child binds that part of the node to the
/// key; passing the plain value renders it once.
#[derive(Debug, Clone, PartialEq)]
pub struct StateRef {
    key: SmartString,
    value: StateValue,
}

impl StateRef {
    pub fn new(key: impl Into<SmartString>, value: StateValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &StateValue {
        &self.value
    }

    pub fn into_parts(self) -> (SmartString, StateValue) {
        (self.key, self.value)
    }
}
