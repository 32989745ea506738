use super::value::{StateRef, StateValue};
use smartstring::alias::String as SmartString;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("{0} is not defined in state.")]
    KeyNotDefined(SmartString),
}

/// Component state: a fixed set of keys, each holding a [`StateValue`].
///
/// Keys are decided when the container is created. Updates go through
/// [`State::apply`], which either applies a whole patch or nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    values: HashMap<SmartString, StateValue>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Read a key as a live reference
    pub fn read(&self, key: &str) -> Result<StateRef, StateError> {
        self.values
            .get(key)
            .map(|value| StateRef::new(key, value.clone()))
            .ok_or_else(|| StateError::KeyNotDefined(key.into()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(SmartString::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Apply a patch atomically.
    ///
    /// Every key is checked before anything is written, so on error the
    /// container is exactly as it was. Returns the keys whose value changed,
    /// in patch order, each listed once.
    pub fn apply(&mut self, patch: StatePatch) -> Result<Vec<SmartString>, StateError> {
        if let Some((key, _)) = patch
            .entries
            .iter()
            .find(|(key, _)| !self.values.contains_key(key))
        {
            return Err(StateError::KeyNotDefined(key.clone()));
        }

        let mut changed: Vec<SmartString> = Vec::new();
        for (key, value) in patch.entries {
            let Some(slot) = self.values.get_mut(&key) else {
                continue;
            };
            if slot.eq_value(&value) {
                continue;
            }
            *slot = value;
            if !changed.contains(&key) {
                changed.push(key);
            }
        }
        Ok(changed)
    }

    pub(crate) fn clear(&mut self) {
        self.values.clear();
    }
}

impl<K, V> FromIterator<(K, V)> for State
where
    K: Into<SmartString>,
    V: Into<StateValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Ordered set of key/value writes for [`State::apply`]
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    entries: Vec<(SmartString, StateValue)>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<SmartString>, value: impl Into<StateValue>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// A state holding exactly the patch's entries
    pub fn into_state(self) -> State {
        State {
            values: self.entries.into_iter().collect(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for StatePatch
where
    K: Into<SmartString>,
    V: Into<StateValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
