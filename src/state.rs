//! Application state, form data and the injected state store seam.

use crate::error::StoreError;
use serde_json::{Map, Value};
use std::sync::Mutex;

/// Typed application state keyed by field or section name.
pub type State = Map<String, Value>;

/// Submitted form values keyed by field name: strings, or arrays of strings.
pub type FormData = Map<String, Value>;

/// Reads and merges application state on behalf of the engine.
///
/// The engine never persists anything itself. It reads a snapshot, computes a partial
/// update scoped by section, and hands that update back through `merge`.
pub trait StateStore {
    fn read(&self) -> Result<State, StoreError>;

    /// Merges `update` into the stored state and returns the resulting state.
    fn merge(&self, update: State) -> Result<State, StoreError>;
}

/// A `StateStore` held in memory, mostly useful for tests and tooling.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<State>,
}

impl MemoryStateStore {
    pub fn new(initial: State) -> Self {
        Self {
            state: Mutex::new(initial),
        }
    }
}

impl StateStore for MemoryStateStore {
    fn read(&self) -> Result<State, StoreError> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn merge(&self, update: State) -> Result<State, StoreError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        deep_merge(&mut state, update);
        Ok(state.clone())
    }
}

/// Merges `update` into `target`. Nested objects merge key by key; anything else,
/// arrays included, is replaced.
pub fn deep_merge(target: &mut State, update: State) {
    for (key, value) in update {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// Truthiness in the sense used when pruning unrevealed answers.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Renders a scalar state value the way it is submitted through a form.
pub(crate) fn scalar_to_form_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Equality that tolerates scalars arriving as strings, e.g. `2` and `"2"`.
pub(crate) fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Array(_), _) | (_, Value::Array(_)) => false,
        (Value::Object(_), _) | (_, Value::Object(_)) => false,
        _ => scalar_to_form_string(a) == scalar_to_form_string(b),
    }
}

/// Whether `selected` picks `value`: equal to it, or an array containing it.
pub(crate) fn selects(selected: &Value, value: &Value) -> bool {
    match selected {
        Value::Array(items) => items.iter().any(|item| loose_eq(item, value)),
        other => loose_eq(other, value),
    }
}
