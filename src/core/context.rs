//! Mutable context bag owned by a single interpreter.
//!
//! The context is an arbitrarily-shaped JSON object that guards read and
//! actions mutate. It is exclusively owned by one interpreter instance;
//! cross-interpreter communication goes through events, never through a
//! shared context.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key/value data bag read by guards and mutated by actions.
///
/// Mutations are synchronous: a value written by an action is visible to
/// every guard and action that runs later in the same event-processing
/// cycle.
///
/// # Example
///
/// ```rust
/// use uimachines::Context;
/// use serde_json::json;
///
/// let mut ctx = Context::from_object(json!({ "duration": 3000, "type": "info" })).unwrap();
///
/// assert_eq!(ctx.get_u64("duration"), Some(3000));
/// assert_eq!(ctx.get_str("type"), Some("info"));
///
/// ctx.set("duration", 1500);
/// assert_eq!(ctx.get_u64("duration"), Some(1500));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    fields: Map<String, Value>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON object value.
    ///
    /// Returns `None` when the value is not a JSON object.
    pub fn from_object(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Get a raw value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a mutable reference to a value, for in-place mutation of
    /// nested objects.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    /// Get a string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Get an unsigned integer field.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.fields.get(key).and_then(Value::as_u64)
    }

    /// Get a signed integer field.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(Value::as_i64)
    }

    /// Get a float field.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    /// Get a boolean field.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Remove a field, returning the previous value if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Check whether a field exists.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Merge the fields of a JSON object into this context, overwriting
    /// existing keys. Non-object values are ignored.
    pub fn merge(&mut self, value: Value) {
        if let Value::Object(fields) = value {
            for (key, val) in fields {
                self.fields.insert(key, val);
            }
        }
    }

    /// Snapshot the context as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}
