//! Events delivered to an interpreter.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An event: a kind string plus an arbitrary JSON payload.
///
/// Payload fields are inputs to guards and actions. Events are cheap to
/// build from a bare string when no payload is needed.
///
/// # Example
///
/// ```rust
/// use uimachines::Event;
///
/// let event = Event::new("UPDATE").with("duration", 5000);
/// assert_eq!(event.kind(), "UPDATE");
/// assert_eq!(event.get_u64("duration"), Some(5000));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    kind: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    payload: Map<String, Value>,
}

impl Event {
    /// Create an event with the given kind and no payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Map::new(),
        }
    }

    /// The synthetic kind-less event transient states resolve against.
    pub fn internal() -> Self {
        Self::new("")
    }

    /// Attach a payload field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// The event kind.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Whether this is the synthetic internal event.
    pub fn is_internal(&self) -> bool {
        self.kind.is_empty()
    }

    /// Get a raw payload value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Get a string payload field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// Get an unsigned integer payload field.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.payload.get(key).and_then(Value::as_u64)
    }

    /// The full payload map.
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }
}

impl From<&str> for Event {
    fn from(kind: &str) -> Self {
        Event::new(kind)
    }
}

impl From<String> for Event {
    fn from(kind: String) -> Self {
        Event::new(kind)
    }
}
