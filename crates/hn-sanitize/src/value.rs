//! Dynamic value tree.
//!
//! `Value` models the untyped data that crosses the editor boundary: plain JSON-like
//! data plus the things a host UI tends to leave attached to it (callbacks, live
//! event/handle objects, symbol-keyed members). The opaque parts are cheap to carry
//! around but are never serializable; [`crate::Sanitizer`] strips them.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(1);

/// A non-string object key. Each `Symbol::new` call yields a distinct symbol,
/// even for equal descriptions.
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Arc<str>,
}

impl Symbol {
    pub fn new(description: impl Into<Arc<str>>) -> Self {
        Self {
            id: NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed),
            description: description.into(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Key {
    Name(String),
    Symbol(Symbol),
}

impl Key {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(name) => Some(name),
            Key::Symbol(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::Symbol(symbol) => write!(f, "{symbol}"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<Symbol> for Key {
    fn from(symbol: Symbol) -> Self {
        Key::Symbol(symbol)
    }
}

pub type CallbackFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// A function value. Equality is identity of the underlying closure.
#[derive(Clone)]
pub struct Callback {
    name: Arc<str>,
    f: Arc<CallbackFn>,
}

impl Callback {
    pub fn new<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.f)(args)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({})", self.name)
    }
}

/// A live platform object (DOM event, timer handle, socket...) identified by kind.
#[derive(Clone)]
pub struct PlatformHandle {
    kind: Arc<str>,
    inner: Arc<dyn Any + Send + Sync>,
}

impl PlatformHandle {
    pub fn new<T: Any + Send + Sync>(kind: impl Into<Arc<str>>, inner: T) -> Self {
        Self {
            kind: kind.into(),
            inner: Arc::new(inner),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl PartialEq for PlatformHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for PlatformHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlatformHandle({})", self.kind)
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    /// Ordered members; keys may be symbols.
    Object(Vec<(Key, Value)>),
    /// Keyed container with arbitrary keys.
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
    Function(Callback),
    Handle(PlatformHandle),
}

impl Value {
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<Key>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn function<F>(name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Value::Function(Callback::new(name, f))
    }

    pub fn handle<T: Any + Send + Sync>(kind: &str, inner: T) -> Self {
        Value::Handle(PlatformHandle::new(kind, inner))
    }

    /// Member lookup by string key on objects.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(entries) => entries
                .iter()
                .find(|(k, _)| k.as_name() == Some(name))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self {
            Value::Object(entries) => entries
                .iter_mut()
                .find(|(k, _)| k.as_name() == Some(name))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Insert or replace an object member. No-op on non-objects.
    pub fn insert(&mut self, key: impl Into<Key>, value: Value) -> Option<Value> {
        let Value::Object(entries) = self else {
            return None;
        };
        let key = key.into();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                entries.push((key, value));
                None
            }
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// True for values that can never be serialized.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Handle(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Function(_) => "function",
            Value::Handle(_) => "handle",
        }
    }

    /// Strict JSON conversion; fails on opaque content or symbol keys.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (Key::Name(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            Value::Number(_) => serializer.serialize_unit(),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) | Value::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    match key {
                        Key::Name(name) => map.serialize_entry(name, value)?,
                        Key::Symbol(symbol) => {
                            return Err(S::Error::custom(format!(
                                "symbol key {symbol} is not serializable"
                            )));
                        }
                    }
                }
                map.end()
            }
            Value::Map(entries) => {
                if entries.iter().all(|(k, _)| matches!(k, Value::String(_))) {
                    let mut map = serializer.serialize_map(Some(entries.len()))?;
                    for (key, value) in entries {
                        map.serialize_entry(key, value)?;
                    }
                    map.end()
                } else {
                    let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                    for (key, value) in entries {
                        seq.serialize_element(&(key, value))?;
                    }
                    seq.end()
                }
            }
            Value::Function(callback) => Err(S::Error::custom(format!(
                "function {} is not serializable",
                callback.name()
            ))),
            Value::Handle(handle) => Err(S::Error::custom(format!(
                "platform handle {} is not serializable",
                handle.kind()
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_unique_per_construction() {
        let a = Symbol::new("tag");
        let b = Symbol::new("tag");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn insert_replaces_existing_member() {
        let mut v = Value::object([("a", Value::from(1.0))]);
        assert_eq!(v.insert("a", Value::from(2.0)), Some(Value::from(1.0)));
        assert_eq!(v.insert("b", Value::Null), None);
        assert_eq!(v.get("a"), Some(&Value::from(2.0)));
    }

    #[test]
    fn plain_values_convert_to_json() {
        let v = Value::object([
            ("name", Value::from("Tank 1")),
            ("level", Value::from(2.5)),
            ("tags", Value::Set(vec![Value::from("a")])),
        ]);
        let json = v.to_json().unwrap();
        assert_eq!(json["name"], "Tank 1");
        assert_eq!(json["level"], 2.5);
        assert_eq!(json["tags"][0], "a");
    }

    #[test]
    fn opaque_values_refuse_serialization() {
        let v = Value::object([("onClick", Value::function("onClick", |_| Value::Null))]);
        assert!(v.to_json().is_err());

        let v = Value::object([(Key::Symbol(Symbol::new("meta")), Value::Null)]);
        assert!(v.to_json().is_err());
    }

    #[test]
    fn non_finite_numbers_become_null() {
        let json = Value::from(f64::NAN).to_json().unwrap();
        assert!(json.is_null());
    }

    #[test]
    fn json_round_trip_preserves_order_and_values() {
        let json = serde_json::json!({"b": 1.5, "a": [true, null, "x"]});
        let v = Value::from(json.clone());
        assert_eq!(v.to_json().unwrap(), json);
    }

    #[test]
    fn handles_downcast() {
        let h = PlatformHandle::new("MouseEvent", (10_i32, 20_i32));
        assert_eq!(h.downcast_ref::<(i32, i32)>(), Some(&(10, 20)));
        assert_eq!(h.kind(), "MouseEvent");
    }
}
