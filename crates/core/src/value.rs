//! Canonical value model for Datum.
//!
//! This module defines the single public value type used by every container.
//! A `Value` is a handle to a shared node: cloning a `Value` clones the
//! handle, not the data, so two containers (or two positions inside one
//! composite value) may refer to the same node. Each node carries its own
//! freeze flag, which is what makes deep-freeze observable per node.
//!
//! ## The Eight Kinds
//!
//! 1. `Null` - absence of value (the empty sentinel used by containers)
//! 2. `Bool` - boolean true or false
//! 3. `Int` - 64-bit signed integer
//! 4. `Float` - 64-bit IEEE-754 floating point
//! 5. `String` - UTF-8 encoded string
//! 6. `Bytes` - arbitrary binary data (distinct from String)
//! 7. `Array` - ordered sequence of value handles
//! 8. `Object` - string-keyed map of value handles
//!
//! ## Equality Rules
//!
//! - Different kinds are NEVER equal (no type coercion)
//! - `Int(1)` != `Float(1.0)`
//! - Float uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`
//! - Comparison is structural and cycle-safe: a pair of nodes already under
//!   comparison is assumed equal, so self-referential graphs terminate
//!
//! ## Cycles
//!
//! Because composite kinds hold handles, an array or object can contain an
//! ancestor of itself. Every recursive walk in this module (freeze, equality,
//! serialization) carries a visited set; serialization of a cyclic graph is
//! the one operation that fails rather than silently looping.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A shared handle to one value node.
///
/// `Value` is cheap to clone (one `Arc` bump). Structural equality is
/// provided through [`PartialEq`]; `Eq` is deliberately not implemented
/// because `Float` follows IEEE-754 semantics (`NaN != NaN`).
#[derive(Clone)]
pub struct Value {
    node: Arc<Node>,
}

struct Node {
    frozen: AtomicBool,
    kind: RwLock<Kind>,
}

enum Kind {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Kind {
    fn name(&self) -> &'static str {
        match self {
            Kind::Null => "Null",
            Kind::Bool(_) => "Bool",
            Kind::Int(_) => "Int",
            Kind::Float(_) => "Float",
            Kind::String(_) => "String",
            Kind::Bytes(_) => "Bytes",
            Kind::Array(_) => "Array",
            Kind::Object(_) => "Object",
        }
    }
}

// ============================================================================
// Construction
// ============================================================================

impl Value {
    fn from_kind(kind: Kind) -> Self {
        Value {
            node: Arc::new(Node {
                frozen: AtomicBool::new(false),
                kind: RwLock::new(kind),
            }),
        }
    }

    /// The empty sentinel. Containers reset to this on `clear`/`destroy`.
    pub fn null() -> Self {
        Value::from_kind(Kind::Null)
    }

    /// Build an array value from anything convertible to values.
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::from_kind(Kind::Array(items.into_iter().map(Into::into).collect()))
    }

    /// Build an object value from key/value pairs.
    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::from_kind(Kind::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Build a bytes value.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Value::from_kind(Kind::Bytes(data.into()))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::from_kind(Kind::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::from_kind(Kind::Int(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::from_kind(Kind::Int(i64::from(i)))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::from_kind(Kind::Float(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::from_kind(Kind::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::from_kind(Kind::String(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::from_kind(Kind::Array(items))
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Value::from_kind(Kind::Object(entries))
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl Value {
    /// Returns the kind name as a string (for error messages).
    pub fn kind_name(&self) -> &'static str {
        self.node.kind.read().name()
    }

    /// Check if this value is the empty sentinel.
    pub fn is_null(&self) -> bool {
        matches!(&*self.node.kind.read(), Kind::Null)
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match &*self.node.kind.read() {
            Kind::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_int(&self) -> Option<i64> {
        match &*self.node.kind.read() {
            Kind::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_float(&self) -> Option<f64> {
        match &*self.node.kind.read() {
            Kind::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get as an owned string. Clones out of the shared node.
    pub fn as_str(&self) -> Option<String> {
        match &*self.node.kind.read() {
            Kind::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Try to get as owned bytes. Clones out of the shared node.
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match &*self.node.kind.read() {
            Kind::Bytes(b) => Some(b.clone()),
            _ => None,
        }
    }

    /// Array element by position. `None` for non-arrays or out of range.
    pub fn item(&self, index: usize) -> Option<Value> {
        match &*self.node.kind.read() {
            Kind::Array(items) => items.get(index).cloned(),
            _ => None,
        }
    }

    /// Object field by name. `None` for non-objects or missing keys.
    pub fn field(&self, key: &str) -> Option<Value> {
        match &*self.node.kind.read() {
            Kind::Object(entries) => entries.get(key).cloned(),
            _ => None,
        }
    }

    /// Element count for arrays and objects, `None` for scalars.
    pub fn len(&self) -> Option<usize> {
        match &*self.node.kind.read() {
            Kind::Array(items) => Some(items.len()),
            Kind::Object(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// True when `len()` reports zero.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Sorted field names of an object, empty for anything else.
    pub fn keys(&self) -> Vec<String> {
        match &*self.node.kind.read() {
            Kind::Object(entries) => entries.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Composite editing (gated on the node freeze flag)
// ============================================================================

impl Value {
    fn check_editable(&self) -> Result<()> {
        if self.is_frozen() {
            return Err(Error::Frozen);
        }
        Ok(())
    }

    /// Append to an array node.
    pub fn push(&self, item: impl Into<Value>) -> Result<()> {
        self.check_editable()?;
        match &mut *self.node.kind.write() {
            Kind::Array(items) => {
                items.push(item.into());
                Ok(())
            }
            other => Err(Error::WrongType {
                expected: "Array",
                actual: other.name(),
            }),
        }
    }

    /// Replace an array element in place.
    pub fn set_item(&self, index: usize, item: impl Into<Value>) -> Result<()> {
        self.check_editable()?;
        match &mut *self.node.kind.write() {
            Kind::Array(items) => match items.get_mut(index) {
                Some(slot) => {
                    *slot = item.into();
                    Ok(())
                }
                None => Err(Error::WrongType {
                    expected: "index in range",
                    actual: "out-of-range index",
                }),
            },
            other => Err(Error::WrongType {
                expected: "Array",
                actual: other.name(),
            }),
        }
    }

    /// Insert or replace an object field.
    pub fn insert(&self, key: impl Into<String>, item: impl Into<Value>) -> Result<()> {
        self.check_editable()?;
        match &mut *self.node.kind.write() {
            Kind::Object(entries) => {
                entries.insert(key.into(), item.into());
                Ok(())
            }
            other => Err(Error::WrongType {
                expected: "Object",
                actual: other.name(),
            }),
        }
    }

    /// Remove an object field, returning the removed handle.
    pub fn remove(&self, key: &str) -> Result<Option<Value>> {
        self.check_editable()?;
        match &mut *self.node.kind.write() {
            Kind::Object(entries) => Ok(entries.remove(key)),
            other => Err(Error::WrongType {
                expected: "Object",
                actual: other.name(),
            }),
        }
    }
}

// ============================================================================
// Freezing
// ============================================================================

impl Value {
    fn addr(&self) -> usize {
        Arc::as_ptr(&self.node) as usize
    }

    /// Shallow-freeze this node. Composite edits on it fail afterwards;
    /// children are untouched.
    pub fn freeze(&self) {
        self.node.frozen.store(true, Ordering::Release);
    }

    /// Whether this node (shallowly) is frozen.
    pub fn is_frozen(&self) -> bool {
        self.node.frozen.load(Ordering::Acquire)
    }

    /// Recursively freeze this node and everything reachable from it.
    ///
    /// Each node is frozen exactly once; nodes that are already frozen are
    /// short-circuited without descending into them, and the visited set
    /// bounds the walk on cyclic or shared graphs.
    pub fn deep_freeze(&self) {
        let mut visited = HashSet::new();
        self.deep_freeze_walk(&mut visited);
    }

    fn deep_freeze_walk(&self, visited: &mut HashSet<usize>) {
        if !visited.insert(self.addr()) {
            return;
        }
        // swap returns the previous flag: already-frozen nodes short-circuit
        if self.node.frozen.swap(true, Ordering::AcqRel) {
            return;
        }
        match &*self.node.kind.read() {
            Kind::Array(items) => {
                for item in items {
                    item.deep_freeze_walk(visited);
                }
            }
            Kind::Object(entries) => {
                for item in entries.values() {
                    item.deep_freeze_walk(visited);
                }
            }
            _ => {}
        }
    }

    /// Whether every node reachable from this one is frozen.
    pub fn is_deeply_frozen(&self) -> bool {
        let mut visited = HashSet::new();
        self.deeply_frozen_walk(&mut visited)
    }

    fn deeply_frozen_walk(&self, visited: &mut HashSet<usize>) -> bool {
        if !visited.insert(self.addr()) {
            return true;
        }
        if !self.is_frozen() {
            return false;
        }
        match &*self.node.kind.read() {
            Kind::Array(items) => items.iter().all(|item| item.deeply_frozen_walk(visited)),
            Kind::Object(entries) => entries
                .values()
                .all(|item| item.deeply_frozen_walk(visited)),
            _ => true,
        }
    }
}

// ============================================================================
// Equality
// ============================================================================

impl Value {
    /// Structural deep equality, cycle-safe.
    ///
    /// Handles that are literally the same node compare equal without a
    /// walk. A pair of nodes already under comparison is assumed equal,
    /// which makes comparison of cyclic graphs terminate.
    pub fn deep_eq(&self, other: &Value) -> bool {
        let mut visiting = HashSet::new();
        self.eq_walk(other, &mut visiting)
    }

    fn eq_walk(&self, other: &Value, visiting: &mut HashSet<(usize, usize)>) -> bool {
        if Arc::ptr_eq(&self.node, &other.node) {
            return true;
        }
        if !visiting.insert((self.addr(), other.addr())) {
            return true;
        }
        let a = self.node.kind.read();
        let b = other.node.kind.read();
        match (&*a, &*b) {
            (Kind::Null, Kind::Null) => true,
            (Kind::Bool(x), Kind::Bool(y)) => x == y,
            (Kind::Int(x), Kind::Int(y)) => x == y,
            // IEEE-754: NaN != NaN, -0.0 == 0.0
            (Kind::Float(x), Kind::Float(y)) => x == y,
            (Kind::String(x), Kind::String(y)) => x == y,
            (Kind::Bytes(x), Kind::Bytes(y)) => x == y,
            (Kind::Array(x), Kind::Array(y)) => {
                x.len() == y.len()
                    && x.iter().zip(y.iter()).all(|(l, r)| l.eq_walk(r, visiting))
            }
            (Kind::Object(x), Kind::Object(y)) => {
                x.len() == y.len()
                    && x.iter().zip(y.iter()).all(|((lk, lv), (rk, rv))| {
                        lk == rk && lv.eq_walk(rv, visiting)
                    })
            }
            // Different kinds: NEVER equal (no type coercion)
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.deep_eq(other)
    }
}

// ============================================================================
// Serialization
// ============================================================================

impl Value {
    /// Deterministic JSON snapshot of the graph.
    ///
    /// Object keys come out sorted (the backing map is ordered), non-finite
    /// floats serialize as `null` (JSON cannot represent them), bytes
    /// serialize as number arrays. Fails with [`Error::Serialization`] on
    /// cyclic graphs.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut on_stack = HashSet::new();
        self.to_json_walk(&mut on_stack)
    }

    fn to_json_walk(&self, on_stack: &mut HashSet<usize>) -> Result<serde_json::Value> {
        if !on_stack.insert(self.addr()) {
            return Err(Error::Serialization(
                "cannot serialize a cyclic value graph".to_string(),
            ));
        }
        let json = match &*self.node.kind.read() {
            Kind::Null => serde_json::Value::Null,
            Kind::Bool(b) => serde_json::Value::Bool(*b),
            Kind::Int(i) => serde_json::Value::from(*i),
            Kind::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Kind::String(s) => serde_json::Value::String(s.clone()),
            Kind::Bytes(b) => serde_json::Value::Array(
                b.iter().map(|byte| serde_json::Value::from(*byte)).collect(),
            ),
            Kind::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(item.to_json_walk(on_stack)?);
                }
                serde_json::Value::Array(out)
            }
            Kind::Object(entries) => {
                let mut out = serde_json::Map::new();
                for (key, item) in entries {
                    out.insert(key.clone(), item.to_json_walk(on_stack)?);
                }
                serde_json::Value::Object(out)
            }
        };
        on_stack.remove(&self.addr());
        Ok(json)
    }

    /// Canonical string form used by the legacy change comparator.
    pub fn to_canonical_json(&self) -> Result<String> {
        serde_json::to_string(&self.to_json()?)
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Rebuild a value graph from JSON. The result is always acyclic.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::null(),
            serde_json::Value::Bool(b) => Value::from(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::from(i)
                } else {
                    Value::from(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::from(s.as_str()),
            serde_json::Value::Array(items) => {
                Value::array(items.iter().map(Value::from_json))
            }
            serde_json::Value::Object(entries) => Value::object(
                entries.iter().map(|(k, v)| (k.clone(), Value::from_json(v))),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Ok(Value::from_json(&json))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Ok(json) => write!(f, "Value({json})"),
            Err(_) => write!(f, "Value(<cyclic {}>)", self.kind_name()),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::null()
    }
}

// ============================================================================
// Tests
// ============================================================================
