// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dynamic value model shared by params, accumulators, effect payloads and
//! store state.
//!
//! Containers ([`ObjectRef`], [`ArrayRef`]) are reference-identity handles:
//! cloning a handle aliases the same container, which is what lets one value
//! graph contain shared and cyclic references. Every container carries a
//! frozen flag; once set, every mutating method fails with
//! [`ValueError::Frozen`].
//!
//! Dates are atomic leaves. Freezing never touches their setter, so
//! [`DateRef::set_time`] keeps working on a frozen graph; the integrity hash
//! is what catches that kind of write.
//!
//! # Equality
//!
//! [`PartialEq`] follows strict-equality semantics: primitives compare by
//! value, containers, dates, functions and symbols compare by identity. Use
//! [`crate::canonical_bytes`] for structural comparison.
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use thiserror::Error;

/// Errors raised by container mutation and value conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// A write was attempted against a frozen container.
    #[error("cannot assign to read only {kind}: value is frozen")]
    Frozen {
        /// Kind of container that rejected the write (`object` or `array`).
        kind: &'static str,
    },
    /// An array index was past the end of the array.
    #[error("array index {index} out of bounds (len {len})")]
    OutOfBounds {
        /// Requested index.
        index: usize,
        /// Array length at the time of the call.
        len: usize,
    },
    /// The value has no representation in the requested encoding.
    #[error("cannot convert {kind} value: {reason}")]
    Unrepresentable {
        /// Kind of the offending value.
        kind: &'static str,
        /// Why the conversion failed.
        reason: &'static str,
    },
}

struct ObjectCell {
    frozen: Cell<bool>,
    entries: RefCell<IndexMap<String, Value>>,
}

/// Shared handle to an insertion-ordered string-keyed object.
#[derive(Clone)]
pub struct ObjectRef(Rc<ObjectCell>);

impl ObjectRef {
    /// Creates an empty, mutable object.
    pub fn new() -> Self {
        Self(Rc::new(ObjectCell {
            frozen: Cell::new(false),
            entries: RefCell::new(IndexMap::new()),
        }))
    }

    /// Creates a mutable object from `(key, value)` pairs in iteration order.
    ///
    /// A repeated key keeps its first position and its last value.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self(Rc::new(ObjectCell {
            frozen: Cell::new(false),
            entries: RefCell::new(map),
        }))
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.entries.borrow().get(key).cloned()
    }

    /// Returns true when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.entries.borrow().contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.entries.borrow().len()
    }

    /// Returns true when the object has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.entries.borrow().is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.0.entries.borrow().keys().cloned().collect()
    }

    /// Entries in insertion order (values are handle clones).
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Inserts or replaces `key`, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: Value) -> Result<Option<Value>, ValueError> {
        self.ensure_mutable()?;
        Ok(self.0.entries.borrow_mut().insert(key.into(), value))
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove(&self, key: &str) -> Result<Option<Value>, ValueError> {
        self.ensure_mutable()?;
        Ok(self.0.entries.borrow_mut().shift_remove(key))
    }

    /// Marks this object (not its children) immutable.
    pub fn freeze(&self) {
        self.0.frozen.set(true);
    }

    /// Returns true once [`ObjectRef::freeze`] has been called.
    pub fn is_frozen(&self) -> bool {
        self.0.frozen.get()
    }

    /// Returns true when both handles point at the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    fn ensure_mutable(&self) -> Result<(), ValueError> {
        if self.is_frozen() {
            return Err(ValueError::Frozen { kind: "object" });
        }
        Ok(())
    }
}

impl Default for ObjectRef {
    fn default() -> Self {
        Self::new()
    }
}

struct ArrayCell {
    frozen: Cell<bool>,
    items: RefCell<Vec<Value>>,
}

/// Shared handle to an ordered list of values.
#[derive(Clone)]
pub struct ArrayRef(Rc<ArrayCell>);

impl ArrayRef {
    /// Creates an empty, mutable array.
    pub fn new() -> Self {
        Self::from_items(Vec::new())
    }

    /// Creates a mutable array holding `items`.
    pub fn from_items(items: impl IntoIterator<Item = Value>) -> Self {
        Self(Rc::new(ArrayCell {
            frozen: Cell::new(false),
            items: RefCell::new(items.into_iter().collect()),
        }))
    }

    /// Returns the element at `index`.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.items.borrow().get(index).cloned()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    /// Returns true when the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.items.borrow().is_empty()
    }

    /// Elements in order (handle clones).
    pub fn items(&self) -> Vec<Value> {
        self.0.items.borrow().clone()
    }

    /// Appends `value`.
    pub fn push(&self, value: Value) -> Result<(), ValueError> {
        self.ensure_mutable()?;
        self.0.items.borrow_mut().push(value);
        Ok(())
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn set(&self, index: usize, value: Value) -> Result<Value, ValueError> {
        self.ensure_mutable()?;
        let mut items = self.0.items.borrow_mut();
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or(ValueError::OutOfBounds { index, len })?;
        Ok(std::mem::replace(slot, value))
    }

    /// Removes and returns the last element.
    pub fn pop(&self) -> Result<Option<Value>, ValueError> {
        self.ensure_mutable()?;
        Ok(self.0.items.borrow_mut().pop())
    }

    /// Removes the element at `index`, shifting later elements down.
    pub fn remove(&self, index: usize) -> Result<Value, ValueError> {
        self.ensure_mutable()?;
        let mut items = self.0.items.borrow_mut();
        let len = items.len();
        if index >= len {
            return Err(ValueError::OutOfBounds { index, len });
        }
        Ok(items.remove(index))
    }

    /// Marks this array (not its elements) immutable.
    pub fn freeze(&self) {
        self.0.frozen.set(true);
    }

    /// Returns true once [`ArrayRef::freeze`] has been called.
    pub fn is_frozen(&self) -> bool {
        self.0.frozen.get()
    }

    /// Returns true when both handles point at the same array.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    fn ensure_mutable(&self) -> Result<(), ValueError> {
        if self.is_frozen() {
            return Err(ValueError::Frozen { kind: "array" });
        }
        Ok(())
    }
}

impl Default for ArrayRef {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, always-writable time value (epoch milliseconds).
#[derive(Clone)]
pub struct DateRef(Rc<Cell<i64>>);

impl DateRef {
    /// Creates a date at `millis` since the Unix epoch.
    pub fn new(millis: i64) -> Self {
        Self(Rc::new(Cell::new(millis)))
    }

    /// Epoch milliseconds.
    pub fn time(&self) -> i64 {
        self.0.get()
    }

    /// Overwrites the time. Freezing does not affect this accessor.
    pub fn set_time(&self, millis: i64) {
        self.0.set(millis);
    }

    /// Returns true when both handles point at the same date.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Signature of a native callable stored inside a value graph.
pub type NativeFn = dyn Fn(&[Value]) -> Value;

/// Shared callable. Atomic for freezing; unsupported for hashing and copying.
#[derive(Clone)]
pub struct FunctionRef(Rc<NativeFn>);

impl FunctionRef {
    /// Wraps `f` as a value-graph function.
    pub fn new(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invokes the function.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    /// Returns true when both handles point at the same function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }
}

/// Identity-bearing token. Two symbols with the same description are distinct.
#[derive(Clone)]
pub struct Symbol(Rc<str>);

impl Symbol {
    /// Creates a fresh symbol.
    pub fn new(description: &str) -> Self {
        Self(Rc::from(description))
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.0
    }

    /// Returns true when both handles are the same symbol.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<u8>() as usize
    }
}

/// A dynamically typed value.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// IEEE-754 double.
    Number(f64),
    /// Integer outside the double-safe range.
    BigInt(i128),
    /// UTF-8 string.
    String(String),
    /// Identity-bearing token.
    Symbol(Symbol),
    /// Time value.
    Date(DateRef),
    /// Native callable.
    Function(FunctionRef),
    /// Ordered list container.
    Array(ArrayRef),
    /// Keyed container.
    Object(ObjectRef),
}

impl Value {
    /// New empty mutable object.
    pub fn object() -> Self {
        Self::Object(ObjectRef::new())
    }

    /// New mutable object built from `(key, value)` pairs.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Object(ObjectRef::from_entries(entries))
    }

    /// New mutable array holding `items`.
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Array(ArrayRef::from_items(items))
    }

    /// New date at `millis` since the Unix epoch.
    pub fn date(millis: i64) -> Self {
        Self::Date(DateRef::new(millis))
    }

    /// New native function value.
    pub fn function(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self::Function(FunctionRef::new(f))
    }

    /// New symbol value.
    pub fn symbol(description: &str) -> Self {
        Self::Symbol(Symbol::new(description))
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::BigInt(_) => "bigint",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Date(_) => "date",
            Self::Function(_) => "function",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Returns the object handle when this is an object.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Returns the array handle when this is an array.
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the date handle when this is a date.
    pub fn as_date(&self) -> Option<&DateRef> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Returns the function handle when this is a function.
    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Self::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Returns the number when this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice when this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean when this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Shorthand for `self.as_object()?.get(key)`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.as_object()?.get(key)
    }

    /// Returns true for `Undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns true when this is a container and it is frozen.
    ///
    /// Non-container values report `false`.
    pub fn is_frozen(&self) -> bool {
        match self {
            Self::Object(o) => o.is_frozen(),
            Self::Array(a) => a.is_frozen(),
            _ => false,
        }
    }

    /// Converts to JSON.
    ///
    /// `undefined` becomes `null`, non-finite numbers become `null`, dates
    /// become their epoch milliseconds. Bigints, functions, symbols and cyclic
    /// graphs are rejected.
    pub fn to_json(&self) -> Result<serde_json::Value, ValueError> {
        let mut ancestors = FxHashSet::default();
        to_json_inner(self, &mut ancestors)
    }

    pub(crate) fn container_addr(&self) -> Option<usize> {
        match self {
            Self::Object(o) => Some(o.addr()),
            Self::Array(a) => Some(a.addr()),
            _ => None,
        }
    }
}

/// Largest integer an `f64` holds exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Whole numbers in the exact range become JSON integers.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn json_number(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}

fn to_json_inner(
    value: &Value,
    ancestors: &mut FxHashSet<usize>,
) -> Result<serde_json::Value, ValueError> {
    use serde_json::Value as Json;
    let cyclic = ValueError::Unrepresentable {
        kind: value.kind(),
        reason: "cyclic structure",
    };
    Ok(match value {
        Value::Undefined | Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => json_number(*n),
        Value::String(s) => Json::String(s.clone()),
        Value::Date(d) => Json::from(d.time()),
        Value::BigInt(_) | Value::Symbol(_) | Value::Function(_) => {
            return Err(ValueError::Unrepresentable {
                kind: value.kind(),
                reason: "no JSON form",
            })
        }
        Value::Array(a) => {
            if !ancestors.insert(a.addr()) {
                return Err(cyclic);
            }
            let out = a
                .items()
                .iter()
                .map(|item| to_json_inner(item, ancestors))
                .collect::<Result<Vec<_>, _>>()?;
            ancestors.remove(&a.addr());
            Json::Array(out)
        }
        Value::Object(o) => {
            if !ancestors.insert(o.addr()) {
                return Err(cyclic);
            }
            let mut out = serde_json::Map::new();
            for (k, v) in o.entries() {
                out.insert(k, to_json_inner(&v, ancestors)?);
            }
            ancestors.remove(&o.addr());
            Json::Object(out)
        }
    })
}

impl PartialEq for Value {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a.ptr_eq(b),
            (Self::Date(a), Self::Date(b)) => a.ptr_eq(b),
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            (Self::Array(a), Self::Array(b)) => a.ptr_eq(b),
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<usize> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Self::Object(o)
    }
}

impl From<ArrayRef> for Value {
    fn from(a: ArrayRef) -> Self {
        Self::Array(a)
    }
}

impl From<DateRef> for Value {
    fn from(d: DateRef) -> Self {
        Self::Date(d)
    }
}

impl From<FunctionRef> for Value {
    fn from(f: FunctionRef) -> Self {
        Self::Function(f)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::array(items.into_iter().map(Self::from)),
            Json::Object(map) => {
                Self::from_entries(map.into_iter().map(|(k, v)| (k, Self::from(v))))
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ancestors = Vec::new();
        fmt_value(self, f, &mut ancestors)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&Value::Object(self.clone()), f)
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&Value::Array(self.clone()), f)
    }
}

fn fmt_value(value: &Value, f: &mut fmt::Formatter<'_>, ancestors: &mut Vec<usize>) -> fmt::Result {
    match value {
        Value::Undefined => f.write_str("undefined"),
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Number(n) => write!(f, "{n}"),
        Value::BigInt(n) => write!(f, "{n}n"),
        Value::String(s) => write!(f, "{s:?}"),
        Value::Symbol(s) => write!(f, "Symbol({})", s.description()),
        Value::Date(d) => write!(f, "Date({})", d.time()),
        Value::Function(_) => f.write_str("[Function]"),
        Value::Array(a) => {
            if ancestors.contains(&a.addr()) {
                return f.write_str("[Circular]");
            }
            ancestors.push(a.addr());
            f.write_str("[")?;
            for (i, item) in a.items().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                fmt_value(item, f, ancestors)?;
            }
            ancestors.pop();
            f.write_str("]")
        }
        Value::Object(o) => {
            if ancestors.contains(&o.addr()) {
                return f.write_str("[Circular]");
            }
            ancestors.push(o.addr());
            f.write_str("{")?;
            for (i, (k, v)) in o.entries().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{k}: ")?;
                fmt_value(v, f, ancestors)?;
            }
            ancestors.pop();
            f.write_str("}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_object_rejects_writes() {
        let obj = ObjectRef::from_entries([("a", Value::from(1))]);
        obj.freeze();
        assert_eq!(
            obj.set("b", Value::from(2)),
            Err(ValueError::Frozen { kind: "object" })
        );
        assert_eq!(obj.remove("a"), Err(ValueError::Frozen { kind: "object" }));
        assert_eq!(obj.len(), 1);
    }

    #[test]
    fn frozen_array_rejects_writes() {
        let arr = ArrayRef::from_items([Value::from(1)]);
        arr.freeze();
        assert!(arr.push(Value::Null).is_err());
        assert!(arr.set(0, Value::Null).is_err());
        assert!(arr.pop().is_err());
        assert_eq!(arr.len(), 1);
    }

    #[test]
    fn array_set_out_of_bounds() {
        let arr = ArrayRef::new();
        assert_eq!(
            arr.set(3, Value::Null),
            Err(ValueError::OutOfBounds { index: 3, len: 0 })
        );
    }

    #[test]
    fn containers_compare_by_identity() {
        let a = Value::object();
        let b = Value::object();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(Value::from("x"), Value::from("x"));
    }

    #[test]
    fn debug_output_survives_cycles() {
        let obj = ObjectRef::new();
        assert!(obj.set("me", Value::Object(obj.clone())).is_ok());
        assert_eq!(format!("{obj:?}"), "{me: [Circular]}");
    }

    #[test]
    fn json_round_trip_preserves_shape() {
        let json = serde_json::json!({"a": [1, 2, {"b": null}], "c": "d"});
        let value = Value::from(json.clone());
        assert_eq!(value.to_json(), Ok(json));
    }

    #[test]
    fn to_json_keeps_whole_numbers_integral() {
        assert_eq!(Value::from(2).to_json(), Ok(serde_json::json!(2)));
        assert_eq!(Value::from(2.5).to_json(), Ok(serde_json::json!(2.5)));
        assert_eq!(Value::from(-0.0).to_json(), Ok(serde_json::json!(0)));
        assert_eq!(Value::from(1e300).to_json(), Ok(serde_json::json!(1e300)));
        assert_eq!(Value::from(f64::NAN).to_json(), Ok(serde_json::Value::Null));
    }

    #[test]
    fn to_json_rejects_cycles_and_functions() {
        let arr = ArrayRef::new();
        assert!(arr.push(Value::Array(arr.clone())).is_ok());
        assert!(Value::Array(arr).to_json().is_err());
        assert!(Value::function(|_| Value::Null).to_json().is_err());
    }
}
