// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Store contract and the in-memory reference store.
//!
//! The store is the only state, besides the RNG, that outlives one command
//! invocation. Simulation and atomic batches roll it back with whole-state
//! snapshot/restore, never with fine-grained undo.
use std::fmt::Write as _;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::value::{ArrayRef, DateRef, ObjectRef, Value, ValueError};

/// Errors raised while copying store state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A value with no plain-data form was found at `path`.
    #[error("unsupported {kind} value in store at {path}")]
    Unsupported {
        /// Location of the value, e.g. `$.items[0].onHit`.
        path: String,
        /// Kind of the offending value.
        kind: &'static str,
    },
    /// The store root must be an object.
    #[error("store root must be an object, got {0}")]
    NotAnObject(&'static str),
}

/// Opaque deep copy of store state.
#[derive(Debug, Clone)]
pub struct StoreSnapshot(Value);

impl StoreSnapshot {
    /// Wraps an already-copied value.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Borrowed view of the snapshot contents.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Anything the engine can snapshot and roll back.
pub trait EngineStore {
    /// Captures the current state.
    ///
    /// # Errors
    /// Fails when the state holds data the store cannot copy.
    fn snapshot(&self) -> Result<StoreSnapshot, StoreError>;

    /// Replaces the current state with `snapshot`.
    ///
    /// # Errors
    /// Fails when the snapshot holds data the store cannot copy.
    fn restore(&mut self, snapshot: &StoreSnapshot) -> Result<(), StoreError>;
}

/// In-memory store rooted at one object.
///
/// Copies defensively in both directions: a snapshot never aliases live
/// state, and restoring never aliases the snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    root: ObjectRef,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a deep copy of `value`.
    ///
    /// # Errors
    /// [`StoreError::NotAnObject`] for non-object roots,
    /// [`StoreError::Unsupported`] for data that cannot be copied.
    pub fn from_value(value: &Value) -> Result<Self, StoreError> {
        match deep_copy(value)? {
            Value::Object(root) => Ok(Self { root }),
            other => Err(StoreError::NotAnObject(other.kind())),
        }
    }

    /// Live value under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.root.get(key)
    }

    /// Writes `value` under `key`, returning the previous value.
    ///
    /// # Errors
    /// [`ValueError::Frozen`] once the root has been frozen, which happens
    /// when a rule hands [`MemoryStore::root`] to the accumulator.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: Value,
    ) -> Result<Option<Value>, ValueError> {
        self.root.set(key, value)
    }

    /// Live root object.
    pub fn root(&self) -> &ObjectRef {
        &self.root
    }

    /// Array stored under `key`, if any.
    pub fn collection(&self, key: &str) -> Option<ArrayRef> {
        self.root.get(key).and_then(|v| v.as_array().cloned())
    }
}

impl EngineStore for MemoryStore {
    fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        deep_copy(&Value::Object(self.root.clone())).map(StoreSnapshot)
    }

    fn restore(&mut self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        match deep_copy(&snapshot.0)? {
            Value::Object(root) => {
                self.root = root;
                Ok(())
            }
            other => Err(StoreError::NotAnObject(other.kind())),
        }
    }
}

/// Copies a plain-data value graph into fresh, unfrozen containers.
///
/// Shared and cyclic references are reproduced in the copy. Functions and
/// symbols are rejected.
///
/// # Errors
/// [`StoreError::Unsupported`] naming the first offending location.
pub fn deep_copy(value: &Value) -> Result<Value, StoreError> {
    let mut copier = Copier::default();
    let mut path = String::from("$");
    copier.copy(value, &mut path)
}

#[derive(Default)]
struct Copier {
    memo: FxHashMap<usize, Value>,
}

impl Copier {
    fn copy(&mut self, value: &Value, path: &mut String) -> Result<Value, StoreError> {
        if let Some(addr) = value.container_addr() {
            if let Some(done) = self.memo.get(&addr) {
                return Ok(done.clone());
            }
        }
        match value {
            Value::Function(_) | Value::Symbol(_) => Err(StoreError::Unsupported {
                path: path.clone(),
                kind: value.kind(),
            }),
            Value::Date(d) => Ok(Value::Date(DateRef::new(d.time()))),
            Value::Array(src) => {
                let dst = ArrayRef::new();
                self.memo.insert(src.addr(), Value::Array(dst.clone()));
                for (i, item) in src.items().iter().enumerate() {
                    let mark = path.len();
                    let _ = write!(path, "[{i}]");
                    let copied = self.copy(item, path)?;
                    path.truncate(mark);
                    let _ = dst.push(copied);
                }
                Ok(Value::Array(dst))
            }
            Value::Object(src) => {
                let dst = ObjectRef::new();
                self.memo.insert(src.addr(), Value::Object(dst.clone()));
                for (key, item) in src.entries() {
                    let mark = path.len();
                    path.push('.');
                    path.push_str(&key);
                    let copied = self.copy(&item, path)?;
                    path.truncate(mark);
                    let _ = dst.set(key, copied);
                }
                Ok(Value::Object(dst))
            }
            primitive => Ok(primitive.clone()),
        }
    }
}
