// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Frozen, incrementally built result value of one command invocation.
use crate::freeze::deep_freeze;
use crate::hash::identity_hash;
use crate::value::{ObjectRef, Value};

/// The accumulator: a deep-frozen keyed map.
///
/// Every merge produces a new map; the previous one is left untouched. Keys
/// are unique across the whole invocation.
#[derive(Clone)]
pub struct Accumulator {
    root: ObjectRef,
}

impl Accumulator {
    pub(crate) fn empty() -> Self {
        let root = ObjectRef::new();
        root.freeze();
        Self { root }
    }

    /// Returns the value under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.root.get(key)
    }

    /// Returns true when `key` has been produced by an earlier rule.
    pub fn contains_key(&self, key: &str) -> bool {
        self.root.contains_key(key)
    }

    /// Keys in merge order.
    pub fn keys(&self) -> Vec<String> {
        self.root.keys()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Returns true before any fragment has been merged.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// The underlying frozen object.
    pub fn as_object(&self) -> &ObjectRef {
        &self.root
    }

    /// The accumulator as a [`Value::Object`] sharing the same identity.
    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Identity-aware structural hash, defined for every accumulator.
    pub(crate) fn fingerprint(&self) -> u64 {
        identity_hash(&self.to_value())
    }

    /// Merges `fragment` into a new frozen map.
    ///
    /// Fails with the first fragment key already present.
    pub(crate) fn merge(&self, fragment: &ObjectRef) -> Result<Self, String> {
        let incoming = fragment.entries();
        if let Some((key, _)) = incoming.iter().find(|(k, _)| self.root.contains_key(k)) {
            return Err(key.clone());
        }
        let root = ObjectRef::from_entries(self.root.entries().into_iter().chain(incoming));
        deep_freeze(&Value::Object(root.clone()));
        Ok(Self { root })
    }
}

impl std::fmt::Debug for Accumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Accumulator").field(&self.root).finish()
    }
}
