// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Seeded in-memory stores.

use stagecraft_core::{ArrayRef, MemoryStore, StoreError, Value};

/// Store holding `{ "items": [] }`.
#[must_use]
#[allow(clippy::expect_used)]
pub fn items_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .set("items", Value::array([]))
        .expect("fresh store root is mutable");
    store
}

/// Store seeded from a JSON object literal.
pub fn store_from_json(value: serde_json::Value) -> Result<MemoryStore, StoreError> {
    MemoryStore::from_value(&Value::from(value))
}

/// Length of the `items` collection; zero when absent.
pub fn items_len(store: &MemoryStore) -> usize {
    store.collection("items").as_ref().map_or(0, ArrayRef::len)
}
