// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Value builders for tests.

use stagecraft_core::{ObjectRef, Value};

/// Converts a `serde_json::json!` literal into a [`Value`].
///
/// # Example
///
/// ```
/// use stagecraft_dry_tests::json;
///
/// let v = json(serde_json::json!({"hp": 3}));
/// assert_eq!(v.get("hp").and_then(|v| v.as_f64()), Some(3.0));
/// ```
pub fn json(value: serde_json::Value) -> Value {
    Value::from(value)
}

/// `{ left: S, right: S }` where both keys point at the same object `S`.
pub fn shared_graph() -> (Value, ObjectRef) {
    let shared = ObjectRef::from_entries([("n", Value::from(1))]);
    let root = Value::from_entries([
        ("left", Value::Object(shared.clone())),
        ("right", Value::Object(shared.clone())),
    ]);
    (root, shared)
}

/// `{ name, self: <root>, list: [<root>] }`: a self-referencing object.
pub fn cyclic_graph() -> ObjectRef {
    let root = ObjectRef::from_entries([("name", Value::from("loop"))]);
    let list = Value::array([Value::Object(root.clone())]);
    // Fresh containers are never frozen.
    let _ = root.set("self", Value::Object(root.clone()));
    let _ = root.set("list", list);
    root
}
