// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Recursive, cycle-tolerant immutability marking.
use rustc_hash::FxHashSet;

use crate::value::Value;

/// Freezes every object and array reachable from `root`.
///
/// Traversal uses an explicit work stack and an identity-keyed visited set,
/// so cycles terminate and a container reachable through several paths is
/// visited once and keeps its identity. Primitives, dates, functions and
/// symbols are atomic leaves: they are never descended into and never
/// altered, so functions stay callable and dates keep their setter.
///
/// Returns the number of containers that were not frozen before this call.
pub fn deep_freeze(root: &Value) -> usize {
    let mut visited: FxHashSet<usize> = FxHashSet::default();
    let mut stack: Vec<Value> = vec![root.clone()];
    let mut newly_frozen = 0usize;

    while let Some(value) = stack.pop() {
        let Some(addr) = value.container_addr() else {
            continue;
        };
        if !visited.insert(addr) {
            continue;
        }
        match &value {
            Value::Object(obj) => {
                if !obj.is_frozen() {
                    obj.freeze();
                    newly_frozen += 1;
                }
                stack.extend(obj.entries().into_iter().map(|(_, v)| v));
            }
            Value::Array(arr) => {
                if !arr.is_frozen() {
                    arr.freeze();
                    newly_frozen += 1;
                }
                stack.extend(arr.items());
            }
            _ => {}
        }
    }
    newly_frozen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ArrayRef, ObjectRef};

    #[test]
    fn primitives_pass_through() {
        assert_eq!(deep_freeze(&Value::from(3)), 0);
        assert_eq!(deep_freeze(&Value::from("s")), 0);
    }

    #[test]
    fn nested_containers_are_frozen() {
        let inner = ArrayRef::from_items([Value::from(1)]);
        let root = Value::from_entries([("list", Value::Array(inner.clone()))]);
        assert_eq!(deep_freeze(&root), 2);
        assert!(root.is_frozen());
        assert!(inner.is_frozen());
    }

    #[test]
    fn shared_child_is_frozen_once() {
        let shared = ObjectRef::from_entries([("n", Value::from(1))]);
        let root = Value::from_entries([
            ("a", Value::Object(shared.clone())),
            ("b", Value::Object(shared.clone())),
        ]);
        assert_eq!(deep_freeze(&root), 2);
        let (Some(a), Some(b)) = (root.get("a"), root.get("b")) else {
            unreachable!("both keys were inserted above");
        };
        assert_eq!(a, b);
    }

    #[test]
    fn cycles_terminate() {
        let obj = ObjectRef::new();
        assert!(obj.set("self", Value::Object(obj.clone())).is_ok());
        assert_eq!(deep_freeze(&Value::Object(obj.clone())), 1);
        assert!(obj.is_frozen());
        assert_eq!(deep_freeze(&Value::Object(obj)), 0);
    }

    #[test]
    fn functions_stay_callable_and_dates_writable() {
        let root = Value::from_entries([
            ("f", Value::function(|_| Value::from(7))),
            ("d", Value::date(10)),
        ]);
        deep_freeze(&root);
        let called = root.get("f").and_then(|f| f.as_function().map(|f| f.call(&[])));
        assert_eq!(called, Some(Value::from(7)));
        if let Some(Value::Date(d)) = root.get("d") {
            d.set_time(11);
            assert_eq!(d.time(), 11);
        }
    }
}
