// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
use stagecraft_core::{deep_copy, deep_freeze, integrity_hash, MemoryStore, StoreError, Value};
use stagecraft_dry_tests::{cyclic_graph, shared_graph, store_from_json};

#[test]
fn shared_subobject_is_frozen_exactly_once() {
    let (root, shared) = shared_graph();
    assert_eq!(deep_freeze(&root), 2);
    assert!(shared.is_frozen());
    assert_eq!(deep_freeze(&root), 0);
    assert_eq!(root.get("left"), root.get("right"));
}

#[test]
fn cyclic_graph_freezes_but_does_not_hash() {
    let root = Value::Object(cyclic_graph());
    assert_eq!(deep_freeze(&root), 2);
    assert!(root.get("list").is_some_and(|l| l.is_frozen()));
    assert!(integrity_hash(&root).is_err());
}

#[test]
fn copying_a_frozen_graph_yields_mutable_containers() {
    let (root, _) = shared_graph();
    let _ = deep_freeze(&root);
    let copy = deep_copy(&root).expect("plain data");
    assert!(!copy.is_frozen());
    let left = copy.get("left").expect("left");
    assert!(!left.is_frozen());
    assert_eq!(left, copy.get("right").expect("right"));
    assert_eq!(integrity_hash(&copy), integrity_hash(&root));
}

#[test]
fn store_rejects_symbols_at_copy_time() {
    let mut store = MemoryStore::new();
    store
        .set("tags", Value::array([Value::symbol("hidden")]))
        .expect("mutable root");
    let err = stagecraft_core::EngineStore::snapshot(&store).expect_err("symbol");
    assert_eq!(
        err,
        StoreError::Unsupported {
            path: "$.tags[0]".to_owned(),
            kind: "symbol",
        }
    );
}

#[test]
fn json_seeded_store_round_trips() {
    let store = store_from_json(serde_json::json!({"items": [{"id": "a"}], "turn": 2}))
        .expect("plain data");
    assert_eq!(store.collection("items").map(|a| a.len()), Some(1));
    let json = store.get("turn").and_then(|v| v.to_json().ok());
    assert_eq!(json, Some(serde_json::json!(2)));
}
