// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
use stagecraft_core::{
    run_pair_determinism, BatchItem, DeterminismError, Engine, EngineConfig, MemoryStore, Rng,
    Value,
};
use stagecraft_dry_tests::{demo_registry, items_store, json, ADD, PUSH_ITEM, ROLL};

fn rolls(engine: &mut Engine<'_>, n: usize) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let outcome = engine.execute(ROLL, &Value::Null);
            let data = outcome.data().expect("roll succeeds");
            data.get("roll").and_then(|v| v.as_f64()).expect("roll value")
        })
        .collect()
}

#[test]
fn add_twice_with_seed_one_draws_twice() {
    let registry = demo_registry().expect("demo registry");
    let mut engine = Engine::new(&registry, MemoryStore::new(), 1);

    let first = engine.execute(ADD, &Value::Null);
    let second = engine.execute(ADD, &Value::Null);

    for outcome in [&first, &second] {
        assert!(outcome.is_ok());
        let value = outcome.data().and_then(|d| d.get("value"));
        assert_eq!(value.and_then(|v| v.as_f64()), Some(1.0));
        assert!(outcome.effects().is_empty());
    }

    let mut expected = Rng::new(1);
    let _ = expected.float();
    let _ = expected.float();
    assert_eq!(engine.rng_state(), expected.state());
}

#[test]
fn rule_free_draw_makes_sequences_diverge() {
    let registry = demo_registry().expect("demo registry");
    let mut plain = Engine::new(&registry, MemoryStore::new(), 9);
    let mut padded = Engine::new(&registry, MemoryStore::new(), 9);
    let _ = padded.execute(ADD, &Value::Null);
    assert_ne!(rolls(&mut plain, 8), rolls(&mut padded, 8));
}

#[test]
fn same_seed_same_sequence_across_engines() {
    let registry = demo_registry().expect("demo registry");
    let mut a = Engine::new(&registry, MemoryStore::new(), 1234);
    let mut b = Engine::new(&registry, MemoryStore::new(), 1234);
    let seq_a = rolls(&mut a, 32);
    assert_eq!(seq_a, rolls(&mut b, 32));
    assert!(seq_a.iter().all(|r| (1.0..=6.0).contains(r)));
}

#[test]
fn save_restore_replays_sequence() {
    let registry = demo_registry().expect("demo registry");
    let mut engine = Engine::new(&registry, MemoryStore::new(), 77);
    let _ = rolls(&mut engine, 3);
    let saved = engine.rng_state();
    let first = rolls(&mut engine, 10);
    engine.set_rng_state(saved);
    assert_eq!(first, rolls(&mut engine, 10));
}

#[test]
fn pair_runs_agree_on_demo_script() {
    let registry = demo_registry().expect("demo registry");
    let script = vec![
        BatchItem::new(ROLL, Value::Null),
        BatchItem::new(PUSH_ITEM, json(serde_json::json!({"id": "a"}))),
        BatchItem::new(ADD, Value::Null),
        BatchItem::new("missing", Value::Null),
        BatchItem::new(PUSH_ITEM, json(serde_json::json!({"id": "b"}))),
        BatchItem::new(ROLL, Value::Null),
    ];
    let config = EngineConfig::from_json_str(r#"{"seed": 5}"#).expect("config");
    run_pair_determinism(&registry, &config, items_store, &script).expect("deterministic");
}

#[test]
fn pair_runs_report_store_divergence() {
    let registry = demo_registry().expect("demo registry");
    let mut built = 0;
    let make_store = || {
        built += 1;
        let store = items_store();
        if built == 2 {
            store
                .collection("items")
                .expect("items")
                .push(Value::from_entries([("id", Value::from("seeded"))]))
                .expect("fresh array");
        }
        store
    };
    let script = vec![BatchItem::new(ADD, Value::Null)];
    let err = run_pair_determinism(&registry, &EngineConfig::default(), make_store, &script)
        .expect_err("stores differ");
    assert!(matches!(
        err,
        DeterminismError::Divergence { step: 0, what: "store", .. }
    ));
}
