// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Demo commands for integration tests.
//!
//! All of them run against a [`MemoryStore`]; the ones touching the store
//! expect an `items` array (see [`crate::items_store`]).

use stagecraft_core::{
    command, Failure, MemoryStore, Registry, RegistryError, RuleError, RuleOutput, Value,
};

/// One calc rule returning `{ value: 1 }`.
pub const ADD: &str = "add";
/// Validates `params.id`, appends `{ id }` to `items`, emits `item-added`.
pub const PUSH_ITEM: &str = "push-item";
/// Calc rule that raises a rule error without touching the store.
pub const FAIL_MID: &str = "fail-mid";
/// Buffers an effect, then rejects with domain code `NOT_ALLOWED`.
pub const REJECT: &str = "reject";
/// One d6 draw from the engine RNG, returned as `{ roll }`.
pub const ROLL: &str = "roll";
/// Load and calc both return the key `hp`.
pub const DUP_KEY: &str = "dup-key";
/// Calc writes into a frozen object it received through the accumulator.
pub const TAMPER_FROZEN: &str = "tamper-frozen";
/// Calc moves a date held by the accumulator; the frozen flag does not see it.
pub const TAMPER_SILENT: &str = "tamper-silent";

/// Registers every demo command into `registry`.
pub fn register_demo_commands(registry: &mut Registry) -> Result<(), RegistryError> {
    command(ADD)
        .calc(|_, _, _| Ok(RuleOutput::fragment([("value", Value::from(1))])))
        .register(registry)?;

    command::<MemoryStore>(PUSH_ITEM)
        .validate(|_, params, _| {
            if !params.get("id").is_some_and(|v| v.as_str().is_some()) {
                return Ok(Failure::param_invalid("params.id must be a string").into());
            }
            Ok(RuleOutput::Nothing)
        })
        .mutate(|_, params, ctx| {
            let id = params.get("id").unwrap_or_default();
            let items = ctx
                .store()
                .collection("items")
                .ok_or_else(|| RuleError::message("store has no items collection"))?;
            items.push(Value::from_entries([("id", id)]))?;
            Ok(RuleOutput::fragment([("count", Value::from(items.len()))]))
        })
        .emit(|_, params, ctx| {
            let target = params.get("id").and_then(|v| v.as_str().map(str::to_owned));
            ctx.emit("item-added", target.unwrap_or_default(), None);
            Ok(RuleOutput::Nothing)
        })
        .register(registry)?;

    command(FAIL_MID)
        .calc(|_, _, _| Err(RuleError::message("fail-mid")))
        .register(registry)?;

    command(REJECT)
        .calc(|_, _, ctx| {
            ctx.emit("warn", "gate", None);
            Ok(RuleOutput::fragment([("checked", Value::from(true))]))
        })
        .mutate(|_, _, _| Ok(Failure::domain("NOT_ALLOWED").with_message("gate closed").into()))
        .register(registry)?;

    command(ROLL)
        .calc(|_, _, ctx| {
            let roll = ctx.rng().int(1, 6);
            Ok(RuleOutput::fragment([("roll", Value::from(roll))]))
        })
        .register(registry)?;

    command(DUP_KEY)
        .load(|_, _, _| Ok(RuleOutput::fragment([("hp", Value::from(1))])))
        .calc(|_, _, _| Ok(RuleOutput::fragment([("hp", Value::from(2))])))
        .register(registry)?;

    command(TAMPER_FROZEN)
        .load(|_, _, _| {
            Ok(RuleOutput::fragment([(
                "stats",
                Value::from_entries([("hp", Value::from(1))]),
            )]))
        })
        .calc(|acc, _, _| {
            if let Some(stats) = acc.get("stats").as_ref().and_then(Value::as_object) {
                stats.set("hp", Value::from(99))?;
            }
            Ok(RuleOutput::Nothing)
        })
        .register(registry)?;

    command(TAMPER_SILENT)
        .load(|_, _, _| Ok(RuleOutput::fragment([("at", Value::date(0))])))
        .calc(|acc, _, _| {
            if let Some(at) = acc.get("at").as_ref().and_then(Value::as_date) {
                at.set_time(86_400_000);
            }
            Ok(RuleOutput::Nothing)
        })
        .register(registry)?;

    Ok(())
}

/// Fresh registry holding every demo command.
pub fn demo_registry() -> Result<Registry, RegistryError> {
    let mut registry: Registry = Registry::new();
    register_demo_commands(&mut registry)?;
    Ok(registry)
}
