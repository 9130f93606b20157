// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Side-by-side determinism checks for isolated engines.
use crate::accumulator::Accumulator;
use crate::batch::BatchItem;
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::hash::{integrity_hash, HashError};
use crate::outcome::CommandOutcome;
use crate::registry::Registry;
use crate::store::{EngineStore, StoreError};
use crate::value::Value;

/// Determinism check failure.
#[derive(Debug, thiserror::Error)]
pub enum DeterminismError {
    /// The two engines disagreed at `step`.
    #[error("determinism mismatch at step {step} ({what}): {left:#x} vs {right:#x}")]
    Divergence {
        /// Index of the script item that diverged.
        step: usize,
        /// Which observation differed: `outcome`, `rng` or `store`.
        what: &'static str,
        /// Observation of the first engine.
        left: u64,
        /// Observation of the second engine.
        right: u64,
    },
    /// An outcome or store snapshot had no canonical form.
    #[error("cannot fingerprint step {step}: {source}")]
    Unhashable {
        /// Index of the script item.
        step: usize,
        /// Underlying hash error.
        source: HashError,
    },
    /// A store snapshot could not be taken.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Runs `script` on two engines built from the same registry and config,
/// each on a fresh store from `make_store`, comparing them after every step.
///
/// Engines run on the calling thread, one step at a time.
///
/// # Errors
/// [`DeterminismError::Divergence`] at the first step where outcome
/// fingerprints, RNG states or store snapshots differ.
pub fn run_pair_determinism<S, F>(
    registry: &Registry<S>,
    config: &EngineConfig,
    mut make_store: F,
    script: &[BatchItem],
) -> Result<(), DeterminismError>
where
    S: EngineStore,
    F: FnMut() -> S,
{
    let mut a = Engine::with_config(registry, make_store(), config);
    let mut b = Engine::with_config(registry, make_store(), config);

    for (step, item) in script.iter().enumerate() {
        let out_a = a.execute(&item.key, &item.params);
        let out_b = b.execute(&item.key, &item.params);

        let unhashable = |source| DeterminismError::Unhashable { step, source };
        check(
            step,
            "outcome",
            outcome_fingerprint(&out_a).map_err(unhashable)?,
            outcome_fingerprint(&out_b).map_err(unhashable)?,
        )?;
        check(step, "rng", u64::from(a.rng_state()), u64::from(b.rng_state()))?;
        check(
            step,
            "store",
            integrity_hash(a.store().snapshot()?.as_value()).map_err(unhashable)?,
            integrity_hash(b.store().snapshot()?.as_value()).map_err(unhashable)?,
        )?;
    }
    Ok(())
}

fn check(step: usize, what: &'static str, left: u64, right: u64) -> Result<(), DeterminismError> {
    if left == right {
        return Ok(());
    }
    tracing::warn!(step, what, "engines diverged");
    Err(DeterminismError::Divergence {
        step,
        what,
        left,
        right,
    })
}

/// Structural hash of an outcome: discriminant, code, message, data and
/// effects.
pub fn outcome_fingerprint(outcome: &CommandOutcome) -> Result<u64, HashError> {
    let effects = outcome.effects().iter().map(|e| {
        Value::from_entries([
            ("type", Value::from(e.kind())),
            ("target", Value::from(e.target())),
            ("payload", e.payload().cloned().unwrap_or_default()),
        ])
    });
    let text = |s: Option<&str>| s.map_or(Value::Undefined, Value::from);
    let shape = Value::from_entries([
        ("kind", Value::from(outcome.kind())),
        ("code", text(outcome.code())),
        ("message", text(outcome.message())),
        ("data", outcome.data().map_or(Value::Undefined, Accumulator::to_value)),
        ("effects", Value::array(effects)),
    ]);
    integrity_hash(&shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{command, RuleOutput};
    use crate::store::MemoryStore;

    #[test]
    fn seeded_pair_agrees() {
        let mut registry: Registry = Registry::new();
        let registered = command("roll")
            .calc(|_, _, ctx| {
                let d20 = ctx.rng().int(1, 20);
                Ok(RuleOutput::fragment([("d20", Value::from(d20))]))
            })
            .register(&mut registry);
        assert!(registered.is_ok());
        let script: Vec<BatchItem> = (0..16)
            .map(|_| BatchItem::new("roll", Value::Null))
            .collect();
        let result =
            run_pair_determinism(&registry, &EngineConfig::default(), MemoryStore::new, &script);
        assert!(result.is_ok());
    }

    #[test]
    fn fingerprint_tracks_data() {
        let a = CommandOutcome::from(crate::outcome::Failure::domain("A"));
        let b = CommandOutcome::from(crate::outcome::Failure::domain("B"));
        assert_ne!(outcome_fingerprint(&a), outcome_fingerprint(&b));
    }
}
