// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine facade: the unified execute / simulate / batch surface.
use tracing::{instrument, warn};

use crate::config::EngineConfig;
use crate::effects::EffectsBuffer;
use crate::executor;
use crate::outcome::{CommandOutcome, FailureCode};
use crate::prng::Rng;
use crate::registry::Registry;
use crate::store::MemoryStore;
use crate::value::Value;

/// One engine instance: an RNG, a store, and a borrowed command registry.
///
/// Strictly single-threaded and non-reentrant; every call runs to completion
/// before the next one may start. The RNG and the store are the only state
/// shared across invocations.
pub struct Engine<'r, S = MemoryStore> {
    registry: &'r Registry<S>,
    rng: Rng,
    store: S,
    id_field: String,
}

impl<'r, S> Engine<'r, S> {
    /// Engine seeded with `seed`, diffing records by `"id"`.
    pub fn new(registry: &'r Registry<S>, store: S, seed: u32) -> Self {
        Self::with_config(registry, store, &EngineConfig::default().with_seed(seed))
    }

    /// Engine built from `config`.
    pub fn with_config(registry: &'r Registry<S>, store: S, config: &EngineConfig) -> Self {
        Self {
            registry,
            rng: Rng::new(config.seed),
            store,
            id_field: config.id_field.clone(),
        }
    }

    /// Runs the command registered under `key`.
    ///
    /// An unknown key yields an `UNKNOWN_COMMAND` engine failure. Every other
    /// problem inside the command is reported through the outcome as well.
    #[instrument(level = "debug", skip_all, fields(command = %key))]
    pub fn execute(&mut self, key: &str, params: &Value) -> CommandOutcome {
        let Some(descriptor) = self.registry.get(key) else {
            warn!("unknown command");
            return CommandOutcome::engine(
                FailureCode::UnknownCommand,
                format!("unknown command: {key}"),
            );
        };
        let mut effects = EffectsBuffer::new();
        executor::run(descriptor, params, &mut self.rng, &mut effects, &mut self.store)
    }

    /// Registry this engine dispatches through.
    pub fn registry(&self) -> &'r Registry<S> {
        self.registry
    }

    /// Current RNG state.
    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    /// Overwrites the RNG state.
    pub fn set_rng_state(&mut self, state: u32) {
        self.rng.set_state(state);
    }

    /// Engine RNG, for callers that draw outside commands.
    pub fn rng_mut(&mut self) -> &mut Rng {
        &mut self.rng
    }

    /// Engine store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Engine store, mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consumes the engine, returning its store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Record identifier field used by [`Engine::simulate`].
    pub fn id_field(&self) -> &str {
        &self.id_field
    }
}

impl<S> std::fmt::Debug for Engine<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("commands", &self.registry.len())
            .field("rng_state", &self.rng.state())
            .field("id_field", &self.id_field)
            .finish_non_exhaustive()
    }
}
