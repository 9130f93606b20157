// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dry-run execution.
use tracing::{debug, instrument};

use crate::diff::{diff_snapshots, StoreDiff};
use crate::effects::Effect;
use crate::engine::Engine;
use crate::outcome::CommandOutcome;
use crate::store::{EngineStore, StoreError};
use crate::value::Value;

/// Result of [`Engine::simulate`].
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Outcome the command produced against live state.
    pub outcome: CommandOutcome,
    /// Collection changes the command made before they were rolled back.
    pub diff: StoreDiff,
    /// The outcome's own effects; never derived or mirrored ones.
    pub effects: Vec<Effect>,
}

impl<S: EngineStore> Engine<'_, S> {
    /// Runs `key` for real, then rolls the store and the RNG back.
    ///
    /// Rules observe the true store and RNG. Rollback happens whatever the
    /// outcome.
    ///
    /// # Errors
    /// Store copy failures. The pre-call state is still restored when the
    /// post-call snapshot is the one that fails.
    #[instrument(level = "debug", skip_all, fields(command = %key))]
    pub fn simulate(&mut self, key: &str, params: &Value) -> Result<Simulation, StoreError> {
        let before = self.store().snapshot()?;
        let rng_before = self.rng_state();

        let outcome = self.execute(key, params);
        let after = self.store().snapshot();

        self.set_rng_state(rng_before);
        self.store_mut().restore(&before)?;
        let after = after?;

        let diff = diff_snapshots(&before, &after, self.id_field());
        debug!(outcome = outcome.kind(), changed = !diff.is_empty(), "simulation rolled back");
        let effects = outcome.effects().to_vec();
        Ok(Simulation {
            outcome,
            diff,
            effects,
        })
    }
}
