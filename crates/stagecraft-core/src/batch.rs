// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Multi-command execution with optional all-or-nothing rollback.
use tracing::{debug, instrument, warn};

use crate::effects::Effect;
use crate::engine::Engine;
use crate::outcome::CommandOutcome;
use crate::store::{EngineStore, StoreError};
use crate::value::Value;

/// One `{key, params}` entry of a batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// Command key.
    pub key: String,
    /// Command params.
    pub params: Value,
}

impl BatchItem {
    /// Builds an item.
    pub fn new(key: impl Into<String>, params: Value) -> Self {
        Self {
            key: key.into(),
            params,
        }
    }
}

/// Batch mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Roll everything back on the first failure.
    pub atomic: bool,
}

impl BatchOptions {
    /// All-or-nothing mode.
    pub const fn atomic() -> Self {
        Self { atomic: true }
    }

    /// Best-effort mode.
    pub const fn best_effort() -> Self {
        Self { atomic: false }
    }
}

/// Aggregate result of [`Engine::batch`].
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Atomic: every item succeeded. Best-effort: at least one did.
    pub ok: bool,
    /// Outcomes in item order. An aborted atomic batch stops at the failure.
    pub results: Vec<CommandOutcome>,
    /// Effects of successful items in order; empty when an atomic batch aborts.
    pub effects: Vec<Effect>,
    /// Failed outcomes in encounter order.
    pub failed: Vec<CommandOutcome>,
}

impl<S: EngineStore> Engine<'_, S> {
    /// Runs `items` in order.
    ///
    /// # Errors
    /// Store copy failures while taking or restoring the atomic snapshot.
    #[instrument(level = "debug", skip_all, fields(items = items.len(), atomic = options.atomic))]
    pub fn batch(
        &mut self,
        items: &[BatchItem],
        options: BatchOptions,
    ) -> Result<BatchReport, StoreError> {
        if options.atomic {
            self.batch_atomic(items)
        } else {
            Ok(self.batch_best_effort(items))
        }
    }

    fn batch_atomic(&mut self, items: &[BatchItem]) -> Result<BatchReport, StoreError> {
        let snapshot = self.store().snapshot()?;
        let rng_before = self.rng_state();
        let mut report = BatchReport::default();

        for (index, item) in items.iter().enumerate() {
            let outcome = self.execute(&item.key, &item.params);
            report.results.push(outcome.clone());
            if !outcome.is_ok() {
                self.set_rng_state(rng_before);
                self.store_mut().restore(&snapshot)?;
                warn!(
                    index,
                    command = %item.key,
                    code = ?outcome.code(),
                    "atomic batch rolled back"
                );
                report.effects.clear();
                report.failed.push(outcome);
                return Ok(report);
            }
            report.effects.extend_from_slice(outcome.effects());
        }

        report.ok = true;
        debug!(effects = report.effects.len(), "atomic batch committed");
        Ok(report)
    }

    fn batch_best_effort(&mut self, items: &[BatchItem]) -> BatchReport {
        let mut report = BatchReport::default();
        for item in items {
            let outcome = self.execute(&item.key, &item.params);
            if outcome.is_ok() {
                report.ok = true;
                report.effects.extend_from_slice(outcome.effects());
            } else {
                report.failed.push(outcome.clone());
            }
            report.results.push(outcome);
        }
        debug!(ok = report.ok, failed = report.failed.len(), "batch finished");
        report
    }
}
