// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Drives one command through its stages.
//!
//! Per rule, in registration order within each stage:
//!
//! 1. capture the accumulator fingerprint;
//! 2. invoke the rule, catching errors and panics;
//! 3. re-fingerprint; any change is an integrity violation, even when the
//!    write went through a path the frozen flag does not guard;
//! 4. short-circuit on a returned failure;
//! 5. merge an object fragment into a new frozen accumulator.
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, trace, warn};

use crate::accumulator::Accumulator;
use crate::command::{CommandDescriptor, RuleContext, RuleOutput, Stage};
use crate::effects::EffectsBuffer;
use crate::outcome::{CommandOutcome, Failure, FailureCode};
use crate::prng::Rng;
use crate::value::Value;

/// Runs `descriptor` against `params`.
///
/// The RNG is advanced once on entry whether or not any rule draws from it.
/// `effects` should be empty; it is always left empty on return.
///
/// Never fails: every rule error and panic is converted into an outcome.
pub fn run<S>(
    descriptor: &CommandDescriptor<S>,
    params: &Value,
    rng: &mut Rng,
    effects: &mut EffectsBuffer,
    store: &mut S,
) -> CommandOutcome {
    let key = descriptor.key();
    let entry_draw = rng.float();
    trace!(command = key, draw = entry_draw, state = rng.state(), "entry draw");

    let mut acc = Accumulator::empty();
    for stage in Stage::ALL {
        for (index, rule) in descriptor.rules(stage).iter().enumerate() {
            let before = acc.fingerprint();
            let result = {
                let mut ctx = RuleContext::new(key, rng, effects, store);
                catch_unwind(AssertUnwindSafe(|| rule.invoke(&acc, params, &mut ctx)))
            };
            let after = acc.fingerprint();

            let output = match result {
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    return engine_failure(effects, key, stage, FailureCode::RuleException, message);
                }
                Ok(Err(err)) => {
                    let code = if err.is_immutable_write() {
                        FailureCode::IntegrityMutation
                    } else {
                        FailureCode::RuleException
                    };
                    return engine_failure(effects, key, stage, code, err.to_string());
                }
                Ok(Ok(output)) => output,
            };

            if before != after {
                return engine_failure(
                    effects,
                    key,
                    stage,
                    FailureCode::IntegrityMutation,
                    format!("accumulator changed by {stage} rule #{index}"),
                );
            }

            match output {
                RuleOutput::Nothing => {}
                RuleOutput::Reject(Failure::Domain { code, message }) => {
                    let discarded = effects.drain().len();
                    debug!(command = key, %stage, %code, discarded, "domain failure");
                    return CommandOutcome::DomainFailure { code, message };
                }
                RuleOutput::Reject(Failure::Engine { code, message }) => {
                    let message = message.unwrap_or_else(|| code.as_str().to_owned());
                    return engine_failure(effects, key, stage, code, message);
                }
                RuleOutput::Fragment(Value::Object(fragment)) => match acc.merge(&fragment) {
                    Ok(next) => acc = next,
                    Err(dup) => {
                        return engine_failure(
                            effects,
                            key,
                            stage,
                            FailureCode::DuplicateResultKey,
                            format!("duplicate result key: {dup}"),
                        );
                    }
                },
                RuleOutput::Fragment(other) => {
                    trace!(command = key, %stage, kind = other.kind(), "non-object return ignored");
                }
            }
            debug!(command = key, %stage, rule = index, keys = acc.len(), "rule done");
        }
    }

    let effects = effects.drain();
    debug!(command = key, keys = acc.len(), effects = effects.len(), "command succeeded");
    CommandOutcome::Success { data: acc, effects }
}

fn engine_failure(
    effects: &mut EffectsBuffer,
    key: &str,
    stage: Stage,
    code: FailureCode,
    message: String,
) -> CommandOutcome {
    // Buffered effects are never surfaced on an engine failure.
    let _ = effects.drain();
    warn!(command = key, %stage, %code, %message, "engine failure");
    CommandOutcome::engine(code, message)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "rule panicked".to_owned()
    }
}
