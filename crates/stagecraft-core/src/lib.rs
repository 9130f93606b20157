// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! stagecraft-core: deterministic staged command-execution runtime.
//!
//! Commands are named pipelines of rule functions grouped into five fixed
//! stages (validate, load, calc, mutate, emit). Each invocation builds a
//! deep-frozen accumulator from rule fragments, records effects in order, and
//! reports a [`CommandOutcome`]. Illegal writes to the accumulator are caught
//! by the frozen flag or, failing that, by the structural integrity hash.
//!
//! The [`Engine`] owns a seeded [`Rng`] and a store, and adds dry-run
//! [`Engine::simulate`] and all-or-nothing [`Engine::batch`] on top of
//! [`Engine::execute`]. Both roll back with whole-state snapshots.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod accumulator;
mod batch;
mod command;
mod config;
mod diff;
mod effects;
mod engine;
/// Stage driver behind [`Engine::execute`].
pub mod executor;
mod freeze;
mod hash;
mod outcome;
mod prng;
mod registry;
mod sandbox;
mod simulate;
mod store;
mod value;

pub use accumulator::Accumulator;
pub use batch::{BatchItem, BatchOptions, BatchReport};
pub use command::{
    command, CommandBuilder, CommandDescriptor, Rule, RuleContext, RuleError, RuleOutput,
    RuleResult, Stage,
};
pub use config::{ConfigError, EngineConfig};
pub use diff::{diff_snapshots, CollectionDiff, DiffEntry, RecordId, StoreDiff};
pub use effects::{mirror_effects, Effect, EffectsBuffer};
pub use engine::Engine;
pub use freeze::deep_freeze;
pub use hash::{canonical_bytes, integrity_hash, HashError};
pub use outcome::{CommandOutcome, Failure, FailureCode};
pub use prng::Rng;
pub use registry::{Registry, RegistryError};
pub use sandbox::{outcome_fingerprint, run_pair_determinism, DeterminismError};
pub use simulate::Simulation;
pub use store::{deep_copy, EngineStore, MemoryStore, StoreError, StoreSnapshot};
pub use value::{ArrayRef, DateRef, FunctionRef, NativeFn, ObjectRef, Symbol, Value, ValueError};
