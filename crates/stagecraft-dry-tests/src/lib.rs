// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for Stagecraft crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`commands`] - Demo commands (add, push-item, fail-mid, tamper, ...)
//! - [`stores`] - Seeded in-memory stores
//! - [`values`] - Value builders, including shared and cyclic graphs
//! - [`logging`] - Tracing bootstrap for tests

pub mod commands;
pub mod logging;
pub mod stores;
pub mod values;

pub use commands::{
    demo_registry, register_demo_commands, ADD, DUP_KEY, FAIL_MID, PUSH_ITEM, REJECT, ROLL,
    TAMPER_FROZEN, TAMPER_SILENT,
};
pub use logging::init_tracing;
pub use stores::{items_len, items_store, store_from_json};
pub use values::{cyclic_graph, json, shared_graph};
