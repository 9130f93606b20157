// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tracing bootstrap for tests.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a test-writer subscriber once per process.
///
/// Filter comes from `RUST_LOG`, defaulting to `stagecraft_core=debug`.
/// Safe to call from every test.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("stagecraft_core=debug"));
        let installed = tracing_subscriber::fmt()
            .with_test_writer()
            .with_target(false)
            .without_time()
            .with_env_filter(filter)
            .try_init();
        if installed.is_ok() {
            tracing::debug!("test tracing initialised");
        }
    });
}
