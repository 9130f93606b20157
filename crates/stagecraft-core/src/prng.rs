// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Seeded counter-based pseudo-random generator with a single `u32` state.

/// Weyl increment added to the counter on every draw.
const WEYL_STEP: u32 = 0x6D2B_79F5;

/// 2^32, the divisor that maps a `u32` output into `[0, 1)`.
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Stateful counter-based generator (mulberry32 mixer) for deterministic runs.
///
/// * Not cryptographically secure; use only for rule-content randomness.
/// * The whole state is one `u32`, so [`Rng::state`] / [`Rng::set_state`]
///   capture and restore it exactly: identical state plus identical call order
///   yields an identical sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rng {
    state: u32,
}

impl Rng {
    /// Constructs a generator whose state is `seed`.
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Returns the next float in `[0, 1)` and advances the counter.
    pub fn float(&mut self) -> f64 {
        self.state = self.state.wrapping_add(WEYL_STEP);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        f64::from(t ^ (t >> 14)) / TWO_POW_32
    }

    /// Returns an integer in the inclusive range `[min, max]`.
    ///
    /// Derived from one [`Rng::float`] draw. Reversed bounds are swapped
    /// rather than rejected.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn int(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let span = (i128::from(hi) - i128::from(lo) + 1) as f64;
        let offset = (self.float() * span).floor() as i128;
        // `float() < 1` keeps the offset below `span`; clamp guards f64 rounding.
        let value = (i128::from(lo) + offset).min(i128::from(hi));
        value as i64
    }

    /// Current state.
    pub const fn state(&self) -> u32 {
        self.state
    }

    /// Overwrites the state; the next draw continues from `state`.
    pub fn set_state(&mut self, state: u32) {
        self.state = state;
    }
}
