//! Deterministic random number generation for the demo dataset.
//!
//! RULE: the demo generator never calls a platform RNG.
//! All randomness flows through `DemoRng` streams derived from a single
//! master seed, so the same seed always yields the same dataset.
//!
//! Each table gets its own stream, seeded from
//! (master_seed XOR stream_index * golden ratio).

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct DemoRng {
    pub stream: DemoStream,
    inner: Pcg64Mcg,
}

impl DemoRng {
    pub fn new(master_seed: u64, stream: DemoStream) -> Self {
        let derived_seed = master_seed ^ (stream as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            stream,
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an i64 in [lo, hi].
    pub fn range_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(hi >= lo, "empty range {lo}..={hi}");
        lo + self.next_u64_below((hi - lo + 1) as u64) as i64
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Simplified Pareto draw. x_min: minimum value, alpha: shape.
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }
}

/// Stable stream assignments. Append only; reordering reseeds every table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum DemoStream {
    Profiles = 0,
    Accounts = 1,
    Transactions = 2,
}
