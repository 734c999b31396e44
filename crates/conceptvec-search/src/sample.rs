//! Random sampling of equation operands.
//!
//! Each trial fixes the query `Q` and draws the free variables `B` and `C`
//! uniformly over the store, independently and with replacement. A draw may
//! set `b_idx == c_idx` or collide with the query index; only the *result*
//! of the equation is filtered downstream, never the inputs.

use rand::Rng;
use rand::rngs::StdRng;

/// The free-variable operands of one sampled trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquationSample {
    /// Index of `B` in the store.
    pub b_idx: usize,
    /// Index of `C` in the store.
    pub c_idx: usize,
}

/// Draw `n` `(B, C)` index pairs uniformly over `[0, store_size)`.
///
/// Sampling is with replacement in both coordinates, so duplicates within
/// and across pairs are expected. Determinism comes entirely from the
/// caller-provided RNG.
pub fn generate_samples(n: usize, store_size: usize, rng: &mut StdRng) -> Vec<EquationSample> {
    (0..n)
        .map(|_| EquationSample {
            b_idx: rng.random_range(0..store_size),
            c_idx: rng.random_range(0..store_size),
        })
        .collect()
}
