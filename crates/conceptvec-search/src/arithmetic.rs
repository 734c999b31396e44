//! Batched vector arithmetic.
//!
//! Computes `D = Q + B - C` for every sampled pair in one pass over a flat
//! output matrix, keeping the arithmetic step cache-friendly for `n` in the
//! thousands. Per-row bookkeeping (exclusion, selection) happens later in
//! the assembler.

use conceptvec_store::ConceptStore;

use crate::sample::EquationSample;

/// Compute the `[n, dim]` matrix of `D` vectors for the sampled pairs.
///
/// Row `i` is `q + store[samples[i].b_idx] - store[samples[i].c_idx]`.
/// Pure and deterministic given the samples; the output is row-major flat.
pub fn compute_d_batch(q: &[f32], samples: &[EquationSample], store: &ConceptStore) -> Vec<f32> {
    let dim = store.dim();
    debug_assert_eq!(q.len(), dim);

    let mut out = Vec::with_capacity(samples.len() * dim);
    for sample in samples {
        let b = store.vector_at(sample.b_idx);
        let c = store.vector_at(sample.c_idx);
        for j in 0..dim {
            out.push(q[j] + b[j] - c[j]);
        }
    }
    out
}
